//! Best-effort text recognition over a normalized overlay image.

use leptess::{LepTess, Variable};
use opencv::{core::Vector, imgcodecs, prelude::*};

use crate::error::SeekError;

/// Outcome of a recognition attempt.
///
/// A failed engine call and a blank read are the same thing to callers:
/// "no readable clock here", which is a normal outcome, not an error. The
/// variant exists so it can never be confused with a successful read of
/// actual text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Text(String),
    Empty,
}

impl Recognition {
    pub(crate) fn from_raw(raw: String) -> Self {
        if raw.trim().is_empty() {
            Recognition::Empty
        } else {
            Recognition::Text(raw)
        }
    }
}

pub struct TextRecognizer {
    engine: LepTess,
}

impl TextRecognizer {
    /// Initialize Tesseract with a character whitelist and single-line page
    /// segmentation. Initialization is the one place OCR is allowed to fail
    /// for real: without tessdata there is no engine to degrade to.
    pub fn new(tessdata: Option<&str>, lang: &str, whitelist: &str) -> Result<Self, SeekError> {
        let mut engine =
            LepTess::new(tessdata, lang).map_err(|e| SeekError::OcrInit(e.to_string()))?;

        engine
            .set_variable(Variable::TesseditCharWhitelist, whitelist)
            .map_err(|e| SeekError::OcrInit(e.to_string()))?;
        engine
            .set_variable(Variable::TesseditPagesegMode, "7")
            .map_err(|e| SeekError::OcrInit(e.to_string()))?;

        Ok(Self { engine })
    }

    /// Run recognition on a normalized image. Never fails: any encode or
    /// engine error degrades to `Recognition::Empty`.
    pub fn recognize(&mut self, image: &Mat) -> Recognition {
        let mut png = Vector::<u8>::new();
        let params = Vector::<i32>::new();
        if imgcodecs::imencode(".png", image, &mut png, &params).is_err() {
            return Recognition::Empty;
        }

        if self.engine.set_image_from_mem(png.as_slice()).is_err() {
            return Recognition::Empty;
        }
        self.engine.set_source_resolution(300);

        match self.engine.get_utf8_text() {
            Ok(raw) => Recognition::from_raw(raw),
            Err(_) => Recognition::Empty,
        }
    }
}

pub mod preprocess;
pub mod recognize;

use chrono::NaiveTime;
use opencv::core::Mat;

use crate::error::SeekError;
use crate::timecode::TimeFormat;
use preprocess::CropRect;
use recognize::{Recognition, TextRecognizer};

/// Read the overlay clock out of one frame: crop and normalize the region,
/// recognize it, extract the timestamp.
pub fn read_clock(
    frame: &Mat,
    crop: &CropRect,
    recognizer: &mut TextRecognizer,
    format: TimeFormat,
) -> Result<NaiveTime, SeekError> {
    let normalized = preprocess::preprocess(frame, crop)?;
    match recognizer.recognize(&normalized) {
        Recognition::Empty => Err(SeekError::RecognitionEmpty),
        Recognition::Text(raw) => format.find_timestamp(&raw),
    }
}

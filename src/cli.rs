use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::ocr::preprocess::CropRect;
use crate::timecode::TimeFormat;
use crate::window::ExtractorConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind to
    #[arg(long, default_value_t = 12270)]
    pub port: u16,

    /// Root directory for uploads and transcoded output
    #[arg(long, env = "CLOCKJUMP_MEDIA_ROOT")]
    pub media_root: PathBuf,

    /// ffmpeg binary used to re-encode uploads
    #[arg(long, env = "CLOCKJUMP_FFMPEG", default_value = "ffmpeg")]
    pub ffmpeg: String,

    /// Tesseract data directory (engine default when unset)
    #[arg(long, env = "CLOCKJUMP_TESSDATA")]
    pub tessdata: Option<String>,

    /// Tesseract language model
    #[arg(long, env = "CLOCKJUMP_OCR_LANG", default_value = "eng")]
    pub ocr_lang: String,

    /// Clock format of the overlay and of the log's time components
    #[arg(long, env = "CLOCKJUMP_TIME_FORMAT", value_enum, default_value = "24h")]
    pub time_format: TimeFormat,

    /// Overlay crop region, left edge
    #[arg(long, env = "CLOCKJUMP_CROP_X", default_value_t = 0)]
    pub crop_x: i32,

    /// Overlay crop region, top edge
    #[arg(long, env = "CLOCKJUMP_CROP_Y", default_value_t = 0)]
    pub crop_y: i32,

    /// Overlay crop region width
    #[arg(long, env = "CLOCKJUMP_CROP_WIDTH", default_value_t = 512)]
    pub crop_width: i32,

    /// Overlay crop region height
    #[arg(long, env = "CLOCKJUMP_CROP_HEIGHT", default_value_t = 64)]
    pub crop_height: i32,

    /// Seconds of video time between samples in a clock scan
    #[arg(long, env = "CLOCKJUMP_SAMPLE_INTERVAL", default_value_t = 5.0)]
    pub sample_interval_secs: f64,

    /// Timestamp column of the uploaded log
    #[arg(long, env = "CLOCKJUMP_TIME_COLUMN", default_value = "DATE AND TIME")]
    pub time_column: String,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn crop(&self) -> CropRect {
        CropRect {
            x: self.crop_x,
            y: self.crop_y,
            width: self.crop_width,
            height: self.crop_height,
        }
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            crop: self.crop(),
            format: self.time_format,
            tessdata: self.tessdata.clone(),
            lang: self.ocr_lang.clone(),
            sample_interval_secs: self.sample_interval_secs,
        }
    }

    /// Directory holding original uploads.
    pub fn upload_dir(&self) -> PathBuf {
        self.media_root.join("uploads")
    }

    /// Directory holding transcoded, playable files.
    pub fn playable_dir(&self) -> PathBuf {
        self.media_root.join("playable")
    }
}

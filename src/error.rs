use chrono::NaiveTime;
use thiserror::Error;

/// Failure kinds of the extraction and alignment pipeline.
///
/// None of these is fatal to the process: the API layer maps every variant
/// to a "play from the beginning" response. The distinction between variants
/// matters for the reason string shown to the user and for tests.
#[derive(Error, Debug)]
pub enum SeekError {
    #[error("could not read frame {0} from the video")]
    FrameRead(usize),

    #[error("recognizer produced no text")]
    RecognitionEmpty,

    #[error("no timestamp found in recognized text")]
    TimestampNotFound,

    #[error("selected time {selected} is outside the video window {start}..{end}")]
    OutOfRange {
        selected: NaiveTime,
        start: NaiveTime,
        end: NaiveTime,
    },

    #[error("log row has no usable timestamp field")]
    MalformedRow,

    #[error("crop region starts outside the frame ({x}, {y})")]
    CropOutOfBounds { x: i32, y: i32 },

    #[error("OCR engine unavailable: {0}")]
    OcrInit(String),

    #[error("transcode failed: {0}")]
    Transcode(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Video(#[from] opencv::Error),

    #[error("log could not be parsed: {0}")]
    Log(#[from] csv::Error),
}

impl SeekError {
    /// True for the expected, informational misses that the UI reports as
    /// "playing from the start" rather than as failures.
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            SeekError::RecognitionEmpty
                | SeekError::TimestampNotFound
                | SeekError::OutOfRange { .. }
                | SeekError::MalformedRow
        )
    }
}

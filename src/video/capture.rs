use opencv::{
    prelude::*,
    videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT, CAP_PROP_POS_FRAMES},
};

use super::FrameSource;
use crate::error::SeekError;

/// OpenCV-backed frame source. Opened per access span; `VideoCapture`
/// releases the underlying handle on drop.
pub struct CaptureSource {
    capture: VideoCapture,
}

impl CaptureSource {
    pub fn open(path: &str) -> Result<Self, SeekError> {
        let capture = VideoCapture::from_file(path, CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(SeekError::FrameRead(0));
        }
        tracing::debug!("opened capture for {}", path);
        Ok(Self { capture })
    }
}

impl FrameSource for CaptureSource {
    fn frame_count(&mut self) -> Result<usize, SeekError> {
        Ok(self.capture.get(CAP_PROP_FRAME_COUNT)? as usize)
    }

    fn fps(&mut self) -> Result<f64, SeekError> {
        let fps = self.capture.get(CAP_PROP_FPS)?;
        if fps <= 0.0 {
            tracing::warn!("capture reported no FPS metadata, falling back to 30.0");
            return Ok(30.0);
        }
        Ok(fps)
    }

    fn read_at(&mut self, index: usize) -> Result<Mat, SeekError> {
        self.capture.set(CAP_PROP_POS_FRAMES, index as f64)?;
        let mut frame = Mat::default();
        let success = self.capture.read(&mut frame)?;
        if !success || frame.empty() {
            return Err(SeekError::FrameRead(index));
        }
        Ok(frame)
    }
}

pub mod capture;
pub mod transcode;

use opencv::core::Mat;

use crate::error::SeekError;

/// A video we can pull individual frames from.
///
/// The capture handle behind an implementation is owned for a single
/// read-then-release span; dropping the source releases it whether or not
/// any read succeeded.
pub trait FrameSource {
    fn frame_count(&mut self) -> Result<usize, SeekError>;
    fn fps(&mut self) -> Result<f64, SeekError>;
    fn read_at(&mut self, index: usize) -> Result<Mat, SeekError>;
}

/// The video's first frame.
pub fn first_frame<S: FrameSource>(source: &mut S) -> Result<Mat, SeekError> {
    source.read_at(0)
}

/// The frame two from the end. The final frame of a freshly transcoded file
/// can be truncated, so the window's end bound is read just before it.
pub fn end_frame<S: FrameSource>(source: &mut S) -> Result<Mat, SeekError> {
    let count = source.frame_count()?;
    source.read_at(count.saturating_sub(2))
}

/// Frame indices for the periodic sampling variant: one frame per
/// `interval_secs` of video time, starting at frame 0.
pub fn sample_positions(frame_count: usize, fps: f64, interval_secs: f64) -> Vec<usize> {
    let step = (fps * interval_secs).round().max(1.0) as usize;
    (0..frame_count).step_by(step).collect()
}

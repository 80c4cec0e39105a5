//! Turns a log row's wall-clock time into a playback offset.

use chrono::NaiveTime;

use crate::error::SeekError;
use crate::window::VideoWindow;

/// Compute the seek offset in seconds for a row time within the window,
/// optionally pushed forward by a jump time.
///
/// The jump only ever moves playback forward: a jump earlier than the row
/// time contributes nothing and is silently ignored. That mirrors the
/// shipped behavior of the original tool; it is not treated as an error.
pub fn align(
    window: &VideoWindow,
    row_time: NaiveTime,
    jump_time: Option<NaiveTime>,
) -> Result<f64, SeekError> {
    if row_time < window.start || row_time > window.end {
        return Err(SeekError::OutOfRange {
            selected: row_time,
            start: window.start,
            end: window.end,
        });
    }

    let mut offset = row_time.signed_duration_since(window.start).num_seconds() as f64;

    if let Some(jump) = jump_time {
        if jump >= row_time {
            offset += jump.signed_duration_since(row_time).num_seconds() as f64;
        }
    }

    Ok(offset)
}

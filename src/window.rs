//! Extracts the wall-clock window a video covers from its overlay clock.

use std::collections::HashMap;

use chrono::NaiveTime;
use serde::Serialize;

use crate::error::SeekError;
use crate::ocr::{self, preprocess::CropRect, recognize::TextRecognizer};
use crate::timecode::TimeFormat;
use crate::video::{self, capture::CaptureSource};
use crate::video::FrameSource;

/// The `[start, end]` wall-clock interval the video's content spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl VideoWindow {
    /// `None` when the bounds are inverted — an inverted pair means at
    /// least one bound was misread, so the whole window is unusable.
    pub fn from_bounds(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    pub fn span_seconds(&self) -> f64 {
        self.end.signed_duration_since(self.start).num_seconds() as f64
    }
}

/// Everything the extraction pipeline needs, resolved from configuration.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub crop: CropRect,
    pub format: TimeFormat,
    pub tessdata: Option<String>,
    pub lang: String,
    pub sample_interval_secs: f64,
}

impl ExtractorConfig {
    fn recognizer(&self) -> Result<TextRecognizer, SeekError> {
        TextRecognizer::new(self.tessdata.as_deref(), &self.lang, self.format.whitelist())
    }
}

enum Bound {
    First,
    End,
}

/// Read one window bound. Each bound gets its own capture span so the
/// handle is released between accesses, as with the original tool.
fn read_bound(
    path: &str,
    bound: Bound,
    cfg: &ExtractorConfig,
    recognizer: &mut TextRecognizer,
) -> Result<NaiveTime, SeekError> {
    let mut source = CaptureSource::open(path)?;
    let frame = match bound {
        Bound::First => video::first_frame(&mut source)?,
        Bound::End => video::end_frame(&mut source)?,
    };
    ocr::read_clock(&frame, &cfg.crop, recognizer, cfg.format)
}

/// Extract the video's clock window from its first and end frames.
///
/// `Ok(None)` means the window could not be established (unreadable or
/// inverted bounds) and every selection should fall back to playing from
/// the start. `Err` is reserved for real failures: frame reads, OpenCV,
/// engine initialization.
pub fn extract_window(
    path: &str,
    cfg: &ExtractorConfig,
) -> Result<Option<VideoWindow>, SeekError> {
    let mut recognizer = cfg.recognizer()?;

    let mut bound_or_miss = |bound| match read_bound(path, bound, cfg, &mut recognizer) {
        Ok(t) => Ok(Some(t)),
        Err(e) if e.is_informational() => {
            tracing::debug!("window bound unreadable: {}", e);
            Ok(None)
        }
        Err(e) => Err(e),
    };

    let start = bound_or_miss(Bound::First)?;
    let end = bound_or_miss(Bound::End)?;

    let window = match (start, end) {
        (Some(start), Some(end)) => VideoWindow::from_bounds(start, end),
        _ => None,
    };

    match window {
        Some(w) => tracing::info!(
            "extracted window {} .. {} from {}",
            cfg.format.render(w.start),
            cfg.format.render(w.end),
            path
        ),
        None => tracing::warn!("no usable clock window in {}", path),
    }

    Ok(window)
}

/// Per-process memoization of extracted windows, keyed by the transcoded
/// file's path. Unusable windows are cached too: repeating a selection must
/// not re-run OCR.
#[derive(Default)]
pub struct WindowCache {
    entries: HashMap<String, Option<VideoWindow>>,
}

impl WindowCache {
    pub fn get_or_try_insert_with<F>(
        &mut self,
        key: &str,
        extract: F,
    ) -> Result<Option<VideoWindow>, SeekError>
    where
        F: FnOnce() -> Result<Option<VideoWindow>, SeekError>,
    {
        if let Some(cached) = self.entries.get(key) {
            return Ok(*cached);
        }
        let window = extract()?;
        self.entries.insert(key.to_string(), window);
        Ok(window)
    }
}

/// One sampled frame of a periodic clock scan.
#[derive(Debug, Serialize)]
pub struct ScanEntry {
    pub frame: usize,
    pub elapsed_secs: f64,
    pub clock: Option<String>,
}

/// Read the overlay clock at every sampling interval, strictly in order.
/// A frame that yields no clock is reported as a miss; a frame that cannot
/// be read at all aborts the scan.
pub fn scan_clock(path: &str, cfg: &ExtractorConfig) -> Result<Vec<ScanEntry>, SeekError> {
    let mut recognizer = cfg.recognizer()?;
    let mut source = CaptureSource::open(path)?;
    let count = source.frame_count()?;
    let fps = source.fps()?;

    let positions = video::sample_positions(count, fps, cfg.sample_interval_secs);
    let mut entries = Vec::with_capacity(positions.len());

    for index in positions {
        let frame = source.read_at(index)?;
        let clock = match ocr::read_clock(&frame, &cfg.crop, &mut recognizer, cfg.format) {
            Ok(t) => Some(cfg.format.render(t)),
            Err(e) if e.is_informational() => None,
            Err(e) => return Err(e),
        };
        entries.push(ScanEntry {
            frame: index,
            elapsed_secs: index as f64 / fps,
            clock,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap()
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        assert!(VideoWindow::from_bounds(t("09:10:00"), t("09:00:00")).is_none());
        assert!(VideoWindow::from_bounds(t("09:00:00"), t("09:10:00")).is_some());
    }

    #[test]
    fn test_window_accepts_single_instant() {
        let w = VideoWindow::from_bounds(t("09:00:00"), t("09:00:00")).unwrap();
        assert_eq!(w.span_seconds(), 0.0);
    }

    #[test]
    fn test_span_seconds() {
        let w = VideoWindow::from_bounds(t("09:00:00"), t("09:10:00")).unwrap();
        assert_eq!(w.span_seconds(), 600.0);
    }

    #[test]
    fn test_cache_extracts_once_per_key() {
        let mut cache = WindowCache::default();
        let mut calls = 0;
        let window = VideoWindow::from_bounds(t("09:00:00"), t("09:10:00"));

        for _ in 0..3 {
            let got = cache
                .get_or_try_insert_with("a.mp4", || {
                    calls += 1;
                    Ok(window)
                })
                .unwrap();
            assert_eq!(got, window);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_cache_remembers_unusable_windows() {
        let mut cache = WindowCache::default();
        let mut calls = 0;

        for _ in 0..2 {
            let got = cache
                .get_or_try_insert_with("b.mp4", || {
                    calls += 1;
                    Ok(None)
                })
                .unwrap();
            assert!(got.is_none());
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_cache_does_not_cache_failures() {
        let mut cache = WindowCache::default();
        let mut calls = 0;

        for _ in 0..2 {
            let result = cache.get_or_try_insert_with("c.mp4", || {
                calls += 1;
                Err(SeekError::FrameRead(0))
            });
            assert!(result.is_err());
        }
        assert_eq!(calls, 2);
    }
}

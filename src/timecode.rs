//! Timestamp extraction from raw OCR text.
//!
//! One deployment runs with exactly one clock format; text in the other
//! format is a miss, never coerced. There is deliberately no repair of OCR
//! confusions (`O` for `0` and friends) — garbage in, miss out, and the
//! caller falls back to playing from the start.

use chrono::NaiveTime;
use clap::ValueEnum;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::SeekError;

lazy_static! {
    static ref RE_24H: Regex = Regex::new(r"\d{2}:\d{2}:\d{2}").unwrap();
    static ref RE_12H: Regex = Regex::new(r"\d{2}:\d{2}:\d{2} [AP]M").unwrap();
}

/// Clock format of the overlay and of the log's time components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeFormat {
    /// `HH:MM:SS`, hours 00-23.
    #[value(name = "24h")]
    Hour24,
    /// `HH:MM:SS AM` / `HH:MM:SS PM`, hours 01-12.
    #[value(name = "12h")]
    Hour12,
}

impl TimeFormat {
    fn pattern(&self) -> &'static Regex {
        match self {
            TimeFormat::Hour24 => &RE_24H,
            TimeFormat::Hour12 => &RE_12H,
        }
    }

    fn strftime(&self) -> &'static str {
        match self {
            TimeFormat::Hour24 => "%H:%M:%S",
            TimeFormat::Hour12 => "%I:%M:%S %p",
        }
    }

    /// Tesseract character whitelist for this format.
    pub fn whitelist(&self) -> &'static str {
        match self {
            TimeFormat::Hour24 => "0123456789:",
            TimeFormat::Hour12 => "0123456789: APM",
        }
    }

    /// Parse a whole token that must be exactly one timestamp, e.g. a log
    /// field's time component or the jump-time input.
    pub fn parse_exact(&self, token: &str) -> Option<NaiveTime> {
        if !self.pattern().is_match(token) {
            return None;
        }
        NaiveTime::parse_from_str(token, self.strftime()).ok()
    }

    /// Extract the first matching timestamp from raw OCR text.
    ///
    /// A regex match whose fields are out of range (`29:75:80`) is also a
    /// miss: the match shape is right but it is not a time of day.
    pub fn find_timestamp(&self, raw: &str) -> Result<NaiveTime, SeekError> {
        let m = self
            .pattern()
            .find(raw)
            .ok_or(SeekError::TimestampNotFound)?;
        NaiveTime::parse_from_str(m.as_str(), self.strftime())
            .map_err(|_| SeekError::TimestampNotFound)
    }

    /// Render a time back into this format's textual shape.
    pub fn render(&self, t: NaiveTime) -> String {
        t.format(self.strftime()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_24h() {
        for s in ["00:00:00", "09:03:30", "12:00:01", "23:59:59"] {
            let t = TimeFormat::Hour24.find_timestamp(s).unwrap();
            assert_eq!(TimeFormat::Hour24.render(t), s);
        }
    }

    #[test]
    fn test_round_trip_12h() {
        for s in ["01:00:00 AM", "09:03:30 AM", "12:59:59 PM"] {
            let t = TimeFormat::Hour12.find_timestamp(s).unwrap();
            assert_eq!(TimeFormat::Hour12.render(t), s);
        }
    }

    #[test]
    fn test_first_match_in_noisy_text() {
        let raw = "CAM1  09:03:30 \n 10:00:00";
        let t = TimeFormat::Hour24.find_timestamp(raw).unwrap();
        assert_eq!(TimeFormat::Hour24.render(t), "09:03:30");
    }

    #[test]
    fn test_ocr_letter_confusion_is_a_miss() {
        // Letter O substituted for zero; no edit-distance repair.
        let err = TimeFormat::Hour24.find_timestamp("O2:15:3O").unwrap_err();
        assert!(matches!(err, SeekError::TimestampNotFound));
    }

    #[test]
    fn test_no_match_is_a_miss() {
        for raw in ["", "no clock here", "9:3:30", "123456"] {
            let err = TimeFormat::Hour24.find_timestamp(raw).unwrap_err();
            assert!(matches!(err, SeekError::TimestampNotFound), "raw={raw:?}");
        }
    }

    #[test]
    fn test_range_invalid_match_is_a_miss() {
        // Matches the pattern but is not a time of day.
        let err = TimeFormat::Hour24.find_timestamp("29:75:80").unwrap_err();
        assert!(matches!(err, SeekError::TimestampNotFound));
    }

    #[test]
    fn test_24h_accepts_the_time_prefix_of_12h_text() {
        // The 24-hour pattern legitimately matches the leading HH:MM:SS;
        // only the 12-hour side of the format wall is mechanical.
        let t = TimeFormat::Hour24.find_timestamp("09:03:30 AM").unwrap();
        assert_eq!(TimeFormat::Hour24.render(t), "09:03:30");
    }

    #[test]
    fn test_12h_rejects_bare_24h_text() {
        let err = TimeFormat::Hour12.find_timestamp("14:22:05").unwrap_err();
        assert!(matches!(err, SeekError::TimestampNotFound));
    }

    #[test]
    fn test_12h_rejects_out_of_range_hour() {
        // Shape matches but %I only accepts 01-12.
        let err = TimeFormat::Hour12.find_timestamp("13:00:00 PM").unwrap_err();
        assert!(matches!(err, SeekError::TimestampNotFound));
    }

    #[test]
    fn test_parse_exact() {
        assert!(TimeFormat::Hour24.parse_exact("09:03:30").is_some());
        assert!(TimeFormat::Hour24.parse_exact("garbage").is_none());
        assert!(TimeFormat::Hour12.parse_exact("09:03:30 PM").is_some());
        assert!(TimeFormat::Hour12.parse_exact("14:22:05").is_none());
    }
}

//! Event log ingestion.
//!
//! The log is delimited text with a header row and no further schema; one
//! column carries `<date> <time>` text. The time component is the field's
//! last whitespace-delimited token — two tokens in 12-hour deployments,
//! where the meridiem is part of the time.

use chrono::NaiveTime;

use crate::error::SeekError;
use crate::timecode::TimeFormat;

#[derive(Debug)]
pub struct EventLog {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl EventLog {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SeekError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(EventLog { headers, rows })
    }
}

/// The trailing time component of a timestamp field.
pub fn time_component(field: &str, format: TimeFormat) -> Result<String, SeekError> {
    let tokens: Vec<&str> = field.split_whitespace().collect();
    match format {
        TimeFormat::Hour24 => tokens.last().map(|t| t.to_string()),
        TimeFormat::Hour12 => match tokens.as_slice() {
            [.., time, meridiem] => Some(format!("{time} {meridiem}")),
            _ => None,
        },
    }
    .ok_or(SeekError::MalformedRow)
}

/// Parse a row's timestamp field into its time of day.
pub fn row_time(field: &str, format: TimeFormat) -> Result<NaiveTime, SeekError> {
    let token = time_component(field, format)?;
    format.parse_exact(&token).ok_or(SeekError::MalformedRow)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
EVENT,DATE AND TIME,OPERATOR
door open,12/01/2024 09:03:30,smith
door close,12/01/2024 09:05:12,smith
";

    #[test]
    fn test_parse_log() {
        let log = EventLog::from_bytes(SAMPLE.as_bytes()).unwrap();
        assert_eq!(log.headers, vec!["EVENT", "DATE AND TIME", "OPERATOR"]);
        assert_eq!(log.rows.len(), 2);
        assert_eq!(log.rows[0][1], "12/01/2024 09:03:30");
    }

    #[test]
    fn test_ragged_rows_are_accepted() {
        let raw = "A,B\n1,2\n3\n";
        let log = EventLog::from_bytes(raw.as_bytes()).unwrap();
        assert_eq!(log.rows.len(), 2);
        assert_eq!(log.rows[1], vec!["3"]);
    }

    #[test]
    fn test_time_component_takes_last_token() {
        let c = time_component("12/01/2024 09:03:30", TimeFormat::Hour24).unwrap();
        assert_eq!(c, "09:03:30");
        let c = time_component("09:03:30", TimeFormat::Hour24).unwrap();
        assert_eq!(c, "09:03:30");
    }

    #[test]
    fn test_time_component_keeps_meridiem() {
        let c = time_component("12/01/2024 09:03:30 PM", TimeFormat::Hour12).unwrap();
        assert_eq!(c, "09:03:30 PM");
    }

    #[test]
    fn test_blank_field_is_malformed() {
        for field in ["", "   "] {
            let err = time_component(field, TimeFormat::Hour24).unwrap_err();
            assert!(matches!(err, SeekError::MalformedRow));
        }
    }

    #[test]
    fn test_row_time() {
        let t = row_time("12/01/2024 09:03:30", TimeFormat::Hour24).unwrap();
        assert_eq!(TimeFormat::Hour24.render(t), "09:03:30");
    }

    #[test]
    fn test_row_time_12h() {
        let t = row_time("12/01/2024 09:03:30 PM", TimeFormat::Hour12).unwrap();
        assert_eq!(TimeFormat::Hour12.render(t), "09:03:30 PM");
    }

    #[test]
    fn test_unparsable_token_is_malformed() {
        let err = row_time("12/01/2024 not-a-time", TimeFormat::Hour24).unwrap_err();
        assert!(matches!(err, SeekError::MalformedRow));
    }

    #[test]
    fn test_date_only_field_is_malformed() {
        let err = row_time("12/01/2024", TimeFormat::Hour24).unwrap_err();
        assert!(matches!(err, SeekError::MalformedRow));
    }
}

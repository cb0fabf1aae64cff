use thiserror::Error;

/// Errors returned while decoding a single history record.
///
/// # Examples
/// ```
/// use pumplog_core::records::RecordError;
///
/// let err = RecordError::MalformedDate { year: 2014, month: 13, day: 1 };
/// assert!(err.to_string().contains("malformed packed date"));
/// assert!(err.is_malformed());
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("malformed packed date: {year:04}-{month:02}-{day:02} is not a calendar date")]
    MalformedDate { year: i32, month: u8, day: u8 },
    #[error("no calendar day follows {date}")]
    DateOverflow { date: time::Date },
}

impl RecordError {
    /// True when the record bytes were read but describe an impossible date.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            RecordError::MalformedDate { .. } | RecordError::DateOverflow { .. }
        )
    }
}

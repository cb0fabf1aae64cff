use thiserror::Error;

use crate::records::RecordError;

/// Errors returned while walking a history buffer.
///
/// # Examples
/// ```
/// use pumplog_core::HistoryError;
///
/// let err = HistoryError::UnknownEventType { code: 0xff, offset: 52 };
/// assert!(err.to_string().contains("unknown event type 0xff"));
/// ```
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("unknown event type {code:#04x} at offset {offset}")]
    UnknownEventType { code: u8, offset: usize },
    #[error("truncated {name} record at offset {offset}: need {needed} bytes, got {actual}")]
    Truncated {
        name: &'static str,
        offset: usize,
        needed: usize,
        actual: usize,
    },
    #[error("{name} record at offset {offset}: {source}")]
    Record {
        name: &'static str,
        offset: usize,
        #[source]
        source: RecordError,
    },
}

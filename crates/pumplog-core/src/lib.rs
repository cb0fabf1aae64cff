//! pumplog core library for insulin pump history-log decoding.
//!
//! This crate implements the offline decoding pipeline used by the CLI:
//! sources load a history buffer, the history walker slices it into record
//! windows through the type-code registry, record decoders (layout/parser)
//! derive timestamps and fields, and results are aggregated into a
//! deterministic report. Decoding is byte-oriented and side-effect free; all
//! I/O is isolated in `source`.
//!
//! Invariants:
//! - Record type codes and sizes are constants, never read from content.
//! - A malformed record is either reported as skipped or aborts the walk;
//!   a plausible-looking replacement date is never produced.
//! - Report outputs are deterministic and stable across runs.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use pumplog_core::{DecodeOptions, InputFormat, analyze_history_file};
//!
//! let report = analyze_history_file(
//!     Path::new("page.hex"),
//!     InputFormat::Hex,
//!     &DecodeOptions::default(),
//! )?;
//! println!("records: {}", report.records.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod analysis;
mod history;
pub mod records;
mod source;

pub use analysis::{AnalysisError, analyze_history, analyze_history_file};
pub use history::{
    DecodeOptions, DecodedRecord, HistoryDecode, HistoryError, MalformedPolicy, decode_history,
    decode_window,
};
pub use source::{InputFormat, SourceError, decode_hex_text, load_history};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;

/// Decoded history report with records in walk order.
///
/// # Examples
/// ```
/// use pumplog_core::make_stub_report;
///
/// let report = make_stub_report("page.hex", 52);
/// assert_eq!(report.report_version, pumplog_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// Input history metadata.
    pub input: InputInfo,
    /// Decoded records.
    pub records: Vec<RecordEntry>,
    /// Records dropped by the malformed-record policy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRecord>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the decoder.
    pub path: String,
    /// Decoded history size in bytes.
    pub bytes: u64,
}

/// One decoded record: its offset plus the record's own serialization.
///
/// # Examples
/// ```
/// use pumplog_core::RecordEntry;
/// use serde_json::{Map, Value};
///
/// let mut fields = Map::new();
/// fields.insert("type".to_string(), Value::from("Sara6E"));
/// let entry = RecordEntry { offset: 0, fields };
///
/// let json = serde_json::to_value(&entry).unwrap();
/// assert_eq!(json["offset"], 0);
/// assert_eq!(json["type"], "Sara6E");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Byte offset of the type code within the history buffer.
    pub offset: usize,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Record dropped because its content is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub offset: usize,
    pub code: u8,
    pub name: String,
    /// Human-readable decode error.
    pub reason: String,
}

/// Build a stub report with base fields filled and no records.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> HistoryReport {
    HistoryReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "pumplog".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        records: vec![],
        skipped: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_skipped_when_empty() {
        let report = make_stub_report("page.hex", 0);
        let value = serde_json::to_value(&report).expect("report json");
        assert!(value.get("skipped").is_none());
        assert_eq!(value["records"], Value::Array(vec![]));
        assert_eq!(value["tool"]["name"], "pumplog");
    }

    #[test]
    fn record_entry_round_trips_flattened_fields() {
        let mut fields = Map::new();
        fields.insert("type".to_string(), Value::from("Sara6E"));
        fields.insert("valid_date".to_string(), Value::from("2014-03-15"));
        let entry = RecordEntry { offset: 52, fields };

        let json = serde_json::to_string(&entry).expect("entry json");
        let parsed: RecordEntry = serde_json::from_str(&json).expect("parse entry");
        assert_eq!(parsed, entry);
    }
}

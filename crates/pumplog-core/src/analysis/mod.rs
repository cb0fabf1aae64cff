use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::history::{DecodeOptions, HistoryError, decode_history};
use crate::source::{InputFormat, SourceError, load_history};
use crate::{HistoryReport, RecordEntry, make_stub_report};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Load a history file and decode it into a report.
///
/// # Errors
/// Returns `AnalysisError` when the file cannot be loaded or the history
/// walk fails.
pub fn analyze_history_file(
    path: &Path,
    format: InputFormat,
    options: &DecodeOptions,
) -> Result<HistoryReport, AnalysisError> {
    let data = load_history(path, format)?;
    analyze_history(&path.display().to_string(), &data, options)
}

/// Decode an in-memory history buffer into a report.
///
/// # Errors
/// Returns `AnalysisError::History` when the history walk fails.
pub fn analyze_history(
    input_path: &str,
    data: &[u8],
    options: &DecodeOptions,
) -> Result<HistoryReport, AnalysisError> {
    let decoded = decode_history(data, options)?;
    info!(
        input = input_path,
        records = decoded.records.len(),
        skipped = decoded.skipped.len(),
        "history decoded"
    );

    let mut report = make_stub_report(input_path, data.len() as u64);
    report.records = decoded
        .records
        .into_iter()
        .map(|entry| RecordEntry {
            offset: entry.offset,
            fields: entry.fields,
        })
        .collect();
    report.skipped = decoded.skipped;
    Ok(report)
}

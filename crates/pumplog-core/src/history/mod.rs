//! History buffer walker.
//!
//! Slices a buffer of back-to-back records into windows using the type-code
//! registry, decodes each window and applies the malformed-record policy.
//! Record boundaries are only known through `bytesize`, so an unknown type
//! code ends the walk with an error.

mod error;

pub use error::HistoryError;

use tracing::{debug, warn};

use crate::SkippedRecord;
use crate::records::common::reader::RecordReader;
use crate::records::{EventRecord, GenericTimestamp, RecordError, SerializedRecord, lookup};

/// What to do with a record whose bytes decode to an impossible date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Log, record in `HistoryDecode::skipped` and continue.
    #[default]
    Skip,
    /// Stop with `HistoryError::Record`.
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub policy: MalformedPolicy,
    /// Stable-sort decoded records by timestamp instead of stream order.
    pub sort_by_timestamp: bool,
}

/// A record that decoded cleanly, with its derived values.
#[derive(Debug)]
pub struct DecodedRecord {
    pub offset: usize,
    pub timestamp: GenericTimestamp,
    pub fields: SerializedRecord,
    pub summary: String,
    pub record: Box<dyn EventRecord>,
}

#[derive(Debug, Default)]
pub struct HistoryDecode {
    pub records: Vec<DecodedRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Decode the single record starting at `offset`.
///
/// Windows never overlap, so callers may decode several offsets on
/// independent threads.
///
/// # Errors
/// Returns `HistoryError::UnknownEventType` for unregistered codes and
/// `HistoryError::Truncated` when the buffer ends inside the record.
pub fn decode_window(data: &[u8], offset: usize) -> Result<Box<dyn EventRecord>, HistoryError> {
    let reader = RecordReader::new(data);
    let code = reader
        .read_u8(offset)
        .map_err(|_| HistoryError::Truncated {
            name: "unknown",
            offset,
            needed: 1,
            actual: data.len().saturating_sub(offset),
        })?;
    let descriptor = lookup(code).ok_or(HistoryError::UnknownEventType { code, offset })?;
    let end = offset + descriptor.bytesize;
    let window = reader
        .read_slice(offset..end)
        .map_err(|_| HistoryError::Truncated {
            name: descriptor.name,
            offset,
            needed: descriptor.bytesize,
            actual: data.len() - offset,
        })?;
    (descriptor.decode)(window).map_err(|source| HistoryError::Record {
        name: descriptor.name,
        offset,
        source,
    })
}

/// Walk `data` from offset 0 and decode every record.
///
/// # Examples
/// ```
/// use pumplog_core::{DecodeOptions, decode_history};
///
/// let mut data = vec![0u8; 52];
/// data[0] = 0x6e;
/// data[1..3].copy_from_slice(&[0x2f, 0x8e]);
///
/// let decoded = decode_history(&data, &DecodeOptions::default())?;
/// assert_eq!(decoded.records[0].summary, "Sara6E 2014-03-16 00:00:00");
/// # Ok::<(), pumplog_core::HistoryError>(())
/// ```
///
/// # Errors
/// Returns `HistoryError` on unknown codes, truncated records, or (with
/// `MalformedPolicy::Abort`) the first malformed record.
pub fn decode_history(data: &[u8], options: &DecodeOptions) -> Result<HistoryDecode, HistoryError> {
    let mut decoded = HistoryDecode::default();
    let mut offset = 0usize;

    while offset < data.len() {
        let record = decode_window(data, offset)?;
        let size = record.bytesize();
        let name = record.type_name();
        let code = record.event_type_code();

        match materialize(offset, record) {
            Ok(entry) => {
                debug!(offset, record = name, timestamp = %entry.timestamp, "decoded record");
                decoded.records.push(entry);
            }
            Err(err) if err.is_malformed() && options.policy == MalformedPolicy::Skip => {
                warn!(offset, record = name, error = %err, "skipping malformed record");
                decoded.skipped.push(SkippedRecord {
                    offset,
                    code,
                    name: name.to_string(),
                    reason: err.to_string(),
                });
            }
            Err(source) => {
                return Err(HistoryError::Record {
                    name,
                    offset,
                    source,
                });
            }
        }
        offset += size;
    }

    if options.sort_by_timestamp {
        decoded.records.sort_by_key(|entry| entry.timestamp);
    }
    debug!(
        records = decoded.records.len(),
        skipped = decoded.skipped.len(),
        "history walk complete"
    );
    Ok(decoded)
}

fn materialize(offset: usize, record: Box<dyn EventRecord>) -> Result<DecodedRecord, RecordError> {
    Ok(DecodedRecord {
        offset,
        timestamp: record.timestamp()?,
        fields: record.as_json()?,
        summary: record.to_s()?,
        record,
    })
}

#[cfg(test)]
mod tests {
    use super::{DecodeOptions, HistoryError, MalformedPolicy, decode_history, decode_window};
    use crate::records::RecordError;

    fn sara6e(date: [u8; 2]) -> Vec<u8> {
        let mut window = vec![0u8; 52];
        window[0] = 0x6e;
        window[1..3].copy_from_slice(&date);
        window
    }

    fn buffer(dates: &[[u8; 2]]) -> Vec<u8> {
        dates.iter().flat_map(|date| sara6e(*date)).collect()
    }

    #[test]
    fn decodes_back_to_back_records() {
        let data = buffer(&[[0x2f, 0x8e], [0xdf, 0x0e]]);
        let decoded = decode_history(&data, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.records.len(), 2);
        assert_eq!(decoded.records[0].offset, 0);
        assert_eq!(decoded.records[1].offset, 52);
        assert_eq!(decoded.records[1].summary, "Sara6E 2015-01-01 00:00:00");
        assert!(decoded.skipped.is_empty());
    }

    #[test]
    fn empty_buffer_has_no_records() {
        let decoded = decode_history(&[], &DecodeOptions::default()).unwrap();
        assert!(decoded.records.is_empty());
    }

    #[test]
    fn skip_policy_records_malformed_entries() {
        let data = buffer(&[[0x2f, 0x8e], [0xc1, 0x8e], [0x3c, 0x10]]);
        let decoded = decode_history(&data, &DecodeOptions::default()).unwrap();
        assert_eq!(decoded.records.len(), 2);
        assert_eq!(decoded.skipped.len(), 1);
        let skipped = &decoded.skipped[0];
        assert_eq!(skipped.offset, 52);
        assert_eq!(skipped.code, 0x6e);
        assert_eq!(skipped.name, "Sara6E");
        assert!(skipped.reason.contains("2014-13-01"));
    }

    #[test]
    fn abort_policy_stops_on_malformed_entry() {
        let data = buffer(&[[0x2f, 0x8e], [0xc1, 0x8e]]);
        let options = DecodeOptions {
            policy: MalformedPolicy::Abort,
            ..DecodeOptions::default()
        };
        let err = decode_history(&data, &options).unwrap_err();
        match err {
            HistoryError::Record { offset, source, .. } => {
                assert_eq!(offset, 52);
                assert!(matches!(source, RecordError::MalformedDate { month: 13, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_code_stops_walk() {
        let mut data = buffer(&[[0x2f, 0x8e]]);
        data.push(0xff);
        let err = decode_history(&data, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::UnknownEventType {
                code: 0xff,
                offset: 52
            }
        ));
    }

    #[test]
    fn truncated_tail_is_reported() {
        let mut data = buffer(&[[0x2f, 0x8e]]);
        data.extend_from_slice(&[0x6e, 0x2f, 0x8e]);
        let err = decode_history(&data, &DecodeOptions::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("truncated Sara6E record at offset 52"));
        assert!(msg.contains("need 52 bytes, got 3"));
    }

    #[test]
    fn sort_orders_by_timestamp() {
        let data = buffer(&[[0xdf, 0x0e], [0x2f, 0x8e]]);
        let options = DecodeOptions {
            sort_by_timestamp: true,
            ..DecodeOptions::default()
        };
        let decoded = decode_history(&data, &options).unwrap();
        assert_eq!(decoded.records[0].offset, 52);
        assert_eq!(decoded.records[1].offset, 0);
    }

    #[test]
    fn windows_decode_independently_across_threads() {
        let data = buffer(&[[0x2f, 0x8e], [0xdf, 0x0e], [0x3c, 0x10], [0x3c, 0x0f]]);
        let sequential: Vec<String> = (0..4)
            .map(|i| decode_window(&data, i * 52).unwrap().to_s().unwrap())
            .collect();

        let parallel: Vec<String> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|i| {
                    let data = &data;
                    scope.spawn(move || decode_window(data, i * 52).unwrap().to_s().unwrap())
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(sequential, parallel);
    }
}

use std::fs;

use pumplog_core::records::{EventRecord, RecordKind, Sara6E};
use pumplog_core::{DecodeOptions, InputFormat, SourceError, decode_history, load_history};
use tempfile::TempDir;

fn sara6e(date: [u8; 2]) -> Vec<u8> {
    let mut window = vec![0u8; Sara6E::BYTESIZE];
    window[0] = Sara6E::EVENT_TYPE_CODE;
    window[1..3].copy_from_slice(&date);
    window
}

#[test]
fn binary_source_reads_raw_bytes() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("page.bin");
    fs::write(&path, sara6e([0x2f, 0x8e])).expect("write fixture");

    let data = load_history(&path, InputFormat::from_path(&path)).unwrap();
    let decoded = decode_history(&data, &DecodeOptions::default()).unwrap();
    assert_eq!(decoded.records.len(), 1);
    assert_eq!(decoded.records[0].record.type_name(), "Sara6E");
}

#[test]
fn hex_source_matches_binary_source() {
    let temp = TempDir::new().expect("tempdir");
    let bytes = sara6e([0xdf, 0x0e]);
    let bin = temp.path().join("page.bin");
    let hex_path = temp.path().join("page.hex");
    fs::write(&bin, &bytes).expect("write bin");
    let text: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    fs::write(&hex_path, format!("# one record\n{text}\n")).expect("write hex");

    let from_bin = load_history(&bin, InputFormat::Binary).unwrap();
    let from_hex = load_history(&hex_path, InputFormat::Hex).unwrap();
    assert_eq!(from_bin, from_hex);
}

#[test]
fn missing_file_is_an_io_error() {
    let temp = TempDir::new().expect("tempdir");
    let err = load_history(&temp.path().join("missing.bin"), InputFormat::Binary).unwrap_err();
    assert!(matches!(err, SourceError::Io(_)));
}

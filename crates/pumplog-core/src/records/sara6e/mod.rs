//! `Sara6E` ("date validated") record decoding.
//!
//! The record carries a single packed date at offset 1. Its timestamp is
//! derived, never stored: the device marks the date as validated from the
//! start of the *following* day, so `timestamp()` is midnight of
//! `valid_date() + 1`, rolling over month and year ends.
//!
//! Byte offsets live in `layout`; the record type and its contract
//! implementation live in `parser`.

pub mod layout;
pub mod parser;

pub use parser::Sara6E;

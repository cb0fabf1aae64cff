//! Primitives shared by every record decoder.
//!
//! - `reader`: bounds-checked access to a record window
//! - `date`: the pump's packed 2-byte date codec
//! - `timestamp`: the canonical 6-field timestamp and its string form

pub mod date;
pub(crate) mod reader;
pub mod timestamp;

pub use date::{Minimed2ByteDate, PackedDate, PackedDateCodec, parse_date_2byte};
pub use timestamp::{GenericTimestamp, format_date};

//! Packed 2-byte date codec.
//!
//! The pump stores calendar dates in two bytes:
//!
//! ```text
//! byte o:    M M M D D D D D   (month bits 3..1, day)
//! byte o+1:  m Y Y Y Y Y Y Y   (month bit 0, year - 2000)
//! ```
//!
//! Decoding never validates the triple; `PackedDate::to_calendar_date` does.

use time::{Date, Month};

use super::reader::RecordReader;
use crate::records::error::RecordError;

const DAY_MASK: u8 = 0x1f;
const MONTH_HIGH_MASK: u8 = 0xe0;
const MONTH_LOW_MASK: u8 = 0x80;
const YEAR_MASK: u8 = 0x7f;
const YEAR_BASE: i32 = 2000;

/// Raw `(year, month, day)` triple as stored on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl PackedDate {
    /// Validate the triple as a real calendar date.
    ///
    /// # Errors
    /// Returns `RecordError::MalformedDate` when the month or day is out of
    /// range for the given year.
    pub fn to_calendar_date(self) -> Result<Date, RecordError> {
        let malformed = RecordError::MalformedDate {
            year: self.year,
            month: self.month,
            day: self.day,
        };
        let month = Month::try_from(self.month).map_err(|_| malformed.clone())?;
        Date::from_calendar_date(self.year, month, self.day).map_err(|_| malformed)
    }
}

/// Decodes a packed date at a record-relative offset.
///
/// Implementations must be pure: decoding the same bytes twice yields the
/// same triple.
pub trait PackedDateCodec {
    fn decode(&self, data: &[u8], offset: usize) -> Result<PackedDate, RecordError>;
}

/// The pump's standard 2-byte date layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minimed2ByteDate;

impl PackedDateCodec for Minimed2ByteDate {
    fn decode(&self, data: &[u8], offset: usize) -> Result<PackedDate, RecordError> {
        let [first, second] = RecordReader::new(data).read_pair(offset)?;
        Ok(PackedDate {
            year: YEAR_BASE + i32::from(second & YEAR_MASK),
            month: ((first & MONTH_HIGH_MASK) >> 4) | ((second & MONTH_LOW_MASK) >> 7),
            day: first & DAY_MASK,
        })
    }
}

/// Decode the packed date at `offset` with the standard codec.
///
/// # Examples
/// ```
/// use pumplog_core::records::common::parse_date_2byte;
///
/// let record = [0x6e, 0x2f, 0x8e];
/// let date = parse_date_2byte(&record, 1)?;
/// assert_eq!((date.year, date.month, date.day), (2014, 3, 15));
/// # Ok::<(), pumplog_core::records::RecordError>(())
/// ```
///
/// # Errors
/// Returns `RecordError::TooShort` when `offset + 2` exceeds the record.
pub fn parse_date_2byte(data: &[u8], offset: usize) -> Result<PackedDate, RecordError> {
    Minimed2ByteDate.decode(data, offset)
}

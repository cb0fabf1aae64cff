use std::fmt;

use time::Date;

/// Canonical `(year, month, day, hour, minute, second)` record time.
///
/// Ordering is field by field, so sorting by `GenericTimestamp` orders
/// records chronologically regardless of their type.
///
/// # Examples
/// ```
/// use pumplog_core::records::common::GenericTimestamp;
///
/// let ts = GenericTimestamp::new(2014, 3, 16, 0, 0, 0);
/// assert_eq!(ts.to_string(), "2014-03-16 00:00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenericTimestamp {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl GenericTimestamp {
    pub const fn new(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Midnight at the start of `date`.
    pub fn midnight(date: Date) -> Self {
        Self::new(date.year(), u8::from(date.month()), date.day(), 0, 0, 0)
    }

    pub fn as_tuple(&self) -> (i32, u8, u8, u8, u8, u8) {
        (
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }
}

impl fmt::Display for GenericTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Format a calendar date as zero-padded `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

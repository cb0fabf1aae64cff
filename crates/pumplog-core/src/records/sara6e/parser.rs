use serde_json::Value;
use time::Date;

use super::layout;
use crate::records::common::reader::RecordReader;
use crate::records::common::{GenericTimestamp, Minimed2ByteDate, PackedDateCodec, format_date};
use crate::records::{EventRecord, RecordError, RecordKind, SerializedRecord};

/// "Date validated" history record (type code 0x6E).
///
/// # Examples
/// ```
/// use pumplog_core::records::{EventRecord, RecordKind, Sara6E};
///
/// let mut window = [0u8; 52];
/// window[0] = 0x6e;
/// window[1..3].copy_from_slice(&[0x2f, 0x8e]);
///
/// let record = Sara6E::from_window(&window)?;
/// assert_eq!(record.valid_date_str()?, "2014-03-15");
/// assert_eq!(record.to_s()?, "Sara6E 2014-03-16 00:00:00");
/// # Ok::<(), pumplog_core::records::RecordError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sara6E {
    data: [u8; layout::BYTESIZE],
}

impl Sara6E {
    pub fn new(data: [u8; layout::BYTESIZE]) -> Self {
        Self { data }
    }

    /// The stored date, validated as a calendar date.
    ///
    /// # Errors
    /// Returns `RecordError::MalformedDate` when the packed bytes do not
    /// denote a real date.
    pub fn valid_date(&self) -> Result<Date, RecordError> {
        self.valid_date_with(&Minimed2ByteDate)
    }

    /// Same as `valid_date`, decoding the packed bytes with `codec`.
    pub fn valid_date_with<C: PackedDateCodec + ?Sized>(
        &self,
        codec: &C,
    ) -> Result<Date, RecordError> {
        codec
            .decode(&self.data, layout::VALID_DATE_OFFSET)?
            .to_calendar_date()
    }

    pub fn valid_date_str(&self) -> Result<String, RecordError> {
        Ok(format_date(self.valid_date()?))
    }
}

impl EventRecord for Sara6E {
    fn event_type_code(&self) -> u8 {
        Self::EVENT_TYPE_CODE
    }

    fn bytesize(&self) -> usize {
        Self::BYTESIZE
    }

    fn type_name(&self) -> &'static str {
        Self::NAME
    }

    fn data(&self) -> &[u8] {
        &self.data
    }

    fn timestamp(&self) -> Result<GenericTimestamp, RecordError> {
        let date = self.valid_date()?;
        let midnight = date
            .next_day()
            .ok_or(RecordError::DateOverflow { date })?;
        Ok(GenericTimestamp::midnight(midnight))
    }

    fn as_json(&self) -> Result<SerializedRecord, RecordError> {
        let mut map = self.base_json()?;
        map.insert("valid_date".to_string(), Value::from(self.valid_date_str()?));
        Ok(map)
    }
}

impl RecordKind for Sara6E {
    const EVENT_TYPE_CODE: u8 = layout::EVENT_TYPE_CODE;
    const BYTESIZE: usize = layout::BYTESIZE;
    const NAME: &'static str = "Sara6E";

    fn from_window(window: &[u8]) -> Result<Self, RecordError> {
        let reader = RecordReader::new(window);
        reader.require_len(layout::BYTESIZE)?;
        let mut data = [0u8; layout::BYTESIZE];
        data.copy_from_slice(reader.read_slice(0..layout::BYTESIZE)?);
        Ok(Self::new(data))
    }
}

#[cfg(test)]
mod tests {
    use super::Sara6E;
    use crate::records::common::{GenericTimestamp, PackedDate, PackedDateCodec, parse_date_2byte};
    use crate::records::sara6e::layout;
    use crate::records::{EventRecord, RecordError, RecordKind};

    fn window(date: [u8; 2]) -> Vec<u8> {
        let mut window = vec![0u8; layout::BYTESIZE];
        window[layout::TYPE_CODE_OFFSET] = layout::EVENT_TYPE_CODE;
        window[layout::VALID_DATE_OFFSET..layout::VALID_DATE_OFFSET + 2].copy_from_slice(&date);
        window
    }

    fn record(date: [u8; 2]) -> Sara6E {
        Sara6E::from_window(&window(date)).unwrap()
    }

    struct FixedDate(PackedDate);

    impl PackedDateCodec for FixedDate {
        fn decode(&self, _data: &[u8], _offset: usize) -> Result<PackedDate, RecordError> {
            Ok(self.0)
        }
    }

    #[test]
    fn constants_ignore_content() {
        for date in [[0x2f, 0x8e], [0xff, 0xff], [0x00, 0x00]] {
            let record = record(date);
            assert_eq!(record.event_type_code(), 0x6e);
            assert_eq!(record.bytesize(), 52);
        }
    }

    #[test]
    fn decodes_worked_example() {
        let record = record([0x2f, 0x8e]);
        assert_eq!(record.valid_date_str().unwrap(), "2014-03-15");
        assert_eq!(
            record.timestamp().unwrap().as_tuple(),
            (2014, 3, 16, 0, 0, 0)
        );
        assert_eq!(record.to_s().unwrap(), "Sara6E 2014-03-16 00:00:00");
    }

    #[test]
    fn timestamp_rolls_over_year_end() {
        let record = record([0xdf, 0x0e]);
        assert_eq!(record.valid_date_str().unwrap(), "2014-12-31");
        assert_eq!(
            record.timestamp().unwrap().as_tuple(),
            (2015, 1, 1, 0, 0, 0)
        );
    }

    #[test]
    fn timestamp_lands_on_leap_day() {
        let record = record([0x3c, 0x10]);
        assert_eq!(record.valid_date_str().unwrap(), "2016-02-28");
        assert_eq!(
            record.timestamp().unwrap().as_tuple(),
            (2016, 2, 29, 0, 0, 0)
        );
    }

    #[test]
    fn timestamp_skips_feb_29_outside_leap_years() {
        // 2015-02-28
        let record = record([0x3c, 0x0f]);
        assert_eq!(
            record.timestamp().unwrap().as_tuple(),
            (2015, 3, 1, 0, 0, 0)
        );
    }

    #[test]
    fn valid_date_is_idempotent() {
        let record = record([0x2f, 0x8e]);
        assert_eq!(record.valid_date().unwrap(), record.valid_date().unwrap());
    }

    #[test]
    fn month_thirteen_is_malformed() {
        let record = record([0xc1, 0x8e]);
        let err = record.valid_date().unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedDate {
                year: 2014,
                month: 13,
                day: 1
            }
        );
        assert!(record.timestamp().is_err());
        assert!(record.as_json().is_err());
        assert!(record.to_s().is_err());
    }

    #[test]
    fn day_thirty_one_in_april_is_malformed() {
        let record = record([0x5f, 0x0e]);
        assert!(matches!(
            record.valid_date_str(),
            Err(RecordError::MalformedDate {
                month: 4,
                day: 31,
                ..
            })
        ));
    }

    #[test]
    fn injected_codec_reports_day_thirty_two() {
        let record = record([0x00, 0x00]);
        let codec = FixedDate(PackedDate {
            year: 2014,
            month: 1,
            day: 32,
        });
        assert!(record.valid_date_with(&codec).unwrap_err().is_malformed());
    }

    #[test]
    fn reserved_bytes_are_ignored() {
        let mut noisy = window([0x2f, 0x8e]);
        for byte in &mut noisy[layout::RESERVED_RANGE] {
            *byte = 0xa5;
        }
        let noisy = Sara6E::from_window(&noisy).unwrap();
        assert_eq!(
            noisy.as_json().unwrap(),
            record([0x2f, 0x8e]).as_json().unwrap()
        );
    }

    #[test]
    fn as_json_extends_base_fields() {
        let record = record([0x2f, 0x8e]);
        let base = record.base_json().unwrap();
        let json = record.as_json().unwrap();

        for (key, value) in &base {
            assert_eq!(json.get(key), Some(value), "base key {key} changed");
        }
        assert_eq!(json["type"], "Sara6E");
        assert_eq!(json["timestamp"], "2014-03-16 00:00:00");
        assert_eq!(json["valid_date"], "2014-03-15");
        assert_eq!(json.len(), base.len() + 1);
    }

    #[test]
    fn from_window_keeps_only_record_bytes() {
        let mut long = window([0x2f, 0x8e]);
        long.extend_from_slice(&[0x6e, 0x00, 0x00]);
        let record = Sara6E::from_window(&long).unwrap();
        assert_eq!(record.data().len(), layout::BYTESIZE);
    }

    #[test]
    fn from_window_rejects_truncated_window() {
        let err = Sara6E::from_window(&[0x6e, 0x2f, 0x8e]).unwrap_err();
        assert_eq!(
            err,
            RecordError::TooShort {
                needed: 52,
                actual: 3
            }
        );
    }

    #[test]
    fn timestamp_rolls_over_thirty_day_month() {
        let record = record([0x5e, 0x0e]);
        assert_eq!(record.valid_date_str().unwrap(), "2014-04-30");
        assert_eq!(
            record.timestamp().unwrap().as_tuple(),
            (2014, 5, 1, 0, 0, 0)
        );
    }

    #[test]
    fn every_packed_date_yields_next_midnight_or_error() {
        let mut valid = 0usize;
        let mut invalid = 0usize;
        for first in 0..=u8::MAX {
            for second in 0..=u8::MAX {
                let record = record([first, second]);
                let packed = parse_date_2byte(&[first, second], 0).unwrap();
                match packed.to_calendar_date() {
                    Ok(date) => {
                        valid += 1;
                        let expected = GenericTimestamp::midnight(date.next_day().unwrap());
                        let ts = record.timestamp().unwrap();
                        assert_eq!(ts, expected, "bytes {first:#04x} {second:#04x}");
                        assert_eq!(record.to_s().unwrap(), format!("Sara6E {ts}"));
                        let date_str = record.valid_date_str().unwrap();
                        assert_eq!(date_str.len(), 10);
                        assert_eq!(
                            date_str,
                            format!("{:04}-{:02}-{:02}", packed.year, packed.month, packed.day)
                        );
                    }
                    Err(_) => {
                        invalid += 1;
                        assert!(record.timestamp().is_err());
                        assert!(record.as_json().is_err());
                        assert!(record.to_s().is_err());
                    }
                }
            }
        }
        assert_eq!(valid + invalid, 65_536);
        assert!(valid > 0 && invalid > 0);
    }
}

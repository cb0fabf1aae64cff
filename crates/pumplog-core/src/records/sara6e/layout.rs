pub const EVENT_TYPE_CODE: u8 = 0x6e;
pub const BYTESIZE: usize = 52;

pub const TYPE_CODE_OFFSET: usize = 0;
pub const VALID_DATE_OFFSET: usize = 1;
/// Bytes 3..52 are reserved and never interpreted.
pub const RESERVED_RANGE: std::ops::Range<usize> = 3..BYTESIZE;

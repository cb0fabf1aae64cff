//! Static type-code registry.
//!
//! The history walker reads one type-code byte, looks up its descriptor and
//! slices exactly `bytesize` bytes before calling `decode`.

use std::fmt;

use super::error::RecordError;
use super::sara6e::Sara6E;
use super::{EventRecord, RecordKind};

pub type DecodeFn = fn(&[u8]) -> Result<Box<dyn EventRecord>, RecordError>;

/// Dispatch entry for one record type.
#[derive(Clone, Copy)]
pub struct RecordDescriptor {
    pub code: u8,
    pub name: &'static str,
    pub bytesize: usize,
    pub decode: DecodeFn,
}

impl fmt::Debug for RecordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("code", &format_args!("{:#04x}", self.code))
            .field("name", &self.name)
            .field("bytesize", &self.bytesize)
            .finish_non_exhaustive()
    }
}

fn decode_boxed<R: RecordKind>(window: &[u8]) -> Result<Box<dyn EventRecord>, RecordError> {
    Ok(Box::new(R::from_window(window)?))
}

static REGISTRY: [RecordDescriptor; 1] = [RecordDescriptor {
    code: Sara6E::EVENT_TYPE_CODE,
    name: Sara6E::NAME,
    bytesize: Sara6E::BYTESIZE,
    decode: decode_boxed::<Sara6E>,
}];

/// Find the descriptor for a type code.
///
/// # Examples
/// ```
/// use pumplog_core::records::lookup;
///
/// let descriptor = lookup(0x6e).expect("Sara6E is registered");
/// assert_eq!(descriptor.name, "Sara6E");
/// assert_eq!(descriptor.bytesize, 52);
/// assert!(lookup(0xff).is_none());
/// ```
pub fn lookup(code: u8) -> Option<&'static RecordDescriptor> {
    REGISTRY.iter().find(|descriptor| descriptor.code == code)
}

/// All registered type codes in ascending order.
pub fn registered_codes() -> Vec<u8> {
    let mut codes: Vec<u8> = REGISTRY.iter().map(|descriptor| descriptor.code).collect();
    codes.sort_unstable();
    codes
}

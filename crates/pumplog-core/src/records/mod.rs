//! History record decoding.
//!
//! Every record type implements two traits:
//! - `RecordKind`: compile-time constants (type code, byte size, name) and a
//!   constructor over a raw record window, used by the `registry`
//! - `EventRecord`: the object-safe capability set the history walker and
//!   report builder query (timestamp, serialization, one-line summary)
//!
//! Record types follow the same layered structure:
//! - `layout`: byte offsets and sizes (source of truth)
//! - `parser`: domain-level decoding (no direct byte indexing)
//!
//! Shared primitives (packed-date codec, canonical timestamp, bounds-checked
//! reads) live in `common`. Decoders are pure and own their bytes; any
//! number of them can be decoded concurrently.

use std::fmt;

use serde_json::{Map, Value};

pub mod common;
pub mod error;
pub mod registry;
pub mod sara6e;

pub use common::GenericTimestamp;
pub use error::RecordError;
pub use registry::{RecordDescriptor, lookup, registered_codes};
pub use sara6e::Sara6E;

/// Serialized form of a record: a key-ordered JSON object.
pub type SerializedRecord = Map<String, Value>;

/// Capabilities every decoded history record provides.
///
/// Only `event_type_code`, `bytesize`, `type_name`, `data` and `timestamp`
/// are required. The default serialization is `{ "type", "timestamp" }` and
/// the default summary is `"<type_name> <timestamp>"`; record types extend
/// `as_json` with their own fields.
pub trait EventRecord: fmt::Debug + Send + Sync {
    fn event_type_code(&self) -> u8;

    /// Total record length, type-code byte included.
    fn bytesize(&self) -> usize;

    fn type_name(&self) -> &'static str;

    /// The raw record window this instance was built from.
    fn data(&self) -> &[u8];

    fn timestamp(&self) -> Result<GenericTimestamp, RecordError>;

    fn timestamp_str(&self) -> Result<String, RecordError> {
        Ok(self.timestamp()?.to_string())
    }

    /// Fields shared by every record type.
    fn base_json(&self) -> Result<SerializedRecord, RecordError> {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::from(self.type_name()));
        map.insert("timestamp".to_string(), Value::from(self.timestamp_str()?));
        Ok(map)
    }

    fn as_json(&self) -> Result<SerializedRecord, RecordError> {
        self.base_json()
    }

    fn to_s(&self) -> Result<String, RecordError> {
        Ok(format!("{} {}", self.type_name(), self.timestamp_str()?))
    }
}

/// Static description of a record type, used for dispatch.
pub trait RecordKind: EventRecord + Sized + 'static {
    const EVENT_TYPE_CODE: u8;
    const BYTESIZE: usize;
    const NAME: &'static str;

    /// Build the record from a window starting at its type-code byte.
    ///
    /// # Errors
    /// Returns `RecordError::TooShort` when fewer than `BYTESIZE` bytes are
    /// supplied. Content is not validated here.
    fn from_window(window: &[u8]) -> Result<Self, RecordError>;
}

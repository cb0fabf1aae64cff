//! History input sources.
//!
//! Files hold either the raw record bytes or a hex dump of them. Hex dumps
//! may contain ASCII whitespace and `#` comment lines. All file I/O for the
//! crate happens here.

mod hex_text;

use std::fs;
use std::path::Path;

use thiserror::Error;

pub use hex_text::decode_hex_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Binary,
    Hex,
}

impl InputFormat {
    /// `.hex` and `.txt` files are hex dumps; anything else is raw bytes.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    ///
    /// use pumplog_core::InputFormat;
    ///
    /// assert_eq!(InputFormat::from_path(Path::new("page.HEX")), InputFormat::Hex);
    /// assert_eq!(InputFormat::from_path(Path::new("page.bin")), InputFormat::Binary);
    /// ```
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "hex" | "txt" => InputFormat::Hex,
            _ => InputFormat::Binary,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex input: {message}")]
    InvalidHex { message: String },
}

/// Load a history buffer from `path`.
///
/// # Errors
/// Returns `SourceError::Io` when the file cannot be read and
/// `SourceError::InvalidHex` when a hex dump does not decode.
pub fn load_history(path: &Path, format: InputFormat) -> Result<Vec<u8>, SourceError> {
    match format {
        InputFormat::Binary => Ok(fs::read(path)?),
        InputFormat::Hex => decode_hex_text(&fs::read_to_string(path)?),
    }
}

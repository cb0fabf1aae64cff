use super::SourceError;

/// Decode a hex dump, ignoring ASCII whitespace and `#` comment lines.
///
/// # Examples
/// ```
/// use pumplog_core::decode_hex_text;
///
/// let bytes = decode_hex_text("# page 0\n6e 2f8e\n")?;
/// assert_eq!(bytes, vec![0x6e, 0x2f, 0x8e]);
/// # Ok::<(), pumplog_core::SourceError>(())
/// ```
///
/// # Errors
/// Returns `SourceError::InvalidHex` on odd digit counts or non-hex
/// characters.
pub fn decode_hex_text(text: &str) -> Result<Vec<u8>, SourceError> {
    let digits: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(|line| line.chars())
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    hex::decode(&digits).map_err(|err| SourceError::InvalidHex {
        message: err.to_string(),
    })
}

//! Transport encoding of file content.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::RemoteError;

/// Encode text for upload.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Decode downloaded content into text.
///
/// GitHub wraps base64 at 60 columns, so all ASCII whitespace is removed
/// before decoding.
pub fn decode_content(encoded: &str) -> Result<String, RemoteError> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| RemoteError::Decode {
            message: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| RemoteError::Decode {
        message: e.to_string(),
    })
}

//! Base64 helpers for local persistence.
//!
//! Two flavours are used:
//! - URL-safe without padding, so arbitrary cache keys can become file names
//! - Standard with padding, for the reversible credential blob

use base64::{Engine, engine::general_purpose};

/// Encode bytes to URL-safe base64 (no padding).
///
/// # Example
/// ```
/// use bucketlib::base64::base64url_encode;
/// let encoded = base64url_encode(b"r2_image_hosting_files_a/b/");
/// assert!(!encoded.contains('='));
/// assert!(!encoded.contains('/'));
/// ```
pub fn base64url_encode(data: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(data)
}

/// Decode URL-safe base64, tolerating trailing padding.
pub fn base64url_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s.trim_end_matches('='))
}

/// Encode bytes to standard padded base64.
pub fn encode_blob(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

/// Decode standard padded base64.
pub fn decode_blob(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s.trim())
}

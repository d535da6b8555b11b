//! Base64URL encoding/decoding per RFC 4648
//!
//! Encoding is URL-safe and unpadded. Decoding accepts input with or without
//! `=` padding and ignores non-zero trailing bits, the same leniency as
//! re-padding a segment and running a standard Base64 decoder over it.

use crate::error::{Error, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode bytes to Base64URL string
pub fn encode_bytes(input: &[u8]) -> String {
    LENIENT_URL_SAFE.encode(input)
}

/// Encode string to Base64URL
pub fn encode(input: &str) -> String {
    encode_bytes(input.as_bytes())
}

/// Decode Base64URL string to bytes
pub fn decode_bytes(input: &str) -> Result<Vec<u8>> {
    LENIENT_URL_SAFE
        .decode(input)
        .map_err(|e| Error::Base64Decode(e.to_string()))
}

/// Decode Base64URL string to UTF-8 string
pub fn decode(input: &str) -> Result<String> {
    let bytes = decode_bytes(input)?;
    String::from_utf8(bytes).map_err(|e| Error::Base64Decode(format!("Invalid UTF-8: {e}")))
}

fn is_alphabet_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Check that every character belongs to `[A-Za-z0-9_-]`
///
/// The empty string passes; emptiness is a segment-level rule.
pub fn is_base64url(input: &str) -> bool {
    input.chars().all(is_alphabet_char)
}

/// Characters outside the Base64URL alphabet with their byte offsets
pub fn invalid_chars(input: &str) -> Vec<(usize, char)> {
    input
        .char_indices()
        .filter(|(_, c)| !is_alphabet_char(*c))
        .collect()
}

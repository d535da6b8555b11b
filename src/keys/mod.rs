//! Key material for HMAC signing and verification
//!
//! Keys borrow the caller's secret for the duration of a single operation.
//! Nothing in this crate stores a secret beyond the call that received it.

/// A symmetric key for HMAC algorithms
#[derive(Clone, Copy)]
pub struct SymmetricKey<'a> {
    bytes: &'a [u8],
}

impl<'a> SymmetricKey<'a> {
    /// Create a new symmetric key
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Key used by algorithms that ignore key material (`none`)
    pub fn empty() -> Self {
        Self { bytes: &[] }
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl<'a> From<&'a [u8]> for SymmetricKey<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a str> for SymmetricKey<'a> {
    fn from(secret: &'a str) -> Self {
        Self::new(secret.as_bytes())
    }
}

// Secrets never show up in logs or panic messages.
impl std::fmt::Debug for SymmetricKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymmetricKey(<redacted, {} bytes>)", self.bytes.len())
    }
}

use crate::error::Result;
use crate::keys::SymmetricKey;

/// Core algorithm trait that all supported JWT signature algorithms implement
pub trait Algorithm {
    /// Compute the Base64URL-encoded signature over `signing_input`
    fn sign(&self, signing_input: &str, key: &SymmetricKey<'_>) -> Result<String>;

    /// Check a Base64URL-encoded signature
    ///
    /// Never fails: undecodable or wrong-length signatures are simply not a
    /// match.
    fn verify(&self, signing_input: &str, signature: &str, key: &SymmetricKey<'_>) -> bool;
}

/// Type alias for boxed algorithm trait objects
pub type Signer = Box<dyn Algorithm + Send + Sync>;

/// Get the implementation for the given algorithm ID
pub fn get_signer(algorithm: &super::AlgorithmId) -> Signer {
    match algorithm {
        super::AlgorithmId::HS256 => Box::new(super::hmac::HS256),
        super::AlgorithmId::HS384 => Box::new(super::hmac::HS384),
        super::AlgorithmId::None => Box::new(super::none::Unsigned),
    }
}

use crate::algorithm::Algorithm;
use crate::error::Result;
use crate::keys::SymmetricKey;

/// The `none` algorithm: empty signature, key ignored
pub struct Unsigned;

impl Algorithm for Unsigned {
    fn sign(&self, _signing_input: &str, _key: &SymmetricKey<'_>) -> Result<String> {
        Ok(String::new())
    }

    fn verify(&self, _signing_input: &str, signature: &str, _key: &SymmetricKey<'_>) -> bool {
        signature.is_empty()
    }
}

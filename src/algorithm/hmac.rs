use crate::algorithm::Algorithm;
use crate::error::{Error, Result};
use crate::keys::SymmetricKey;
use crate::utils::base64url;

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384};

/// HS256 algorithm (HMAC with SHA-256)
pub struct HS256;

/// HS384 algorithm (HMAC with SHA-384)
pub struct HS384;

impl Algorithm for HS256 {
    fn sign(&self, signing_input: &str, key: &SymmetricKey<'_>) -> Result<String> {
        let mac = compute_mac::<Hmac<Sha256>>(signing_input, key.as_bytes())?;
        Ok(base64url::encode_bytes(&mac))
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &SymmetricKey<'_>) -> bool {
        verify_mac::<Hmac<Sha256>>(signing_input, signature, key.as_bytes())
    }
}

impl Algorithm for HS384 {
    fn sign(&self, signing_input: &str, key: &SymmetricKey<'_>) -> Result<String> {
        let mac = compute_mac::<Hmac<Sha384>>(signing_input, key.as_bytes())?;
        Ok(base64url::encode_bytes(&mac))
    }

    fn verify(&self, signing_input: &str, signature: &str, key: &SymmetricKey<'_>) -> bool {
        verify_mac::<Hmac<Sha384>>(signing_input, signature, key.as_bytes())
    }
}

/// Raw MAC bytes of `signing_input`
fn compute_mac<M>(signing_input: &str, secret: &[u8]) -> Result<Vec<u8>>
where
    M: Mac + hmac::digest::KeyInit,
{
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|e| Error::InvalidKey(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Recompute and compare with constant-time equality
///
/// Comparison is on the canonical unpadded encoding, so a signature that
/// differs only in ignored trailing bits still does not match.
fn verify_mac<M>(signing_input: &str, signature: &str, secret: &[u8]) -> bool
where
    M: Mac + hmac::digest::KeyInit,
{
    let Ok(expected_signature) = compute_mac::<M>(signing_input, secret) else {
        return false;
    };
    let expected_signature = base64url::encode_bytes(&expected_signature);

    if signature.len() != expected_signature.len() {
        return false;
    }

    constant_time_eq(signature.as_bytes(), expected_signature.as_bytes())
}

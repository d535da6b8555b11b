mod none;
mod traits;

pub mod hmac;

pub use none::Unsigned;
pub use traits::{get_signer, Algorithm, Signer};

use crate::error::{Error, Result};
use crate::keys::SymmetricKey;

/// Algorithm identifier from the JWT header `alg` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    /// HMAC with SHA-256
    HS256,

    /// HMAC with SHA-384
    HS384,

    /// Unsecured JWT, empty signature segment
    None,
}

impl AlgorithmId {
    /// Parse algorithm string from JWT header
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self> {
        match s {
            "HS256" => Ok(AlgorithmId::HS256),
            "HS384" => Ok(AlgorithmId::HS384),
            "none" => Ok(AlgorithmId::None),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::HS256 => "HS256",
            AlgorithmId::HS384 => "HS384",
            AlgorithmId::None => "none",
        }
    }

    /// Check if algorithm is HMAC-based (needs a secret)
    pub fn is_symmetric(&self) -> bool {
        matches!(self, AlgorithmId::HS256 | AlgorithmId::HS384)
    }

    /// Check if tokens with this algorithm carry an empty signature
    pub fn is_unsigned(&self) -> bool {
        matches!(self, AlgorithmId::None)
    }
}

impl std::fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl serde::Serialize for AlgorithmId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Policy for allowed algorithms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmPolicy {
    allowed: Vec<AlgorithmId>,
}

impl AlgorithmPolicy {
    /// Create a policy that allows only specific algorithms
    pub fn allow_only(algorithms: Vec<AlgorithmId>) -> Self {
        Self {
            allowed: algorithms,
        }
    }

    /// Create a policy that allows every supported algorithm, `none` included
    pub fn allow_all() -> Self {
        Self::allow_only(vec![AlgorithmId::HS256, AlgorithmId::HS384, AlgorithmId::None])
    }

    /// Policy that allows any HMAC algorithm and rejects `none`
    pub fn hmac_any() -> Self {
        Self::allow_only(vec![AlgorithmId::HS256, AlgorithmId::HS384])
    }

    /// Policy that allows only HS256
    pub fn hs256_only() -> Self {
        Self::allow_only(vec![AlgorithmId::HS256])
    }

    /// Check if an algorithm is allowed
    pub fn is_allowed(&self, algorithm: &AlgorithmId) -> bool {
        self.allowed.contains(algorithm)
    }

    /// Check a raw `alg` string against the policy
    ///
    /// Unknown names are reported the same way as known-but-disallowed ones
    /// so the message always lists the allowed set.
    pub fn validate_name(&self, name: &str) -> Result<AlgorithmId> {
        match AlgorithmId::from_str(name) {
            Ok(id) if self.is_allowed(&id) => Ok(id),
            _ => Err(Error::AlgorithmNotAllowed {
                found: name.to_string(),
                allowed: self.allowed_names(),
            }),
        }
    }

    /// Validate algorithm against policy
    pub fn validate(&self, algorithm: &AlgorithmId) -> Result<()> {
        if self.is_allowed(algorithm) {
            Ok(())
        } else {
            Err(Error::AlgorithmNotAllowed {
                found: algorithm.to_string(),
                allowed: self.allowed_names(),
            })
        }
    }

    /// Get list of allowed algorithms
    pub fn allowed_algorithms(&self) -> &[AlgorithmId] {
        &self.allowed
    }

    fn allowed_names(&self) -> Vec<String> {
        self.allowed.iter().map(|a| a.to_string()).collect()
    }
}

impl Default for AlgorithmPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

/// Produce the Base64URL signature for `signing_input` under `alg`
///
/// `none` yields an empty signature and ignores the key. Unknown names fail
/// with [`Error::UnsupportedAlgorithm`].
pub fn sign(alg: &str, key: &SymmetricKey<'_>, signing_input: &str) -> Result<String> {
    let algorithm = AlgorithmId::from_str(alg)?;
    get_signer(&algorithm).sign(signing_input, key)
}

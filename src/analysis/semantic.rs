use crate::claims::{ClaimsValidator, SemanticResult, ValidationConfig};
use crate::decoder::decode;
use crate::error::PhaseFailure;
use crate::utils::now_ts;

/// Decode a JWT and run the semantic checks against the system clock
pub fn analyze_semantic(
    token: &str,
    config: &ValidationConfig,
) -> Result<SemanticResult, PhaseFailure> {
    analyze_semantic_at(token, config, now_ts())
}

/// [`analyze_semantic`] with an explicit current time
///
/// Decoding problems fail in their own phase; semantic findings, including
/// an invalid verdict, are carried inside the returned result.
pub fn analyze_semantic_at(
    token: &str,
    config: &ValidationConfig,
    now: i64,
) -> Result<SemanticResult, PhaseFailure> {
    let decoded = decode(token)?;
    Ok(ClaimsValidator::validate(
        &decoded.header,
        &decoded.payload,
        config,
        now,
    ))
}

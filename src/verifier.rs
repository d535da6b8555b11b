//! Signature and expiry verification
//!
//! A verification ends in exactly one of three outcomes: the signature does
//! not match, the token is expired, or it is valid. Input that cannot be
//! verified at all (malformed segments, missing `alg`, unsupported
//! algorithm, missing secret) is a [`PhaseFailure`] instead.

use serde::Serialize;

use crate::algorithm::{get_signer, AlgorithmId, AlgorithmPolicy};
use crate::analysis::{analyze_lexical, parse_lexical};
use crate::claims::is_expired;
use crate::error::{Diagnostic, Error, Phase, PhaseFailure};
use crate::json::{JsonObject, JsonValue};
use crate::keys::SymmetricKey;
use crate::token::SegmentKind;
use crate::utils::now_ts;

/// Terminal state of a verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyOutcome {
    Valid,
    SignatureMismatch,
    Expired,
}

impl VerifyOutcome {
    /// Short label used when recording the outcome
    pub fn label(&self) -> &'static str {
        match self {
            VerifyOutcome::Valid => "valid",
            VerifyOutcome::SignatureMismatch => "invalid-signature",
            VerifyOutcome::Expired => "expired",
        }
    }
}

/// Result of verifying a well-formed token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyResult {
    pub valid: bool,
    pub outcome: VerifyOutcome,
    pub message: String,
    pub algorithm: AlgorithmId,
}

/// Verify against the system clock, accepting every supported algorithm
pub fn verify(token: &str, secret: &str) -> Result<VerifyResult, PhaseFailure> {
    verify_at(token, secret, &AlgorithmPolicy::default(), now_ts())
}

/// Verify a token's signature and expiry at time `now`
///
/// The signature is checked first, so a forged token is reported as a
/// mismatch even when it is also expired. For `alg: none` the signature
/// segment must be empty and the secret is ignored: such a token is valid in
/// format only, never authenticated.
pub fn verify_at(
    token: &str,
    secret: &str,
    policy: &AlgorithmPolicy,
    now: i64,
) -> Result<VerifyResult, PhaseFailure> {
    tracing::debug!(len = token.len(), "verification started");
    let result = verify_inner(token, SymmetricKey::from(secret), policy, now);
    match &result {
        Ok(result) => tracing::debug!(
            algorithm = %result.algorithm,
            outcome = result.outcome.label(),
            "verification finished"
        ),
        Err(failure) => tracing::warn!(phase = %failure.phase, "verification failed"),
    }
    result
}

fn verify_inner(
    token: &str,
    key: SymmetricKey<'_>,
    policy: &AlgorithmPolicy,
    now: i64,
) -> Result<VerifyResult, PhaseFailure> {
    let lexical = analyze_lexical(token)?;
    let (header, payload) = parse_lexical(&lexical)?;

    let header = expect_object(header, SegmentKind::Header)?;
    let algorithm = match header.get("alg") {
        None => return Err(semantic_failure("Missing required field 'alg'")),
        Some(JsonValue::String(alg)) => policy
            .validate_name(alg)
            .map_err(|e| PhaseFailure::from_error(Phase::Cryptographic, &e))?,
        Some(_) => return Err(semantic_failure("'alg' must be a string")),
    };

    if algorithm.is_symmetric() && key.is_empty() {
        return Err(PhaseFailure::from_error(
            Phase::Input,
            &Error::MissingInput(format!("secret to verify {algorithm} tokens")),
        ));
    }

    let payload = expect_object(payload, SegmentKind::Payload)?;

    let parts = &lexical.parts;
    let signing_input = format!("{}.{}", parts.header, parts.payload);
    let signature_ok = get_signer(&algorithm).verify(&signing_input, &parts.signature, &key);

    let outcome = if !signature_ok {
        VerifyOutcome::SignatureMismatch
    } else if is_expired(&payload, now) {
        VerifyOutcome::Expired
    } else {
        VerifyOutcome::Valid
    };

    Ok(VerifyResult {
        valid: outcome == VerifyOutcome::Valid,
        outcome,
        message: message(outcome, algorithm).to_string(),
        algorithm,
    })
}

fn message(outcome: VerifyOutcome, algorithm: AlgorithmId) -> &'static str {
    match (outcome, algorithm.is_unsigned()) {
        (VerifyOutcome::Valid, false) => "Valid signature: the token has not been tampered with",
        (VerifyOutcome::Valid, true) => {
            "Unsigned token accepted: the format is valid but authenticity is not established"
        }
        (VerifyOutcome::SignatureMismatch, false) => {
            "Invalid signature: the token was modified or the secret is wrong"
        }
        (VerifyOutcome::SignatureMismatch, true) => {
            "Invalid signature: alg \"none\" tokens must have an empty signature"
        }
        (VerifyOutcome::Expired, _) => "Token has expired",
    }
}

fn expect_object(value: JsonValue, segment: SegmentKind) -> Result<JsonObject, PhaseFailure> {
    match value {
        JsonValue::Object(object) => Ok(object),
        other => Err(PhaseFailure::new(
            Phase::Semantic,
            vec![Diagnostic::new(
                Phase::Semantic,
                format!("Expected a JSON object, found {}", other.value_type()),
            )
            .in_segment(segment)],
        )),
    }
}

fn semantic_failure(message: &str) -> PhaseFailure {
    PhaseFailure::new(
        Phase::Semantic,
        vec![Diagnostic::new(Phase::Semantic, message).in_segment(SegmentKind::Header)],
    )
}

//! Building signed tokens from a header and payload
//!
//! The encoder never mutates what it is given: it works on an augmented copy
//! of the payload (default `exp` injected) and returns that copy with the
//! token.

use serde::Serialize;

use crate::algorithm::{get_signer, AlgorithmId};
use crate::analysis::{analyze_lexical, parse_lexical, PhaseSummary};
use crate::claims::{ClaimsValidator, ValidationConfig, EXP};
use crate::error::{Diagnostic, Diagnostics, Error, Phase, PhaseFailure};
use crate::json::JsonValue;
use crate::keys::SymmetricKey;
use crate::limits::{DEFAULT_TTL_SECONDS, MAX_NESTING_DEPTH, MAX_TOKEN_LENGTH};
use crate::token::SegmentKind;
use crate::utils::{base64url, now_ts};

/// Configuration for token encoding
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Lifetime given to payloads without a numeric `exp`
    pub default_ttl_seconds: i64,

    /// Semantic rules the header and payload must satisfy before signing
    pub validation: ValidationConfig,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            validation: ValidationConfig::default(),
        }
    }
}

impl EncoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default token lifetime
    pub fn default_ttl(mut self, seconds: i64) -> Self {
        self.default_ttl_seconds = seconds;
        self
    }

    /// Set the semantic validation rules
    pub fn validation(mut self, config: ValidationConfig) -> Self {
        self.validation = config;
        self
    }
}

/// A freshly encoded token
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeResult {
    pub message: String,
    pub token: String,
    pub algorithm: AlgorithmId,
    pub header: JsonValue,
    /// The payload actually signed, including an injected `exp`
    pub payload: JsonValue,
    pub warnings: Vec<Diagnostic>,
    pub phases: PhaseSummary,
}

/// Token encoder
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode against the system clock
    pub fn encode(
        &self,
        header: &JsonValue,
        payload: &JsonValue,
        secret: Option<&str>,
    ) -> Result<EncodeResult, PhaseFailure> {
        self.encode_at(header, payload, secret, now_ts())
    }

    /// Validate, sign and self-check a token at time `now`
    pub fn encode_at(
        &self,
        header: &JsonValue,
        payload: &JsonValue,
        secret: Option<&str>,
        now: i64,
    ) -> Result<EncodeResult, PhaseFailure> {
        tracing::debug!("encode started");
        self.encode_inner(header, payload, secret, now)
            .inspect(|result| {
                tracing::debug!(
                    algorithm = %result.algorithm,
                    len = result.token.len(),
                    "encode passed"
                );
            })
            .inspect_err(|failure| {
                if failure.is_internal() {
                    tracing::error!(error = %failure, "encoded token failed its self-check");
                } else {
                    tracing::warn!(
                        phase = %failure.phase,
                        errors = failure.diagnostics.len(),
                        "encode failed"
                    );
                }
            })
    }

    fn encode_inner(
        &self,
        header: &JsonValue,
        payload: &JsonValue,
        secret: Option<&str>,
        now: i64,
    ) -> Result<EncodeResult, PhaseFailure> {
        check_input(header, payload, secret)?;

        let payload = self.with_default_expiry(payload, now);

        let semantic = ClaimsValidator::validate(header, &payload, &self.config.validation, now)
            .into_result()?;

        // Semantic validation guarantees a supported, string-valued `alg`.
        let alg = header.get("alg").and_then(JsonValue::as_str).unwrap_or_default();
        let algorithm = AlgorithmId::from_str(alg)
            .map_err(|e| PhaseFailure::from_error(Phase::Cryptographic, &e))?;

        let signing_input = format!(
            "{}.{}",
            base64url::encode(&header.to_json_string()),
            base64url::encode(&payload.to_json_string())
        );
        let key = SymmetricKey::from(secret.unwrap_or_default());
        let signature = get_signer(&algorithm)
            .sign(&signing_input, &key)
            .map_err(|e| PhaseFailure::from_error(Phase::Cryptographic, &e))?;
        let token = format!("{signing_input}.{signature}");

        if token.len() > MAX_TOKEN_LENGTH {
            return Err(PhaseFailure::from_error(
                Phase::Input,
                &Error::TokenTooLarge {
                    size: token.len(),
                    max: MAX_TOKEN_LENGTH,
                },
            ));
        }

        self_check(&token)?;

        Ok(EncodeResult {
            message: "JWT generated successfully".to_string(),
            token,
            algorithm,
            header: header.clone(),
            payload,
            warnings: semantic.warnings,
            phases: PhaseSummary::new(&["lexical", "syntactic", "semantic"]),
        })
    }

    /// Copy of `payload` with `exp` defaulted when absent or non-numeric
    fn with_default_expiry(&self, payload: &JsonValue, now: i64) -> JsonValue {
        let mut payload = payload.clone();
        if let JsonValue::Object(claims) = &mut payload {
            if !matches!(claims.get(EXP), Some(JsonValue::Number(_))) {
                let exp = now.saturating_add(self.config.default_ttl_seconds);
                claims.insert(EXP, JsonValue::from(exp));
            }
        }
        payload
    }
}

fn check_input(
    header: &JsonValue,
    payload: &JsonValue,
    secret: Option<&str>,
) -> Result<(), PhaseFailure> {
    let mut diagnostics = Diagnostics::new();
    let mut invalid = |segment: SegmentKind, reason: String| {
        diagnostics.push(
            Diagnostic::from_error(Phase::Input, &Error::InvalidInput(reason)).in_segment(segment),
        );
    };

    for (segment, value) in [(SegmentKind::Header, header), (SegmentKind::Payload, payload)] {
        if value.as_object().is_none() {
            invalid(
                segment,
                format!("expected a JSON object, found {}", value.value_type()),
            );
        }
        if value.depth() > MAX_NESTING_DEPTH {
            invalid(
                segment,
                format!("nesting deeper than {MAX_NESTING_DEPTH} levels"),
            );
        }
        if !value.is_finite() {
            invalid(segment, "numbers must be finite".to_string());
        }
    }

    if let Some(alg) = header.get("alg").and_then(JsonValue::as_str) {
        if alg != AlgorithmId::None.as_str() && secret.map_or(true, str::is_empty) {
            diagnostics.push(Diagnostic::from_error(
                Phase::Input,
                &Error::MissingInput(format!("secret for alg '{alg}'")),
            ));
        }
    }

    diagnostics.finish(Phase::Input)
}

/// Re-analyze a produced token; any failure is a defect in this crate
fn self_check(token: &str) -> Result<(), PhaseFailure> {
    let internal = |failure: PhaseFailure| {
        PhaseFailure::from_error(
            Phase::Internal,
            &Error::Internal(format!("encoded token failed its own analysis: {failure}")),
        )
    };

    let lexical = analyze_lexical(token).map_err(internal)?;
    parse_lexical(&lexical).map_err(internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::AlgorithmPolicy;
    use crate::decoder::decode;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn encode(
        header: serde_json::Value,
        payload: serde_json::Value,
        secret: Option<&str>,
    ) -> Result<EncodeResult, PhaseFailure> {
        Encoder::default().encode_at(
            &JsonValue::from(header),
            &JsonValue::from(payload),
            secret,
            NOW,
        )
    }

    #[test]
    fn test_encode_hs256() {
        let result = encode(
            json!({"alg": "HS256", "typ": "JWT"}),
            json!({"sub": "1234567890", "iat": NOW}),
            Some("secret"),
        )
        .unwrap();

        assert_eq!(result.algorithm, AlgorithmId::HS256);
        assert!(result.token.starts_with("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9."));
        assert_eq!(result.token.split('.').count(), 3);
        assert_eq!(
            result.payload.get("exp"),
            Some(&JsonValue::from(NOW + DEFAULT_TTL_SECONDS))
        );
        assert!(result.phases.passed("semantic"));
    }

    #[test]
    fn test_caller_payload_untouched() {
        let header = JsonValue::from(json!({"alg": "HS256", "typ": "JWT"}));
        let payload = JsonValue::from(json!({"sub": "a"}));
        let result = Encoder::default()
            .encode_at(&header, &payload, Some("k"), NOW)
            .unwrap();

        assert!(payload.get("exp").is_none());
        assert!(result.payload.get("exp").is_some());
    }

    #[test]
    fn test_non_numeric_exp_replaced_in_place() {
        let result = encode(
            json!({"alg": "HS256", "typ": "JWT"}),
            json!({"exp": "later", "sub": "a"}),
            Some("k"),
        )
        .unwrap();
        assert_eq!(
            result.payload.to_json_string(),
            format!(r#"{{"exp":{},"sub":"a"}}"#, NOW + 1500)
        );
    }

    #[test]
    fn test_explicit_exp_kept() {
        let result = encode(
            json!({"alg": "HS384", "typ": "JWT"}),
            json!({"sub": "a", "exp": NOW + 10}),
            Some("k"),
        )
        .unwrap();
        assert_eq!(result.payload.get("exp"), Some(&JsonValue::from(NOW + 10)));
    }

    #[test]
    fn test_custom_ttl() {
        let encoder = Encoder::new(EncoderConfig::new().default_ttl(60));
        let result = encoder
            .encode_at(
                &JsonValue::from(json!({"alg": "HS256", "typ": "JWT"})),
                &JsonValue::from(json!({"sub": "a"})),
                Some("k"),
                NOW,
            )
            .unwrap();
        assert_eq!(result.payload.get("exp"), Some(&JsonValue::from(NOW + 60)));
    }

    #[test]
    fn test_none_has_empty_signature() {
        let result = encode(json!({"alg": "none", "typ": "JWT"}), json!({"sub": "a"}), None)
            .unwrap();
        assert!(result.token.ends_with('.'));
        assert_eq!(result.algorithm, AlgorithmId::None);
    }

    #[test]
    fn test_input_errors_accumulate() {
        let failure = encode(json!("header"), json!([1]), Some("k")).unwrap_err();
        assert_eq!(failure.phase, Phase::Input);
        assert_eq!(failure.diagnostics.len(), 2);
    }

    #[test]
    fn test_secret_required_for_hmac() {
        let failure = encode(json!({"alg": "HS256", "typ": "JWT"}), json!({"sub": "a"}), None)
            .unwrap_err();
        assert_eq!(failure.phase, Phase::Input);
        assert_eq!(
            failure.messages(),
            vec!["Missing required input: secret for alg 'HS256'"]
        );

        let failure = encode(json!({"alg": "HS256", "typ": "JWT"}), json!({"sub": "a"}), Some(""))
            .unwrap_err();
        assert_eq!(failure.phase, Phase::Input);
    }

    #[test]
    fn test_semantic_failure_blocks_signing() {
        let failure = encode(
            json!({"alg": "HS512", "typ": "JWT"}),
            json!({"sub": "a"}),
            Some("k"),
        )
        .unwrap_err();
        assert_eq!(failure.phase, Phase::Semantic);

        let failure = encode(
            json!({"alg": "HS256", "typ": "JWT"}),
            json!({"iat": 100, "exp": 50}),
            Some("k"),
        )
        .unwrap_err();
        assert_eq!(failure.phase, Phase::Semantic);
    }

    #[test]
    fn test_policy_applies_to_encoding() {
        let encoder = Encoder::new(
            EncoderConfig::new()
                .validation(ValidationConfig::new().algorithms(AlgorithmPolicy::hmac_any())),
        );
        let failure = encoder
            .encode_at(
                &JsonValue::from(json!({"alg": "none", "typ": "JWT"})),
                &JsonValue::from(json!({"sub": "a"})),
                None,
                NOW,
            )
            .unwrap_err();
        assert_eq!(failure.phase, Phase::Semantic);
    }

    #[test]
    fn test_roundtrip_through_decoder() {
        let header = json!({"alg": "HS256", "typ": "JWT", "kid": "k1"});
        let payload = json!({"sub": "a", "roles": ["x", "y"], "n": {"deep": [null, true, 1.5]}});
        let result = encode(header.clone(), payload, Some("k")).unwrap();

        let decoded = decode(&result.token).unwrap();
        assert_eq!(decoded.header, JsonValue::from(header));
        assert_eq!(decoded.payload, result.payload);
    }

    #[test]
    fn test_deep_payload_is_input_error() {
        let mut deep = JsonValue::from(1i64);
        for _ in 0..=MAX_NESTING_DEPTH {
            deep = JsonValue::Array(vec![deep]);
        }
        let mut claims = crate::json::JsonObject::new();
        claims.insert("sub", JsonValue::from("a"));
        claims.insert("deep", deep);

        let failure = Encoder::default()
            .encode_at(
                &JsonValue::from(json!({"alg": "HS256", "typ": "JWT"})),
                &JsonValue::Object(claims),
                Some("k"),
                NOW,
            )
            .unwrap_err();
        assert_eq!(failure.phase, Phase::Input);
        assert_eq!(
            failure.messages(),
            vec!["payload: Invalid input: nesting deeper than 128 levels"]
        );
    }

    #[test]
    fn test_oversized_token_is_input_error() {
        let failure = encode(
            json!({"alg": "HS256", "typ": "JWT"}),
            json!({"sub": "a", "blob": "x".repeat(MAX_TOKEN_LENGTH)}),
            Some("k"),
        )
        .unwrap_err();
        assert_eq!(failure.phase, Phase::Input);
        assert!(failure.messages()[0].starts_with("Token too large"));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        let mut claims = crate::json::JsonObject::new();
        claims.insert("sub", JsonValue::from("a"));
        claims.insert("exp", JsonValue::Number(f64::INFINITY));

        let failure = Encoder::default()
            .encode_at(
                &JsonValue::from(json!({"alg": "HS256", "typ": "JWT"})),
                &JsonValue::Object(claims),
                Some("k"),
                NOW,
            )
            .unwrap_err();
        assert_eq!(failure.phase, Phase::Input);
        assert_eq!(
            failure.messages(),
            vec!["payload: Invalid input: numbers must be finite"]
        );
    }

    #[test]
    fn test_extreme_clock_saturates() {
        let result = Encoder::new(EncoderConfig::new().default_ttl(i64::MAX))
            .encode_at(
                &JsonValue::from(json!({"alg": "HS256", "typ": "JWT"})),
                &JsonValue::from(json!({"sub": "a"})),
                Some("k"),
                NOW,
            )
            .unwrap();
        assert_eq!(
            result.payload.get("exp").and_then(JsonValue::as_f64),
            Some(i64::MAX as f64)
        );
    }
}

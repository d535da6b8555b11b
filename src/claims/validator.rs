use serde::Serialize;

use crate::algorithm::AlgorithmPolicy;
use crate::claims::{numeric_claim, symbol_table, SymbolEntry, AUD, EXP, IAT, ISS, SUB};
use crate::error::{Diagnostic, Diagnostics, Phase, PhaseFailure};
use crate::json::{JsonObject, JsonValue};
use crate::token::SegmentKind;

/// How an expired `exp` affects semantic validity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Expired tokens are semantically invalid
    #[default]
    Reject,
    /// Expiry is reported as a warning; only the verifier rejects it
    Warn,
}

/// Configuration for semantic analysis
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Treatment of `exp <= now`
    pub expiry_policy: ExpiryPolicy,

    /// Claims whose absence produces a warning (default: sub, exp, iat)
    pub recommended_claims: Vec<String>,

    /// Accepted values of the header `alg` field
    pub algorithms: AlgorithmPolicy,

    /// Run the `iat`/`exp` checks against the clock
    pub validate_temporal: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            expiry_policy: ExpiryPolicy::default(),
            recommended_claims: vec![SUB.to_string(), EXP.to_string(), IAT.to_string()],
            algorithms: AlgorithmPolicy::default(),
            validate_temporal: true,
        }
    }
}

impl ValidationConfig {
    /// Create a new validation config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how expiry is reported
    pub fn expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    /// Replace the recommended-claims list
    pub fn recommended_claims<I, S>(mut self, claims: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recommended_claims = claims.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict the accepted algorithms
    pub fn algorithms(mut self, policy: AlgorithmPolicy) -> Self {
        self.algorithms = policy;
        self
    }

    /// Skip the clock-dependent checks (`iat` in the future, expiry)
    ///
    /// The `exp > iat` ordering rule does not depend on the clock and still
    /// applies.
    pub fn skip_temporal(mut self) -> Self {
        self.validate_temporal = false;
        self
    }
}

/// Outcome of semantic analysis
///
/// Errors, warnings and the symbol table are always populated, whether or
/// not the token is valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticResult {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub symbol_table: Vec<SymbolEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SemanticResult {
    /// Rendered error messages
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Rendered warning messages
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// Turn an invalid result into a semantic-phase failure
    pub fn into_result(self) -> Result<Self, PhaseFailure> {
        if self.valid {
            Ok(self)
        } else {
            Err(PhaseFailure::new(Phase::Semantic, self.errors))
        }
    }
}

/// Semantic checks over a parsed header and payload
pub struct ClaimsValidator;

impl ClaimsValidator {
    /// Validate header and payload according to configuration
    pub fn validate(
        header: &JsonValue,
        payload: &JsonValue,
        config: &ValidationConfig,
        now: i64,
    ) -> SemanticResult {
        let Some(header) = header.as_object() else {
            return SemanticResult {
                valid: false,
                errors: vec![header_error("Header is not a JSON object")],
                warnings: Vec::new(),
                symbol_table: Vec::new(),
                message: None,
            };
        };

        let mut errors = Diagnostics::new();
        let mut warnings = Diagnostics::new();

        Self::check_header(header, config, &mut errors);

        let symbols = match payload.as_object() {
            Some(payload) => {
                Self::check_payload(payload, config, now, &mut errors, &mut warnings);
                symbol_table(payload)
            }
            None => {
                errors.push(payload_error("Payload is not a JSON object"));
                Vec::new()
            }
        };

        let valid = errors.is_empty();
        tracing::debug!(
            valid,
            errors = errors.len(),
            warnings = warnings.len(),
            "semantic analysis finished"
        );

        SemanticResult {
            valid,
            errors: errors.into_vec(),
            warnings: warnings.into_vec(),
            symbol_table: symbols,
            message: valid
                .then(|| "Semantic analysis passed: structure and claims are valid".to_string()),
        }
    }

    fn check_header(header: &JsonObject, config: &ValidationConfig, errors: &mut Diagnostics) {
        for field in ["alg", "typ"] {
            match header.get(field) {
                None => errors.push(header_error(format!("Missing required field '{field}'"))),
                Some(JsonValue::String(_)) => {}
                Some(_) => errors.push(header_error(format!("'{field}' must be a string"))),
            }
        }

        if let Some(JsonValue::String(alg)) = header.get("alg") {
            if let Err(e) = config.algorithms.validate_name(alg) {
                errors.push(header_error(e.to_string()));
            }
        }
    }

    fn check_payload(
        payload: &JsonObject,
        config: &ValidationConfig,
        now: i64,
        errors: &mut Diagnostics,
        warnings: &mut Diagnostics,
    ) {
        if payload.is_empty() {
            errors.push(payload_error("Payload contains no claims"));
        }

        for claim in [EXP, IAT] {
            if let Some(value) = payload.get(claim) {
                if !matches!(value, JsonValue::Number(_)) {
                    errors.push(payload_error(format!(
                        "'{claim}' must be a number (seconds since epoch)"
                    )));
                }
            }
        }

        if let Some(value) = payload.get(ISS) {
            if !matches!(value, JsonValue::String(_)) {
                errors.push(payload_error("'iss' must be a string"));
            }
        }

        match payload.get(AUD) {
            None | Some(JsonValue::String(_)) => {}
            Some(JsonValue::Array(items)) => {
                if !items.iter().all(|item| matches!(item, JsonValue::String(_))) {
                    errors.push(payload_error("'aud' array must contain only strings"));
                }
            }
            Some(_) => errors.push(payload_error("'aud' must be a string or an array")),
        }

        let iat = numeric_claim(payload, IAT);
        let exp = numeric_claim(payload, EXP);

        if config.validate_temporal {
            if iat.is_some_and(|iat| iat > now as f64) {
                warnings.push(payload_warning("'iat' is in the future"));
            }
            if exp.is_some_and(|exp| exp <= now as f64) {
                match config.expiry_policy {
                    ExpiryPolicy::Reject => errors.push(payload_error("Token has expired")),
                    ExpiryPolicy::Warn => warnings.push(payload_warning("Token has expired")),
                }
            }
        }

        if let (Some(exp), Some(iat)) = (exp, iat) {
            if exp <= iat {
                errors.push(payload_error("'exp' must be greater than 'iat'"));
            }
        }

        let missing: Vec<&str> = config
            .recommended_claims
            .iter()
            .map(String::as_str)
            .filter(|claim| !payload.contains_key(claim))
            .collect();
        if !missing.is_empty() {
            warnings.push(payload_warning(format!(
                "Missing recommended claims: {}",
                missing.join(", ")
            )));
        }
    }
}

fn header_error(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(Phase::Semantic, message).in_segment(SegmentKind::Header)
}

fn payload_error(message: impl Into<String>) -> Diagnostic {
    Diagnostic::new(Phase::Semantic, message).in_segment(SegmentKind::Payload)
}

fn payload_warning(message: impl Into<String>) -> Diagnostic {
    payload_error(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn validate(header: serde_json::Value, payload: serde_json::Value) -> SemanticResult {
        validate_with(header, payload, &ValidationConfig::default())
    }

    fn validate_with(
        header: serde_json::Value,
        payload: serde_json::Value,
        config: &ValidationConfig,
    ) -> SemanticResult {
        ClaimsValidator::validate(
            &JsonValue::from(header),
            &JsonValue::from(payload),
            config,
            NOW,
        )
    }

    fn hs256() -> serde_json::Value {
        json!({"alg": "HS256", "typ": "JWT"})
    }

    #[test]
    fn test_valid_token() {
        let result = validate(
            hs256(),
            json!({"sub": "u1", "iat": NOW - 10, "exp": NOW + 3600}),
        );
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.symbol_table.len(), 3);
        assert_eq!(
            result.message.as_deref(),
            Some("Semantic analysis passed: structure and claims are valid")
        );
    }

    #[test]
    fn test_header_not_object_short_circuits() {
        let result = validate(json!(["HS256"]), json!({"sub": "x"}));
        assert!(!result.valid);
        assert_eq!(result.error_messages(), vec!["header: Header is not a JSON object"]);
        assert!(result.symbol_table.is_empty());
        assert!(result.message.is_none());
    }

    #[test]
    fn test_header_errors_accumulate() {
        let result = validate(json!({"alg": 256}), json!({"sub": "x", "exp": NOW + 1, "iat": NOW}));
        assert_eq!(
            result.error_messages(),
            vec![
                "header: 'alg' must be a string",
                "header: Missing required field 'typ'",
            ]
        );
    }

    #[test]
    fn test_unsupported_algorithm_names_allowed_set() {
        let result = validate(
            json!({"alg": "RS256", "typ": "JWT"}),
            json!({"sub": "x", "exp": NOW + 1, "iat": NOW}),
        );
        assert_eq!(
            result.error_messages(),
            vec!["header: Algorithm 'RS256' not allowed. Allowed: HS256, HS384, none"]
        );
    }

    #[test]
    fn test_algorithm_policy_is_configurable() {
        let config = ValidationConfig::new().algorithms(AlgorithmPolicy::hmac_any());
        let result = validate_with(
            json!({"alg": "none", "typ": "JWT"}),
            json!({"sub": "x", "exp": NOW + 1, "iat": NOW}),
            &config,
        );
        assert!(!result.valid);
    }

    #[test]
    fn test_payload_not_object_keeps_header_errors() {
        let result = validate(json!({"typ": "JWT"}), json!("claims"));
        assert_eq!(
            result.error_messages(),
            vec![
                "header: Missing required field 'alg'",
                "payload: Payload is not a JSON object",
            ]
        );
    }

    #[test]
    fn test_empty_claims() {
        let result = validate(hs256(), json!({}));
        assert!(!result.valid);
        assert_eq!(result.error_messages(), vec!["payload: Payload contains no claims"]);
        assert_eq!(
            result.warning_messages(),
            vec!["payload: Missing recommended claims: sub, exp, iat"]
        );
    }

    #[test]
    fn test_claim_type_errors_are_separate() {
        let result = validate(
            hs256(),
            json!({"exp": "soon", "iat": null, "iss": 5, "aud": 7, "sub": "x"}),
        );
        assert_eq!(
            result.error_messages(),
            vec![
                "payload: 'exp' must be a number (seconds since epoch)",
                "payload: 'iat' must be a number (seconds since epoch)",
                "payload: 'iss' must be a string",
                "payload: 'aud' must be a string or an array",
            ]
        );
    }

    #[test]
    fn test_aud_array() {
        let ok = validate(hs256(), json!({"sub": "x", "exp": NOW + 5, "iat": NOW, "aud": ["a", "b"]}));
        assert!(ok.valid);

        let bad = validate(hs256(), json!({"sub": "x", "exp": NOW + 5, "iat": NOW, "aud": ["a", 1]}));
        assert_eq!(
            bad.error_messages(),
            vec!["payload: 'aud' array must contain only strings"]
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let expired = validate(hs256(), json!({"sub": "x", "exp": NOW - 1}));
        assert!(!expired.valid);
        assert!(expired
            .error_messages()
            .contains(&"payload: Token has expired".to_string()));

        let at_now = validate(hs256(), json!({"sub": "x", "exp": NOW}));
        assert!(!at_now.valid);

        let fresh = validate(hs256(), json!({"sub": "x", "exp": NOW + 1}));
        assert!(fresh.valid);
    }

    #[test]
    fn test_expiry_warn_policy() {
        let config = ValidationConfig::new().expiry_policy(ExpiryPolicy::Warn);
        let result = validate_with(hs256(), json!({"sub": "x", "exp": NOW - 1, "iat": NOW - 10}), &config);
        assert!(result.valid);
        assert_eq!(result.warning_messages(), vec!["payload: Token has expired"]);
    }

    #[test]
    fn test_exp_must_exceed_iat() {
        let result = validate(hs256(), json!({"sub": "x", "iat": 100, "exp": 50}));
        assert!(result
            .error_messages()
            .contains(&"payload: 'exp' must be greater than 'iat'".to_string()));

        let config = ValidationConfig::new().skip_temporal();
        let result = validate_with(hs256(), json!({"sub": "x", "iat": 100, "exp": 50}), &config);
        assert_eq!(
            result.error_messages(),
            vec!["payload: 'exp' must be greater than 'iat'"]
        );
    }

    #[test]
    fn test_iat_in_future_is_warning() {
        let result = validate(hs256(), json!({"sub": "x", "iat": NOW + 60, "exp": NOW + 3600}));
        assert!(result.valid);
        assert_eq!(result.warning_messages(), vec!["payload: 'iat' is in the future"]);
    }

    #[test]
    fn test_recommended_claims_configurable() {
        let config = ValidationConfig::new().recommended_claims(["jti"]);
        let result = validate_with(hs256(), json!({"sub": "x"}), &config);
        assert!(result.valid);
        assert_eq!(
            result.warning_messages(),
            vec!["payload: Missing recommended claims: jti"]
        );
    }

    #[test]
    fn test_into_result() {
        let failure = validate(hs256(), json!({}))
            .into_result()
            .unwrap_err();
        assert_eq!(failure.phase, Phase::Semantic);
        assert_eq!(failure.messages(), vec!["payload: Payload contains no claims"]);
    }

    #[test]
    fn test_serialization_shape() {
        let result = validate(hs256(), json!({"sub": "x", "exp": NOW + 1, "iat": NOW}));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["symbolTable"][0]["name"], "sub");
        assert!(json["errors"].as_array().unwrap().is_empty());
    }
}

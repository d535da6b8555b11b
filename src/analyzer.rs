//! One entry point for every pipeline operation
//!
//! [`JwtAnalyzer`] carries the configuration and an optional fixed clock, so
//! a transport layer can map each method 1:1 to an endpoint.

use crate::analysis::{self, FullAnalysis, LexicalAnalysis, SyntacticAnalysis};
use crate::claims::{SemanticResult, ValidationConfig};
use crate::decoder::{self, DecodeResult};
use crate::encoder::{EncodeResult, Encoder, EncoderConfig};
use crate::error::PhaseFailure;
use crate::json::JsonValue;
use crate::utils::now_ts;
use crate::verifier::{self, VerifyResult};

/// Facade over the analysis, encoding and verification operations
///
/// # Examples
///
/// ```
/// use jwtlens::{JsonValue, JwtAnalyzer};
///
/// let analyzer = JwtAnalyzer::new().with_now(1_700_000_000);
///
/// let header: JsonValue = serde_json::json!({"alg": "HS256", "typ": "JWT"}).into();
/// let payload: JsonValue = serde_json::json!({"sub": "42"}).into();
/// let encoded = analyzer.encode(&header, &payload, Some("secret")).unwrap();
///
/// let verified = analyzer.verify(&encoded.token, "secret").unwrap();
/// assert!(verified.valid);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JwtAnalyzer {
    validation: ValidationConfig,
    default_ttl_seconds: Option<i64>,
    now: Option<i64>,
}

impl JwtAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the semantic validation rules
    pub fn with_validation(mut self, config: ValidationConfig) -> Self {
        self.validation = config;
        self
    }

    /// Lifetime given by [`encode`](Self::encode) to payloads without `exp`
    pub fn with_default_ttl(mut self, seconds: i64) -> Self {
        self.default_ttl_seconds = Some(seconds);
        self
    }

    /// Pin the clock to a fixed Unix timestamp
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = Some(now);
        self
    }

    pub fn validation(&self) -> &ValidationConfig {
        &self.validation
    }

    /// Current time as seen by this analyzer
    pub fn now(&self) -> i64 {
        self.now.unwrap_or_else(now_ts)
    }

    pub fn analyze_lexical(&self, token: &str) -> Result<LexicalAnalysis, PhaseFailure> {
        analysis::analyze_lexical(token)
    }

    pub fn analyze_syntactic(&self, token: &str) -> Result<SyntacticAnalysis, PhaseFailure> {
        analysis::analyze_syntactic(token)
    }

    pub fn analyze_semantic(&self, token: &str) -> Result<SemanticResult, PhaseFailure> {
        analysis::analyze_semantic_at(token, &self.validation, self.now())
    }

    pub fn decode(&self, token: &str) -> Result<DecodeResult, PhaseFailure> {
        decoder::decode(token)
    }

    pub fn encode(
        &self,
        header: &JsonValue,
        payload: &JsonValue,
        secret: Option<&str>,
    ) -> Result<EncodeResult, PhaseFailure> {
        self.encoder().encode_at(header, payload, secret, self.now())
    }

    /// Verify with the configured algorithm policy
    pub fn verify(&self, token: &str, secret: &str) -> Result<VerifyResult, PhaseFailure> {
        verifier::verify_at(token, secret, &self.validation.algorithms, self.now())
    }

    pub fn full_analysis(&self, token: &str) -> Result<FullAnalysis, PhaseFailure> {
        analysis::full_analysis_at(token, &self.validation, self.now())
    }

    fn encoder(&self) -> Encoder {
        let mut config = EncoderConfig::new().validation(self.validation.clone());
        if let Some(ttl) = self.default_ttl_seconds {
            config = config.default_ttl(ttl);
        }
        Encoder::new(config)
    }
}

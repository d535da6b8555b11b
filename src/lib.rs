//! # jwtlens - A Compiler-Style JWT Analyzer
//!
//! > Inspect, encode and verify JSON Web Tokens phase by phase.
//!
//! **jwtlens** treats a JWT the way a compiler treats source text. A token is
//! split and scanned (lexical phase), its decoded segments are parsed as
//! strict JSON (syntactic phase), and the resulting header and claims are
//! checked against the rules of RFC 7519 (semantic phase). HMAC signing and
//! verification sit on top of the same pipeline.
//!
//! ## Overview
//!
//! Every public operation returns either its result or a [`PhaseFailure`]
//! naming the phase that stopped the pipeline. Inside a phase all findings
//! are collected before the phase reports, so a caller sees every charset
//! violation or every claim-type error in one pass. A later phase never runs
//! on input an earlier phase rejected: no signature is checked over JSON
//! that does not parse.
//!
//! ```text
//! token ──split──▶ segments ──charset──▶ decoded text ──tokenize──▶ JSON tokens
//!                                                                       │
//!                                     SemanticResult ◀──validate── value trees
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use jwtlens::{JsonValue, JwtAnalyzer, VerifyOutcome};
//!
//! let analyzer = JwtAnalyzer::new().with_now(1_700_000_000);
//!
//! let header: JsonValue = serde_json::json!({"alg": "HS256", "typ": "JWT"}).into();
//! let payload: JsonValue = serde_json::json!({"sub": "user123"}).into();
//!
//! // `exp` defaults to now + 1500 seconds
//! let encoded = analyzer.encode(&header, &payload, Some("secret")).unwrap();
//!
//! let analysis = analyzer.full_analysis(&encoded.token).unwrap();
//! assert!(analysis.semantic.valid);
//!
//! let verified = analyzer.verify(&encoded.token, "secret").unwrap();
//! assert_eq!(verified.outcome, VerifyOutcome::Valid);
//! ```
//!
//! ## Operations
//!
//! | Operation | Function | Fails in |
//! |-----------|----------|----------|
//! | Lexical analysis | [`analysis::analyze_lexical`] | lexical |
//! | Syntactic analysis | [`analysis::analyze_syntactic`] | lexical, syntactic |
//! | Semantic analysis | [`analysis::analyze_semantic`] | lexical, syntactic |
//! | Decode | [`decoder::decode`] | lexical, syntactic |
//! | Encode | [`Encoder::encode`] | input, semantic, cryptographic, internal |
//! | Verify | [`verifier::verify`] | lexical, syntactic, semantic, cryptographic, input |
//! | Full analysis | [`analysis::full_analysis`] | lexical, syntactic |
//!
//! Time-dependent operations have an `_at` form taking the current Unix
//! timestamp, and [`JwtAnalyzer::with_now`] pins the clock for all of them.
//!
//! ## Algorithm Support
//!
//! - **HS256**: HMAC with SHA-256
//! - **HS384**: HMAC with SHA-384
//! - **none**: unsigned, empty signature segment
//!
//! An unsigned token that verifies as valid is well-formed and unexpired,
//! nothing more. Use [`AlgorithmPolicy::hmac_any`] to reject `none`.
//!
//! ## Security
//!
//! HMAC signatures are compared in constant time via
//! [`constant_time_eq`](https://crates.io/crates/constant_time_eq). Secrets
//! are borrowed for the duration of one call and are redacted from `Debug`
//! output. Token size and JSON nesting depth are bounded (see [`limits`]).
//!
//! ## References
//!
//! - [RFC 4648](https://datatracker.ietf.org/doc/html/rfc4648) Base64URL
//! - [RFC 7515](https://datatracker.ietf.org/doc/html/rfc7515) JSON Web Signature (JWS)
//! - [RFC 7519](https://datatracker.ietf.org/doc/html/rfc7519) JSON Web Token (JWT)
//! - [RFC 8259](https://datatracker.ietf.org/doc/html/rfc8259) JSON

// Core modules
pub mod error;
pub mod limits;
pub mod utils;

// JSON front end
pub mod json;

// Algorithm system
pub mod algorithm;
pub mod keys;

// Claims and validation
pub mod claims;

// Token segments
pub mod token;

// Pipeline
pub mod analysis;
pub mod decoder;
pub mod encoder;
pub mod verifier;

// Facade and records
pub mod analyzer;
pub mod record;

// ============================================================================
// PUBLIC API
// ============================================================================

pub use analyzer::JwtAnalyzer;

// Results
pub use analysis::{FullAnalysis, LexicalAnalysis, PhaseSummary, SyntacticAnalysis};
pub use claims::{SemanticResult, SymbolEntry};
pub use decoder::DecodeResult;
pub use encoder::EncodeResult;
pub use verifier::{VerifyOutcome, VerifyResult};

// Configuration types
pub use claims::{ExpiryPolicy, ValidationConfig};
pub use encoder::{Encoder, EncoderConfig};

// Supporting types
pub use algorithm::{AlgorithmId, AlgorithmPolicy};
pub use error::{Diagnostic, Error, Phase, PhaseFailure, Result};
pub use json::{JsonObject, JsonToken, JsonValue, TokenKind, ValueType};
pub use keys::SymmetricKey;
pub use record::{AnalysisRecord, RecordKind};
pub use token::SegmentKind;

//! Phase ordering, facade behaviour and analysis records

use jwtlens::*;
use serde_json::json;

const NOW: i64 = 1_700_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn token(header: &str, payload: &str, signature: &str) -> String {
    format!(
        "{}.{}.{}",
        utils::base64url::encode(header),
        utils::base64url::encode(payload),
        signature
    )
}

fn issued(analyzer: &JwtAnalyzer, payload: serde_json::Value) -> String {
    analyzer
        .encode(
            &JsonValue::from(json!({"alg": "HS256", "typ": "JWT"})),
            &JsonValue::from(payload),
            Some("secret"),
        )
        .unwrap()
        .token
}

#[test]
fn test_full_analysis_reports_every_phase() {
    init_tracing();
    let analyzer = JwtAnalyzer::new().with_now(NOW);
    let token = issued(&analyzer, json!({"sub": "u1", "iat": NOW, "iss": "https://issuer"}));

    let analysis = analyzer.full_analysis(&token).unwrap();
    assert_eq!(analysis.lexical.message, "Lexical analysis passed");
    assert_eq!(analysis.syntactic.message, "Syntactic analysis passed");
    assert!(analysis.semantic.valid);
    assert!(analysis.semantic.warnings.is_empty());

    let names: Vec<&str> = analysis
        .semantic
        .symbol_table
        .iter()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(names, ["sub", "iat", "iss", "exp"]);
}

#[test]
fn test_full_analysis_keeps_semantic_errors() {
    init_tracing();
    let analyzer = JwtAnalyzer::new().with_now(NOW);
    let expired = token(
        r#"{"alg":"HS256"}"#,
        &format!(r#"{{"sub":"u1","exp":{}}}"#, NOW - 1),
        "c2ln",
    );

    let analysis = analyzer.full_analysis(&expired).unwrap();
    assert!(!analysis.semantic.valid);
    assert!(analysis
        .semantic
        .error_messages()
        .iter()
        .any(|m| m.contains("Token has expired")));

    let failure = analyzer.analyze_semantic(&expired).unwrap();
    assert!(!failure.valid);
}

#[test]
fn test_warn_policy_downgrades_expiry() {
    let analyzer = JwtAnalyzer::new()
        .with_now(NOW)
        .with_validation(ValidationConfig::new().expiry_policy(ExpiryPolicy::Warn));
    let expired = token(
        r#"{"alg":"HS256","typ":"JWT"}"#,
        &format!(r#"{{"sub":"u1","iat":{},"exp":{}}}"#, NOW - 10, NOW),
        "c2ln",
    );

    let semantic = analyzer.analyze_semantic(&expired).unwrap();
    assert!(semantic.valid);
    assert!(semantic
        .warning_messages()
        .iter()
        .any(|m| m.contains("Token has expired")));
}

#[test]
fn test_earlier_phase_stops_the_pipeline() {
    init_tracing();
    let analyzer = JwtAnalyzer::new().with_now(NOW);

    let lexical = analyzer.full_analysis("abc.d*f.").unwrap_err();
    assert_eq!(lexical.phase, Phase::Lexical);
    assert!(lexical
        .diagnostics
        .iter()
        .all(|d| d.phase == Phase::Lexical));

    let syntactic = analyzer
        .full_analysis(&token(r#"{"alg":"HS256",}"#, r#"{"sub":}"#, "c2ln"))
        .unwrap_err();
    assert_eq!(syntactic.phase, Phase::Syntactic);
    let segments: Vec<Option<SegmentKind>> =
        syntactic.diagnostics.iter().map(|d| d.segment).collect();
    assert_eq!(
        segments,
        [Some(SegmentKind::Header), Some(SegmentKind::Payload)]
    );

    let verify = analyzer
        .verify(&token(r#"{"alg":"HS256"}"#, "[1,2]", "c2ln"), "secret")
        .unwrap_err();
    assert_eq!(verify.phase, Phase::Semantic);
}

#[test]
fn test_every_operation_agrees_on_parsed_values() {
    let analyzer = JwtAnalyzer::new().with_now(NOW);
    let token = issued(&analyzer, json!({"sub": "u1", "n": 0.5, "list": [1, "two"]}));

    let syntactic = analyzer.analyze_syntactic(&token).unwrap();
    let decoded = analyzer.decode(&token).unwrap();
    let full = analyzer.full_analysis(&token).unwrap();

    assert_eq!(syntactic.payload, decoded.payload);
    assert_eq!(full.syntactic.payload, decoded.payload);
    assert_eq!(full.syntactic.header, decoded.header);
    assert_eq!(decoded.raw.payload_decoded, full.lexical.payload_decoded);
}

#[test]
fn test_phase_summaries() {
    let analyzer = JwtAnalyzer::new().with_now(NOW);
    let token = issued(&analyzer, json!({"sub": "u1", "iat": NOW}));

    let decoded = analyzer.decode(&token).unwrap();
    let phases: Vec<&str> = decoded.phases.iter().collect();
    assert_eq!(phases, ["lexical", "decoding", "syntactic"]);

    let encoded = serde_json::to_value(&decoded).unwrap();
    assert_eq!(encoded["phases"], json!({"lexical": "OK", "decoding": "OK", "syntactic": "OK"}));
    assert_eq!(encoded["message"], "Token decoded successfully");
}

#[test]
fn test_algorithm_policy_applies_everywhere() {
    let permissive = JwtAnalyzer::new().with_now(NOW);
    let unsigned = permissive
        .encode(
            &JsonValue::from(json!({"alg": "none", "typ": "JWT"})),
            &JsonValue::from(json!({"sub": "u1", "iat": NOW})),
            None,
        )
        .unwrap()
        .token;
    assert!(permissive.verify(&unsigned, "").unwrap().valid);

    let strict = JwtAnalyzer::new()
        .with_now(NOW)
        .with_validation(ValidationConfig::new().algorithms(AlgorithmPolicy::hmac_any()));

    let semantic = strict.analyze_semantic(&unsigned).unwrap();
    assert!(!semantic.valid);
    assert_eq!(
        strict.verify(&unsigned, "").unwrap_err().phase,
        Phase::Cryptographic
    );
    assert_eq!(
        strict
            .encode(
                &JsonValue::from(json!({"alg": "none", "typ": "JWT"})),
                &JsonValue::from(json!({"sub": "u1"})),
                None,
            )
            .unwrap_err()
            .phase,
        Phase::Semantic
    );
}

#[test]
fn test_records_capture_outcomes() {
    let analyzer = JwtAnalyzer::new().with_now(NOW);
    let token = issued(&analyzer, json!({"sub": "u1", "iat": NOW}));

    let verified = AnalysisRecord::verification(&token, &analyzer.verify(&token, "secret"), NOW)
        .unwrap();
    assert_eq!(verified.outcome, Some("valid"));
    assert_eq!(verified.algorithm.as_deref(), Some("HS256"));

    let forged = AnalysisRecord::verification(&token, &analyzer.verify(&token, "nope"), NOW)
        .unwrap();
    assert_eq!(forged.outcome, Some("invalid-signature"));

    let malformed = AnalysisRecord::verification("a.b", &analyzer.verify("a.b", "secret"), NOW)
        .unwrap();
    assert_eq!(malformed.outcome, Some("malformed"));
    assert_eq!(malformed.details["phase"], "lexical");

    let full = AnalysisRecord::new(
        token.as_str(),
        RecordKind::FullAnalysis,
        &analyzer.full_analysis(&token),
        NOW,
    )
    .unwrap();
    let json = serde_json::to_value(&full).unwrap();
    assert_eq!(json["kind"], "full-analysis");
    assert_eq!(json["details"]["semantic"]["valid"], true);
    assert!(json.get("outcome").is_none());
}

#[test]
fn test_failure_serializes_with_phase() {
    let failure = JwtAnalyzer::new().analyze_lexical("only.two").unwrap_err();
    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["phase"], "lexical");
    assert!(json["errors"].as_array().is_some_and(|d| !d.is_empty()));
}

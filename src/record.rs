//! Records describing one pipeline invocation
//!
//! A record is built after an operation returns and is not modified
//! afterwards. Storing records is left to the caller.

use serde::Serialize;

use crate::error::PhaseFailure;
use crate::verifier::VerifyResult;

/// Which operation produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Lexical,
    Syntactic,
    Semantic,
    Decode,
    Encode,
    Verify,
    FullAnalysis,
}

/// One operation's outcome, ready for an append-only store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    pub token: String,
    pub kind: RecordKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Verification label: `valid`, `expired`, `invalid-signature` or `malformed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<&'static str>,
    /// Seconds since Unix epoch
    pub timestamp: i64,
    pub details: serde_json::Value,
}

impl AnalysisRecord {
    /// Record a success or failure of any operation
    pub fn new<T: Serialize>(
        token: impl Into<String>,
        kind: RecordKind,
        outcome: &Result<T, PhaseFailure>,
        timestamp: i64,
    ) -> serde_json::Result<Self> {
        let details = match outcome {
            Ok(value) => serde_json::to_value(value)?,
            Err(failure) => serde_json::to_value(failure)?,
        };

        Ok(Self {
            token: token.into(),
            kind,
            algorithm: None,
            outcome: None,
            timestamp,
            details,
        })
    }

    /// Record a verification, labelled by its terminal state
    pub fn verification(
        token: impl Into<String>,
        outcome: &Result<VerifyResult, PhaseFailure>,
        timestamp: i64,
    ) -> serde_json::Result<Self> {
        let mut record = Self::new(token, RecordKind::Verify, outcome, timestamp)?;
        match outcome {
            Ok(result) => {
                record.algorithm = Some(result.algorithm.to_string());
                record.outcome = Some(result.outcome.label());
            }
            Err(_) => record.outcome = Some("malformed"),
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Phase;
    use crate::verifier::verify;
    use serde_json::json;

    #[test]
    fn test_record_failure() {
        let outcome: Result<(), PhaseFailure> =
            Err(PhaseFailure::single(Phase::Lexical, "bad token"));
        let record = AnalysisRecord::new("x.y", RecordKind::Lexical, &outcome, 42).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["kind"], "lexical");
        assert_eq!(json["timestamp"], 42);
        assert_eq!(json["details"]["phase"], "lexical");
        assert!(json.get("algorithm").is_none());
    }

    #[test]
    fn test_record_verification_labels() {
        let malformed = AnalysisRecord::verification("a.b", &verify("a.b", "k"), 1).unwrap();
        assert_eq!(malformed.outcome, Some("malformed"));
        assert_eq!(malformed.kind, RecordKind::Verify);

        // {"alg":"none"}.{"sub":"a"}.
        let token = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJhIn0.";
        let valid = AnalysisRecord::verification(token, &verify(token, ""), 1).unwrap();
        assert_eq!(valid.outcome, Some("valid"));
        assert_eq!(valid.algorithm.as_deref(), Some("none"));
        assert_eq!(valid.details["valid"], json!(true));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(
            serde_json::to_value(RecordKind::FullAnalysis).unwrap(),
            json!("full-analysis")
        );
    }
}

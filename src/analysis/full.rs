use serde::Serialize;

use crate::analysis::lexical::{analyze_lexical, LexicalAnalysis};
use crate::analysis::syntactic::{parse_lexical, SyntacticAnalysis};
use crate::claims::{ClaimsValidator, SemanticResult, ValidationConfig};
use crate::error::PhaseFailure;
use crate::utils::now_ts;

/// Results of all three phases for a token that got through each of them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullAnalysis {
    pub lexical: LexicalAnalysis,
    pub syntactic: SyntacticAnalysis,
    pub semantic: SemanticResult,
}

/// Run lexical, syntactic and semantic analysis against the system clock
pub fn full_analysis(
    token: &str,
    config: &ValidationConfig,
) -> Result<FullAnalysis, PhaseFailure> {
    full_analysis_at(token, config, now_ts())
}

/// [`full_analysis`] with an explicit current time
///
/// The syntactic phase parses the token streams produced by the lexical
/// phase, so each segment is tokenized once. A semantically invalid token is
/// still a complete analysis; only lexical and syntactic failures stop early.
pub fn full_analysis_at(
    token: &str,
    config: &ValidationConfig,
    now: i64,
) -> Result<FullAnalysis, PhaseFailure> {
    let lexical = analyze_lexical(token)?;

    let (header, payload) = parse_lexical(&lexical).inspect_err(|failure| {
        tracing::warn!(errors = failure.diagnostics.len(), "syntactic analysis failed");
    })?;

    let semantic = ClaimsValidator::validate(&header, &payload, config, now);

    Ok(FullAnalysis {
        lexical,
        syntactic: SyntacticAnalysis::new(header, payload),
        semantic,
    })
}

use serde::Serialize;

use crate::error::{Diagnostic, Diagnostics, Error, Phase, PhaseFailure};
use crate::json::{tokenize, JsonToken, TokenKind};
use crate::token::{SegmentKind, TokenParts};
use crate::utils::base64url;

/// The three raw segments, owned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segments {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

impl From<TokenParts<'_>> for Segments {
    fn from(parts: TokenParts<'_>) -> Self {
        Self {
            header: parts.header.to_string(),
            payload: parts.payload.to_string(),
            signature: parts.signature.to_string(),
        }
    }
}

/// Successful lexical analysis of a compact JWT
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LexicalAnalysis {
    pub message: String,
    pub parts: Segments,
    pub header_decoded: String,
    pub payload_decoded: String,
    pub header_tokens: Vec<JsonToken>,
    pub payload_tokens: Vec<JsonToken>,
}

/// Split, charset-check, decode and tokenize a JWT
///
/// Findings are collected across all three segments before the phase
/// reports. An empty signature is only accepted when the header's top-level
/// `alg` is `"none"`.
pub fn analyze_lexical(token: &str) -> Result<LexicalAnalysis, PhaseFailure> {
    tracing::debug!(len = token.len(), "lexical analysis started");

    let parts = TokenParts::split(token)
        .map_err(|e| fail(PhaseFailure::from_error(Phase::Lexical, &e)))?;

    let mut diagnostics = Diagnostics::new();
    parts.check_non_empty(Phase::Lexical, &mut diagnostics);
    parts.check_charset(Phase::Lexical, &mut diagnostics);
    diagnostics.finish(Phase::Lexical).map_err(fail)?;

    let mut diagnostics = Diagnostics::new();
    let header = decode_and_tokenize(SegmentKind::Header, parts.header, &mut diagnostics);
    let payload = decode_and_tokenize(SegmentKind::Payload, parts.payload, &mut diagnostics);

    if parts.signature.is_empty() {
        let unsigned = header
            .as_ref()
            .is_some_and(|(_, tokens)| declares_unsigned(tokens));
        if !unsigned {
            diagnostics.push(
                Diagnostic::new(
                    Phase::Lexical,
                    "Segment is empty (only alg \"none\" tokens may omit the signature)",
                )
                .in_segment(SegmentKind::Signature),
            );
        }
    }

    diagnostics.finish(Phase::Lexical).map_err(fail)?;

    // Both are present once no diagnostic was recorded.
    let (Some((header_decoded, header_tokens)), Some((payload_decoded, payload_tokens))) =
        (header, payload)
    else {
        return Err(PhaseFailure::from_error(
            Phase::Internal,
            &Error::Internal("lexical analysis lost a decoded segment".to_string()),
        ));
    };

    tracing::debug!(
        header_tokens = header_tokens.len(),
        payload_tokens = payload_tokens.len(),
        "lexical analysis passed"
    );

    Ok(LexicalAnalysis {
        message: "Lexical analysis passed".to_string(),
        parts: parts.into(),
        header_decoded,
        payload_decoded,
        header_tokens,
        payload_tokens,
    })
}

fn decode_and_tokenize(
    segment: SegmentKind,
    encoded: &str,
    diagnostics: &mut Diagnostics,
) -> Option<(String, Vec<JsonToken>)> {
    let decoded = match base64url::decode(encoded) {
        Ok(decoded) => decoded,
        Err(e) => {
            diagnostics.push(Diagnostic::from_error(Phase::Lexical, &e).in_segment(segment));
            return None;
        }
    };

    match tokenize(&decoded) {
        Ok(tokens) => Some((decoded, tokens)),
        Err(e) => {
            diagnostics.push(Diagnostic::from_error(Phase::Lexical, &e).in_segment(segment));
            None
        }
    }
}

/// Whether a top-level `"alg": "none"` member appears in the token stream
///
/// Only members of the outermost object count, and a later `alg` overrides an
/// earlier one, matching how the parsed object resolves duplicate keys.
fn declares_unsigned(tokens: &[JsonToken]) -> bool {
    let mut depth = 0usize;
    let mut alg: Option<&str> = None;

    for (i, token) in tokens.iter().enumerate() {
        match &token.kind {
            TokenKind::LeftBrace | TokenKind::LeftBracket => depth += 1,
            TokenKind::RightBrace | TokenKind::RightBracket => depth = depth.saturating_sub(1),
            TokenKind::String(key) if depth == 1 && key == "alg" => {
                if let [colon, value, ..] = &tokens[i + 1..] {
                    if colon.kind == TokenKind::Colon {
                        alg = match &value.kind {
                            TokenKind::String(s) => Some(s.as_str()),
                            _ => Some(""),
                        };
                    }
                }
            }
            _ => {}
        }
    }

    matches!(tokens.first().map(|t| &t.kind), Some(TokenKind::LeftBrace)) && alg == Some("none")
}

fn fail(failure: PhaseFailure) -> PhaseFailure {
    tracing::warn!(
        phase = %failure.phase,
        errors = failure.diagnostics.len(),
        "lexical analysis failed"
    );
    failure
}

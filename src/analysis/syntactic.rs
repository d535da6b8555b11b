use serde::Serialize;

use crate::analysis::lexical::LexicalAnalysis;
use crate::decoder::decode;
use crate::error::{Diagnostic, Diagnostics, Phase, PhaseFailure, Result};
use crate::json::{parse, parse_tokens, JsonValue};
use crate::token::SegmentKind;

/// Successful syntactic analysis: both segments parsed into value trees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntacticAnalysis {
    pub message: String,
    pub header: JsonValue,
    pub payload: JsonValue,
}

impl SyntacticAnalysis {
    pub(crate) fn new(header: JsonValue, payload: JsonValue) -> Self {
        Self {
            message: "Syntactic analysis passed".to_string(),
            header,
            payload,
        }
    }
}

/// Decode a JWT and parse its header and payload as strict JSON
///
/// Segment and Base64URL problems fail the lexical phase; grammar
/// violations fail the syntactic phase with the segment and offset named.
pub fn analyze_syntactic(token: &str) -> std::result::Result<SyntacticAnalysis, PhaseFailure> {
    let decoded = decode(token)?;
    tracing::debug!("syntactic analysis passed");
    Ok(SyntacticAnalysis::new(decoded.header, decoded.payload))
}

/// Parse decoded header and payload text, reporting failures of both
pub fn parse_segments(
    header: &str,
    payload: &str,
) -> std::result::Result<(JsonValue, JsonValue), PhaseFailure> {
    collect_parsed(parse(header), parse(payload))
}

/// Parse the token streams of a lexically valid token
///
/// Each segment is tokenized once, during lexical analysis.
pub(crate) fn parse_lexical(
    lexical: &LexicalAnalysis,
) -> std::result::Result<(JsonValue, JsonValue), PhaseFailure> {
    collect_parsed(
        parse_tokens(&lexical.header_tokens, lexical.header_decoded.len()),
        parse_tokens(&lexical.payload_tokens, lexical.payload_decoded.len()),
    )
}

/// Merge two segment parse results into one syntactic outcome
fn collect_parsed(
    header: Result<JsonValue>,
    payload: Result<JsonValue>,
) -> std::result::Result<(JsonValue, JsonValue), PhaseFailure> {
    let mut diagnostics = Diagnostics::new();
    let mut keep = |segment: SegmentKind, parsed: Result<JsonValue>| match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            diagnostics.push(Diagnostic::from_error(Phase::Syntactic, &e).in_segment(segment));
            None
        }
    };

    let header = keep(SegmentKind::Header, header);
    let payload = keep(SegmentKind::Payload, payload);

    match (header, payload) {
        (Some(header), Some(payload)) => Ok((header, payload)),
        _ => Err(PhaseFailure::new(Phase::Syntactic, diagnostics.into_vec())),
    }
}

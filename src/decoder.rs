//! Decoding a JWT into its header and payload trees
//!
//! Decoding never checks the signature; use [`crate::verifier`] when
//! authenticity matters.

use serde::Serialize;

use crate::analysis::{analyze_lexical, parse_lexical, PhaseSummary};
use crate::error::PhaseFailure;
use crate::json::JsonValue;

/// Decoded segment texts and the untouched signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegments {
    pub header_decoded: String,
    pub payload_decoded: String,
    pub signature: String,
}

/// Successful decode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeResult {
    pub message: String,
    pub phases: PhaseSummary,
    pub header: JsonValue,
    pub payload: JsonValue,
    pub raw: RawSegments,
}

/// Decode a JWT without verifying it
pub fn decode(token: &str) -> Result<DecodeResult, PhaseFailure> {
    tracing::debug!(len = token.len(), "decode started");
    decode_inner(token).inspect_err(|failure| {
        tracing::warn!(phase = %failure.phase, errors = failure.diagnostics.len(), "decode failed");
    })
}

fn decode_inner(token: &str) -> Result<DecodeResult, PhaseFailure> {
    let lexical = analyze_lexical(token)?;
    let (header, payload) = parse_lexical(&lexical)?;

    tracing::debug!("decode passed");

    Ok(DecodeResult {
        message: "Token decoded successfully".to_string(),
        phases: PhaseSummary::new(&["lexical", "decoding", "syntactic"]),
        header,
        payload,
        raw: RawSegments {
            header_decoded: lexical.header_decoded,
            payload_decoded: lexical.payload_decoded,
            signature: lexical.parts.signature,
        },
    })
}

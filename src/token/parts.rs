use serde::Serialize;

use crate::error::{Diagnostic, Diagnostics, Error, Phase, Result};
use crate::limits::MAX_TOKEN_LENGTH;
use crate::token::SegmentKind;
use crate::utils::base64url;

/// The three raw segments of a compact JWT, borrowed from the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenParts<'a> {
    pub header: &'a str,
    pub payload: &'a str,
    pub signature: &'a str,
}

impl<'a> TokenParts<'a> {
    /// Split a JWT on `.` into exactly three segments
    ///
    /// Only arity and size are checked here; empty segments are left to the
    /// caller since an empty signature is legal for `alg: none`.
    pub fn split(token: &'a str) -> Result<Self> {
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(Error::TokenTooLarge {
                size: token.len(),
                max: MAX_TOKEN_LENGTH,
            });
        }

        let mut segments = token.split('.');
        match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(header), Some(payload), Some(signature), None) => Ok(Self {
                header,
                payload,
                signature,
            }),
            _ => Err(Error::SegmentCount {
                found: token.split('.').count(),
            }),
        }
    }

    /// The bytes covered by the signature: `header.payload`
    pub fn signing_input(&self) -> String {
        format!("{}.{}", self.header, self.payload)
    }

    /// Segments paired with their kind, in token order
    pub fn segments(&self) -> [(SegmentKind, &'a str); 3] {
        [
            (SegmentKind::Header, self.header),
            (SegmentKind::Payload, self.payload),
            (SegmentKind::Signature, self.signature),
        ]
    }

    /// Record a diagnostic for every empty header or payload segment
    pub fn check_non_empty(&self, phase: Phase, diagnostics: &mut Diagnostics) {
        for (kind, segment) in &self.segments()[..2] {
            if segment.is_empty() {
                diagnostics.push(Diagnostic::new(phase, "Segment is empty").in_segment(*kind));
            }
        }
    }

    /// Record a diagnostic for every character outside the Base64URL alphabet
    pub fn check_charset(&self, phase: Phase, diagnostics: &mut Diagnostics) {
        for (kind, segment) in self.segments() {
            for (offset, found) in base64url::invalid_chars(segment) {
                diagnostics.push(
                    Diagnostic::new(
                        phase,
                        format!("Invalid Base64URL character {found:?} at position {offset}"),
                    )
                    .in_segment(kind)
                    .at(offset),
                );
            }
        }
    }
}

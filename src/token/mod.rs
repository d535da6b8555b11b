//! Compact-serialization segments of a JWT
//!
//! Every pipeline operation starts here: the raw string is size-checked and
//! split on `.` into exactly three borrowed segments.

mod parts;

pub use parts::TokenParts;

use serde::Serialize;

/// One of the three dot-separated segments of a compact JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    Header,
    Payload,
    Signature,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Header => "header",
            SegmentKind::Payload => "payload",
            SegmentKind::Signature => "signature",
        }
    }
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

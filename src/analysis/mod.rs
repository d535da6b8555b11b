//! The analysis pipeline, one module per phase
//!
//! Phases run in order (lexical, syntactic, semantic) and the first failing
//! phase stops the pipeline. Inside a phase every finding is collected
//! before the phase reports.

mod full;
mod lexical;
mod semantic;
mod syntactic;

pub use full::{full_analysis, full_analysis_at, FullAnalysis};
pub use lexical::{analyze_lexical, LexicalAnalysis, Segments};
pub use semantic::{analyze_semantic, analyze_semantic_at};
pub use syntactic::{analyze_syntactic, parse_segments, SyntacticAnalysis};

pub(crate) use syntactic::parse_lexical;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Names of the phases an operation passed, reported as `{"<phase>": "OK"}`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhaseSummary {
    passed: Vec<&'static str>,
}

impl PhaseSummary {
    pub fn new(passed: &[&'static str]) -> Self {
        Self {
            passed: passed.to_vec(),
        }
    }

    pub fn passed(&self, phase: &str) -> bool {
        self.passed.contains(&phase)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passed.iter().copied()
    }
}

impl Serialize for PhaseSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.passed.len()))?;
        for phase in &self.passed {
            map.serialize_entry(phase, "OK")?;
        }
        map.end()
    }
}

//! Errors and phase-tagged diagnostics
//!
//! Low-level building blocks (codec, tokenizer, parser, signer) fail with the
//! typed [`Error`] enum. The public pipeline operations never return those
//! directly: they collect [`Diagnostic`]s per phase and hand back a
//! [`PhaseFailure`] naming the phase that stopped the pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::token::SegmentKind;

/// jwtlens Errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Token too large: {size} bytes (maximum: {max} bytes)")]
    TokenTooLarge { size: usize, max: usize },

    // ============================================================================
    // Format Errors
    // ============================================================================
    #[error("Invalid JWT format: expected 3 segments separated by '.', found {found}")]
    SegmentCount { found: usize },

    #[error("Base64URL decoding failed: {0}")]
    Base64Decode(String),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    // ============================================================================
    // Algorithm Errors
    // ============================================================================
    #[error("Algorithm '{0}' is not supported")]
    UnsupportedAlgorithm(String),

    #[error("Algorithm '{found}' not allowed. Allowed: {}", .allowed.join(", "))]
    AlgorithmNotAllowed { found: String, allowed: Vec<String> },

    #[error("Invalid signing key: {0}")]
    InvalidKey(String),

    // ============================================================================
    // Input Errors
    // ============================================================================
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal invariant violated: {0}")]
    Internal(String),
}

/// Errors raised while splitting JSON text into tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("Unterminated string starting at position {pos}")]
    UnterminatedString { pos: usize },

    #[error("Invalid escape sequence '\\{escape}' at position {pos}")]
    InvalidEscape { escape: char, pos: usize },

    #[error("Invalid unicode escape at position {pos}: expected 4 hex digits")]
    InvalidUnicodeEscape { pos: usize },

    #[error("Unescaped control character U+{code:04X} in string at position {pos}")]
    UnescapedControlCharacter { code: u32, pos: usize },

    #[error("Invalid number '{lexeme}' at position {pos}")]
    InvalidNumber { lexeme: String, pos: usize },

    #[error("Unexpected character '{found}' at position {pos}")]
    UnexpectedCharacter { found: char, pos: usize },
}

impl LexError {
    /// Byte offset of the offending input
    pub fn pos(&self) -> usize {
        match self {
            LexError::UnterminatedString { pos }
            | LexError::InvalidEscape { pos, .. }
            | LexError::InvalidUnicodeEscape { pos }
            | LexError::UnescapedControlCharacter { pos, .. }
            | LexError::InvalidNumber { pos, .. }
            | LexError::UnexpectedCharacter { pos, .. } => *pos,
        }
    }
}

/// Grammar violations found by the recursive-descent parser
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("Unexpected token {found} at position {pos}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        pos: usize,
    },

    #[error("Unexpected end of input at position {pos}, expected {expected}")]
    UnexpectedEnd { expected: &'static str, pos: usize },

    #[error("Expected ':' after object key at position {pos}")]
    ExpectedColon { pos: usize },

    #[error("Expected ',' or '{close}' at position {pos}")]
    ExpectedCommaOrClose { close: char, pos: usize },

    #[error("Expected string key at position {pos}")]
    ExpectedKey { pos: usize },

    #[error("Unexpected trailing input at position {pos}")]
    UnexpectedTrailingInput { pos: usize },

    #[error("Nesting deeper than {max} levels at position {pos}")]
    NestingTooDeep { max: usize, pos: usize },
}

impl SyntaxError {
    /// Byte offset where the grammar was violated
    pub fn pos(&self) -> usize {
        match self {
            SyntaxError::UnexpectedToken { pos, .. }
            | SyntaxError::UnexpectedEnd { pos, .. }
            | SyntaxError::ExpectedColon { pos }
            | SyntaxError::ExpectedCommaOrClose { pos, .. }
            | SyntaxError::ExpectedKey { pos }
            | SyntaxError::UnexpectedTrailingInput { pos }
            | SyntaxError::NestingTooDeep { pos, .. } => *pos,
        }
    }
}

impl Error {
    /// Byte offset carried by tokenizer and parser errors
    pub fn pos(&self) -> Option<usize> {
        match self {
            Error::Lex(e) => Some(e.pos()),
            Error::Syntax(e) => Some(e.pos()),
            _ => None,
        }
    }
}

/// Result type alias for jwtlens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage a diagnostic originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Missing or malformed top-level arguments
    Input,
    Lexical,
    Syntactic,
    Semantic,
    Cryptographic,
    /// An invariant of this crate did not hold; never a caller mistake
    Internal,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Input => "input",
            Phase::Lexical => "lexical",
            Phase::Syntactic => "syntactic",
            Phase::Semantic => "semantic",
            Phase::Cryptographic => "cryptographic",
            Phase::Internal => "internal",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding, tagged with the phase that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<SegmentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(phase: Phase, message: impl Into<String>) -> Self {
        Self {
            phase,
            segment: None,
            offset: None,
            message: message.into(),
        }
    }

    /// Attach the token segment the finding belongs to
    pub fn in_segment(mut self, segment: SegmentKind) -> Self {
        self.segment = Some(segment);
        self
    }

    /// Attach a byte offset within the decoded segment text
    pub fn at(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Build a diagnostic from a typed error, keeping its offset
    pub fn from_error(phase: Phase, error: &Error) -> Self {
        let diagnostic = Self::new(phase, error.to_string());
        match error.pos() {
            Some(pos) => diagnostic.at(pos),
            None => diagnostic,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.segment {
            Some(segment) => write!(f, "{segment}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Accumulates every finding of one phase before the phase reports
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Findings of a single phase
    pub fn for_phase(&self, phase: Phase) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.phase == phase)
    }

    /// Rendered messages, in insertion order
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }

    /// `Ok(())` when nothing was collected, otherwise a failure for `phase`
    pub fn finish(self, phase: Phase) -> std::result::Result<(), PhaseFailure> {
        if self.items.is_empty() {
            Ok(())
        } else {
            Err(PhaseFailure::new(phase, self.items))
        }
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

/// The phase-tagged failure every public operation returns
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{phase} phase failed: {}", render(.diagnostics))]
pub struct PhaseFailure {
    pub phase: Phase,
    #[serde(rename = "errors")]
    pub diagnostics: Vec<Diagnostic>,
}

fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl PhaseFailure {
    pub fn new(phase: Phase, diagnostics: Vec<Diagnostic>) -> Self {
        Self { phase, diagnostics }
    }

    /// Failure with a single message
    pub fn single(phase: Phase, message: impl Into<String>) -> Self {
        Self::new(phase, vec![Diagnostic::new(phase, message)])
    }

    /// Wrap a typed error as the only diagnostic of `phase`
    pub fn from_error(phase: Phase, error: &Error) -> Self {
        Self::new(phase, vec![Diagnostic::from_error(phase, error)])
    }

    /// Rendered messages, in the order they were found
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    /// True for invariant violations that should be alarmed on, not shown
    pub fn is_internal(&self) -> bool {
        self.phase == Phase::Internal
    }
}

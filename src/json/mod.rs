//! Hand-written JSON front end: tokenizer, recursive-descent parser and
//! the value tree they produce.

pub mod parser;
pub mod token;
pub mod tokenizer;
pub mod value;

pub use parser::{parse, parse_tokens, Parser};
pub use token::{JsonToken, TokenKind};
pub use tokenizer::{tokenize, Tokenizer};
pub use value::{JsonObject, JsonValue, TypeMismatch, ValueType};

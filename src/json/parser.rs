//! Recursive-descent JSON parser
//!
//! ```text
//! value  := object | array | string | number | boolean | null
//! object := '{' (string ':' value (',' string ':' value)*)? '}'
//! array  := '[' (value (',' value)*)? ']'
//! ```
//!
//! The parser pulls tokens lazily, so the first problem in reading order is
//! the one reported, whether it is lexical or grammatical. Strict JSON only:
//! no comments, trailing commas or single quotes.

use crate::error::{Error, LexError, Result, SyntaxError};
use crate::json::token::{JsonToken, TokenKind};
use crate::json::tokenizer::Tokenizer;
use crate::json::value::{JsonObject, JsonValue};
use crate::limits::MAX_NESTING_DEPTH;

/// Parser over any stream of tokens
pub struct Parser<I>
where
    I: Iterator<Item = std::result::Result<JsonToken, LexError>>,
{
    tokens: I,
    peeked: Option<JsonToken>,
    end: usize,
    depth: usize,
}

impl<'a> Parser<Tokenizer<'a>> {
    /// Parse directly from JSON text
    pub fn from_text(input: &'a str) -> Self {
        Parser::new(Tokenizer::new(input), input.len())
    }
}

impl<I> Parser<I>
where
    I: Iterator<Item = std::result::Result<JsonToken, LexError>>,
{
    /// `end` is the offset reported when input runs out
    pub fn new(tokens: I, end: usize) -> Self {
        Self {
            tokens,
            peeked: None,
            end,
            depth: 0,
        }
    }

    /// Parse exactly one value and require the stream to end after it
    pub fn parse_document(mut self) -> Result<JsonValue> {
        let value = self.parse_value()?;
        match self.tokens_next() {
            None => Ok(value),
            Some(Ok(token)) => Err(SyntaxError::UnexpectedTrailingInput { pos: token.pos }.into()),
            Some(Err(e)) => Err(SyntaxError::UnexpectedTrailingInput { pos: e.pos() }.into()),
        }
    }

    fn tokens_next(&mut self) -> Option<std::result::Result<JsonToken, LexError>> {
        match self.peeked.take() {
            Some(token) => Some(Ok(token)),
            None => self.tokens.next(),
        }
    }

    fn advance(&mut self) -> Result<Option<JsonToken>> {
        self.tokens_next().transpose().map_err(Error::from)
    }

    fn enter(&mut self, pos: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(SyntaxError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
                pos,
            }
            .into());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self) -> Result<JsonValue> {
        let token = self.advance()?.ok_or(SyntaxError::UnexpectedEnd {
            expected: "value",
            pos: self.end,
        })?;

        match token.kind {
            TokenKind::LeftBrace => self.parse_object(token.pos),
            TokenKind::LeftBracket => self.parse_array(token.pos),
            TokenKind::String(s) => Ok(JsonValue::String(s)),
            TokenKind::Number(n) => Ok(JsonValue::Number(n)),
            TokenKind::Boolean(b) => Ok(JsonValue::Bool(b)),
            TokenKind::Null => Ok(JsonValue::Null),
            other => Err(SyntaxError::UnexpectedToken {
                found: other.describe(),
                expected: "value",
                pos: token.pos,
            }
            .into()),
        }
    }

    fn expect_key(&mut self, first: bool) -> Result<Option<String>> {
        match self.advance()? {
            Some(JsonToken {
                kind: TokenKind::String(key),
                ..
            }) => Ok(Some(key)),
            Some(JsonToken {
                kind: TokenKind::RightBrace,
                ..
            }) if first => Ok(None),
            Some(token) => Err(SyntaxError::ExpectedKey { pos: token.pos }.into()),
            None => Err(SyntaxError::UnexpectedEnd {
                expected: if first { "string key or '}'" } else { "string key" },
                pos: self.end,
            }
            .into()),
        }
    }

    fn parse_object(&mut self, open: usize) -> Result<JsonValue> {
        self.enter(open)?;
        let mut object = JsonObject::new();

        let Some(mut key) = self.expect_key(true)? else {
            self.leave();
            return Ok(JsonValue::Object(object));
        };

        loop {
            match self.advance()? {
                Some(JsonToken {
                    kind: TokenKind::Colon,
                    ..
                }) => {}
                Some(token) => return Err(SyntaxError::ExpectedColon { pos: token.pos }.into()),
                None => {
                    return Err(SyntaxError::UnexpectedEnd {
                        expected: "':'",
                        pos: self.end,
                    }
                    .into())
                }
            }

            let value = self.parse_value()?;
            object.insert(key, value);

            match self.advance()? {
                Some(JsonToken {
                    kind: TokenKind::Comma,
                    ..
                }) => {
                    key = self
                        .expect_key(false)?
                        .ok_or(SyntaxError::ExpectedKey { pos: self.end })?;
                }
                Some(JsonToken {
                    kind: TokenKind::RightBrace,
                    ..
                }) => break,
                Some(token) => {
                    return Err(SyntaxError::ExpectedCommaOrClose {
                        close: '}',
                        pos: token.pos,
                    }
                    .into())
                }
                None => {
                    return Err(SyntaxError::UnexpectedEnd {
                        expected: "',' or '}'",
                        pos: self.end,
                    }
                    .into())
                }
            }
        }

        self.leave();
        Ok(JsonValue::Object(object))
    }

    fn parse_array(&mut self, open: usize) -> Result<JsonValue> {
        self.enter(open)?;
        let mut items = Vec::new();

        let empty = matches!(
            self.peek()?,
            Some(JsonToken {
                kind: TokenKind::RightBracket,
                ..
            })
        );
        if empty {
            self.peeked = None;
            self.leave();
            return Ok(JsonValue::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            match self.advance()? {
                Some(JsonToken {
                    kind: TokenKind::Comma,
                    ..
                }) => {}
                Some(JsonToken {
                    kind: TokenKind::RightBracket,
                    ..
                }) => break,
                Some(token) => {
                    return Err(SyntaxError::ExpectedCommaOrClose {
                        close: ']',
                        pos: token.pos,
                    }
                    .into())
                }
                None => {
                    return Err(SyntaxError::UnexpectedEnd {
                        expected: "',' or ']'",
                        pos: self.end,
                    }
                    .into())
                }
            }
        }

        self.leave();
        Ok(JsonValue::Array(items))
    }

    fn peek(&mut self) -> Result<Option<&JsonToken>> {
        if self.peeked.is_none() {
            self.peeked = self.tokens.next().transpose()?;
        }
        Ok(self.peeked.as_ref())
    }
}

/// Parse JSON text into a value tree
pub fn parse(input: &str) -> Result<JsonValue> {
    Parser::from_text(input).parse_document()
}

/// Parse an already tokenized stream; `end` is the length of the source text
pub fn parse_tokens(tokens: &[JsonToken], end: usize) -> Result<JsonValue> {
    Parser::new(tokens.iter().cloned().map(Ok::<JsonToken, LexError>), end).parse_document()
}

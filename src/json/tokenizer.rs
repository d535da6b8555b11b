//! JSON tokenizer
//!
//! Turns JSON text into a flat stream of positioned [`JsonToken`]s. The
//! tokenizer knows nothing about nesting: `}}}` lexes fine and is rejected
//! later by the parser. Offsets are byte offsets into the input.

use crate::error::{LexError, Result};
use crate::json::token::{JsonToken, TokenKind};

const REPLACEMENT: char = '\u{FFFD}';

/// Lazily yields tokens; stops for good after the first error
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            failed: false,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek_byte() {
            self.pos += 1;
        }
    }

    fn single(&mut self, kind: TokenKind) -> JsonToken {
        let token = JsonToken::new(kind, self.pos);
        self.pos += 1;
        token
    }

    fn lex_token(&mut self, byte: u8) -> std::result::Result<JsonToken, LexError> {
        match byte {
            b'{' => Ok(self.single(TokenKind::LeftBrace)),
            b'}' => Ok(self.single(TokenKind::RightBrace)),
            b'[' => Ok(self.single(TokenKind::LeftBracket)),
            b']' => Ok(self.single(TokenKind::RightBracket)),
            b':' => Ok(self.single(TokenKind::Colon)),
            b',' => Ok(self.single(TokenKind::Comma)),
            b'"' => self.lex_string(),
            b'-' | b'0'..=b'9' => self.lex_number(),
            b't' => self.lex_literal("true", TokenKind::Boolean(true)),
            b'f' => self.lex_literal("false", TokenKind::Boolean(false)),
            b'n' => self.lex_literal("null", TokenKind::Null),
            _ => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> LexError {
        LexError::UnexpectedCharacter {
            found: self.peek_char().unwrap_or(REPLACEMENT),
            pos: self.pos,
        }
    }

    fn lex_literal(
        &mut self,
        text: &'static str,
        kind: TokenKind,
    ) -> std::result::Result<JsonToken, LexError> {
        if !self.input[self.pos..].starts_with(text) {
            return Err(self.unexpected());
        }
        let token = JsonToken::new(kind, self.pos);
        self.pos += text.len();
        Ok(token)
    }

    fn lex_string(&mut self) -> std::result::Result<JsonToken, LexError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let c = self
                .peek_char()
                .ok_or(LexError::UnterminatedString { pos: start })?;

            match c {
                '"' => {
                    self.pos += 1;
                    return Ok(JsonToken::new(TokenKind::String(value), start));
                }
                '\\' => {
                    let escape_pos = self.pos;
                    self.pos += 1;
                    let escape = self
                        .peek_char()
                        .ok_or(LexError::UnterminatedString { pos: start })?;
                    self.pos += escape.len_utf8();
                    match escape {
                        '"' => value.push('"'),
                        '\\' => value.push('\\'),
                        '/' => value.push('/'),
                        'b' => value.push('\u{0008}'),
                        'f' => value.push('\u{000C}'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        'u' => value.push(self.lex_unicode_escape(escape_pos)?),
                        other => {
                            return Err(LexError::InvalidEscape {
                                escape: other,
                                pos: escape_pos,
                            })
                        }
                    }
                }
                c if (c as u32) < 0x20 => {
                    return Err(LexError::UnescapedControlCharacter {
                        code: c as u32,
                        pos: self.pos,
                    });
                }
                c => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
    }

    /// Decode the code unit(s) after `\u`, pairing UTF-16 surrogates
    ///
    /// Unpaired surrogates cannot live in a Rust string and become U+FFFD.
    fn lex_unicode_escape(&mut self, escape_pos: usize) -> std::result::Result<char, LexError> {
        let unit = self.read_hex4(escape_pos)?;

        if (0xD800..=0xDBFF).contains(&unit) && self.input[self.pos..].starts_with("\\u") {
            let low_pos = self.pos;
            self.pos += 2;
            let low = self.read_hex4(low_pos)?;
            if (0xDC00..=0xDFFF).contains(&low) {
                let combined = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(combined).unwrap_or(REPLACEMENT));
            }
            // High surrogate followed by an ordinary escape: re-read the second one
            self.pos = low_pos;
            return Ok(REPLACEMENT);
        }

        Ok(char::from_u32(unit).unwrap_or(REPLACEMENT))
    }

    fn read_hex4(&mut self, escape_pos: usize) -> std::result::Result<u32, LexError> {
        let digits = self
            .input
            .as_bytes()
            .get(self.pos..self.pos + 4)
            .ok_or(LexError::InvalidUnicodeEscape { pos: escape_pos })?;

        let mut unit = 0u32;
        for &digit in digits {
            let nibble = (digit as char)
                .to_digit(16)
                .ok_or(LexError::InvalidUnicodeEscape { pos: escape_pos })?;
            unit = unit * 16 + nibble;
        }
        self.pos += 4;
        Ok(unit)
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while let Some(b'0'..=b'9') = self.peek_byte() {
            self.pos += 1;
        }
        self.pos - start
    }

    fn invalid_number(&mut self, start: usize) -> LexError {
        // Swallow the rest of the malformed lexeme so the message shows all of it
        while let Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-') = self.peek_byte() {
            self.pos += 1;
        }
        LexError::InvalidNumber {
            lexeme: self.input[start..self.pos].to_string(),
            pos: start,
        }
    }

    /// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    fn lex_number(&mut self) -> std::result::Result<JsonToken, LexError> {
        let start = self.pos;

        if self.peek_byte() == Some(b'-') {
            self.pos += 1;
        }

        match self.peek_byte() {
            Some(b'0') => {
                self.pos += 1;
                if let Some(b'0'..=b'9') = self.peek_byte() {
                    return Err(self.invalid_number(start));
                }
            }
            Some(b'1'..=b'9') => {
                self.skip_digits();
            }
            _ => return Err(self.invalid_number(start)),
        }

        if self.peek_byte() == Some(b'.') {
            self.pos += 1;
            if self.skip_digits() == 0 {
                return Err(self.invalid_number(start));
            }
        }

        if let Some(b'e' | b'E') = self.peek_byte() {
            self.pos += 1;
            if let Some(b'+' | b'-') = self.peek_byte() {
                self.pos += 1;
            }
            if self.skip_digits() == 0 {
                return Err(self.invalid_number(start));
            }
        }

        let lexeme = &self.input[start..self.pos];
        let value = lexeme
            .parse::<f64>()
            .map_err(|_| LexError::InvalidNumber {
                lexeme: lexeme.to_string(),
                pos: start,
            })?;

        Ok(JsonToken::new(TokenKind::Number(value), start))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = std::result::Result<JsonToken, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_whitespace();
        let byte = self.peek_byte()?;
        let result = self.lex_token(byte);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Tokenize a whole JSON text, failing on the first lexical error
pub fn tokenize(input: &str) -> Result<Vec<JsonToken>> {
    Tokenizer::new(input)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Into::into)
}

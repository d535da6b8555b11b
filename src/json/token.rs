use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Kind and payload of a lexical JSON token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,
    /// String with escape sequences already resolved
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl TokenKind {
    /// Stable tag used when tokens are shown to callers
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenKind::LeftBrace => "LBRACE",
            TokenKind::RightBrace => "RBRACE",
            TokenKind::LeftBracket => "LBRACKET",
            TokenKind::RightBracket => "RBRACKET",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::String(_) => "STRING",
            TokenKind::Number(_) => "NUMBER",
            TokenKind::Boolean(_) => "BOOLEAN",
            TokenKind::Null => "NULL",
        }
    }

    /// Short human-readable rendering for error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::LeftBrace => "'{'".to_string(),
            TokenKind::RightBrace => "'}'".to_string(),
            TokenKind::LeftBracket => "'['".to_string(),
            TokenKind::RightBracket => "']'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::String(s) => format!("string {s:?}"),
            TokenKind::Number(n) => format!("number {n}"),
            TokenKind::Boolean(b) => format!("'{b}'"),
            TokenKind::Null => "'null'".to_string(),
        }
    }
}

/// A JSON token and the byte offset where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct JsonToken {
    pub kind: TokenKind,
    pub pos: usize,
}

impl JsonToken {
    pub fn new(kind: TokenKind, pos: usize) -> Self {
        Self { kind, pos }
    }
}

// Serialized as `{"type": .., "value": .., "pos": ..}`; structural tokens carry no value.
impl Serialize for JsonToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_value = matches!(
            self.kind,
            TokenKind::String(_) | TokenKind::Number(_) | TokenKind::Boolean(_)
        );
        let mut state = serializer.serialize_struct("JsonToken", if has_value { 3 } else { 2 })?;
        state.serialize_field("type", self.kind.type_name())?;
        match &self.kind {
            TokenKind::String(s) => state.serialize_field("value", s)?,
            TokenKind::Number(n) => state.serialize_field("value", n)?,
            TokenKind::Boolean(b) => state.serialize_field("value", b)?,
            _ => {}
        }
        state.serialize_field("pos", &self.pos)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_shape() {
        let token = JsonToken::new(TokenKind::String("alg".into()), 1);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json, serde_json::json!({"type": "STRING", "value": "alg", "pos": 1}));

        let token = JsonToken::new(TokenKind::Colon, 6);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json, serde_json::json!({"type": "COLON", "pos": 6}));
    }

    #[test]
    fn test_describe() {
        assert_eq!(TokenKind::RightBrace.describe(), "'}'");
        assert_eq!(TokenKind::String("x".into()).describe(), "string \"x\"");
        assert_eq!(TokenKind::Boolean(true).describe(), "'true'");
    }
}

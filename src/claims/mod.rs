//! Registered claim names and the symbol table built from a payload

mod validator;

pub use validator::{ClaimsValidator, ExpiryPolicy, SemanticResult, ValidationConfig};

use serde::Serialize;

use crate::json::{JsonObject, JsonValue, ValueType};

/// Expiration Time, seconds since Unix epoch
pub const EXP: &str = "exp";
/// Issued At, seconds since Unix epoch
pub const IAT: &str = "iat";
/// Issuer
pub const ISS: &str = "iss";
/// Audience, a string or an array of strings
pub const AUD: &str = "aud";
/// Subject
pub const SUB: &str = "sub";

/// One row of the symbol table: a top-level claim with its runtime type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ValueType,
    pub value: JsonValue,
}

/// One entry per top-level claim, in payload order
pub fn symbol_table(payload: &JsonObject) -> Vec<SymbolEntry> {
    payload
        .iter()
        .map(|(name, value)| SymbolEntry {
            name: name.to_string(),
            ty: value.value_type(),
            value: value.clone(),
        })
        .collect()
}

/// A claim's value when it is present and numeric
pub fn numeric_claim(payload: &JsonObject, name: &str) -> Option<f64> {
    payload.get(name).and_then(JsonValue::as_f64)
}

/// True when `exp` is present, numeric and not after `now`
///
/// The boundary is inclusive: a token whose `exp` equals the current second
/// is already expired.
pub fn is_expired(payload: &JsonObject, now: i64) -> bool {
    numeric_claim(payload, EXP).is_some_and(|exp| exp <= now as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> JsonObject {
        match JsonValue::from(value) {
            JsonValue::Object(object) => object,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_symbol_table_types() {
        let payload = object(json!({
            "sub": "user",
            "exp": 10,
            "admin": true,
            "roles": ["a"],
            "meta": {"k": 1},
            "nothing": null
        }));
        let table = symbol_table(&payload);
        let types: Vec<_> = table.iter().map(|e| (e.name.as_str(), e.ty)).collect();
        assert_eq!(
            types,
            vec![
                ("sub", ValueType::String),
                ("exp", ValueType::Number),
                ("admin", ValueType::Boolean),
                ("roles", ValueType::Array),
                ("meta", ValueType::Object),
                ("nothing", ValueType::Null),
            ]
        );
    }

    #[test]
    fn test_symbol_entry_serialization() {
        let payload = object(json!({"iat": 100}));
        let json = serde_json::to_value(symbol_table(&payload)).unwrap();
        assert_eq!(json, json!([{"name": "iat", "type": "number", "value": 100}]));
    }

    #[test]
    fn test_expiry_boundary() {
        let payload = object(json!({"exp": 1000}));
        assert!(is_expired(&payload, 1001));
        assert!(is_expired(&payload, 1000));
        assert!(!is_expired(&payload, 999));

        let payload = object(json!({"exp": "1000"}));
        assert!(!is_expired(&payload, 5000));
        assert!(!is_expired(&object(json!({})), 5000));
    }
}

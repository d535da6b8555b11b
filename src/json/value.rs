//! Parsed JSON values
//!
//! Objects keep their keys in insertion order; inserting an existing key
//! replaces the value in place, so the last write wins without moving the
//! key. Serialization is compact and mirrors `JSON.stringify`.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt::Write as _;
use thiserror::Error;

/// Runtime shape of a [`JsonValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed accessor was used on a value of a different shape
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expected {expected}, found {found}")]
pub struct TypeMismatch {
    pub expected: ValueType,
    pub found: ValueType,
}

/// Insertion-ordered string-keyed map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonObject {
    entries: Vec<(String, JsonValue)>,
}

impl JsonObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the previous value for `key`
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for JsonObject {
    fn from_iter<I: IntoIterator<Item = (K, JsonValue)>>(iter: I) -> Self {
        let mut object = JsonObject::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

/// A JSON value tree
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<JsonValue>),
    Object(JsonObject),
}

impl JsonValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            JsonValue::Null => ValueType::Null,
            JsonValue::Bool(_) => ValueType::Boolean,
            JsonValue::Number(_) => ValueType::Number,
            JsonValue::String(_) => ValueType::String,
            JsonValue::Array(_) => ValueType::Array,
            JsonValue::Object(_) => ValueType::Object,
        }
    }

    fn mismatch(&self, expected: ValueType) -> TypeMismatch {
        TypeMismatch {
            expected,
            found: self.value_type(),
        }
    }

    pub fn try_object(&self) -> Result<&JsonObject, TypeMismatch> {
        match self {
            JsonValue::Object(object) => Ok(object),
            other => Err(other.mismatch(ValueType::Object)),
        }
    }

    pub fn try_array(&self) -> Result<&[JsonValue], TypeMismatch> {
        match self {
            JsonValue::Array(items) => Ok(items),
            other => Err(other.mismatch(ValueType::Array)),
        }
    }

    pub fn try_str(&self) -> Result<&str, TypeMismatch> {
        match self {
            JsonValue::String(s) => Ok(s),
            other => Err(other.mismatch(ValueType::String)),
        }
    }

    pub fn try_number(&self) -> Result<f64, TypeMismatch> {
        match self {
            JsonValue::Number(n) => Ok(*n),
            other => Err(other.mismatch(ValueType::Number)),
        }
    }

    pub fn try_bool(&self) -> Result<bool, TypeMismatch> {
        match self {
            JsonValue::Bool(b) => Ok(*b),
            other => Err(other.mismatch(ValueType::Boolean)),
        }
    }

    pub fn as_object(&self) -> Option<&JsonObject> {
        self.try_object().ok()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.try_str().ok()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.try_number().ok()
    }

    /// Member lookup; `None` for missing keys and for non-objects
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|object| object.get(key))
    }

    /// Number of nested arrays and objects; scalars have depth 0
    pub fn depth(&self) -> usize {
        match self {
            JsonValue::Array(items) => 1 + items.iter().map(JsonValue::depth).max().unwrap_or(0),
            JsonValue::Object(object) => {
                1 + object.iter().map(|(_, value)| value.depth()).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// Whether every number in the tree is finite and so survives serialization
    pub fn is_finite(&self) -> bool {
        match self {
            JsonValue::Number(n) => n.is_finite(),
            JsonValue::Array(items) => items.iter().all(JsonValue::is_finite),
            JsonValue::Object(object) => object.iter().all(|(_, value)| value.is_finite()),
            _ => true,
        }
    }

    /// Compact JSON text
    pub fn to_json_string(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self);
        out
    }
}

impl std::fmt::Display for JsonValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

fn write_value(out: &mut String, value: &JsonValue) {
    match value {
        JsonValue::Null => out.push_str("null"),
        JsonValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        JsonValue::Number(n) => out.push_str(&format_number(*n)),
        JsonValue::String(s) => write_string(out, s),
        JsonValue::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        JsonValue::Object(object) => {
            out.push('{');
            for (i, (key, item)) in object.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Shortest round-trip form, as `JSON.stringify` prints numbers
///
/// Integral values print without a fraction, magnitudes from 1e21 up or
/// below 1e-6 use exponent notation, and NaN and infinities print as `null`.
pub(crate) fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{n:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    if n.fract() == 0.0 {
        return format!("{n:.0}");
    }
    n.to_string()
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(b) => serializer.serialize_bool(*b),
            JsonValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serializer.serialize_i64(*n as i64)
            }
            JsonValue::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            JsonValue::Number(_) => serializer.serialize_unit(),
            JsonValue::String(s) => serializer.serialize_str(s),
            JsonValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            JsonValue::Object(object) => {
                let mut map = serializer.serialize_map(Some(object.len()))?;
                for (key, item) in object.iter() {
                    map.serialize_entry(key, item)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(JsonValue::Null, JsonValue::Number),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::Array(items.into_iter().map(JsonValue::from).collect())
            }
            serde_json::Value::Object(map) => JsonValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, JsonValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&JsonValue> for serde_json::Value {
    fn from(value: &JsonValue) -> Self {
        serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl From<f64> for JsonValue {
    fn from(n: f64) -> Self {
        JsonValue::Number(n)
    }
}

impl From<i64> for JsonValue {
    fn from(n: i64) -> Self {
        JsonValue::Number(n as f64)
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<JsonObject> for JsonValue {
    fn from(object: JsonObject) -> Self {
        JsonValue::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut object = JsonObject::new();
        object.insert("a", 1i64.into());
        object.insert("b", 2i64.into());
        let previous = object.insert("a", 3i64.into());

        assert_eq!(previous, Some(JsonValue::Number(1.0)));
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(object.get("a"), Some(&JsonValue::Number(3.0)));
    }

    #[test]
    fn test_typed_accessors() {
        let value = JsonValue::from("HS256");
        assert_eq!(value.try_str(), Ok("HS256"));
        assert_eq!(
            value.try_number(),
            Err(TypeMismatch {
                expected: ValueType::Number,
                found: ValueType::String
            })
        );
        assert_eq!(
            JsonValue::Null.try_object().unwrap_err().to_string(),
            "expected object, found null"
        );
    }

    #[test]
    fn test_compact_serialization() {
        let value = JsonValue::from(json!({
            "alg": "HS256",
            "typ": "JWT",
        }));
        assert_eq!(value.to_json_string(), r#"{"alg":"HS256","typ":"JWT"}"#);

        let value = JsonValue::from(json!({
            "sub": "1234567890",
            "name": "John Doe",
            "iat": 1516239022,
            "admin": true,
            "roles": ["a", null],
            "ratio": 0.5,
        }));
        assert_eq!(
            value.to_json_string(),
            r#"{"sub":"1234567890","name":"John Doe","iat":1516239022,"admin":true,"roles":["a",null],"ratio":0.5}"#
        );
    }

    #[test]
    fn test_depth_and_finiteness() {
        assert_eq!(JsonValue::from(json!(1)).depth(), 0);
        assert_eq!(JsonValue::from(json!([])).depth(), 1);
        assert_eq!(JsonValue::from(json!({"a": [1, {"b": []}], "c": 2})).depth(), 4);

        let mut object = JsonObject::new();
        object.insert("exp", JsonValue::Number(f64::INFINITY));
        let value = JsonValue::Array(vec![JsonValue::from(1i64), JsonValue::Object(object)]);
        assert!(!value.is_finite());
        assert!(JsonValue::from(json!({"n": [1.5, -2]})).is_finite());
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.7976931348623157e308), "1.7976931348623157e+308");
        assert_eq!(format_number(-1e-300), "-1e-300");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(f64::NAN), "null");
        assert_eq!(format_number(f64::INFINITY), "null");
    }

    #[test]
    fn test_string_escaping() {
        let value = JsonValue::from("a\"b\\c\nd\u{1}/é");
        assert_eq!(value.to_json_string(), r#""a\"b\\c\nd\u0001/é""#);
    }

    #[test]
    fn test_serde_round_trip_keeps_order() {
        let value = JsonValue::from(json!({"z": 1, "a": [true, "x"]}));
        let back = serde_json::Value::from(&value);
        assert_eq!(serde_json::to_string(&back).unwrap(), r#"{"z":1,"a":[true,"x"]}"#);
    }
}

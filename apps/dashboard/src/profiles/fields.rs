//! Lenient field access over loosely-typed backend JSON.
//!
//! Every accessor tolerates a missing key, a `null`, or a value of the wrong type by
//! returning `None` (or an empty slice). Normalizers apply defaults once on top.

use serde_json::{Map, Value};

pub trait Fields {
    /// Non-empty string field. Numbers are not coerced.
    fn str_field(&self, key: &str) -> Option<&str>;
    /// String or number field rendered as text.
    fn text_field(&self, key: &str) -> Option<String>;
    /// Integer field; accepts floats (truncated) and numeric strings.
    fn i64_field(&self, key: &str) -> Option<i64>;
    /// Float field; accepts integers and numeric strings.
    fn f64_field(&self, key: &str) -> Option<f64>;
    /// Array field, or an empty slice.
    fn array_field(&self, key: &str) -> &[Value];
    fn object_field(&self, key: &str) -> Option<&Map<String, Value>>;
    /// Nested value when it is a JSON object.
    fn nested(&self, key: &str) -> Option<&Value>;
    /// Array of non-empty strings (non-string entries are skipped).
    fn string_list(&self, key: &str) -> Vec<String>;
}

impl Fields for Value {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn text_field(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_text)
    }

    fn i64_field(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(value_i64)
    }

    fn f64_field(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(value_f64)
    }

    fn array_field(&self, key: &str) -> &[Value] {
        self.get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn object_field(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    fn nested(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| v.is_object())
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        self.array_field(key)
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Text of a scalar value. Empty strings, `null`, arrays and objects yield `None`.
pub fn value_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn value_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    }
}

pub fn value_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrong_types_are_tolerated() {
        let v = json!({"a": [1], "b": {"x": 1}, "c": "  ", "d": null});
        assert_eq!(v.str_field("a"), None);
        assert_eq!(v.i64_field("b"), None);
        assert_eq!(v.str_field("c"), None);
        assert_eq!(v.text_field("d"), None);
        assert!(v.array_field("b").is_empty());
        assert!(v.object_field("a").is_none());
    }

    #[test]
    fn test_numeric_coercions() {
        let v = json!({"i": 5, "f": 5.9, "s": "12", "sf": "3.5"});
        assert_eq!(v.i64_field("i"), Some(5));
        assert_eq!(v.i64_field("f"), Some(5));
        assert_eq!(v.i64_field("s"), Some(12));
        assert_eq!(v.f64_field("sf"), Some(3.5));
        assert_eq!(v.text_field("i").as_deref(), Some("5"));
    }

    #[test]
    fn test_string_list_skips_non_strings() {
        let v = json!({"tags": ["a", 1, "", "b", null]});
        assert_eq!(v.string_list("tags"), vec!["a", "b"]);
    }
}

//! Conversions from `serde_json` documents.
//!
//! JSON objects keep their key order (serde_json's `preserve_order`), so a decoded object
//! renders its columns in document order.

use super::columns::{Columns, Conditions, WHERE_KEY};
use super::value::Value;
use crate::error::{SqlError, SqlResult};
use serde_json::{Map, Number, Value as JsonValue};

impl From<JsonValue> for Value {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(_) => Value::Unsupported("boolean".to_string()),
            JsonValue::Number(n) => number_value(&n),
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(_) => Value::Unsupported("object".to_string()),
        }
    }
}

/// Decode a data map. A `"where"` key holding an object or string becomes the update
/// conditions; a `null` there means no conditions.
impl TryFrom<JsonValue> for Columns {
    type Error = SqlError;

    fn try_from(v: JsonValue) -> SqlResult<Self> {
        let map = match v {
            JsonValue::Object(map) => map,
            other => {
                return Err(SqlError::unsupported(format!(
                    "expected a JSON object for column data, got {}",
                    json_kind(&other)
                )));
            }
        };

        let mut columns = Columns::new();
        for (key, value) in map {
            if key == WHERE_KEY {
                if !value.is_null() {
                    columns = columns.filter(Conditions::try_from(value)?);
                }
                continue;
            }
            columns.insert(key, Value::from(value));
        }
        Ok(columns)
    }
}

impl TryFrom<JsonValue> for Conditions {
    type Error = SqlError;

    fn try_from(v: JsonValue) -> SqlResult<Self> {
        match v {
            JsonValue::String(s) => Ok(Conditions::Raw(s)),
            JsonValue::Object(map) => Ok(Conditions::Map(condition_map(map))),
            other => Err(SqlError::unsupported(format!(
                "expected a JSON object or string for conditions, got {}",
                json_kind(&other)
            ))),
        }
    }
}

// `arbitrary_precision` keeps the document's digits, so integers wider than 64 bits are parsed
// from the text instead of collapsing into a float.
fn number_value(n: &Number) -> Value {
    let text = n.to_string();
    let digits = text.strip_prefix('-').unwrap_or(&text);
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        return match text.parse::<i128>() {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Unsupported("integer out of range".to_string()),
        };
    }

    #[cfg(feature = "rust_decimal")]
    if let Ok(d) = rust_decimal::Decimal::from_str_exact(&text) {
        return Value::Decimal(d);
    }

    n.as_f64()
        .map_or_else(|| Value::Unsupported("number".to_string()), Value::Float)
}

// Inside a condition map `where` is an ordinary column name.
fn condition_map(map: Map<String, JsonValue>) -> Columns {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

//! # Document Access
//!
//! Strict parsing of raw documents and typed field access with dotted
//! error paths.
//!
//! `serde_json` silently keeps the last value when an object repeats a
//! key. Both document kinds require unique keys within every object, so
//! all parsing goes through [`StrictValue`], which rejects duplicates at
//! insertion time. The wrapper is format-agnostic: any serde
//! `Deserializer` (JSON, YAML) can produce it.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

use crate::error::FieldError;

/// A `serde_json::Value` whose objects were checked for duplicate keys.
#[derive(Debug, Clone, PartialEq)]
pub struct StrictValue(pub Value);

impl StrictValue {
    /// Consumes the wrapper and returns the inner value.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl<'de> Deserialize<'de> for StrictValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StrictVisitor).map(StrictValue)
    }
}

struct StrictVisitor;

impl<'de> Visitor<'de> for StrictVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-compatible value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| E::custom(format!("non-finite number {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        StrictValue::deserialize(deserializer).map(StrictValue::into_inner)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(StrictValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key `{key}`")));
            }
            let StrictValue(value) = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

/// Parse JSON text, rejecting duplicate keys in any object.
pub fn parse_json(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str::<StrictValue>(text).map(StrictValue::into_inner)
}

/// Join a parent path and a key into a dotted field path.
pub fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

/// Interpret `value` as an object.
pub fn as_object<'a>(value: &'a Value, field: &str) -> Result<&'a Map<String, Value>, FieldError> {
    value.as_object().ok_or_else(|| invalid(field, "an object"))
}

/// Fetch a required member of `object`.
pub fn required<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<&'a Value, FieldError> {
    object.get(key).ok_or_else(|| FieldError::Missing {
        field: join(parent, key),
    })
}

/// Fetch an optional member of `object` that must itself be an object.
pub fn optional_object<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<Option<&'a Map<String, Value>>, FieldError> {
    object
        .get(key)
        .map(|v| as_object(v, &join(parent, key)))
        .transpose()
}

/// Fetch an optional string member of `object`.
pub fn optional_str<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    parent: &str,
) -> Result<Option<&'a str>, FieldError> {
    object
        .get(key)
        .map(|v| expect_str(v, &join(parent, key)))
        .transpose()
}

/// Interpret `value` as a string.
pub fn expect_str<'a>(value: &'a Value, field: &str) -> Result<&'a str, FieldError> {
    value.as_str().ok_or_else(|| invalid(field, "a string"))
}

/// Interpret `value` as a boolean.
pub fn expect_bool(value: &Value, field: &str) -> Result<bool, FieldError> {
    value.as_bool().ok_or_else(|| invalid(field, "a boolean"))
}

/// Interpret `value` as a 64-bit integer. Floating point numbers are rejected.
pub fn expect_i64(value: &Value, field: &str) -> Result<i64, FieldError> {
    value.as_i64().ok_or_else(|| invalid(field, "an integer"))
}

/// Interpret `value` as a 32-bit integer.
pub fn expect_i32(value: &Value, field: &str) -> Result<i32, FieldError> {
    value
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| invalid(field, "a 32-bit integer"))
}

/// Interpret `value` as a floating point number. Integers are accepted.
pub fn expect_f64(value: &Value, field: &str) -> Result<f64, FieldError> {
    value.as_f64().ok_or_else(|| invalid(field, "a number"))
}

fn invalid(field: &str, expected: &'static str) -> FieldError {
    FieldError::InvalidType {
        field: if field.is_empty() { "(root)".to_string() } else { field.to_string() },
        expected,
    }
}

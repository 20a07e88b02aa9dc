//! Scalar values and their canonical text form.
//!
//! # Design
//! Query parameters, form fields and header values all travel as text, but
//! callers hand them over as whatever scalar they happen to hold. `Value`
//! closes the set of accepted kinds so coercion is total. The loosely-typed
//! entry point is `TryFrom<serde_json::Value>`, which is where an unsupported
//! kind (null, array, object) is rejected with `Error::UnsupportedValueKind`.
//!
//! Floats always render with exactly six fractional digits using std's
//! `{:.6}` formatting, which rounds the exact binary value to the nearest
//! representable six-digit decimal. `f32` is widened to `f64` first, so
//! `0.1f32` renders as `"0.100000"`.

use std::fmt;

use crate::error::Error;

/// A scalar that can be sent as a query parameter, form field or header value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// Canonical text form used on the wire.
    pub fn coerce(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Int(n) => n.to_string(),
            Value::UInt(n) => n.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Bool(b) => b.to_string(),
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "+Inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        format!("{f:.6}")
    }
}

/// Coerce a loosely-typed JSON value straight to text.
pub fn coerce_json(value: serde_json::Value) -> Result<String, Error> {
    Value::try_from(value).map(|v| v.coerce())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coerce())
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as Json;

        match value {
            Json::String(s) => Ok(Value::Text(s)),
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::UInt(u))
                } else {
                    // as_f64 is always Some without arbitrary_precision
                    Ok(Value::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Json::Null => Err(Error::UnsupportedValueKind { kind: "null" }),
            Json::Array(_) => Err(Error::UnsupportedValueKind { kind: "array" }),
            Json::Object(_) => Err(Error::UnsupportedValueKind { kind: "object" }),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

macro_rules! from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(i64::from(n))
            }
        })*
    };
}

macro_rules! from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::UInt(u64::from(n))
            }
        })*
    };
}

from_signed!(i8, i16, i32, i64);
from_unsigned!(u8, u16, u32, u64);

impl From<isize> for Value {
    fn from(n: isize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::UInt(n as u64)
    }
}

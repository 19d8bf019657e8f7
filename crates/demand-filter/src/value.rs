//! Scalar values carried by restrictions and records.
//!
//! A [`Scalar`] is the comparison operand of a leaf predicate. Demands arrive
//! as JSON, so scalars convert from and to [`serde_json::Value`].

use std::cmp::Ordering;
use std::fmt;

use serde_json::Value as Json;

/// A single restriction operand or record field value.
///
/// # Example
///
/// ```
/// use demand_filter::Scalar;
///
/// assert_eq!(Scalar::from(5), Scalar::Int(5));
/// assert!(Scalar::Int(3) < Scalar::Float(3.5));
/// assert_eq!(Scalar::from("o'clock").to_string(), "'o''clock'");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Absent or null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// String value.
    String(String),
}

impl Scalar {
    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Returns `true` for `Int` and `Float`.
    pub fn is_number(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the integer value, if present.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts numeric values to f64.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Loose truthiness: `null`, `false`, `0`, `0.0`, `""` and `"0"` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Null => false,
            Scalar::Bool(b) => *b,
            Scalar::Int(n) => *n != 0,
            Scalar::Float(n) => *n != 0.0,
            Scalar::String(s) => !(s.is_empty() || s == "0"),
        }
    }

    /// Compares two scalars of compatible types.
    ///
    /// Integers and floats compare numerically with each other. Returns `None`
    /// on a type mismatch or a NaN operand.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => Some(a.cmp(b)),
            (Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
            (Scalar::Bool(a), Scalar::Bool(b)) => Some(a.cmp(b)),
            (Scalar::Null, Scalar::Null) => Some(Ordering::Equal),
            (a, b) if a.is_number() && b.is_number() => a.to_f64()?.partial_cmp(&b.to_f64()?),
            _ => None,
        }
    }

    /// Converts a JSON scalar. Arrays and objects yield `None`.
    pub fn from_json(value: &Json) -> Option<Scalar> {
        match value {
            Json::Null => Some(Scalar::Null),
            Json::Bool(b) => Some(Scalar::Bool(*b)),
            Json::Number(n) => Some(match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Json::String(s) => Some(Scalar::String(s.clone())),
            Json::Array(_) | Json::Object(_) => None,
        }
    }

    /// Converts back into JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> Json {
        match self {
            Scalar::Null => Json::Null,
            Scalar::Bool(b) => Json::Bool(*b),
            Scalar::Int(n) => Json::from(*n),
            Scalar::Float(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Scalar::String(s) => Json::String(s.clone()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other)
    }
}

/// Renders as a SQL-style literal: strings single-quoted with quotes doubled.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(n) => write!(f, "{n}"),
            Scalar::Float(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(n as i64)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Scalar::Int(n as i64)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

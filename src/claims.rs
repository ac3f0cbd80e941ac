//! Loosely-typed claim sets.
//!
//! [`RawClaims`] wraps the JSON object a provider hands back, either the
//! payload of a verified ID token or a profile endpoint body. Nothing about
//! its keys is guaranteed, so every accessor returns a [`Lookup`] that tells
//! the caller whether the key was missing or held an unexpected type instead
//! of panicking.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Largest integer a JSON float can carry without losing precision (2^53).
pub const MAX_SAFE_FLOAT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The closed set of JSON value kinds a claim can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

/// Why a typed claim read did not produce a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// The key is not present.
    Missing,
    /// The key is present but holds another type.
    TypeMismatch { observed: ValueKind },
    /// An array element has the wrong type.
    ElementMismatch { index: usize, observed: ValueKind },
    /// A numeric identifier cannot be rendered exactly.
    OutOfRange { value: f64 },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::TypeMismatch { observed } => write!(f, "unexpected type {observed}"),
            Self::ElementMismatch { index, observed } => {
                write!(f, "unexpected type {observed} at index {index}")
            },
            Self::OutOfRange { value } => write!(f, "value {value} out of range"),
        }
    }
}

/// Outcome of a typed claim read.
pub type Lookup<T> = std::result::Result<T, Issue>;

/// A provider claim set keyed by claim name.
///
/// # Example
///
/// ```rust
/// use gexec_authn::{Issue, RawClaims, ValueKind};
/// use serde_json::json;
///
/// let raw = RawClaims::try_from(json!({"sub": "abc", "id": 42})).unwrap();
/// assert_eq!(raw.string("sub"), Ok("abc"));
/// assert_eq!(raw.integer_id("id"), Ok("42".to_string()));
/// assert_eq!(raw.string("email"), Err(Issue::Missing));
/// assert_eq!(
///     raw.string("id"),
///     Err(Issue::TypeMismatch { observed: ValueKind::Number })
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawClaims(Map<String, Value>);

impl RawClaims {
    /// Create an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw access to a claim.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether a claim is present (even when `null`).
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or replace a claim.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Number of claims.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the claim set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over claims in their original order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn value(&self, key: &str) -> Lookup<&Value> {
        self.0.get(key).ok_or(Issue::Missing)
    }

    /// Read a string claim.
    pub fn string(&self, key: &str) -> Lookup<&str> {
        let value = self.value(key)?;
        value.as_str().ok_or(Issue::TypeMismatch {
            observed: ValueKind::of(value),
        })
    }

    /// Read a string claim that providers may send as `null`.
    ///
    /// Absent and `null` both yield `Ok(None)`.
    pub fn nullable_string(&self, key: &str) -> Lookup<Option<&str>> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(Issue::TypeMismatch {
                observed: ValueKind::of(other),
            }),
        }
    }

    /// Read an array of strings, preserving order.
    ///
    /// The first non-string element rejects the whole claim.
    pub fn string_list(&self, key: &str) -> Lookup<Vec<String>> {
        let value = self.value(key)?;
        let items = value.as_array().ok_or(Issue::TypeMismatch {
            observed: ValueKind::of(value),
        })?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str()
                    .map(String::from)
                    .ok_or(Issue::ElementMismatch {
                        index,
                        observed: ValueKind::of(item),
                    })
            })
            .collect()
    }

    /// Read a numeric identifier and render it as a decimal string.
    ///
    /// JSON integers are rendered exactly across the full `i64`/`u64` range.
    /// JSON floats are accepted only when they are integral and within
    /// ±2^53; anything else is reported as [`Issue::OutOfRange`] rather than
    /// silently truncated.
    pub fn integer_id(&self, key: &str) -> Lookup<String> {
        let number = match self.value(key)? {
            Value::Number(number) => number,
            other => {
                return Err(Issue::TypeMismatch {
                    observed: ValueKind::of(other),
                })
            },
        };

        if let Some(unsigned) = number.as_u64() {
            return Ok(unsigned.to_string());
        }

        if let Some(signed) = number.as_i64() {
            return Ok(signed.to_string());
        }

        match number.as_f64() {
            Some(float)
                if float.is_finite()
                    && float.fract() == 0.0
                    && float.abs() <= MAX_SAFE_FLOAT_INTEGER =>
            {
                // Exact: the magnitude check keeps the value inside i64 and
                // inside the contiguous integer range of f64.
                Ok((float as i64).to_string())
            },
            Some(float) => Err(Issue::OutOfRange { value: float }),
            None => Err(Issue::TypeMismatch {
                observed: ValueKind::Number,
            }),
        }
    }
}

impl From<Map<String, Value>> for RawClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RawClaims {
    type Error = ValueKind;

    /// Accepts only JSON objects; returns the observed kind otherwise.
    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ValueKind::of(&other)),
        }
    }
}

impl From<RawClaims> for Value {
    fn from(claims: RawClaims) -> Self {
        Value::Object(claims.0)
    }
}

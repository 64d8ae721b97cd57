//! Dynamically typed cell values read back from the database.

use rusqlite::types::ValueRef;
use serde::Serialize;
use subtle_encoding::hex;

/// A single value from a query result.
///
/// Mirrors SQLite's storage classes, since result sets are discovered at
/// query time and carry no schema of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// A numeric view of a [`Cell`], used when summing and comparing measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Real(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Integer(i) => *i as f64,
            Self::Real(f) => *f,
        }
    }
}

/// Sums stay integral for as long as both sides are integers and the result
/// does not overflow.
impl std::ops::Add for Number {
    type Output = Number;

    fn add(self, other: Number) -> Number {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => match a.checked_add(b) {
                Some(sum) => Self::Integer(sum),
                None => Self::Real(a as f64 + b as f64),
            },
            (a, b) => Self::Real(a.as_f64() + b.as_f64()),
        }
    }
}

/// Integers compare exactly. Only a comparison involving a real goes through
/// `f64`.
impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write_real(f, *r),
        }
    }
}

// Reals that happen to be whole still print with a decimal point so that they
// stay distinguishable from integers.
fn write_real(f: &mut std::fmt::Formatter<'_>, r: f64) -> std::fmt::Result {
    if r.is_finite() && r.fract() == 0.0 {
        write!(f, "{:.1}", r)
    } else {
        write!(f, "{}", r)
    }
}

impl Cell {
    /// Returns the numeric value of this cell, or `None` if it is not a
    /// number.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Integer(i) => Some(Number::Integer(*i)),
            Self::Real(f) => Some(Number::Real(*f)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Real(r) => write_real(f, *r),
            Self::Text(s) => write!(f, "{}", s),
            Self::Blob(b) => write!(f, "x'{}'", String::from_utf8_lossy(&hex::encode(b))),
        }
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(t) => Self::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Self::Blob(b.to_vec()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Self::Real(f)
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Integer(i) => serializer.serialize_i64(*i),
            Cell::Real(f) => serializer.serialize_f64(*f),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Blob(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Number::Integer(i) => serializer.serialize_i64(*i),
            Number::Real(f) => serializer.serialize_f64(*f),
        }
    }
}

//! Dynamic values carried through parsing and building
//!
//! Parsed output and context entries are heterogeneous: integers, byte
//! sequences, text, nested containers. [`Value`] is the tagged union over
//! those kinds, with typed accessors so descriptors that expect a specific
//! kind can fail with a precise error instead of panicking.

use crate::container::Container;
use crate::error::{Error, Result};
use std::fmt;

/// A dynamically typed value produced by parsing or accepted for building
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Absence of a value (unnamed fields, `Pass`)
    Null,
    /// Boolean, e.g. from a single-bit flag
    Bool(bool),
    /// Signed 64-bit integer; the value domain for all integer fields
    Int(i64),
    /// IEEE 754 double; the value domain for float format fields
    Float(f64),
    /// Raw byte sequence
    Bytes(Vec<u8>),
    /// Text; interchangeable with `Bytes` under the latin-1 mapping
    Str(String),
    /// Nested parsed structure
    Container(Container),
    /// Ordered list of values
    List(Vec<Value>),
}

impl Value {
    /// Name of this value's kind, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bytes(_) => "bytes",
            Self::Str(_) => "str",
            Self::Container(_) => "container",
            Self::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Container(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Convert to a container, consuming self
    pub fn into_container(self) -> Option<Container> {
        match self {
            Self::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Convert to a byte vector, consuming self
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Require an integer, failing with a typed error otherwise
    pub fn expect_int(&self) -> Result<i64> {
        self.as_int().ok_or(Error::TypeMismatch {
            expected: "int",
            actual: self.type_name(),
        })
    }

    /// Require a byte sequence, failing with a typed error otherwise
    pub fn expect_bytes(&self) -> Result<&[u8]> {
        self.as_bytes().ok_or(Error::TypeMismatch {
            expected: "bytes",
            actual: self.type_name(),
        })
    }

    /// The byte rendition a raw field writes for this value.
    ///
    /// `Bytes` pass through; `Str` is rendered via the latin-1 mapping.
    /// Integers are deliberately rejected here: fixed-width integers go
    /// through a format field, and the legacy magnitude-based width
    /// inference lives only in the compact-int adapter.
    pub fn to_field_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(b) => Ok(b.clone()),
            Self::Str(s) => latin1_bytes(s),
            other => Err(Error::TypeMismatch {
                expected: "bytes or str",
                actual: other.type_name(),
            }),
        }
    }
}

/// Encode text as latin-1 bytes, one byte per char.
///
/// Chars above U+00FF have no single-byte form and are rejected.
pub(crate) fn latin1_bytes(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            if cp <= 0xFF {
                Ok(cp as u8)
            } else {
                Err(Error::value(format!(
                    "char {c:?} has no single-byte encoding"
                )))
            }
        })
        .collect()
}

/// True when `text` and `bytes` are the same sequence under latin-1
fn str_matches_bytes(text: &str, bytes: &[u8]) -> bool {
    let mut chars = text.chars();
    for &b in bytes {
        match chars.next() {
            Some(c) if c as u32 == u32::from(b) => {}
            _ => return false,
        }
    }
    chars.next().is_none()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Container(a), Container(b)) => a == b,
            (List(a), List(b)) => a == b,
            // Magic values may be declared as text while fields parse bytes.
            (Str(s), Bytes(b)) | (Bytes(b), Str(s)) => str_matches_bytes(s, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Container(c) => write!(f, "{c}"),
            Self::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u8> for Value {
    fn from(i: u8) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Container> for Value {
    fn from(c: Container) -> Self {
        Self::Container(c)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Self::List(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_bytes_compare_under_latin1() {
        assert_eq!(Value::Str("MZ".into()), Value::Bytes(b"MZ".to_vec()));
        assert_eq!(Value::Bytes(b"MZ".to_vec()), Value::Str("MZ".into()));
        assert_ne!(Value::Str("MZ".into()), Value::Bytes(b"ZM".to_vec()));
        assert_ne!(Value::Str("MZx".into()), Value::Bytes(b"MZ".to_vec()));
        // High latin-1 chars map to their single byte
        assert_eq!(Value::Str("\u{00FF}".into()), Value::Bytes(vec![0xFF]));
    }

    #[test]
    fn latin1_rejects_wide_chars() {
        assert!(latin1_bytes("abc").is_ok());
        assert!(latin1_bytes("\u{0100}").is_err());
    }

    #[test]
    fn field_bytes_by_kind() {
        assert_eq!(
            Value::Bytes(vec![1, 2]).to_field_bytes().unwrap(),
            vec![1, 2]
        );
        assert_eq!(Value::Str("ab".into()).to_field_bytes().unwrap(), b"ab");
        assert!(matches!(
            Value::Int(7).to_field_bytes(),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Int(5).as_int(), Some(5));
        assert_eq!(Value::Int(5).as_bool(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert!(Value::Null.is_null());
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
    }
}

//! Wire values

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Identity of a struct inside a [`WireGraph`](crate::WireGraph).
///
/// Two values referring to the same `StructId` are the same decoded object,
/// not two equal copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructId(pub u32);

impl StructId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StructId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A decoded but untyped wire value
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),

    /// Positional sequence, as found under an array's `item` key
    List(Vec<WireValue>),

    /// Reference to a property bag in the owning graph
    Struct(StructId),
}

impl WireValue {
    pub fn is_null(&self) -> bool {
        matches!(self, WireValue::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            WireValue::Bool(_) | WireValue::Int(_) | WireValue::Float(_) | WireValue::String(_)
        )
    }

    pub fn as_struct(&self) -> Option<StructId> {
        match self {
            WireValue::Struct(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            WireValue::Null => "null",
            WireValue::Bool(_) => "bool",
            WireValue::Int(_) => "int",
            WireValue::Float(_) => "float",
            WireValue::String(_) => "string",
            WireValue::List(_) => "list",
            WireValue::Struct(_) => "struct",
        }
    }
}

impl From<bool> for WireValue {
    fn from(v: bool) -> Self { WireValue::Bool(v) }
}

impl From<i32> for WireValue {
    fn from(v: i32) -> Self { WireValue::Int(v as i64) }
}

impl From<i64> for WireValue {
    fn from(v: i64) -> Self { WireValue::Int(v) }
}

impl From<f64> for WireValue {
    fn from(v: f64) -> Self { WireValue::Float(v) }
}

impl From<String> for WireValue {
    fn from(v: String) -> Self { WireValue::String(v) }
}

impl From<&str> for WireValue {
    fn from(v: &str) -> Self { WireValue::String(String::from(v)) }
}

impl From<StructId> for WireValue {
    fn from(v: StructId) -> Self { WireValue::Struct(v) }
}

impl<T: Into<WireValue>> From<Vec<T>> for WireValue {
    fn from(v: Vec<T>) -> Self {
        WireValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<WireValue>> From<Option<T>> for WireValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(x) => x.into(),
            None => WireValue::Null,
        }
    }
}

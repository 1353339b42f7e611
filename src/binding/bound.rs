//! Bound values
//!
//! The typed side of a binding. Complex values are [`BoundObject`]s living
//! in an [`ObjectGraph`] and referenced by [`ObjectId`], so a bound message
//! can preserve shared references and cycles from the wire graph.

use std::fmt;

use thiserror::Error;

/// Identity of an object inside an [`ObjectGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A value bound against a declared type
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<BoundValue>),
    Object(ObjectId),
}

impl BoundValue {
    pub fn is_null(&self) -> bool {
        matches!(self, BoundValue::Null)
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            BoundValue::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[BoundValue]> {
        match self {
            BoundValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BoundValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            BoundValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BoundValue::Null => "null",
            BoundValue::Bool(_) => "bool",
            BoundValue::Int(_) => "int",
            BoundValue::Float(_) => "float",
            BoundValue::String(_) => "string",
            BoundValue::Array(_) => "array",
            BoundValue::Object(_) => "object",
        }
    }
}

impl From<bool> for BoundValue {
    fn from(v: bool) -> Self { BoundValue::Bool(v) }
}

impl From<i32> for BoundValue {
    fn from(v: i32) -> Self { BoundValue::Int(v as i64) }
}

impl From<i64> for BoundValue {
    fn from(v: i64) -> Self { BoundValue::Int(v) }
}

impl From<f64> for BoundValue {
    fn from(v: f64) -> Self { BoundValue::Float(v) }
}

impl From<String> for BoundValue {
    fn from(v: String) -> Self { BoundValue::String(v) }
}

impl From<&str> for BoundValue {
    fn from(v: &str) -> Self { BoundValue::String(v.to_string()) }
}

impl From<ObjectId> for BoundValue {
    fn from(v: ObjectId) -> Self { BoundValue::Object(v) }
}

impl<T: Into<BoundValue>> From<Vec<T>> for BoundValue {
    fn from(v: Vec<T>) -> Self {
        BoundValue::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<BoundValue>> From<Option<T>> for BoundValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(x) => x.into(),
            None => BoundValue::Null,
        }
    }
}

/// An instance of a complex type
#[derive(Debug, Clone, PartialEq)]
pub struct BoundObject {
    /// Original name of the complex type this object instantiates
    pub type_name: String,
    /// Field values in schema order, keyed by property original name
    pub fields: Vec<(String, BoundValue)>,
}

impl BoundObject {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// `None` when the object has no such field, as opposed to a field
    /// holding [`BoundValue::Null`].
    pub fn field(&self, name: &str) -> Option<&BoundValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<BoundValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }
}

/// Arena of objects created by one bind, or assembled by a service to be
/// flattened into a response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGraph {
    objects: Vec<BoundObject>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an object with no fields yet.
    pub fn alloc(&mut self, type_name: impl Into<String>) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(BoundObject::new(type_name));
        id
    }

    /// Allocate an object with the given fields.
    pub fn add_object<K, V, I>(&mut self, type_name: impl Into<String>, fields: I) -> ObjectId
    where
        K: Into<String>,
        V: Into<BoundValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let id = self.alloc(type_name);
        self.objects[id.index()].fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&BoundObject> {
        self.objects.get(id.index())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut BoundObject> {
        self.objects.get_mut(id.index())
    }

    /// Set a field on an existing object. Returns `false` if `id` is not in
    /// this graph.
    pub fn set_field(
        &mut self,
        id: ObjectId,
        name: impl Into<String>,
        value: impl Into<BoundValue>,
    ) -> bool {
        match self.get_mut(id) {
            Some(object) => {
                object.set(name, value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &BoundObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, o)| (ObjectId(i as u32), o))
    }
}

/// Result of binding a request: parameter name to bound value, in method
/// declaration order, plus the objects those values reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundMessage {
    objects: ObjectGraph,
    arguments: Vec<(String, BoundValue)>,
}

impl BoundMessage {
    pub fn new(objects: ObjectGraph, arguments: Vec<(String, BoundValue)>) -> Self {
        Self { objects, arguments }
    }

    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.arguments.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.arguments.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.arguments.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    pub fn objects(&self) -> &ObjectGraph {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&BoundObject> {
        self.objects.get(id)
    }

    /// Convert one argument into a caller type.
    pub fn extract<T: FromBound>(&self, name: &str) -> Result<T, ConversionError> {
        let value = self
            .get(name)
            .ok_or_else(|| ConversionError::MissingField(name.to_string()))?;
        T::from_bound(value, &self.objects)
            .map_err(|e| ConversionError::FieldError(name.to_string(), Box::new(e)))
    }

    pub fn into_parts(self) -> (ObjectGraph, Vec<(String, BoundValue)>) {
        (self.objects, self.arguments)
    }
}

// ============================================================================
// FromBound - conversion into caller types
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("In field '{0}': {1}")]
    FieldError(String, Box<ConversionError>),

    #[error("At index {0}: {1}")]
    IndexError(usize, Box<ConversionError>),

    #[error("Object {0} is not part of the object graph")]
    DanglingObject(ObjectId),
}

impl ConversionError {
    fn mismatch(expected: &str, got: &BoundValue) -> Self {
        ConversionError::TypeMismatch {
            expected: expected.to_string(),
            got: got.kind().to_string(),
        }
    }
}

/// Conversion from a bound value into a caller type.
///
/// Implement it for service-side structs to receive complex arguments as
/// plain Rust values. Cyclic graphs cannot be converted into owned trees;
/// walk the [`ObjectGraph`] directly for those.
pub trait FromBound: Sized {
    fn from_bound(value: &BoundValue, objects: &ObjectGraph) -> Result<Self, ConversionError>;
}

/// Look up the object `value` refers to, checking its type name.
pub fn expect_object<'a>(
    value: &BoundValue,
    objects: &'a ObjectGraph,
    type_name: &str,
) -> Result<&'a BoundObject, ConversionError> {
    let id = value
        .as_object()
        .ok_or_else(|| ConversionError::mismatch(type_name, value))?;
    let object = objects.get(id).ok_or(ConversionError::DanglingObject(id))?;
    if object.type_name != type_name {
        return Err(ConversionError::TypeMismatch {
            expected: type_name.to_string(),
            got: object.type_name.clone(),
        });
    }
    Ok(object)
}

/// Convert one field of `object`.
pub fn field<T: FromBound>(
    object: &BoundObject,
    name: &str,
    objects: &ObjectGraph,
) -> Result<T, ConversionError> {
    let value = object
        .field(name)
        .ok_or_else(|| ConversionError::MissingField(name.to_string()))?;
    T::from_bound(value, objects)
        .map_err(|e| ConversionError::FieldError(name.to_string(), Box::new(e)))
}

impl FromBound for String {
    fn from_bound(value: &BoundValue, _: &ObjectGraph) -> Result<Self, ConversionError> {
        match value {
            BoundValue::String(s) => Ok(s.clone()),
            other => Err(ConversionError::mismatch("string", other)),
        }
    }
}

impl FromBound for i64 {
    fn from_bound(value: &BoundValue, _: &ObjectGraph) -> Result<Self, ConversionError> {
        value
            .as_int()
            .ok_or_else(|| ConversionError::mismatch("int", value))
    }
}

impl FromBound for i32 {
    fn from_bound(value: &BoundValue, _: &ObjectGraph) -> Result<Self, ConversionError> {
        match value {
            BoundValue::Int(n) => i32::try_from(*n).map_err(|_| ConversionError::TypeMismatch {
                expected: "i32".to_string(),
                got: n.to_string(),
            }),
            other => Err(ConversionError::mismatch("int", other)),
        }
    }
}

impl FromBound for bool {
    fn from_bound(value: &BoundValue, _: &ObjectGraph) -> Result<Self, ConversionError> {
        match value {
            BoundValue::Bool(b) => Ok(*b),
            other => Err(ConversionError::mismatch("bool", other)),
        }
    }
}

impl FromBound for f64 {
    fn from_bound(value: &BoundValue, _: &ObjectGraph) -> Result<Self, ConversionError> {
        match value {
            BoundValue::Float(x) => Ok(*x),
            BoundValue::Int(n) => Ok(*n as f64),
            other => Err(ConversionError::mismatch("float", other)),
        }
    }
}

impl<T: FromBound> FromBound for Option<T> {
    fn from_bound(value: &BoundValue, objects: &ObjectGraph) -> Result<Self, ConversionError> {
        match value {
            BoundValue::Null => Ok(None),
            other => T::from_bound(other, objects).map(Some),
        }
    }
}

impl<T: FromBound> FromBound for Vec<T> {
    fn from_bound(value: &BoundValue, objects: &ObjectGraph) -> Result<Self, ConversionError> {
        match value {
            BoundValue::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    T::from_bound(item, objects)
                        .map_err(|e| ConversionError::IndexError(i, Box::new(e)))
                })
                .collect(),
            other => Err(ConversionError::mismatch("array", other)),
        }
    }
}

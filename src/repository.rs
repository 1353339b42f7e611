//! Type Repository
//!
//! Registry of the types a service can bind: scalar names mapped to wire
//! type tags (`"int"` -> `"xsd:int"`) and complex type schemas reachable by
//! either their short alias or their originating identifier.
//!
//! Populated once during bootstrap through `&mut self`, then shared
//! read-only by every bind.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::binding::BindError;
use crate::definition::{ComplexType, TypeSpec};

/// Namespace URI of the XML Schema builtin types
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Scalar types registered by [`TypeRepository::with_xsd_defaults`]
pub const XSD_DEFAULT_TYPES: &[(&str, &str)] = &[
    ("string", "xsd:string"),
    ("boolean", "xsd:boolean"),
    ("int", "xsd:int"),
    ("float", "xsd:float"),
    ("date", "xsd:date"),
    ("dateTime", "xsd:dateTime"),
];

/// A type reference resolved against the repository.
///
/// Whether the reference is an array is carried by the [`TypeSpec`]; this is
/// the base type only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedType<'a> {
    /// Passed through unchanged by the binders
    Scalar { wire_type: &'a str },
    /// Bound property by property
    Complex(&'a ComplexType),
}

/// A property whose type does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Original name of the complex type declaring the property
    pub owner: String,
    pub property: String,
    pub ty: TypeSpec,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRepository {
    xml_namespaces: HashMap<String, String>,
    scalar_types: HashMap<String, String>,
    complex_types: HashMap<String, Arc<ComplexType>>,
}

impl TypeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository with the `xsd` namespace and the common XSD scalars.
    pub fn with_xsd_defaults() -> Self {
        let mut repository = Self::new();
        repository.add_xml_namespace("xsd", XSD_NAMESPACE);
        for (name, wire_type) in XSD_DEFAULT_TYPES {
            repository.add_type(*name, *wire_type);
        }
        repository
    }

    pub fn add_xml_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.xml_namespaces.insert(prefix.into(), uri.into());
    }

    pub fn get_xml_namespace(&self, prefix: &str) -> Option<&str> {
        self.xml_namespaces.get(prefix).map(String::as_str)
    }

    /// Register a scalar type. Re-registering a name replaces its tag.
    pub fn add_type(&mut self, name: impl Into<String>, wire_type: impl Into<String>) {
        self.scalar_types.insert(name.into(), wire_type.into());
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.scalar_types.contains_key(name)
    }

    /// Wire tag of a scalar type. A type registered with an empty tag yields
    /// `Some("")`.
    pub fn get_type(&self, name: &str) -> Option<&str> {
        self.scalar_types.get(name).map(String::as_str)
    }

    /// Expand a scalar's wire tag to `{namespace-uri}local` form.
    ///
    /// Tags without a prefix, or with a prefix that was never registered,
    /// are returned as they are.
    pub fn expand_wire_type(&self, name: &str) -> Option<String> {
        let tag = self.get_type(name)?;
        Some(match tag.split_once(':') {
            Some((prefix, local)) => match self.get_xml_namespace(prefix) {
                Some(uri) => format!("{{{}}}{}", uri, local),
                None => tag.to_string(),
            },
            None => tag.to_string(),
        })
    }

    /// Register a complex type under both its name and its original name.
    /// Later registrations replace earlier ones for either key.
    pub fn add_complex_type(&mut self, ty: ComplexType) {
        let ty = Arc::new(ty);
        if ty.original_name() != ty.name() {
            self.complex_types
                .insert(ty.original_name().to_string(), Arc::clone(&ty));
        }
        self.complex_types.insert(ty.name().to_string(), ty);
    }

    pub fn has_complex_type(&self, name: &str) -> bool {
        self.complex_types.contains_key(name)
    }

    pub fn get_complex_type(&self, name: &str) -> Option<&Arc<ComplexType>> {
        self.complex_types.get(name)
    }

    /// Every distinct complex type, ordered by original name.
    pub fn complex_types(&self) -> Vec<&Arc<ComplexType>> {
        let mut unique: BTreeMap<&str, &Arc<ComplexType>> = BTreeMap::new();
        for ty in self.complex_types.values() {
            unique.entry(ty.original_name()).or_insert(ty);
        }
        unique.into_values().collect()
    }

    /// Resolve the base type of `spec`. Scalars take precedence over complex
    /// types registered under the same name.
    pub fn resolve(&self, spec: &TypeSpec) -> Result<ResolvedType<'_>, BindError> {
        if let Some(wire_type) = self.get_type(spec.name()) {
            return Ok(ResolvedType::Scalar { wire_type });
        }
        match self.get_complex_type(spec.name()) {
            Some(ty) => Ok(ResolvedType::Complex(ty)),
            None => Err(BindError::UnknownType(spec.to_string())),
        }
    }

    /// Properties of registered complex types whose type does not resolve.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        let mut missing = Vec::new();
        for ty in self.complex_types() {
            for property in ty.properties() {
                if self.resolve(&property.ty).is_err() {
                    missing.push(UnresolvedReference {
                        owner: ty.original_name().to_string(),
                        property: property.name.clone(),
                        ty: property.ty.clone(),
                    });
                }
            }
        }
        missing
    }
}

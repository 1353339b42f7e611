//! Service Definitions
//!
//! Complex type schemas and method signatures, as assembled while a service
//! is being bootstrapped. Both follow a two-phase lifecycle:
//!
//! - a mutable builder ([`ComplexTypeBuilder`], [`MethodBuilder`]) used only
//!   during configuration,
//! - an immutable value ([`ComplexType`], [`Method`]) that binders read.

use std::fmt;

// ============================================================================
// TypeSpec - Parsed Type References
// ============================================================================

/// Suffix marking an array type reference (`Foo[]`)
pub const ARRAY_SUFFIX: &str = "[]";

/// A type reference as written in a definition: a scalar or complex type
/// name, optionally marked as an array.
///
/// Parsed once when the definition is built so binders never re-inspect the
/// suffix while recursing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    name: String,
    is_array: bool,
}

impl TypeSpec {
    /// Parse `"Foo"` or `"Foo[]"`. Only one trailing `[]` is stripped.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        match spec.strip_suffix(ARRAY_SUFFIX) {
            Some(base) => Self::array(base),
            None => Self::scalar_or_complex(spec),
        }
    }

    /// A non-array reference to `name`.
    pub fn scalar_or_complex(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: false,
        }
    }

    /// An array of `name`.
    pub fn array(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: true,
        }
    }

    /// The base type name, without the array marker.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// The same reference with the array marker removed.
    pub fn element(&self) -> TypeSpec {
        Self::scalar_or_complex(self.name.clone())
    }
}

impl From<&str> for TypeSpec {
    fn from(spec: &str) -> Self {
        TypeSpec::parse(spec)
    }
}

impl From<String> for TypeSpec {
    fn from(spec: String) -> Self {
        TypeSpec::parse(&spec)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}{}", self.name, ARRAY_SUFFIX)
        } else {
            f.write_str(&self.name)
        }
    }
}

// ============================================================================
// ComplexType - Structured Type Schemas
// ============================================================================

/// One declared property of a complex type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    /// Element name on the wire
    pub name: String,
    /// Field name on the bound object; equals `name` unless renamed
    pub original_name: String,
    /// Declared type
    pub ty: TypeSpec,
    /// Whether the property may be absent or null
    pub nillable: bool,
}

impl Property {
    /// Create a required property whose wire and field names match.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        let name = name.into();
        Self {
            original_name: name.clone(),
            name,
            ty: ty.into(),
            nillable: false,
        }
    }

    pub fn with_original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = original_name.into();
        self
    }

    pub fn with_nillable(mut self, nillable: bool) -> Self {
        self.nillable = nillable;
        self
    }
}

/// An immutable complex type schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexType {
    name: String,
    original_name: String,
    properties: Vec<Property>,
}

impl ComplexType {
    /// Start building a complex type registered under `name`.
    pub fn builder(name: impl Into<String>) -> ComplexTypeBuilder {
        ComplexTypeBuilder::new(name)
    }

    /// Normalized schema name (the short alias)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier the type originates from, e.g. a fully-qualified type path
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Declared properties, in schema order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Find a property by its wire name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Mutable assembly of a [`ComplexType`].
#[derive(Debug, Clone)]
pub struct ComplexTypeBuilder {
    name: String,
    original_name: Option<String>,
    properties: Vec<Property>,
}

impl ComplexTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            original_name: None,
            properties: Vec::new(),
        }
    }

    /// Set the originating identifier. Defaults to the name when unset.
    pub fn original_name(mut self, original_name: impl Into<String>) -> Self {
        self.original_name = Some(original_name.into());
        self
    }

    /// Append a required property.
    pub fn property(self, name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        self.add(Property::new(name, ty))
    }

    /// Append a property that may be absent or null.
    pub fn nillable_property(self, name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        self.add(Property::new(name, ty).with_nillable(true))
    }

    /// Append a fully specified property.
    pub fn add(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn build(self) -> ComplexType {
        let original_name = match self.original_name {
            Some(original) if !original.is_empty() => original,
            _ => self.name.clone(),
        };
        ComplexType {
            name: self.name,
            original_name,
            properties: self.properties,
        }
    }
}

// ============================================================================
// Method - Operation Signatures
// ============================================================================

/// A named, typed method parameter or output part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub ty: TypeSpec,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// An immutable service operation signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
}

impl Method {
    pub fn builder(name: impl Into<String>) -> MethodBuilder {
        MethodBuilder::new(name)
    }

    /// Operation identifier
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inputs in declaration order
    pub fn inputs(&self) -> &[Param] {
        &self.inputs
    }

    /// Outputs in declaration order
    pub fn outputs(&self) -> &[Param] {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<&Param> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Param> {
        self.outputs.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        write_params(f, &self.inputs)?;
        f.write_str(")")?;
        if !self.outputs.is_empty() {
            f.write_str(" -> (")?;
            write_params(f, &self.outputs)?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[Param]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", param.name, param.ty)?;
    }
    Ok(())
}

/// Mutable assembly of a [`Method`].
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    inputs: Vec<Param>,
    outputs: Vec<Param>,
}

impl MethodBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn input(mut self, name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        self.inputs.push(Param::new(name, ty));
        self
    }

    pub fn output(mut self, name: impl Into<String>, ty: impl Into<TypeSpec>) -> Self {
        self.outputs.push(Param::new(name, ty));
        self
    }

    pub fn build(self) -> Method {
        Method {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
        }
    }
}

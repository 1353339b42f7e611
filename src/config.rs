//! Service definition files
//!
//! A service definition is a JSON document describing the type repository
//! and method signatures of one service. It is read once at startup and
//! turned into an immutable [`Service`].

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binding::{BindingStyle, MessageBinder, ResponseBinder};
use crate::definition::{ComplexType, Method, Param, Property};
use crate::repository::TypeRepository;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Type '{ty}' referenced by {owner}.{member} is not registered")]
    UnknownType {
        owner: String,
        member: String,
        ty: String,
    },

    #[error("Method '{0}' is defined more than once")]
    DuplicateMethod(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    #[serde(default)]
    pub binding: BindingStyle,
    /// Register the `xsd` namespace and the common XSD scalars
    #[serde(default)]
    pub xsd_defaults: bool,
    /// Namespace prefix -> URI
    #[serde(default)]
    pub namespaces: BTreeMap<String, String>,
    /// Scalar type name -> wire type tag
    #[serde(default)]
    pub types: BTreeMap<String, String>,
    #[serde(default)]
    pub complex_types: Vec<ComplexTypeConfig>,
    #[serde(default)]
    pub methods: Vec<MethodConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexTypeConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub nillable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodConfig {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<ParamConfig>,
    #[serde(default)]
    pub outputs: Vec<ParamConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl ServiceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("reading service definition {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Assemble the repository and methods, checking that every referenced
    /// type is registered.
    pub fn build(&self) -> Result<Service, ConfigError> {
        let mut repository = if self.xsd_defaults {
            TypeRepository::with_xsd_defaults()
        } else {
            TypeRepository::new()
        };
        for (prefix, uri) in &self.namespaces {
            repository.add_xml_namespace(prefix.as_str(), uri.as_str());
        }
        for (name, wire_type) in &self.types {
            repository.add_type(name.as_str(), wire_type.as_str());
        }
        for ty in &self.complex_types {
            repository.add_complex_type(ty.to_complex_type());
        }

        if let Some(missing) = repository.unresolved_references().into_iter().next() {
            return Err(ConfigError::UnknownType {
                owner: missing.owner,
                member: missing.property,
                ty: missing.ty.to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut methods = Vec::with_capacity(self.methods.len());
        for config in &self.methods {
            if !seen.insert(config.name.as_str()) {
                return Err(ConfigError::DuplicateMethod(config.name.clone()));
            }
            let method = config.to_method();
            check_params(&repository, &method, method.inputs())?;
            check_params(&repository, &method, method.outputs())?;
            methods.push(method);
        }

        info!(
            "loaded service '{}' ({}, {} complex types, {} methods)",
            self.name,
            self.binding,
            repository.complex_types().len(),
            methods.len()
        );

        Ok(Service {
            name: self.name.clone(),
            binding: self.binding,
            repository,
            methods,
        })
    }
}

impl ComplexTypeConfig {
    pub fn to_complex_type(&self) -> ComplexType {
        let mut builder = ComplexType::builder(self.name.as_str());
        if let Some(original_name) = &self.original_name {
            builder = builder.original_name(original_name.as_str());
        }
        for property in &self.properties {
            let mut built = Property::new(property.name.as_str(), property.ty.as_str())
                .with_nillable(property.nillable);
            if let Some(original_name) = &property.original_name {
                built = built.with_original_name(original_name.as_str());
            }
            builder = builder.add(built);
        }
        builder.build()
    }
}

impl MethodConfig {
    pub fn to_method(&self) -> Method {
        let mut builder = Method::builder(self.name.as_str());
        for input in &self.inputs {
            builder = builder.input(input.name.as_str(), input.ty.as_str());
        }
        for output in &self.outputs {
            builder = builder.output(output.name.as_str(), output.ty.as_str());
        }
        builder.build()
    }
}

fn check_params(
    repository: &TypeRepository,
    method: &Method,
    params: &[Param],
) -> Result<(), ConfigError> {
    for param in params {
        if repository.resolve(&param.ty).is_err() {
            return Err(ConfigError::UnknownType {
                owner: method.name().to_string(),
                member: param.name.clone(),
                ty: param.ty.to_string(),
            });
        }
    }
    Ok(())
}

/// A loaded service: its types, methods and binding style
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub binding: BindingStyle,
    pub repository: TypeRepository,
    pub methods: Vec<Method>,
}

impl Service {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ServiceConfig::from_path(path)?.build()
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn request_binder(&self) -> Box<dyn MessageBinder> {
        self.binding.request_binder()
    }

    pub fn response_binder(&self) -> Box<dyn ResponseBinder> {
        self.binding.response_binder()
    }
}

//! Message Binding
//!
//! Converts between wire structures and typed method arguments.
//!
//! - Request direction: positional wire arguments -> [`BoundMessage`]
//! - Response direction: bound return values -> [`WireMessage`]
//!
//! Two binding styles are provided, selected by [`BindingStyle`]:
//! `rpc-literal` binds each part directly, `document-wrapped` wraps all parts
//! in one element named after the operation.

pub mod bound;
mod request;
mod response;
mod wrapped;

pub use bound::{
    BoundMessage, BoundObject, BoundValue, ConversionError, FromBound, ObjectGraph, ObjectId,
};
pub use request::RpcLiteralRequestBinder;
pub use response::{RpcLiteralResponseBinder, WireMessage};
pub use wrapped::{DocumentWrappedRequestBinder, DocumentWrappedResponseBinder, RETURN_PART};

use std::fmt;

use serde::{Deserialize, Serialize};
use soapbind_wire::{StructId, WireGraph, WireValue};
use thiserror::Error;

use crate::definition::Method;
use crate::repository::TypeRepository;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindError {
    #[error("Required property '{property}' of type '{type_name}' is missing")]
    RequiredPropertyMissing { type_name: String, property: String },

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Unexpected value at '{path}': expected {expected}, got {found}")]
    UnexpectedValue {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Struct {0} is not part of the wire graph")]
    DanglingStruct(StructId),

    #[error("Object {0} is not part of the object graph")]
    DanglingObject(ObjectId),
}

impl BindError {
    /// Whether the caller sent a payload that cannot be bound, as opposed to
    /// a service misconfiguration.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BindError::RequiredPropertyMissing { .. } | BindError::UnexpectedValue { .. }
        )
    }

    /// Translate into the fault the RPC layer reports to the caller.
    pub fn fault(&self) -> Fault {
        let code = if self.is_client_error() {
            FaultCode::Client
        } else {
            FaultCode::Server
        };
        Fault {
            code,
            message: self.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    Client,
    Server,
}

impl FaultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCode::Client => "soap:Client",
            FaultCode::Server => "soap:Server",
        }
    }
}

/// A protocol-level fault derived from a [`BindError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub code: FaultCode,
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

/// Binds decoded request arguments to a method's inputs.
pub trait MessageBinder: Send + Sync {
    /// Bind `arguments` (positional, aligned with `method.inputs()`).
    ///
    /// Any fault aborts the whole message; no partial result is returned.
    fn process_message(
        &self,
        method: &Method,
        graph: &WireGraph,
        arguments: &[WireValue],
        repository: &TypeRepository,
    ) -> Result<BoundMessage, BindError>;
}

/// Flattens typed return values into wire structures.
pub trait ResponseBinder: Send + Sync {
    /// Flatten `values` (positional, aligned with `method.outputs()`).
    /// Objects referenced by `values` live in `objects`.
    fn process_response(
        &self,
        method: &Method,
        objects: &ObjectGraph,
        values: &[BoundValue],
        repository: &TypeRepository,
    ) -> Result<WireMessage, BindError>;
}

/// SOAP binding style of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingStyle {
    #[default]
    RpcLiteral,
    DocumentWrapped,
}

impl BindingStyle {
    pub fn request_binder(&self) -> Box<dyn MessageBinder> {
        match self {
            BindingStyle::RpcLiteral => Box::new(RpcLiteralRequestBinder),
            BindingStyle::DocumentWrapped => Box::new(DocumentWrappedRequestBinder),
        }
    }

    pub fn response_binder(&self) -> Box<dyn ResponseBinder> {
        match self {
            BindingStyle::RpcLiteral => Box::new(RpcLiteralResponseBinder),
            BindingStyle::DocumentWrapped => Box::new(DocumentWrappedResponseBinder),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingStyle::RpcLiteral => "rpc-literal",
            BindingStyle::DocumentWrapped => "document-wrapped",
        }
    }
}

impl fmt::Display for BindingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dotted location of a value inside a message, for error reporting
pub(crate) fn child_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

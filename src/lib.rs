//! soapbind: SOAP RPC message binding
//!
//! Converts between loosely-typed wire structures, as produced by a SOAP
//! envelope decoder, and the typed arguments of a service method.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              Service                    │
//! │                                         │
//! │  config      - JSON service definitions │
//! │  definition  - ComplexType / Method     │
//! │  repository  - TypeRepository           │
//! │  binding     - request / response       │
//! │                                         │
//! ├─────────────────────────────────────────┤
//! │     soapbind-wire (WireGraph/Value)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use soapbind::{ComplexType, Method, MessageBinder, RpcLiteralRequestBinder, TypeRepository};
//! use soapbind_wire::{WireGraph, WireValue};
//!
//! let mut repository = TypeRepository::with_xsd_defaults();
//! repository.add_complex_type(
//!     ComplexType::builder("Foo")
//!         .property("foo", "string")
//!         .property("bar", "int")
//!         .build(),
//! );
//! let method = Method::builder("complextype_argument").input("foo", "Foo").build();
//!
//! let mut graph = WireGraph::new();
//! let foo = graph.add_struct(vec![
//!     ("foo", WireValue::from("foobar")),
//!     ("bar", WireValue::Int(19395)),
//! ]);
//!
//! let bound = RpcLiteralRequestBinder
//!     .process_message(&method, &graph, &[foo.into()], &repository)
//!     .expect("bind");
//! let object = bound.get("foo").and_then(|v| v.as_object()).expect("object");
//! assert_eq!(bound.object(object).map(|o| o.type_name.as_str()), Some("Foo"));
//! ```

pub mod binding;
pub mod config;
pub mod definition;
pub mod document;
pub mod repository;

pub use binding::{
    BindError, BindingStyle, BoundMessage, BoundObject, BoundValue, DocumentWrappedRequestBinder,
    DocumentWrappedResponseBinder, Fault, FaultCode, FromBound, MessageBinder, ObjectGraph,
    ObjectId, ResponseBinder, RpcLiteralRequestBinder, RpcLiteralResponseBinder, WireMessage,
};
pub use config::{ConfigError, Service, ServiceConfig};
pub use definition::{ComplexType, Method, Param, Property, TypeSpec};
pub use repository::{ResolvedType, TypeRepository};

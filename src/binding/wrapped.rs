//! `document-wrapped` binding style
//!
//! The request body is a single element named after the operation whose
//! children are the method inputs. The response body is a single
//! `<operation>Response` element holding the outputs, with the `return`
//! output renamed to `<operation>Result`.

use log::debug;
use soapbind_wire::{WireGraph, WireStruct, WireValue};

use super::bound::{BoundMessage, BoundValue, ObjectGraph};
use super::request::bind_inputs;
use super::response::{flatten_outputs, WireMessage};
use super::{BindError, MessageBinder, ResponseBinder};
use crate::definition::Method;
use crate::repository::TypeRepository;

/// Name of the output that carries the operation result
pub const RETURN_PART: &str = "return";

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentWrappedRequestBinder;

impl MessageBinder for DocumentWrappedRequestBinder {
    fn process_message(
        &self,
        method: &Method,
        graph: &WireGraph,
        arguments: &[WireValue],
        repository: &TypeRepository,
    ) -> Result<BoundMessage, BindError> {
        debug!("binding document-wrapped request '{}'", method.name());

        let wrapper = match arguments.first() {
            None | Some(WireValue::Null) => None,
            Some(WireValue::Struct(id)) => {
                Some(graph.get(*id).ok_or(BindError::DanglingStruct(*id))?)
            }
            Some(other) => {
                return Err(BindError::UnexpectedValue {
                    path: method.name().to_string(),
                    expected: "wrapper struct".to_string(),
                    found: other.kind().to_string(),
                });
            }
        };

        let unwrapped: Vec<Option<&WireValue>> = method
            .inputs()
            .iter()
            .map(|input| wrapper.and_then(|w| w.get(&input.name)))
            .collect();
        bind_inputs(method, graph, &unwrapped, repository)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentWrappedResponseBinder;

impl DocumentWrappedResponseBinder {
    /// Name of the wrapper part for `method`
    pub fn response_name(method: &Method) -> String {
        format!("{}Response", method.name())
    }

    /// Key under which the `return` output is placed for `method`
    pub fn result_name(method: &Method) -> String {
        format!("{}Result", method.name())
    }
}

impl ResponseBinder for DocumentWrappedResponseBinder {
    fn process_response(
        &self,
        method: &Method,
        objects: &ObjectGraph,
        values: &[BoundValue],
        repository: &TypeRepository,
    ) -> Result<WireMessage, BindError> {
        debug!("flattening document-wrapped response '{}'", method.name());

        let positional: Vec<Option<&BoundValue>> = (0..method.outputs().len())
            .map(|index| values.get(index))
            .collect();
        let (mut graph, parts) =
            flatten_outputs(method, objects, &positional, repository)?.into_parts();

        let mut wrapper = WireStruct::new();
        for (name, value) in parts {
            if name == RETURN_PART {
                wrapper.set(Self::result_name(method), value);
            } else {
                wrapper.set(name, value);
            }
        }
        let wrapper = graph.push(wrapper);

        Ok(WireMessage::new(
            graph,
            vec![(Self::response_name(method), WireValue::Struct(wrapper))],
        ))
    }
}

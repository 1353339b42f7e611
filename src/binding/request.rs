//! Request direction: wire arguments to bound values

use std::collections::HashMap;

use log::{debug, trace};
use soapbind_wire::{StructId, WireGraph, WireValue};

use super::bound::{BoundMessage, BoundValue, ObjectGraph, ObjectId};
use super::{child_path, BindError, MessageBinder};
use crate::definition::{ComplexType, Method, TypeSpec};
use crate::repository::{ResolvedType, TypeRepository};

/// Binds `rpc-literal` requests: one wire argument per method input, in
/// declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcLiteralRequestBinder;

impl MessageBinder for RpcLiteralRequestBinder {
    fn process_message(
        &self,
        method: &Method,
        graph: &WireGraph,
        arguments: &[WireValue],
        repository: &TypeRepository,
    ) -> Result<BoundMessage, BindError> {
        debug!(
            "binding rpc-literal request '{}' ({} arguments for {} inputs)",
            method.name(),
            arguments.len(),
            method.inputs().len()
        );
        if arguments.len() > method.inputs().len() {
            debug!(
                "ignoring {} surplus arguments for '{}'",
                arguments.len() - method.inputs().len(),
                method.name()
            );
        }

        let positional: Vec<Option<&WireValue>> = (0..method.inputs().len())
            .map(|index| arguments.get(index))
            .collect();
        bind_inputs(method, graph, &positional, repository)
    }
}

/// Bind `arguments` (aligned with the method inputs, `None` for a missing
/// argument) into a message.
pub(crate) fn bind_inputs(
    method: &Method,
    graph: &WireGraph,
    arguments: &[Option<&WireValue>],
    repository: &TypeRepository,
) -> Result<BoundMessage, BindError> {
    let mut binding = RequestBinding::new(graph, repository);
    let mut bound = Vec::with_capacity(method.inputs().len());

    for (input, raw) in method.inputs().iter().zip(arguments) {
        let result = match raw {
            Some(raw) => binding.bind(raw, &input.ty, &input.name).map(Some),
            None => binding.bind_missing(&input.ty),
        };
        match result {
            Ok(Some(value)) => bound.push((input.name.clone(), value)),
            Ok(None) => debug!("argument '{}' of '{}' omitted", input.name, method.name()),
            Err(err) => {
                debug!("request '{}' rejected: {}", method.name(), err);
                return Err(err);
            }
        }
    }

    Ok(BoundMessage::new(binding.finish(), bound))
}

/// Per-call binding state. The visited map keys wire struct identity to the
/// object created for it and is dropped with the call.
struct RequestBinding<'a> {
    graph: &'a WireGraph,
    repository: &'a TypeRepository,
    objects: ObjectGraph,
    visited: HashMap<StructId, ObjectId>,
}

impl<'a> RequestBinding<'a> {
    fn new(graph: &'a WireGraph, repository: &'a TypeRepository) -> Self {
        Self {
            graph,
            repository,
            objects: ObjectGraph::new(),
            visited: HashMap::new(),
        }
    }

    fn finish(self) -> ObjectGraph {
        self.objects
    }

    fn bind(
        &mut self,
        raw: &WireValue,
        spec: &TypeSpec,
        path: &str,
    ) -> Result<BoundValue, BindError> {
        let repository = self.repository;
        let base = repository.resolve(spec)?;
        self.bind_resolved(raw, spec.is_array(), base, path)
    }

    /// Value for a trailing argument the caller did not send. Arrays become
    /// empty, anything else is left out of the message.
    fn bind_missing(&mut self, spec: &TypeSpec) -> Result<Option<BoundValue>, BindError> {
        self.repository.resolve(spec)?;
        Ok(spec.is_array().then(|| BoundValue::Array(Vec::new())))
    }

    fn bind_resolved(
        &mut self,
        raw: &WireValue,
        is_array: bool,
        base: ResolvedType<'a>,
        path: &str,
    ) -> Result<BoundValue, BindError> {
        if !is_array {
            return self.bind_single(raw, base, path);
        }

        if raw.is_null() {
            return Ok(BoundValue::Null);
        }
        let graph = self.graph;
        let items = match (raw, graph.array_items(raw)) {
            (_, Some(items)) => items,
            (WireValue::Struct(id), None) => return Err(BindError::DanglingStruct(*id)),
            (other, None) => return Err(unexpected(path, "array", other)),
        };

        let mut bound = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", path, index);
            bound.push(self.bind_single(item, base, &item_path)?);
        }
        Ok(BoundValue::Array(bound))
    }

    fn bind_single(
        &mut self,
        raw: &WireValue,
        base: ResolvedType<'a>,
        path: &str,
    ) -> Result<BoundValue, BindError> {
        match base {
            ResolvedType::Scalar { .. } => {
                scalar(raw).ok_or_else(|| unexpected(path, "scalar", raw))
            }
            ResolvedType::Complex(ty) => match raw {
                WireValue::Null => Ok(BoundValue::Null),
                WireValue::Struct(id) => self.bind_object(*id, ty, path).map(BoundValue::Object),
                other => Err(unexpected(path, ty.original_name(), other)),
            },
        }
    }

    fn bind_object(
        &mut self,
        id: StructId,
        ty: &'a ComplexType,
        path: &str,
    ) -> Result<ObjectId, BindError> {
        if let Some(existing) = self.visited.get(&id) {
            trace!("struct {} at '{}' already bound as {}", id, path, existing);
            return Ok(*existing);
        }

        let graph = self.graph;
        let repository = self.repository;
        let raw = graph.get(id).ok_or(BindError::DanglingStruct(id))?;

        // Registered before the properties are bound so back-references
        // resolve to this object instead of recursing.
        let object_id = self.objects.alloc(ty.original_name());
        self.visited.insert(id, object_id);

        let mut fields = Vec::with_capacity(ty.properties().len());
        for property in ty.properties() {
            let base = repository.resolve(&property.ty)?;
            let value = match raw.get(&property.name) {
                None | Some(WireValue::Null) if !property.nillable => {
                    return Err(BindError::RequiredPropertyMissing {
                        type_name: ty.original_name().to_string(),
                        property: property.name.clone(),
                    });
                }
                None if property.ty.is_array() => BoundValue::Array(Vec::new()),
                None | Some(WireValue::Null) => BoundValue::Null,
                Some(sub) => {
                    let field_path = child_path(path, &property.name);
                    self.bind_resolved(sub, property.ty.is_array(), base, &field_path)?
                }
            };
            fields.push((property.original_name.clone(), value));
        }

        if let Some(object) = self.objects.get_mut(object_id) {
            object.fields = fields;
        }
        Ok(object_id)
    }
}

fn scalar(raw: &WireValue) -> Option<BoundValue> {
    match raw {
        WireValue::Null => Some(BoundValue::Null),
        WireValue::Bool(b) => Some(BoundValue::Bool(*b)),
        WireValue::Int(n) => Some(BoundValue::Int(*n)),
        WireValue::Float(x) => Some(BoundValue::Float(*x)),
        WireValue::String(s) => Some(BoundValue::String(s.clone())),
        WireValue::List(_) | WireValue::Struct(_) => None,
    }
}

fn unexpected(path: &str, expected: &str, found: &WireValue) -> BindError {
    BindError::UnexpectedValue {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

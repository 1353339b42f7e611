//! Response direction: bound values to wire structures

use std::collections::HashMap;

use log::{debug, trace};
use soapbind_wire::{StructId, WireGraph, WireStruct, WireValue};

use super::bound::{BoundValue, ObjectGraph, ObjectId};
use super::{child_path, BindError, ResponseBinder};
use crate::definition::{ComplexType, Method, TypeSpec};
use crate::repository::{ResolvedType, TypeRepository};

/// Wire-shaped response parts, ready for the envelope encoder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireMessage {
    graph: WireGraph,
    parts: Vec<(String, WireValue)>,
}

impl WireMessage {
    pub fn new(graph: WireGraph, parts: Vec<(String, WireValue)>) -> Self {
        Self { graph, parts }
    }

    pub fn graph(&self) -> &WireGraph {
        &self.graph
    }

    pub fn parts(&self) -> &[(String, WireValue)] {
        &self.parts
    }

    pub fn get(&self, name: &str) -> Option<&WireValue> {
        self.parts.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn into_parts(self) -> (WireGraph, Vec<(String, WireValue)>) {
        (self.graph, self.parts)
    }
}

/// Flattens `rpc-literal` responses: one wire part per method output.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcLiteralResponseBinder;

impl ResponseBinder for RpcLiteralResponseBinder {
    fn process_response(
        &self,
        method: &Method,
        objects: &ObjectGraph,
        values: &[BoundValue],
        repository: &TypeRepository,
    ) -> Result<WireMessage, BindError> {
        debug!(
            "flattening rpc-literal response '{}' ({} values for {} outputs)",
            method.name(),
            values.len(),
            method.outputs().len()
        );

        let positional: Vec<Option<&BoundValue>> = (0..method.outputs().len())
            .map(|index| values.get(index))
            .collect();
        flatten_outputs(method, objects, &positional, repository)
    }
}

/// Flatten `values` (aligned with the method outputs, `None` for a value
/// the service did not return).
pub(crate) fn flatten_outputs(
    method: &Method,
    objects: &ObjectGraph,
    values: &[Option<&BoundValue>],
    repository: &TypeRepository,
) -> Result<WireMessage, BindError> {
    let mut flattening = ResponseFlattening::new(objects, repository);
    let mut parts = Vec::with_capacity(method.outputs().len());

    for (output, value) in method.outputs().iter().zip(values) {
        let result = match value {
            Some(value) => flattening.flatten(value, &output.ty, &output.name).map(Some),
            None => flattening.flatten_missing(&output.ty),
        };
        match result {
            Ok(Some(part)) => parts.push((output.name.clone(), part)),
            Ok(None) => debug!("output '{}' of '{}' omitted", output.name, method.name()),
            Err(err) => {
                debug!("response '{}' rejected: {}", method.name(), err);
                return Err(err);
            }
        }
    }

    Ok(WireMessage::new(flattening.finish(), parts))
}

struct ResponseFlattening<'a> {
    objects: &'a ObjectGraph,
    repository: &'a TypeRepository,
    graph: WireGraph,
    visited: HashMap<ObjectId, StructId>,
}

impl<'a> ResponseFlattening<'a> {
    fn new(objects: &'a ObjectGraph, repository: &'a TypeRepository) -> Self {
        Self {
            objects,
            repository,
            graph: WireGraph::new(),
            visited: HashMap::new(),
        }
    }

    fn finish(self) -> WireGraph {
        self.graph
    }

    fn flatten(
        &mut self,
        value: &BoundValue,
        spec: &TypeSpec,
        path: &str,
    ) -> Result<WireValue, BindError> {
        let repository = self.repository;
        let base = repository.resolve(spec)?;
        self.flatten_resolved(value, spec.is_array(), base, path)
    }

    fn flatten_missing(&mut self, spec: &TypeSpec) -> Result<Option<WireValue>, BindError> {
        self.repository.resolve(spec)?;
        if spec.is_array() {
            Ok(Some(WireValue::Struct(self.graph.array_struct(Vec::new()))))
        } else {
            Ok(None)
        }
    }

    fn flatten_resolved(
        &mut self,
        value: &BoundValue,
        is_array: bool,
        base: ResolvedType<'a>,
        path: &str,
    ) -> Result<WireValue, BindError> {
        if !is_array {
            return self.flatten_single(value, base, path);
        }

        match value {
            BoundValue::Null => Ok(WireValue::Null),
            BoundValue::Array(items) => {
                let mut flat = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, index);
                    flat.push(self.flatten_single(item, base, &item_path)?);
                }
                Ok(WireValue::Struct(self.graph.array_struct(flat)))
            }
            other => Err(unexpected(path, "array", other)),
        }
    }

    fn flatten_single(
        &mut self,
        value: &BoundValue,
        base: ResolvedType<'a>,
        path: &str,
    ) -> Result<WireValue, BindError> {
        match base {
            ResolvedType::Scalar { .. } => {
                scalar(value).ok_or_else(|| unexpected(path, "scalar", value))
            }
            ResolvedType::Complex(ty) => match value {
                BoundValue::Null => Ok(WireValue::Null),
                BoundValue::Object(id) => self.flatten_object(*id, ty, path).map(WireValue::Struct),
                other => Err(unexpected(path, ty.original_name(), other)),
            },
        }
    }

    fn flatten_object(
        &mut self,
        id: ObjectId,
        ty: &'a ComplexType,
        path: &str,
    ) -> Result<StructId, BindError> {
        if let Some(existing) = self.visited.get(&id) {
            trace!("object {} at '{}' already flattened as {}", id, path, existing);
            return Ok(*existing);
        }

        let objects = self.objects;
        let repository = self.repository;
        let object = objects.get(id).ok_or(BindError::DanglingObject(id))?;

        let struct_id = self.graph.add_empty();
        self.visited.insert(id, struct_id);

        let mut entries = WireStruct::new();
        for property in ty.properties() {
            let base = repository.resolve(&property.ty)?;
            let value = match object.field(&property.original_name) {
                None | Some(BoundValue::Null) if !property.nillable => {
                    return Err(BindError::RequiredPropertyMissing {
                        type_name: ty.original_name().to_string(),
                        property: property.name.clone(),
                    });
                }
                None if property.ty.is_array() => {
                    WireValue::Struct(self.graph.array_struct(Vec::new()))
                }
                None | Some(BoundValue::Null) => WireValue::Null,
                Some(field) => {
                    let field_path = child_path(path, &property.name);
                    self.flatten_resolved(field, property.ty.is_array(), base, &field_path)?
                }
            };
            entries.set(property.name.clone(), value);
        }

        if let Some(slot) = self.graph.get_mut(struct_id) {
            *slot = entries;
        }
        Ok(struct_id)
    }
}

fn scalar(value: &BoundValue) -> Option<WireValue> {
    match value {
        BoundValue::Null => Some(WireValue::Null),
        BoundValue::Bool(b) => Some(WireValue::Bool(*b)),
        BoundValue::Int(n) => Some(WireValue::Int(*n)),
        BoundValue::Float(x) => Some(WireValue::Float(*x)),
        BoundValue::String(s) => Some(WireValue::String(s.clone())),
        BoundValue::Array(_) | BoundValue::Object(_) => None,
    }
}

fn unexpected(path: &str, expected: &str, found: &BoundValue) -> BindError {
    BindError::UnexpectedValue {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

//! JSON wire documents
//!
//! Lets the CLI feed decoded messages to the binders without an envelope
//! decoder. A document looks like:
//!
//! ```json
//! {
//!   "structs": [ { "bar": { "$ref": 1 } }, { "foo": { "$ref": 0 } } ],
//!   "arguments": [ { "$ref": 0 } ]
//! }
//! ```
//!
//! `{"$ref": n}` is struct `n` of `structs`, which is how shared and cyclic
//! structs are written. Any other JSON object becomes a fresh struct.
//! Rendering works the other way round: an object is written in full the
//! first time it is reached, with an `$id`, and as `{"$ref": id}` afterwards.

use std::collections::HashSet;

use serde_json::{Map, Number, Value as Json};
use soapbind_wire::{StructId, WireGraph, WireStruct, WireValue};
use thiserror::Error;

use crate::binding::{BoundMessage, BoundValue, ObjectGraph, ObjectId, WireMessage};

pub const REF_KEY: &str = "$ref";
pub const ID_KEY: &str = "$id";
pub const TYPE_KEY: &str = "$type";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed document: {0}")]
    Malformed(String),

    #[error("Reference {reference} is out of range ({declared} structs declared)")]
    BadReference { reference: u64, declared: usize },
}

/// A decoded request: the struct arena plus positional arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireDocument {
    pub graph: WireGraph,
    pub arguments: Vec<WireValue>,
}

impl WireDocument {
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        let json: Json = serde_json::from_str(json)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &Json) -> Result<Self, DocumentError> {
        let document = json
            .as_object()
            .ok_or_else(|| DocumentError::Malformed("document must be a JSON object".to_string()))?;

        let declared = match document.get("structs") {
            None => &[][..],
            Some(Json::Array(structs)) => structs.as_slice(),
            Some(_) => {
                return Err(DocumentError::Malformed("'structs' must be an array".to_string()));
            }
        };

        // Reserve ids first so references may point forward or form cycles.
        let mut graph = WireGraph::new();
        for _ in declared {
            graph.add_empty();
        }
        for (index, entry) in declared.iter().enumerate() {
            let fields = entry.as_object().ok_or_else(|| {
                DocumentError::Malformed(format!("struct {} must be a JSON object", index))
            })?;
            let parsed = parse_struct(fields, &mut graph, declared.len())?;
            if let Some(slot) = graph.get_mut(StructId(index as u32)) {
                *slot = parsed;
            }
        }

        let arguments = match document.get("arguments") {
            None => Vec::new(),
            Some(Json::Array(arguments)) => arguments
                .iter()
                .map(|argument| parse_value(argument, &mut graph, declared.len()))
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(DocumentError::Malformed("'arguments' must be an array".to_string()));
            }
        };

        Ok(Self { graph, arguments })
    }
}

fn parse_struct(
    fields: &Map<String, Json>,
    graph: &mut WireGraph,
    declared: usize,
) -> Result<WireStruct, DocumentError> {
    let mut parsed = WireStruct::new();
    for (key, value) in fields {
        parsed.set(key.as_str(), parse_value(value, graph, declared)?);
    }
    Ok(parsed)
}

fn parse_value(
    json: &Json,
    graph: &mut WireGraph,
    declared: usize,
) -> Result<WireValue, DocumentError> {
    Ok(match json {
        Json::Null => WireValue::Null,
        Json::Bool(b) => WireValue::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => WireValue::Int(i),
            None => WireValue::Float(n.as_f64().ok_or_else(|| {
                DocumentError::Malformed(format!("number {} is out of range", n))
            })?),
        },
        Json::String(s) => WireValue::String(s.clone()),
        Json::Array(items) => WireValue::List(
            items
                .iter()
                .map(|item| parse_value(item, graph, declared))
                .collect::<Result<_, _>>()?,
        ),
        Json::Object(fields) => match reference(fields) {
            Some(reference) => {
                let reference = reference.ok_or_else(|| {
                    DocumentError::Malformed(format!("'{}' must be a struct index", REF_KEY))
                })?;
                if reference as usize >= declared {
                    return Err(DocumentError::BadReference { reference, declared });
                }
                WireValue::Struct(StructId(reference as u32))
            }
            None => {
                let parsed = parse_struct(fields, graph, declared)?;
                WireValue::Struct(graph.push(parsed))
            }
        },
    })
}

/// `Some(Some(n))` for a well-formed `{"$ref": n}`, `Some(None)` for a
/// malformed one, `None` for any other object.
fn reference(fields: &Map<String, Json>) -> Option<Option<u64>> {
    if fields.len() != 1 {
        return None;
    }
    fields.get(REF_KEY).map(Json::as_u64)
}

// ============================================================================
// Rendering
// ============================================================================

/// Render a bound request as `{ name: value, .. }` in argument order.
pub fn render_bound_message(message: &BoundMessage) -> Json {
    let mut renderer = BoundRenderer::new(message.objects());
    let mut out = Map::new();
    for (name, value) in message.iter() {
        out.insert(name.to_string(), renderer.render(value));
    }
    Json::Object(out)
}

/// Render a single bound value whose objects live in `objects`.
pub fn render_bound_value(value: &BoundValue, objects: &ObjectGraph) -> Json {
    BoundRenderer::new(objects).render(value)
}

struct BoundRenderer<'a> {
    objects: &'a ObjectGraph,
    emitted: HashSet<ObjectId>,
}

impl<'a> BoundRenderer<'a> {
    fn new(objects: &'a ObjectGraph) -> Self {
        Self {
            objects,
            emitted: HashSet::new(),
        }
    }

    fn render(&mut self, value: &BoundValue) -> Json {
        match value {
            BoundValue::Null => Json::Null,
            BoundValue::Bool(b) => Json::Bool(*b),
            BoundValue::Int(n) => Json::Number((*n).into()),
            BoundValue::Float(x) => float(*x),
            BoundValue::String(s) => Json::String(s.clone()),
            BoundValue::Array(items) => Json::Array(items.iter().map(|i| self.render(i)).collect()),
            BoundValue::Object(id) => self.render_object(*id),
        }
    }

    fn render_object(&mut self, id: ObjectId) -> Json {
        let objects = self.objects;
        let object = match objects.get(id) {
            Some(object) if self.emitted.insert(id) => object,
            _ => return reference_to(id.0),
        };
        let mut out = Map::new();
        out.insert(TYPE_KEY.to_string(), Json::String(object.type_name.clone()));
        out.insert(ID_KEY.to_string(), Json::Number(id.0.into()));
        for (name, value) in &object.fields {
            out.insert(name.clone(), self.render(value));
        }
        Json::Object(out)
    }
}

/// Render a wire response as `{ part: value, .. }` in part order.
pub fn render_wire_message(message: &WireMessage) -> Json {
    let mut renderer = WireRenderer::new(message.graph());
    let mut out = Map::new();
    for (name, value) in message.parts() {
        out.insert(name.clone(), renderer.render(value));
    }
    Json::Object(out)
}

struct WireRenderer<'a> {
    graph: &'a WireGraph,
    emitted: HashSet<StructId>,
}

impl<'a> WireRenderer<'a> {
    fn new(graph: &'a WireGraph) -> Self {
        Self {
            graph,
            emitted: HashSet::new(),
        }
    }

    fn render(&mut self, value: &WireValue) -> Json {
        match value {
            WireValue::Null => Json::Null,
            WireValue::Bool(b) => Json::Bool(*b),
            WireValue::Int(n) => Json::Number((*n).into()),
            WireValue::Float(x) => float(*x),
            WireValue::String(s) => Json::String(s.clone()),
            WireValue::List(items) => Json::Array(items.iter().map(|i| self.render(i)).collect()),
            WireValue::Struct(id) => self.render_struct(*id),
        }
    }

    fn render_struct(&mut self, id: StructId) -> Json {
        let graph = self.graph;
        let entries = match graph.get(id) {
            Some(entries) if self.emitted.insert(id) => entries,
            _ => return reference_to(id.0),
        };
        let mut out = Map::new();
        out.insert(ID_KEY.to_string(), Json::Number(id.0.into()));
        for (key, value) in entries.iter() {
            out.insert(key.to_string(), self.render(value));
        }
        Json::Object(out)
    }
}

fn reference_to(id: u32) -> Json {
    let mut out = Map::new();
    out.insert(REF_KEY.to_string(), Json::Number(id.into()));
    Json::Object(out)
}

fn float(x: f64) -> Json {
    Number::from_f64(x).map(Json::Number).unwrap_or(Json::Null)
}

//! Wire structures for SOAP message binding
//!
//! A SOAP envelope decoder hands the binder loosely-typed values: scalars,
//! positional lists and property bags. Property bags carry identity: the
//! same decoded object may be referenced from several places, and object
//! graphs may be cyclic. This crate models those values as an arena of
//! structs addressed by [`StructId`], so identity is explicit and cheap to
//! hash.
//!
//! ## Array convention
//!
//! SOAP encoders wrap arrays in a struct exposing an `item` field:
//!
//! ```text
//! { }                      -> empty array (the sentinel)
//! { item: [a, b, c] }      -> three items
//! { item: a }              -> one item, collapsed to a bare value
//! a                        -> one item, the wrapper dropped entirely
//! ```
//!
//! A struct counts as a wrapper only when it has an `item` key, so a bare
//! object with fields of its own is a single item.
//!
//! [`WireGraph::array_items`] and [`WireGraph::array_struct`] implement both
//! directions of that convention.

#![no_std]

extern crate alloc;

mod graph;
mod value;

pub use graph::{ArrayItems, WireGraph, WireStruct, ITEM_KEY};
pub use value::{StructId, WireValue};

//! Struct arena and the `item` array convention

use alloc::string::String;
use alloc::vec::Vec;

use crate::value::{StructId, WireValue};

/// Key under which encoders place array members
pub const ITEM_KEY: &str = "item";

/// A decoded property bag.
///
/// Keys keep their wire order. A key that was never set is *absent*, which
/// the binder treats differently from a key explicitly set to
/// [`WireValue::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireStruct {
    entries: Vec<(String, WireValue)>,
}

impl WireStruct {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Look up a key. `None` means absent; `Some(&WireValue::Null)` means
    /// present with a null value.
    pub fn get(&self, key: &str) -> Option<&WireValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Set a key, replacing the previous value in place if it exists.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<WireValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<WireValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WireValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<WireValue>> FromIterator<(K, V)> for WireStruct {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut s = WireStruct::new();
        for (k, v) in iter {
            s.set(k, v);
        }
        s
    }
}

/// Members of a wire array after applying the `item` convention
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArrayItems<'a> {
    /// The empty-array sentinel
    Empty,
    /// A single member the encoder collapsed into a bare value
    Single(&'a WireValue),
    /// Members listed under `item`
    Many(&'a [WireValue]),
}

impl<'a> ArrayItems<'a> {
    fn from_slice(items: &'a [WireValue]) -> Self {
        if items.is_empty() {
            ArrayItems::Empty
        } else {
            ArrayItems::Many(items)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ArrayItems::Empty => 0,
            ArrayItems::Single(_) => 1,
            ArrayItems::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a WireValue> + 'a {
        let slice: &'a [WireValue] = match *self {
            ArrayItems::Empty => &[],
            ArrayItems::Single(v) => core::slice::from_ref(v),
            ArrayItems::Many(items) => items,
        };
        slice.iter()
    }
}

/// Arena owning every struct of one decoded message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireGraph {
    structs: Vec<WireStruct>,
}

impl WireGraph {
    pub fn new() -> Self {
        Self { structs: Vec::new() }
    }

    /// Add a struct and return its identity.
    pub fn push(&mut self, value: WireStruct) -> StructId {
        let id = StructId(self.structs.len() as u32);
        self.structs.push(value);
        id
    }

    /// Add a struct built from `(key, value)` pairs.
    pub fn add_struct<K, V, I>(&mut self, entries: I) -> StructId
    where
        K: Into<String>,
        V: Into<WireValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.push(entries.into_iter().collect())
    }

    /// Add a struct with no keys, e.g. to be filled in later for cycles.
    pub fn add_empty(&mut self) -> StructId {
        self.push(WireStruct::new())
    }

    pub fn get(&self, id: StructId) -> Option<&WireStruct> {
        self.structs.get(id.index())
    }

    pub fn get_mut(&mut self, id: StructId) -> Option<&mut WireStruct> {
        self.structs.get_mut(id.index())
    }

    /// Set a key on an existing struct. Returns `false` if `id` is not in this graph.
    pub fn set(
        &mut self,
        id: StructId,
        key: impl Into<String>,
        value: impl Into<WireValue>,
    ) -> bool {
        match self.get_mut(id) {
            Some(s) => {
                s.set(key, value);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StructId, &WireStruct)> {
        self.structs
            .iter()
            .enumerate()
            .map(|(i, s)| (StructId(i as u32), s))
    }

    /// Read the members of `raw`, a value found where an array is expected.
    ///
    /// A struct with no keys, or whose `item` is null or an empty list, is
    /// the empty array. A struct with an `item` key is the array wrapper. A
    /// bare value, including a struct without an `item` key, is a single
    /// member. A list is taken as already unwrapped and `Null` is empty.
    ///
    /// Returns `None` if `raw` refers to a struct that is not in this graph.
    pub fn array_items<'a>(&'a self, raw: &'a WireValue) -> Option<ArrayItems<'a>> {
        let id = match raw {
            WireValue::Null => return Some(ArrayItems::Empty),
            WireValue::List(items) => return Some(ArrayItems::from_slice(items)),
            WireValue::Struct(id) => *id,
            single => return Some(ArrayItems::Single(single)),
        };
        let wrapper = self.get(id)?;
        if wrapper.is_empty() {
            return Some(ArrayItems::Empty);
        }
        Some(match wrapper.get(ITEM_KEY) {
            None => ArrayItems::Single(raw),
            Some(WireValue::Null) => ArrayItems::Empty,
            Some(WireValue::List(items)) => ArrayItems::from_slice(items),
            Some(single) => ArrayItems::Single(single),
        })
    }

    /// Wrap `items` in a new array struct. An empty input produces the
    /// sentinel (a struct without an `item` key).
    pub fn array_struct(&mut self, items: Vec<WireValue>) -> StructId {
        let mut wrapper = WireStruct::new();
        if !items.is_empty() {
            wrapper.set(ITEM_KEY, WireValue::List(items));
        }
        self.push(wrapper)
    }
}

//! Name trees (§7.9.6): the persistent-B-tree structure PDF uses for
//! `/Dests`, `/EmbeddedFiles`, `/JavaScript`, and similar string-keyed
//! object catalogs hung off the document catalog's `/Names` entry.
//!
//! [`Document::get_named_destinations`](crate::destinations) predates this
//! module and keeps its own hand-rolled walk; `NameTree` generalizes the
//! same traversal for any leaf value type, and is what the merge engine
//! reaches for when combining two documents' `/Names` trees (§4.G).

use std::collections::BTreeMap;

use crate::dictionary::Dictionary;
use crate::document::Document;
use crate::object::Object;
use crate::Result;

/// A flattened view of a name tree: every `(name, value)` leaf pair,
/// independent of however the `/Kids` intermediate nodes were nested.
pub struct NameTree<V> {
    pub entries: BTreeMap<Vec<u8>, V>,
}

impl<V> Default for NameTree<V> {
    fn default() -> Self {
        NameTree { entries: BTreeMap::new() }
    }
}

impl<V> NameTree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &[u8]) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn insert(&mut self, name: Vec<u8>, value: V) -> Option<V> {
        self.entries.insert(name, value)
    }
}

impl NameTree<Object> {
    /// Flatten `root` (the top `/Names` subdictionary for one category, e.g.
    /// `catalog.get(b"Names")?.as_dict()?.get(b"Dests")`) by walking `/Kids`
    /// recursively and collecting every `/Names` array's `(key, value)`
    /// pairs. Values that are themselves references are left undereferenced;
    /// callers resolve lazily via `document`.
    pub fn read(document: &Document, root: &Dictionary) -> Result<NameTree<Object>> {
        let mut tree = NameTree::new();
        Self::read_node(document, root, &mut tree, &mut 0)?;
        Ok(tree)
    }

    fn read_node(document: &Document, node: &Dictionary, tree: &mut NameTree<Object>, depth: &mut usize) -> Result<()> {
        *depth += 1;
        if *depth > 64 {
            return Ok(());
        }

        if let Ok(kids) = node.get(b"Kids").and_then(Object::as_array) {
            for kid in kids {
                if let Ok(kid_id) = kid.as_reference() {
                    if let Ok(kid_dict) = document.get_dictionary(kid_id) {
                        Self::read_node(document, kid_dict, tree, depth)?;
                    }
                }
            }
        }

        if let Ok(names) = node.get(b"Names").and_then(Object::as_array) {
            let mut it = names.iter();
            while let (Some(key), Some(value)) = (it.next(), it.next()) {
                if let Ok(name) = key.as_str() {
                    tree.insert(name.to_vec(), value.clone());
                }
            }
        }

        *depth -= 1;
        Ok(())
    }

    /// Rebuild a single flat `/Names` node (no `/Kids` nesting) suitable for
    /// writing: one sorted `/Names [key value key value ...]` array, which
    /// is always valid regardless of how deeply the source tree was nested.
    pub fn to_dictionary(&self) -> Dictionary {
        let mut array = Vec::with_capacity(self.entries.len() * 2);
        for (key, value) in &self.entries {
            array.push(Object::string_literal(key.clone()));
            array.push(value.clone());
        }
        let mut dict = Dictionary::new();
        dict.set("Names", Object::Array(array));
        dict
    }
}

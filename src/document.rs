//! Component C: the object store. `Document` owns every indirect object
//! loaded from a file (or built up programmatically), the cross-reference
//! table that locates them, and the trailer dictionary that names the
//! document's entry points (`/Root`, `/Info`, `/Encrypt`, `/ID`).

use std::collections::{BTreeMap, HashSet};

use log::warn;

use crate::dictionary::Dictionary;
use crate::encryption::EncryptionState;
use crate::object::Object;
use crate::xref::{Xref, XrefEntry};
use crate::{Error, ObjectId, Result};

/// A loaded or in-progress PDF document: the object table plus the
/// bookkeeping needed to locate, dereference, and eventually re-serialize
/// its contents.
#[derive(Debug, Clone)]
pub struct Document {
    pub version: String,
    pub objects: BTreeMap<ObjectId, Object>,
    pub reference_table: Xref,
    pub trailer: Dictionary,
    pub max_id: u32,
    pub xref_start: usize,
    pub binary_mark: Vec<u8>,
    pub encryption_state: Option<EncryptionState>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Document {
            version: "1.5".to_string(),
            objects: BTreeMap::new(),
            reference_table: Xref::new(1),
            trailer: Dictionary::new(),
            max_id: 0,
            xref_start: 0,
            binary_mark: vec![0xE2, 0xE3, 0xCF, 0xD3],
            encryption_state: None,
        }
    }

    /// Authenticate `password` against `/Encrypt` without keeping the
    /// resulting key around — used to probe the empty-password case before
    /// asking the caller for a real one.
    pub fn authenticate_password(&self, password: &str) -> Result<()> {
        EncryptionState::decode(self, password)?;
        Ok(())
    }

    /// Next unused object number, for objects appended to the store.
    pub fn new_object_id(&mut self) -> ObjectId {
        self.max_id += 1;
        (self.max_id, 0)
    }

    pub fn get_object(&self, id: ObjectId) -> Result<&Object> {
        self.objects.get(&id).ok_or(Error::MissingXrefEntry)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects.get_mut(&id).ok_or(Error::MissingXrefEntry)
    }

    pub fn get_dictionary(&self, id: ObjectId) -> Result<&Dictionary> {
        self.get_object(id).and_then(Object::as_dict)
    }

    /// Resolve `value` to a concrete object, following one level of
    /// `/Reference` indirection. A direct (non-reference) value dereferences
    /// to itself, tagged with the sentinel id `(0, 0)`.
    pub fn dereference(&self, value: &Object) -> Result<(ObjectId, Object)> {
        match value {
            Object::Reference(id) => self.get_object(*id).map(|obj| (*id, obj.clone())),
            other => Ok(((0, 0), other.clone())),
        }
    }

    /// Follow `value` through however many reference hops it takes to reach
    /// a non-reference object, guarding against cycles (testable property 4).
    pub fn dereference_deep(&self, value: &Object) -> Result<Object> {
        let mut current = value.clone();
        let mut seen = HashSet::new();
        while let Object::Reference(id) = current {
            if !seen.insert(id) {
                return Err(Error::ReferenceCycle(id));
            }
            current = self.get_object(id)?.clone();
        }
        Ok(current)
    }

    pub fn get_catalog(&self) -> Result<&Dictionary> {
        let root = self.trailer.get(b"Root").and_then(Object::as_reference)?;
        self.get_dictionary(root)
    }

    /// Attribute lookup that walks `/Parent` chains (page tree inheritance
    /// for `/Resources`, `/MediaBox`, `/CropBox`, `/Rotate`).
    pub fn get_inherited(&self, page: &Dictionary, key: &[u8]) -> Option<Object> {
        if let Ok(value) = page.get(key) {
            return Some(value.clone());
        }
        let mut current = page.get(b"Parent").and_then(Object::as_reference).ok()?;
        let mut seen = HashSet::new();
        loop {
            if !seen.insert(current) {
                return None;
            }
            let dict = self.get_dictionary(current).ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value.clone());
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
        }
    }

    /// Every page in document order, keyed by its 1-based page number.
    pub fn get_pages(&self) -> BTreeMap<u32, ObjectId> {
        let mut pages = BTreeMap::new();
        let mut next = 1u32;
        if let Ok(root) = self.trailer.get(b"Root").and_then(Object::as_reference) {
            if let Ok(catalog) = self.get_dictionary(root) {
                if let Ok(pages_ref) = catalog.get(b"Pages").and_then(Object::as_reference) {
                    self.collect_pages(pages_ref, &mut pages, &mut next, &mut HashSet::new());
                }
            }
        }
        pages
    }

    fn collect_pages(
        &self, node: ObjectId, out: &mut BTreeMap<u32, ObjectId>, next: &mut u32, seen: &mut HashSet<ObjectId>,
    ) {
        if !seen.insert(node) {
            return;
        }
        let Ok(dict) = self.get_dictionary(node) else { return };
        match dict.get_type() {
            Ok(b"Pages") => {
                if let Ok(kids) = dict.get(b"Kids").and_then(Object::as_array) {
                    for kid in kids {
                        if let Ok(kid_id) = kid.as_reference() {
                            self.collect_pages(kid_id, out, next, seen);
                        }
                    }
                }
            }
            _ => {
                out.insert(*next, node);
                *next += 1;
            }
        }
    }

    /// Object numbers reachable from `/Root`, used by the merge engine and
    /// by a future garbage-collecting writer to tell live objects from
    /// orphans left behind by edits.
    pub fn reachable_objects(&self) -> HashSet<ObjectId> {
        let mut seen = HashSet::new();
        let mut stack = Vec::new();
        if let Ok(root) = self.trailer.get(b"Root").and_then(Object::as_reference) {
            stack.push(root);
        }
        if let Ok(info) = self.trailer.get(b"Info").and_then(Object::as_reference) {
            stack.push(info);
        }
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Ok(obj) = self.get_object(id) {
                Self::collect_references(obj, &mut stack);
            }
        }
        seen
    }

    fn collect_references(obj: &Object, stack: &mut Vec<ObjectId>) {
        match obj {
            Object::Reference(id) => stack.push(*id),
            Object::Array(arr) => arr.iter().for_each(|o| Self::collect_references(o, stack)),
            Object::Dictionary(dict) => dict.iter().for_each(|(_, v)| Self::collect_references(v, stack)),
            Object::Stream(stream) => stream.dict.iter().for_each(|(_, v)| Self::collect_references(v, stack)),
            _ => {}
        }
    }

    /// Mark `id` free in the xref table and drop it from the object map,
    /// the bookkeeping the writer's free-list hygiene and the merge
    /// engine's root cleanup both need.
    pub fn free_object(&mut self, id: ObjectId) {
        self.reference_table.free(id.0);
        self.objects.remove(&id);
    }

    pub fn add_object<O: Into<Object>>(&mut self, object: O) -> ObjectId {
        let id = self.new_object_id();
        self.objects.insert(id, object.into());
        self.reference_table.insert(id.0, XrefEntry::Normal { offset: 0, generation: 0 });
        id
    }

    /// Recompute `/Size` from the highest live object number, warning (per
    /// the repair pass's diagnostic convention) when the trailer disagreed.
    pub fn refresh_size(&mut self) {
        let highest = self.objects.keys().map(|id| id.0).max().unwrap_or(0);
        let correct = highest + 1;
        if self.reference_table.size != correct {
            warn!(
                "Size entry of trailer dictionary is {}, correct value is {}.",
                self.reference_table.size, correct
            );
            self.reference_table.size = correct;
        }
        self.max_id = highest;
        self.trailer.set("Size", Object::Integer(correct as i64));
    }
}

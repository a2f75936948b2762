//! Component G: merging a source document's pages into a destination,
//! renumbering the source's whole object graph into the destination's
//! free object-number space and reconciling the handful of catalog-level
//! dictionaries (`/Names`, `/Dests`, `/AcroForm`, `/Outlines`) that both
//! documents may independently populate.
//!
//! Grounded on [`crate::destinations`]'s `get_named_destinations` walk,
//! generalized here via [`crate::name_tree::NameTree`] for the `/Names`
//! cross-merge, and on [`crate::document::Document::collect_references`]'s
//! recursive-walk shape for the renumbering patch.

use std::collections::{BTreeMap, HashMap};

use crate::dictionary::Dictionary;
use crate::name_tree::NameTree;
use crate::object::Object;
use crate::xref::XrefEntry;
use crate::{Document, Error, ObjectId, Result};

/// Map every source object number (except 0, which is never a real object)
/// to a fresh number in the destination's free space.
fn build_lookup(source: &Document, dest_size: u32) -> HashMap<u32, u32> {
    let mut lookup = HashMap::new();
    let mut next = dest_size;
    for &(num, _) in source.objects.keys() {
        lookup.entry(num).or_insert_with(|| {
            let assigned = next;
            next += 1;
            assigned
        });
    }
    lookup
}

/// Rewrite every `Reference` in `object` through `lookup`, recursing into
/// arrays, dictionaries, and stream dictionaries. References to object
/// numbers the lookup doesn't know about (malformed input) are left as-is.
fn patch_references(object: &mut Object, lookup: &HashMap<u32, u32>) {
    match object {
        Object::Reference(id) => {
            if let Some(&new_num) = lookup.get(&id.0) {
                id.0 = new_num;
            }
        }
        Object::Array(arr) => arr.iter_mut().for_each(|o| patch_references(o, lookup)),
        Object::Dictionary(dict) => {
            for (_, v) in dict.iter_mut() {
                patch_references(v, lookup);
            }
        }
        Object::Stream(stream) => {
            for (_, v) in stream.dict.iter_mut() {
                patch_references(v, lookup);
            }
        }
        _ => {}
    }
}

fn remap(id: ObjectId, lookup: &HashMap<u32, u32>) -> ObjectId {
    (lookup.get(&id.0).copied().unwrap_or(id.0), id.1)
}

impl Document {
    /// Merge `source`'s pages into `self`. When `page_numbers` is `None`,
    /// the whole of `source`'s page tree is appended as a single new kid of
    /// `self`'s `/Pages`; when given, only the listed 1-based page numbers
    /// (from [`Document::get_pages`]) are attached, as direct kids of a new
    /// page-tree node hung off `self`'s `/Pages` (phase 4).
    ///
    /// `source` itself is left untouched; the whole renumbered copy is what
    /// gets folded into `self`.
    pub fn insert_pages(&mut self, source: &Document, page_numbers: Option<&[u32]>) -> Result<()> {
        self.refresh_size();
        let lookup = build_lookup(source, self.reference_table.size);

        let mut migrated: BTreeMap<ObjectId, Object> = BTreeMap::new();
        for (&id, object) in &source.objects {
            let mut object = object.clone();
            patch_references(&mut object, &lookup);
            migrated.insert(remap(id, &lookup), object);
        }

        for (id, object) in &migrated {
            self.objects.insert(*id, object.clone());
            self.reference_table.insert(id.0, XrefEntry::Normal { offset: 0, generation: id.1 });
        }

        let source_root = source.trailer.get(b"Root").and_then(Object::as_reference)?;
        let dest_root_id = remap(source_root, &lookup);

        self.append_pages(&migrated, dest_root_id, page_numbers)?;
        self.merge_names(&migrated, dest_root_id)?;
        self.merge_destinations(&migrated, dest_root_id)?;
        self.merge_acroform(&migrated, dest_root_id)?;
        self.merge_outlines(&migrated, dest_root_id)?;
        self.cleanup_root(source, &lookup)?;

        self.refresh_size();
        Ok(())
    }

    fn append_pages(
        &mut self, migrated: &BTreeMap<ObjectId, Object>, source_root_id: ObjectId, page_numbers: Option<&[u32]>,
    ) -> Result<()> {
        let source_catalog = migrated.get(&source_root_id).and_then(|o| o.as_dict().ok()).ok_or(
            Error::Merge("migrated source has no catalog".into()),
        )?;
        let source_pages_id = source_catalog.get(b"Pages").and_then(Object::as_reference)?;

        let dest_catalog_id = self.trailer.get(b"Root").and_then(Object::as_reference)?;
        let dest_pages_id = self.get_dictionary(dest_catalog_id)?.get(b"Pages").and_then(Object::as_reference)?;

        let kid_id = match page_numbers {
            None => {
                let source_pages = self.get_object_mut(source_pages_id)?.as_dict_mut()?;
                source_pages.set("Parent", Object::Reference(dest_pages_id));
                let count = source_pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
                self.bump_pages_count(dest_pages_id, count)?;
                source_pages_id
            }
            Some(numbers) => {
                let source_pages_dict = self.get_dictionary(source_pages_id)?.clone();
                let mut leaf_ids = BTreeMap::new();
                let mut next = 1u32;
                Self::collect_leaf_pages(migrated, source_pages_id, &source_pages_dict, &mut leaf_ids, &mut next);

                let mut kids = Vec::new();
                for &num in numbers {
                    if let Some(&leaf_id) = leaf_ids.get(&num) {
                        kids.push(Object::Reference(leaf_id));
                    }
                }

                let mut wrapper = Dictionary::new();
                wrapper.set("Type", Object::Name(b"Pages".to_vec()));
                wrapper.set("Parent", Object::Reference(dest_pages_id));
                wrapper.set("Count", Object::Integer(kids.len() as i64));
                wrapper.set("Kids", Object::Array(kids.clone()));
                let wrapper_id = self.add_object(wrapper);

                for kid in &kids {
                    if let Object::Reference(leaf_id) = kid {
                        if let Ok(leaf) = self.get_object_mut(*leaf_id).and_then(Object::as_dict_mut) {
                            leaf.set("Parent", Object::Reference(wrapper_id));
                        }
                    }
                }

                self.bump_pages_count(dest_pages_id, kids.len() as i64)?;
                wrapper_id
            }
        };

        let dest_pages = self.get_object_mut(dest_pages_id)?.as_dict_mut()?;
        let mut new_kids = dest_pages.get(b"Kids").and_then(Object::as_array).ok().cloned().unwrap_or_default();
        new_kids.push(Object::Reference(kid_id));
        dest_pages.set("Kids", Object::Array(new_kids));

        Ok(())
    }

    /// Walk a (migrated) page-tree node, numbering its leaves 1-based in
    /// document order, the same traversal `Document::collect_pages` uses.
    fn collect_leaf_pages(
        migrated: &BTreeMap<ObjectId, Object>, node_id: ObjectId, node: &Dictionary, out: &mut BTreeMap<u32, ObjectId>,
        next: &mut u32,
    ) {
        match node.get_type() {
            Ok(b"Pages") => {
                if let Ok(kids) = node.get(b"Kids").and_then(Object::as_array) {
                    for kid in kids {
                        if let Ok(kid_id) = kid.as_reference() {
                            if let Some(Ok(kid_dict)) = migrated.get(&kid_id).map(Object::as_dict) {
                                Self::collect_leaf_pages(migrated, kid_id, kid_dict, out, next);
                            }
                        }
                    }
                }
            }
            _ => {
                out.insert(*next, node_id);
                *next += 1;
            }
        }
    }

    fn bump_pages_count(&mut self, pages_id: ObjectId, delta: i64) -> Result<()> {
        let dict = self.get_object_mut(pages_id)?.as_dict_mut()?;
        let current = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        dict.set("Count", Object::Integer(current + delta));
        if let Ok(parent) = dict.get(b"Parent").and_then(Object::as_reference) {
            self.bump_pages_count(parent, delta)?;
        }
        Ok(())
    }

    /// Cross-merge `/Names` subtrees (`Dests`, `EmbeddedFiles`, `JavaScript`,
    /// and any other category present in either document) using sorted-merge
    /// on keys; destination entries win on collision except under `Dests`,
    /// which accepts the source's override per the merge policy.
    fn merge_names(&mut self, migrated: &BTreeMap<ObjectId, Object>, source_root_id: ObjectId) -> Result<()> {
        let source_names_dict = migrated
            .get(&source_root_id)
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"Names").ok())
            .and_then(|v| v.as_dict().ok())
            .cloned();
        let Some(source_names_dict) = source_names_dict else { return Ok(()) };

        let dest_catalog_id = self.trailer.get(b"Root").and_then(Object::as_reference)?;
        let dest_has_names = self.get_dictionary(dest_catalog_id)?.get(b"Names").is_ok();

        let mut dest_names_dict = if dest_has_names {
            let dest_names_id = self.get_dictionary(dest_catalog_id)?.get(b"Names").and_then(Object::as_reference);
            match dest_names_id {
                Ok(id) => self.get_dictionary(id)?.clone(),
                Err(_) => self.get_dictionary(dest_catalog_id)?.get(b"Names").and_then(Object::as_dict)?.clone(),
            }
        } else {
            Dictionary::new()
        };

        for (category, source_tree_ref) in source_names_dict.iter() {
            let Ok(source_tree_dict) = source_tree_ref.as_dict() else { continue };
            let source_tree = NameTree::<Object>::read(self, source_tree_dict).unwrap_or_default();

            let mut merged = match dest_names_dict.get(category).and_then(Object::as_dict) {
                Ok(existing) => NameTree::<Object>::read(self, existing).unwrap_or_default(),
                Err(_) => NameTree::new(),
            };

            let overrides_allowed = category == b"Dests";
            for (key, value) in source_tree.entries {
                if overrides_allowed || merged.get(&key).is_none() {
                    merged.insert(key, value);
                }
            }

            let merged_dict = merged.to_dictionary();
            let merged_id = self.add_object(merged_dict);
            dest_names_dict.set(category.clone(), Object::Reference(merged_id));
        }

        let names_id = self.add_object(dest_names_dict);
        let catalog = self.get_object_mut(dest_catalog_id)?.as_dict_mut()?;
        catalog.set("Names", Object::Reference(names_id));
        Ok(())
    }

    /// Union the legacy (pre-name-tree) `/Dests` dictionary, if either
    /// document still carries one; duplicate keys are dropped in favor of
    /// whichever document already held them.
    fn merge_destinations(&mut self, migrated: &BTreeMap<ObjectId, Object>, source_root_id: ObjectId) -> Result<()> {
        let source_dests = migrated
            .get(&source_root_id)
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"Dests").ok())
            .and_then(|v| v.as_dict().ok())
            .cloned();
        let Some(source_dests) = source_dests else { return Ok(()) };

        let dest_catalog_id = self.trailer.get(b"Root").and_then(Object::as_reference)?;
        let mut dest_dests = match self.get_dictionary(dest_catalog_id)?.get(b"Dests").and_then(Object::as_reference) {
            Ok(id) => self.get_dictionary(id)?.clone(),
            Err(_) => Dictionary::new(),
        };

        for (key, value) in source_dests.iter() {
            if !dest_dests.has(key) {
                dest_dests.set(key.clone(), value.clone());
            }
        }

        let id = self.add_object(dest_dests);
        let catalog = self.get_object_mut(dest_catalog_id)?.as_dict_mut()?;
        catalog.set("Dests", Object::Reference(id));
        Ok(())
    }

    /// Merge `/AcroForm`: source fields are wrapped under a fresh top-level
    /// field so their `/T` partial names can't collide with the
    /// destination's, the default `/DA`/`/Q` are back-filled onto terminal
    /// text fields that lack them, `/CO` is concatenated, the destination's
    /// `/DR` wins, `/NeedAppearances` OR-unions (true dominates), and `/XFA`
    /// is dropped (the two documents' XFA packets can't be reconciled).
    fn merge_acroform(&mut self, migrated: &BTreeMap<ObjectId, Object>, source_root_id: ObjectId) -> Result<()> {
        let source_form = migrated
            .get(&source_root_id)
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"AcroForm").ok())
            .and_then(|v| v.as_dict().ok())
            .cloned();
        let Some(source_form) = source_form else { return Ok(()) };

        let dest_catalog_id = self.trailer.get(b"Root").and_then(Object::as_reference)?;
        let dest_form_ref = self.get_dictionary(dest_catalog_id)?.get(b"AcroForm").and_then(Object::as_reference).ok();

        let source_fields = source_form.get(b"Fields").and_then(Object::as_array).ok().cloned().unwrap_or_default();
        let default_da = source_form.get(b"DA").ok().cloned();
        let default_q = source_form.get(b"Q").ok().cloned();
        for field_ref in &source_fields {
            if let Ok(field_id) = field_ref.as_reference() {
                if let Ok(field) = self.get_object_mut(field_id).and_then(Object::as_dict_mut) {
                    if !field.has(b"DA") {
                        if let Some(da) = default_da.clone() {
                            field.set("DA", da);
                        }
                    }
                    if !field.has(b"Q") {
                        if let Some(q) = default_q.clone() {
                            field.set("Q", q);
                        }
                    }
                }
            }
        }

        let mut wrapper = Dictionary::new();
        wrapper.set("T", Object::string_literal(format!("merged-{}", source_root_id.0)));
        wrapper.set("Kids", Object::Array(source_fields.clone()));
        let wrapper_id = self.add_object(wrapper);
        for field_ref in &source_fields {
            if let Ok(field_id) = field_ref.as_reference() {
                if let Ok(field) = self.get_object_mut(field_id).and_then(Object::as_dict_mut) {
                    field.set("Parent", Object::Reference(wrapper_id));
                }
            }
        }

        let mut merged_form = match dest_form_ref {
            Some(id) => self.get_dictionary(id)?.clone(),
            None => Dictionary::new(),
        };

        let mut fields = merged_form.get(b"Fields").and_then(Object::as_array).ok().cloned().unwrap_or_default();
        fields.push(Object::Reference(wrapper_id));
        merged_form.set("Fields", Object::Array(fields));

        if !merged_form.has(b"DR") {
            if let Ok(dr) = source_form.get(b"DR") {
                merged_form.set("DR", dr.clone());
            }
        }

        let mut co = merged_form.get(b"CO").and_then(Object::as_array).ok().cloned().unwrap_or_default();
        if let Ok(source_co) = source_form.get(b"CO").and_then(Object::as_array) {
            co.extend(source_co.iter().cloned());
        }
        if !co.is_empty() {
            merged_form.set("CO", Object::Array(co));
        }

        let dest_needs = merged_form.get(b"NeedAppearances").and_then(Object::as_bool).unwrap_or(false);
        let source_needs = source_form.get(b"NeedAppearances").and_then(Object::as_bool).unwrap_or(false);
        if dest_needs || source_needs {
            merged_form.set("NeedAppearances", Object::Boolean(true));
        }

        merged_form.remove(b"XFA");

        let merged_id = self.add_object(merged_form);
        let catalog = self.get_object_mut(dest_catalog_id)?.as_dict_mut()?;
        catalog.set("AcroForm", Object::Reference(merged_id));
        Ok(())
    }

    /// Adopt the source's outline tree as-is when the destination has none;
    /// otherwise append it as the destination root's last child, relinking
    /// `/First`/`/Last`/`/Next`/`/Prev`/`/Parent` to keep the doubly-linked
    /// list well-formed and summing `/Count` (append-as-child only, no
    /// collapsing — see the design notes).
    fn merge_outlines(&mut self, migrated: &BTreeMap<ObjectId, Object>, source_root_id: ObjectId) -> Result<()> {
        let source_outlines_ref = migrated
            .get(&source_root_id)
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"Outlines").and_then(Object::as_reference).ok());
        let Some(source_outlines_id) = source_outlines_ref else { return Ok(()) };

        let dest_catalog_id = self.trailer.get(b"Root").and_then(Object::as_reference)?;
        let dest_outlines_ref = self.get_dictionary(dest_catalog_id)?.get(b"Outlines").and_then(Object::as_reference).ok();

        match dest_outlines_ref {
            None => {
                let catalog = self.get_object_mut(dest_catalog_id)?.as_dict_mut()?;
                catalog.set("Outlines", Object::Reference(source_outlines_id));
            }
            Some(dest_outlines_id) => {
                let source_first = self.get_dictionary(source_outlines_id)?.get(b"First").and_then(Object::as_reference).ok();
                let source_last = self.get_dictionary(source_outlines_id)?.get(b"Last").and_then(Object::as_reference).ok();
                let source_count = self.get_dictionary(source_outlines_id)?.get(b"Count").and_then(Object::as_i64).unwrap_or(0);

                let dest_last = self.get_dictionary(dest_outlines_id)?.get(b"Last").and_then(Object::as_reference).ok();

                if let Some(first_kid) = source_first {
                    if let Ok(first_kid_dict) = self.get_object_mut(first_kid).and_then(Object::as_dict_mut) {
                        first_kid_dict.set("Parent", Object::Reference(dest_outlines_id));
                        if let Some(prev_last) = dest_last {
                            first_kid_dict.set("Prev", Object::Reference(prev_last));
                        } else {
                            first_kid_dict.remove(b"Prev");
                        }
                    }
                    if let Some(prev_last) = dest_last {
                        if let Ok(prev_last_dict) = self.get_object_mut(prev_last).and_then(Object::as_dict_mut) {
                            prev_last_dict.set("Next", Object::Reference(first_kid));
                        }
                    }
                }

                // Every migrated top-level source outline item becomes a
                // direct child of the destination root, so each needs its
                // `/Parent` repointed even past the first one.
                let mut cursor = source_first;
                while let Some(id) = cursor {
                    let next = self.get_dictionary(id)?.get(b"Next").and_then(Object::as_reference).ok();
                    if let Ok(dict) = self.get_object_mut(id).and_then(Object::as_dict_mut) {
                        dict.set("Parent", Object::Reference(dest_outlines_id));
                    }
                    cursor = next;
                }

                let dest_outlines = self.get_object_mut(dest_outlines_id)?.as_dict_mut()?;
                if dest_outlines.get(b"First").is_err() {
                    if let Some(first_kid) = source_first {
                        dest_outlines.set("First", Object::Reference(first_kid));
                    }
                }
                if let Some(last_kid) = source_last {
                    dest_outlines.set("Last", Object::Reference(last_kid));
                }
                let dest_count = dest_outlines.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
                dest_outlines.set("Count", Object::Integer(dest_count + source_count));
            }
        }

        Ok(())
    }

    /// Free the migrated copies of the source's own `/Root` and `/Info`
    /// objects: their subtrees have already been grafted onto `self`, so the
    /// bare catalog/info dicts themselves are dead weight.
    fn cleanup_root(&mut self, source: &Document, lookup: &HashMap<u32, u32>) -> Result<()> {
        if let Ok(root) = source.trailer.get(b"Root").and_then(Object::as_reference) {
            self.free_object(remap(root, lookup));
        }
        if let Ok(info) = source.trailer.get(b"Info").and_then(Object::as_reference) {
            self.free_object(remap(info, lookup));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use crate::dictionary::Dictionary;
use crate::error::{Error, ParseError};
use crate::object::{Object, Stream};
use crate::Result;

/// One slot of the cross-reference table (component B).
#[derive(Debug, Clone, PartialEq)]
pub enum XrefEntry {
    /// Object number is unused. `generation` is the generation that would be
    /// assigned if the slot is reused (PDF's free-list bookkeeping).
    Free { next_free: u32, generation: u16 },
    /// Never referenced and never part of the free-list chain: the
    /// placeholder created for object `0` before the real chain is known,
    /// or for objects dropped by a merge's root cleanup.
    UnusableFree,
    /// A direct object living at a byte offset in the file.
    Normal { offset: u32, generation: u16 },
    /// An object embedded in an object stream.
    Compressed { container: u32, index: u16 },
}

impl XrefEntry {
    pub fn generation(&self) -> u16 {
        match self {
            XrefEntry::Free { generation, .. } => *generation,
            XrefEntry::UnusableFree => 0,
            XrefEntry::Normal { generation, .. } => *generation,
            XrefEntry::Compressed { .. } => 0,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, XrefEntry::Free { .. } | XrefEntry::UnusableFree)
    }
}

/// The full object-number -> entry mapping, merged across every xref
/// section/stream a document's update chain contains.
#[derive(Debug, Clone, Default)]
pub struct Xref {
    pub entries: BTreeMap<u32, XrefEntry>,
    /// Trailer `/Size`: one greater than the largest object number present.
    pub size: u32,
}

impl Xref {
    pub fn new(size: u32) -> Self {
        Xref {
            entries: BTreeMap::new(),
            size,
        }
    }

    pub fn get(&self, object_number: u32) -> Option<&XrefEntry> {
        self.entries.get(&object_number)
    }

    pub fn insert(&mut self, object_number: u32, entry: XrefEntry) {
        self.entries.insert(object_number, entry);
    }

    pub fn max_id(&self) -> u32 {
        self.entries.keys().next_back().copied().unwrap_or(0)
    }

    /// Merge an older xref section into this (newer) one.
    ///
    /// Per PDF incremental-update semantics the first time an object number
    /// is seen wins: entries already present in `self` (which, by
    /// construction, come from a section written later in the update chain)
    /// are never overwritten by `other`.
    pub fn merge(&mut self, other: Xref) {
        for (id, entry) in other.entries {
            self.entries.entry(id).or_insert(entry);
        }
        self.size = self.size.max(other.size);
    }

    /// Apply the two classic-bug repairs from §4.B.6: synthesize a free
    /// object 0 when `/Size` already accounts for it but the table doesn't,
    /// and shift every key down by one when the table was built starting at
    /// object 1 with no object 0 at all.
    pub fn normalize(&mut self) {
        if self.size as usize == self.entries.len() + 1 && !self.entries.contains_key(&0) {
            self.entries.insert(
                0,
                XrefEntry::Free {
                    next_free: 0,
                    generation: 65535,
                },
            );
        } else if !self.entries.contains_key(&0) && self.entries.contains_key(&1) {
            let shifted: BTreeMap<u32, XrefEntry> = self
                .entries
                .iter()
                .map(|(&id, entry)| (id - 1, entry.clone()))
                .collect();
            self.entries = shifted;
        }

        self.entries.entry(0).or_insert(XrefEntry::Free {
            next_free: 0,
            generation: 65535,
        });

        let entry_count = self.max_id().saturating_add(1);
        self.size = self.size.max(entry_count);
    }

    /// Object numbers currently marked free, in free-list order starting
    /// from object 0 (the head of the circular chain).
    pub fn free_list(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut current = 0u32;
        let mut seen = std::collections::HashSet::new();
        loop {
            if !seen.insert(current) {
                break;
            }
            out.push(current);
            match self.entries.get(&current) {
                Some(XrefEntry::Free { next_free, .. }) if *next_free != 0 || out.len() == 1 => {
                    if *next_free == current {
                        break;
                    }
                    current = *next_free;
                }
                _ => break,
            }
        }
        out
    }

    /// Link `object_number` into the free chain with a bumped generation,
    /// as required of the writer's free-list hygiene.
    pub fn free(&mut self, object_number: u32) {
        let head_next = match self.entries.get(&0) {
            Some(XrefEntry::Free { next_free, .. }) => *next_free,
            _ => 0,
        };
        let generation = match self.entries.get(&object_number) {
            Some(entry) => entry.generation().saturating_add(1),
            None => 0,
        };
        self.entries.insert(
            object_number,
            XrefEntry::Free {
                next_free: head_next,
                generation,
            },
        );
        self.entries.insert(
            0,
            XrefEntry::Free {
                next_free: object_number,
                generation: 65535,
            },
        );
    }
}

/// Decode an xref stream (§4.B.3): an indirect object whose stream body,
/// once filtered, holds fixed-width binary records governed by `/W` and
/// `/Index`. Returns the table plus the stream's own dictionary, which
/// doubles as the trailer.
pub fn decode_xref_stream(mut stream: Stream) -> Result<(Xref, Dictionary)> {
    stream.decode()?;
    let content = stream.content.clone().unwrap_or_default();

    let widths = stream
        .dict
        .get(b"W")
        .and_then(Object::as_array)
        .map_err(|_| Error::Parse(ParseError::InvalidXref))?;
    if widths.len() != 3 {
        return Err(Error::Parse(ParseError::InvalidXref));
    }
    let w: Vec<usize> = widths
        .iter()
        .map(|o| o.as_i64().map(|v| v as usize))
        .collect::<Result<_>>()?;
    let (w0, w1, w2) = (w[0], w[1], w[2]);
    let record_width = w0 + w1 + w2;
    if record_width == 0 {
        return Err(Error::Parse(ParseError::InvalidXref));
    }

    let size = stream.dict.get(b"Size").and_then(Object::as_i64).unwrap_or(0) as u32;

    let index: Vec<(u32, u32)> = match stream.dict.get(b"Index").and_then(Object::as_array) {
        Ok(arr) => arr
            .chunks_exact(2)
            .filter_map(|pair| Some((pair[0].as_i64().ok()? as u32, pair[1].as_i64().ok()? as u32)))
            .collect(),
        Err(_) => vec![(0, size)],
    };

    let mut xref = Xref::new(size);
    let mut cursor = 0usize;

    let read_field = |bytes: &[u8], width: usize, default: u64| -> u64 {
        if width == 0 {
            return default;
        }
        bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
    };

    for (first, count) in index {
        for offset in 0..count {
            if cursor + record_width > content.len() {
                break;
            }
            let record = &content[cursor..cursor + record_width];
            cursor += record_width;

            let field_type = if w0 == 0 { 1 } else { read_field(&record[0..w0], w0, 1) };
            let field2 = read_field(&record[w0..w0 + w1], w1, 0);
            let field3 = read_field(&record[w0 + w1..w0 + w1 + w2], w2, 0);

            let object_number = first + offset;
            let entry = match field_type {
                0 => XrefEntry::Free {
                    next_free: field2 as u32,
                    generation: field3 as u16,
                },
                1 => XrefEntry::Normal {
                    offset: field2 as u32,
                    generation: field3 as u16,
                },
                2 => XrefEntry::Compressed {
                    container: field2 as u32,
                    index: field3 as u16,
                },
                _ => continue,
            };
            xref.insert(object_number, entry);
        }
    }

    let trailer = stream.dict.clone();
    Ok((xref, trailer))
}

/// Merge the entries of `src` into `dest` under the given name — the thin
/// wrapper over [`Xref::merge`] promised by the library API surface (§6) for
/// callers who want to combine two tables without running the full
/// page-import engine.
pub fn merge_xref_tables(_name: &str, src: &Xref, dest: &mut Xref) {
    dest.merge(src.clone());
}

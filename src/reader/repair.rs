//! §4.B.5's repair fallback: when the xref section the trailer points at
//! can't be parsed (truncated, corrupt, or simply missing), fall back to a
//! linear scan of the whole buffer for `N G obj` envelopes and synthesize a
//! single xref section from whatever parses cleanly, instead of failing the
//! whole load.

use std::collections::HashSet;

use log::warn;

use super::Reader;
use crate::dictionary::Dictionary;
use crate::error::{Error, XrefError};
use crate::object::Object;
use crate::parser::{self, ParserInput};
use crate::xref::{Xref, XrefEntry};
use crate::Result;

pub struct RepairPass;

impl RepairPass {
    /// Scan `reader.buffer` for every `N G obj` preamble, parse each
    /// envelope, and build one xref section plus the last `trailer`
    /// dictionary found in the file. Emits a single `repaired: xreftable`
    /// diagnostic on success.
    pub fn run(reader: &Reader) -> Result<(Xref, Dictionary)> {
        let buffer = reader.buffer;
        let mut xref = Xref::new(0);
        let mut pos = 0usize;

        while let Some(rel) = find_obj_preamble(&buffer[pos..]) {
            let offset = pos + rel;
            let mut already_seen = HashSet::new();
            if let Ok((id, _object)) = reader.read_object(offset, None, &mut already_seen) {
                xref.insert(id.0, XrefEntry::Normal { offset: offset as u32, generation: id.1 });
            }
            pos = offset + 1;
        }

        if xref.entries.is_empty() {
            return Err(Error::Xref(XrefError::Corrupt));
        }
        xref.size = xref.max_id().saturating_add(1);

        let trailer = find_last_trailer(buffer).unwrap_or_default();

        warn!("repaired: xreftable");
        Ok((xref, trailer))
    }

    /// Walk backward from a damaged trailer's `/Prev = 0` looking for a
    /// `startxref` keyword followed by an `xref` section, the fallback named
    /// in §4.B.5 for locating a previous revision's table when the forward
    /// pointer itself is unusable.
    pub fn scan_for_previous_xref(buffer: &[u8], before: usize) -> Option<usize> {
        let mut search_end = before;
        loop {
            let start_kw = rfind(&buffer[..search_end], b"startxref")?;
            if let Some(offset) = parser::xref_start(ParserInput::new_extra(&buffer[start_kw + b"startxref".len()..], "")) {
                if offset >= 0 && (offset as usize) < before {
                    return Some(offset as usize);
                }
            }
            if start_kw == 0 {
                return None;
            }
            search_end = start_kw;
        }
    }
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| &haystack[i..i + needle.len()] == needle)
}

/// Find the byte offset of the next `N G obj` preamble at or after the start
/// of `buf`, relative to `buf`'s own start.
fn find_obj_preamble(buf: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < buf.len() {
        if !buf[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        let mut j = i;
        while j < buf.len() && buf[j].is_ascii_digit() {
            j += 1;
        }
        let mut k = j;
        while k < buf.len() && buf[k] == b' ' {
            k += 1;
        }
        if k > j {
            let gen_start = k;
            while k < buf.len() && buf[k].is_ascii_digit() {
                k += 1;
            }
            if k > gen_start {
                let mut m = k;
                while m < buf.len() && buf[m] == b' ' {
                    m += 1;
                }
                if buf[m..].starts_with(b"obj") {
                    return Some(start);
                }
            }
        }
        i = j.max(start + 1);
    }
    None
}

fn find_last_trailer(buffer: &[u8]) -> Option<Dictionary> {
    let mut best = None;
    let mut pos = 0usize;
    while let Some(rel) = find_substring(&buffer[pos..], b"trailer") {
        let idx = pos + rel;
        let after = idx + b"trailer".len();
        if let Some(Object::Dictionary(dict)) = parser::direct_object(ParserInput::new_extra(&buffer[after..], "trailer")) {
            best = Some(dict);
        }
        pos = after;
    }
    best
}

fn find_substring(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

//! Incremental update (§4.F): append a new revision after the original
//! bytes rather than rewriting the whole file, the form PDF readers expect
//! from an edited-in-place document (digitally signed PDFs in particular
//! break if anything before the signature's byte range changes).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dictionary::Dictionary;
use crate::encryption;
use crate::object::Object;
use crate::{Document, Result};

use super::serialize;
use super::SaveOptions;

/// A document loaded from a known byte buffer, tracked so it can be saved
/// back out as an incremental update instead of a full rewrite.
#[derive(Debug, Clone)]
pub struct IncrementalDocument {
    pub buffer: Vec<u8>,
    pub document: Document,
}

impl IncrementalDocument {
    pub fn create_from(buffer: Vec<u8>, document: Document) -> Self {
        IncrementalDocument { buffer, document }
    }

    pub fn save_to<W: Write>(&mut self, w: &mut W) -> Result<()> {
        self.save_with_options(w, SaveOptions::default())
    }

    /// Serialize to a path, appending the new revision after the file's
    /// original bytes (re-reads nothing; `self.buffer` already holds them).
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Append every currently-held object as a fresh revision, with a new
    /// xref section whose `/Prev` points back at the original file's own
    /// xref. Every live object is rewritten, not only ones touched since
    /// load: the store keeps no per-object dirty flag, so "did this change"
    /// can't be answered more cheaply than "did this round-trip identically
    /// through the object model," which isn't meaningfully cheaper.
    pub fn save_with_options<W: Write>(&mut self, w: &mut W, options: SaveOptions) -> Result<()> {
        let options = &options;
        w.write_all(&self.buffer)?;
        if !self.buffer.ends_with(b"\n") {
            w.write_all(b"\n")?;
        }

        self.document.refresh_size();
        let encrypt_ref = self.document.trailer.get(b"Encrypt").and_then(Object::as_reference).ok();

        let base = self.buffer.len() as u64 + if self.buffer.ends_with(b"\n") { 0 } else { 1 };
        let mut written_len = base;
        let mut offsets: BTreeMap<u32, u32> = BTreeMap::new();

        for (&id, object) in self.document.objects.clone().iter() {
            let mut object = object.clone();
            if Some(id) != encrypt_ref {
                if let Some(state) = &self.document.encryption_state {
                    encryption::encrypt_object(state, id, &mut object)?;
                }
            }
            offsets.insert(id.0, written_len as u32);
            let mut buf = Vec::new();
            serialize::write_indirect_object(&mut buf, id, &object)?;
            w.write_all(&buf)?;
            written_len += buf.len() as u64;
        }

        let xref_offset = written_len;
        let prev = self.document.xref_start as i64;

        if options.use_xref_stream {
            write_xref_stream(&mut self.document, w, xref_offset as u32, &offsets, prev)?;
        } else {
            write_classic_xref(w, xref_offset, &offsets, &self.document.trailer, prev)?;
        }

        Ok(())
    }
}

fn write_classic_xref<W: Write>(
    w: &mut W, xref_offset: u64, offsets: &BTreeMap<u32, u32>, trailer: &Dictionary, prev: i64,
) -> Result<()> {
    w.write_all(b"xref\n")?;
    for (&obj_num, &offset) in offsets {
        w.write_all(format!("{} 1\n", obj_num).as_bytes())?;
        w.write_all(format!("{:010} {:05} n \n", offset, 0).as_bytes())?;
    }

    let mut trailer = trailer.clone();
    trailer.set("Prev", Object::Integer(prev));

    w.write_all(b"trailer\n")?;
    let mut buf = Vec::new();
    serialize::write_dictionary(&mut buf, &trailer)?;
    w.write_all(&buf)?;
    w.write_all(format!("\nstartxref\n{}\n%%EOF\n", xref_offset).as_bytes())?;
    Ok(())
}

fn write_xref_stream<W: Write>(
    document: &mut Document, w: &mut W, xref_offset: u32, offsets: &BTreeMap<u32, u32>, prev: i64,
) -> Result<()> {
    let stream_id = document.new_object_id();

    let mut sorted_nums: Vec<u32> = offsets.keys().copied().collect();
    sorted_nums.push(stream_id.0);
    sorted_nums.sort_unstable();
    let first = *sorted_nums.first().unwrap_or(&0);
    let count = sorted_nums.len() as u32;

    let mut content = Vec::with_capacity(sorted_nums.len() * 5);
    for &obj_num in &sorted_nums {
        if let Some(&offset) = offsets.get(&obj_num) {
            content.push(1);
            content.extend_from_slice(&offset.to_be_bytes());
            content.extend_from_slice(&[0, 0]);
        } else {
            // the stream object itself, offset filled in below
            content.push(1);
            content.extend_from_slice(&xref_offset.to_be_bytes());
            content.extend_from_slice(&[0, 0]);
        }
    }

    let mut dict = document.trailer.clone();
    dict.set("Type", Object::Name(b"XRef".to_vec()));
    dict.set("Size", Object::Integer((document.reference_table.size) as i64));
    dict.set("Index", Object::Array(vec![Object::Integer(first as i64), Object::Integer(count as i64)]));
    dict.set("W", Object::Array(vec![Object::Integer(1), Object::Integer(4), Object::Integer(2)]));
    dict.set("Prev", Object::Integer(prev));

    let mut stream = crate::object::Stream::new(dict, Vec::new());
    stream.set_content(content);
    stream.encode()?;

    let mut buf = Vec::new();
    serialize::write_indirect_object(&mut buf, stream_id, &Object::Stream(stream))?;
    w.write_all(&buf)?;

    w.write_all(format!("startxref\n{}\n%%EOF\n", xref_offset).as_bytes())?;
    Ok(())
}

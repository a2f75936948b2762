//! Object streams (`/Type /ObjStm`, PDF 1.5+): a compressed container that
//! packs several non-stream indirect objects into one filtered stream body,
//! addressed by the xref table's `XrefEntry::Compressed` entries.

use std::collections::BTreeMap;

use crate::error::ParseError;
use crate::object::Stream;
use crate::parser::{self, ParserInput};
use crate::{Error, Object, ObjectId, Result};

/// The decoded contents of one object stream: every object it packs,
/// indexed by `(object number, generation 0)`.
pub struct ObjectStream {
    pub objects: BTreeMap<ObjectId, Object>,
}

impl ObjectStream {
    /// Decode `stream` (running the filter pipeline if not already decoded)
    /// and parse its `/N` header pairs plus the `/First`-offset object
    /// bodies that follow them.
    pub fn new(stream: &mut Stream) -> Result<ObjectStream> {
        stream.decode()?;
        let data = stream.content.clone().unwrap_or_default();

        let n = stream
            .dict
            .get(b"N")
            .and_then(Object::as_i64)
            .map_err(|_| Error::Parse(ParseError::InvalidXref))? as usize;
        let first = stream
            .dict
            .get(b"First")
            .and_then(Object::as_i64)
            .map_err(|_| Error::Parse(ParseError::InvalidXref))? as usize;

        // Parent object stream for a nested `/Extends` chain: not followed
        // here; each `XrefEntry::Compressed` names its own direct container.

        let header = data.get(..first).unwrap_or(&data);
        let mut pairs = Vec::with_capacity(n);
        let mut rest = header;
        for _ in 0..n {
            let (obj_num, tail) = parse_uint(rest)?;
            let (offset, tail) = parse_uint(tail)?;
            pairs.push((obj_num, offset));
            rest = tail;
        }

        let mut objects = BTreeMap::new();
        for (i, &(obj_num, offset)) in pairs.iter().enumerate() {
            let start = first + offset as usize;
            let end = pairs.get(i + 1).map(|&(_, next)| first + next as usize).unwrap_or(data.len());
            if start > data.len() || end > data.len() || start > end {
                continue;
            }
            let slice = &data[start..end];
            if let Some(object) = parser::direct_object(ParserInput::new_extra(slice, "object stream entry")) {
                objects.insert((obj_num as u32, 0), object);
            }
        }

        Ok(ObjectStream { objects })
    }
}

fn parse_uint(input: &[u8]) -> Result<(u64, &[u8])> {
    let trimmed = input.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(0);
    let input = &input[trimmed..];
    let digits = input.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Err(Error::Parse(ParseError::InvalidXref));
    }
    let value = std::str::from_utf8(&input[..digits])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::Parse(ParseError::InvalidXref))?;
    Ok((value, &input[digits..]))
}

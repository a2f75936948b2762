use crate::dictionary::Dictionary;
use crate::object::{Object, Stream};
use crate::{Document, ObjectId, Result};

use super::serialize;

/// How aggressively the writer packs non-stream objects into `/Type
/// /ObjStm` containers instead of emitting them as direct indirect objects.
#[derive(Debug, Clone)]
pub struct ObjectStreamConfig {
    pub max_objects_per_stream: usize,
}

impl Default for ObjectStreamConfig {
    fn default() -> Self {
        ObjectStreamConfig {
            max_objects_per_stream: 200,
        }
    }
}

/// An object is eligible for packing into an object stream when it is not a
/// stream itself and is not one of the objects the spec requires a direct
/// xref entry for (the trailer can't point `/Encrypt` or `/Root`'s own
/// cross-reference machinery at a compressed slot, and streams can't nest).
fn is_packable(id: ObjectId, object: &Object, encrypt_ref: Option<ObjectId>) -> bool {
    if matches!(object, Object::Stream(_)) {
        return false;
    }
    if Some(id) == encrypt_ref {
        return false;
    }
    true
}

/// One packed `/ObjStm` stream plus the `(object id -> index within it)`
/// assignment the xref stream needs to record `XrefEntry::Compressed`.
pub struct PackedObjectStream {
    pub container_id: ObjectId,
    pub stream: Stream,
    pub members: Vec<(ObjectId, u16)>,
}

/// Group every packable object from `document` into one or more object
/// streams, in ascending object-number order for deterministic output.
pub struct ObjectStreamBuilder;

impl ObjectStreamBuilder {
    pub fn build(document: &mut Document, config: &ObjectStreamConfig, encrypt_ref: Option<ObjectId>) -> Result<Vec<PackedObjectStream>> {
        let candidates: Vec<ObjectId> = document
            .objects
            .iter()
            .filter(|(&id, obj)| is_packable(id, obj, encrypt_ref))
            .map(|(&id, _)| id)
            .collect();

        let mut out = Vec::new();
        for chunk in candidates.chunks(config.max_objects_per_stream.max(1)) {
            let mut header = Vec::new();
            let mut body = Vec::new();
            let mut members = Vec::new();

            for (index, &id) in chunk.iter().enumerate() {
                let object = document.objects.get(&id).expect("candidate id exists");
                let start = body.len();
                serialize::write_object(&mut body, object).expect("writing to a Vec<u8> cannot fail");
                header.extend_from_slice(format!("{} {} ", id.0, start).as_bytes());
                members.push((id, index as u16));
            }
            let first = header.len();
            let mut content = header;
            content.extend_from_slice(&body);

            let mut dict = Dictionary::new();
            dict.set("Type", Object::Name(b"ObjStm".to_vec()));
            dict.set("N", Object::Integer(chunk.len() as i64));
            dict.set("First", Object::Integer(first as i64));
            let mut stream = Stream::new(dict, Vec::new());
            stream.set_content(content);
            stream.encode()?;

            let container_id = document.new_object_id();
            out.push(PackedObjectStream {
                container_id,
                stream,
                members,
            });
        }
        Ok(out)
    }
}

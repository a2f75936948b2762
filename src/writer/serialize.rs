use std::io::{self, Write};

use crate::dictionary::Dictionary;
use crate::object::{Object, StringFormat};
use crate::ObjectId;

/// Escape a literal string's parentheses, backslashes, and control bytes
/// for re-embedding between `(` and `)`.
fn escape_literal(bytes: &[u8], out: &mut Vec<u8>) {
    for &b in bytes {
        match b {
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\n' => out.extend_from_slice(b"\\n"),
            _ => out.push(b),
        }
    }
}

fn write_name<W: Write>(w: &mut W, name: &[u8]) -> io::Result<()> {
    w.write_all(b"/")?;
    for &b in name {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.') {
            w.write_all(&[b])?;
        } else {
            write!(w, "#{:02X}", b)?;
        }
    }
    Ok(())
}

pub fn write_dictionary<W: Write>(w: &mut W, dict: &Dictionary) -> io::Result<()> {
    w.write_all(b"<<")?;
    for (key, value) in dict.iter() {
        write_name(w, key)?;
        w.write_all(b" ")?;
        write_object(w, value)?;
        w.write_all(b" ")?;
    }
    w.write_all(b">>")
}

/// Serialize one object's value (never its envelope: the `N G obj` header
/// and `endobj`/`stream` framing are the caller's job, since they differ
/// between a fresh write and an object-stream entry).
pub fn write_object<W: Write>(w: &mut W, object: &Object) -> io::Result<()> {
    match object {
        Object::Null => w.write_all(b"null"),
        Object::Boolean(b) => write!(w, "{}", b),
        Object::Integer(i) => write!(w, "{}", i),
        Object::Real(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                write!(w, "{}", *f as i64)
            } else {
                write!(w, "{}", f)
            }
        }
        Object::Name(n) => write_name(w, n),
        Object::String(bytes, StringFormat::Literal) => {
            let mut escaped = Vec::with_capacity(bytes.len() + 2);
            escape_literal(bytes, &mut escaped);
            w.write_all(b"(")?;
            w.write_all(&escaped)?;
            w.write_all(b")")
        }
        Object::String(bytes, StringFormat::Hexadecimal) => {
            w.write_all(b"<")?;
            for &b in bytes {
                write!(w, "{:02x}", b)?;
            }
            w.write_all(b">")
        }
        Object::Array(arr) => {
            w.write_all(b"[")?;
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    w.write_all(b" ")?;
                }
                write_object(w, item)?;
            }
            w.write_all(b"]")
        }
        Object::Dictionary(dict) => write_dictionary(w, dict),
        Object::Reference(id) => write!(w, "{} {} R", id.0, id.1),
        Object::Stream(stream) => {
            write_dictionary(w, &stream.dict)?;
            w.write_all(b"\nstream\n")?;
            w.write_all(&stream.raw)?;
            w.write_all(b"\nendstream")
        }
    }
}

/// Write the full `N G obj ... endobj` envelope for an indirect object,
/// returning nothing — callers record the byte offset before calling this.
pub fn write_indirect_object<W: Write>(w: &mut W, id: ObjectId, object: &Object) -> io::Result<()> {
    write!(w, "{} {} obj\n", id.0, id.1)?;
    write_object(w, object)?;
    w.write_all(b"\nendobj\n")
}

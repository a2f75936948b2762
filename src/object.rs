use std::fmt;

use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::Error;

/// `(object number, generation number)`, the address of an indirect object.
pub type ObjectId = (u32, u16);

/// How a string literal was spelled in the source file.
///
/// Kept on the value (rather than normalized away) so an unmodified string
/// round-trips byte-for-byte through `read -> write` (testable property 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Literal,
    Hexadecimal,
}

/// One entry of a stream's filter pipeline: a filter name plus its
/// `DecodeParms` dictionary (empty if the filter took no parameters).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterParams(pub Dictionary);

impl FilterParams {
    pub fn get_i64(&self, key: &[u8], default: i64) -> i64 {
        self.0.get(key).and_then(Object::as_i64).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &[u8], default: bool) -> bool {
        self.0.get(key).and_then(Object::as_bool).unwrap_or(default)
    }
}

/// A stream object: a dictionary plus a byte payload.
///
/// `raw` is the bytes as they appear (or will appear) in the file, still
/// passed through every filter in the pipeline. `content` is the decoded
/// payload, populated lazily by [`Stream::decode`] and cached until the
/// dictionary's filter list changes. The two buffers cache each other per
/// the data-model invariant: decoding fills `content`; encoding fills `raw`
/// and rewrites `/Length`.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub dict: Dictionary,
    pub raw: Vec<u8>,
    pub content: Option<Vec<u8>>,
    /// Offset, relative to the start of the dictionary, at which the raw
    /// stream body begins. Set when `/Length` could not be resolved while
    /// parsing and the body must be read back later.
    pub start_position: Option<usize>,
}

impl Stream {
    pub fn new(mut dict: Dictionary, raw: Vec<u8>) -> Self {
        dict.set("Length", Object::Integer(raw.len() as i64));
        Stream {
            dict,
            raw,
            content: None,
            start_position: None,
        }
    }

    pub fn with_position(dict: Dictionary, start_position: usize) -> Self {
        Stream {
            dict,
            raw: Vec::new(),
            content: None,
            start_position: Some(start_position),
        }
    }

    /// Populate `raw` once the true `/Length` is known (repair path, or a
    /// deferred read triggered by an unresolved indirect `/Length`).
    pub fn set_raw(&mut self, raw: Vec<u8>) {
        self.raw = raw;
        self.content = None;
    }

    /// Overwrite the decoded payload directly, bypassing filters. Used when
    /// the raw stream was read straight into `content` (e.g. a zero-length
    /// stream, or a stream whose filter list is `Identity`).
    pub fn set_content(&mut self, content: Vec<u8>) {
        self.content = Some(content);
    }

    pub fn is_content_decoded(&self) -> bool {
        self.content.is_some()
    }

    /// Ordered `(filter name, decode parms)` pairs from `/Filter` and
    /// `/DecodeParms`. A bare `/Filter /Name` (not wrapped in an array) is
    /// normalized to a one-element pipeline.
    pub fn filters(&self) -> Vec<(Vec<u8>, FilterParams)> {
        let filter_names: Vec<Vec<u8>> = match self.dict.get(b"Filter") {
            Ok(Object::Name(name)) => vec![name.clone()],
            Ok(Object::Array(arr)) => arr.iter().filter_map(|o| o.as_name().ok().map(|n| n.to_vec())).collect(),
            _ => Vec::new(),
        };

        let parms: Vec<Dictionary> = match self.dict.get(b"DecodeParms").or_else(|_| self.dict.get(b"DP")) {
            Ok(Object::Dictionary(d)) => vec![d.clone()],
            Ok(Object::Array(arr)) => arr
                .iter()
                .map(|o| o.as_dict().cloned().unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        };

        filter_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, FilterParams(parms.get(i).cloned().unwrap_or_default())))
            .collect()
    }
}

/// The tagged sum of every value a PDF object can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(Vec<u8>),
    String(Vec<u8>, StringFormat),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Reference(ObjectId),
    Stream(Stream),
}

impl Object {
    pub fn string_literal<S: Into<Vec<u8>>>(s: S) -> Self {
        Object::String(s.into(), StringFormat::Literal)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Object::Boolean(b) => Ok(*b),
            _ => Err(Error::WrongType("Boolean")),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Object::Integer(i) => Ok(*i),
            Object::Real(f) => Ok(*f as i64),
            _ => Err(Error::WrongType("Integer")),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Object::Integer(i) => Ok(*i as f64),
            Object::Real(f) => Ok(*f),
            _ => Err(Error::WrongType("Real")),
        }
    }

    pub fn as_name(&self) -> Result<&[u8]> {
        match self {
            Object::Name(n) => Ok(n),
            _ => Err(Error::WrongType("Name")),
        }
    }

    pub fn as_name_str(&self) -> Result<&str> {
        self.as_name()
            .and_then(|n| std::str::from_utf8(n).map_err(|_| Error::WrongType("Name")))
    }

    pub fn as_str(&self) -> Result<&[u8]> {
        match self {
            Object::String(s, _) => Ok(s),
            _ => Err(Error::WrongType("String")),
        }
    }

    pub fn as_reference(&self) -> Result<ObjectId> {
        match self {
            Object::Reference(id) => Ok(*id),
            _ => Err(Error::WrongType("Reference")),
        }
    }

    pub fn as_array(&self) -> Result<&Vec<Object>> {
        match self {
            Object::Array(a) => Ok(a),
            _ => Err(Error::WrongType("Array")),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut Vec<Object>> {
        match self {
            Object::Array(a) => Ok(a),
            _ => Err(Error::WrongType("Array")),
        }
    }

    pub fn as_dict(&self) -> Result<&Dictionary> {
        match self {
            Object::Dictionary(d) => Ok(d),
            Object::Stream(s) => Ok(&s.dict),
            _ => Err(Error::WrongType("Dictionary")),
        }
    }

    pub fn as_dict_mut(&mut self) -> Result<&mut Dictionary> {
        match self {
            Object::Dictionary(d) => Ok(d),
            Object::Stream(s) => Ok(&mut s.dict),
            _ => Err(Error::WrongType("Dictionary")),
        }
    }

    pub fn as_stream(&self) -> Result<&Stream> {
        match self {
            Object::Stream(s) => Ok(s),
            _ => Err(Error::WrongType("Stream")),
        }
    }

    pub fn as_stream_mut(&mut self) -> Result<&mut Stream> {
        match self {
            Object::Stream(s) => Ok(s),
            _ => Err(Error::WrongType("Stream")),
        }
    }

    /// Parse a PDF date string (`D:YYYYMMDDHHmmSSOHH'mm'`) into a
    /// `chrono::DateTime<chrono::FixedOffset>`.
    #[cfg(feature = "chrono")]
    pub fn as_datetime(&self) -> Option<chrono::DateTime<chrono::FixedOffset>> {
        let bytes = self.as_str().ok()?;
        let s = std::str::from_utf8(bytes).ok()?;
        crate::reader::metadata::parse_pdf_date(s)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::DateTime<chrono::Local>> for Object {
    fn from(time: chrono::DateTime<chrono::Local>) -> Self {
        use chrono::Offset;
        let offset = time.offset().fix().local_minus_utc();
        let sign = if offset < 0 { '-' } else { '+' };
        let offset = offset.abs();
        let s = format!(
            "D:{}{}{:02}'{:02}'",
            time.format("%Y%m%d%H%M%S"),
            sign,
            offset / 3600,
            (offset % 3600) / 60
        );
        Object::string_literal(s)
    }
}

impl From<bool> for Object {
    fn from(v: bool) -> Self {
        Object::Boolean(v)
    }
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Object::Integer(v)
    }
}

impl From<i32> for Object {
    fn from(v: i32) -> Self {
        Object::Integer(v as i64)
    }
}

impl From<u32> for Object {
    fn from(v: u32) -> Self {
        Object::Integer(v as i64)
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Object::Real(v)
    }
}

impl From<f32> for Object {
    fn from(v: f32) -> Self {
        Object::Real(v as f64)
    }
}

impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Object::Name(v.as_bytes().to_vec())
    }
}

impl From<String> for Object {
    fn from(v: String) -> Self {
        Object::Name(v.into_bytes())
    }
}

impl From<Vec<Object>> for Object {
    fn from(v: Vec<Object>) -> Self {
        Object::Array(v)
    }
}

impl From<Dictionary> for Object {
    fn from(v: Dictionary) -> Self {
        Object::Dictionary(v)
    }
}

impl From<ObjectId> for Object {
    fn from(v: ObjectId) -> Self {
        Object::Reference(v)
    }
}

impl From<Stream> for Object {
    fn from(v: Stream) -> Self {
        Object::Stream(v)
    }
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringFormat::Literal => write!(f, "literal"),
            StringFormat::Hexadecimal => write!(f, "hexadecimal"),
        }
    }
}

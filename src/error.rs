use thiserror::Error as ThisError;

use crate::ObjectId;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures produced by the lexer / object parser (component A).
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed token")]
    LexerSyntax,
    #[error("unexpected end of input")]
    Truncated,
    #[error("numeric literal overflowed")]
    NumberOverflow,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("invalid xref entry")]
    InvalidXref,
    #[error("invalid file header")]
    InvalidFileHeader,
    #[error("invalid object id")]
    InvalidObjectId,
}

/// Failures produced while locating or digesting cross-reference data (component B).
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum XrefError {
    #[error("could not locate startxref")]
    Start,
    #[error("could not follow /Prev pointer")]
    PrevStart,
    #[error("could not follow /XRefStm pointer")]
    StreamStart,
    #[error("xref table is corrupt")]
    Corrupt,
    #[error("trailer dictionary is corrupt or missing required entries")]
    CorruptTrailer,
}

/// Failures produced by the encryption engine (component E).
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum DecryptionError {
    #[error("neither the owner nor the user password matched")]
    WrongPassword,
    #[error("encryption algorithm or revision is not supported")]
    UnsupportedAlgorithm,
    #[error("/Perms validation failed for R6 AES-256")]
    PermsCheckFailed,
    #[error("permission bits do not allow the requested operation")]
    PermissionsCheckFailed,
    #[error("missing required encryption dictionary entry: {0}")]
    MissingEntry(&'static str),
    #[error("invalid key length")]
    InvalidKeyLength,
}

/// Failures produced by the filter pipeline (component D).
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),
    #[error("filter decode failed: {0}")]
    FilterDecodeFailed(String),
    #[error("predictor parameters are inconsistent with the stream")]
    PredictorMismatch,
    #[error("stream data truncated before decode finished")]
    TruncatedStream,
}

/// Failures produced by higher-level semantic operations layered on the core.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("document has no bookmarks")]
    NoBookmarks,
    #[error("document already has bookmarks")]
    ExistingBookmarks,
    #[error("page has no content stream")]
    NoContent,
    #[error("unknown page number")]
    UnknownPage,
}

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("xref error: {0}")]
    Xref(#[from] XrefError),

    #[error("decryption error: {0}")]
    Decryption(#[from] DecryptionError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("semantic error: {0}")]
    Semantic(#[from] SemanticError),

    #[error("document requires a password")]
    InvalidPassword,

    #[error("wrong object type encountered")]
    WrongType(&'static str),

    #[error("missing required dictionary entry: {0}")]
    MissingRequiredEntry(&'static str),

    #[error("xref table has no entry for requested object")]
    MissingXrefEntry,

    #[error("reference cycle detected resolving {}  {} R", (.0).0, (.0).1)]
    ReferenceCycle(ObjectId),

    #[error("offset {0} is outside the document buffer")]
    InvalidOffset(usize),

    #[error("malformed indirect object at offset {offset}")]
    IndirectObject { offset: usize },

    #[error("indirect object id did not match expected id")]
    ObjectIdMismatch,

    #[error("invalid stream: {0}")]
    InvalidStream(String),

    #[error("numeric cast failed: {0}")]
    NumericCast(String),

    #[error("operation is not implemented: {0}")]
    Unimplemented(&'static str),

    #[error("merge failed: {0}")]
    Merge(String),
}


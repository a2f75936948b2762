//! A pure Rust engine for reading, repairing, decrypting, filtering,
//! writing, and merging PDF documents.
//!
//! The crate is organized around the document's own data model rather than
//! around a single "do everything" entry point: [`parser`] turns bytes into
//! [`Object`] values, [`xref`] and [`reader`] locate and load them into a
//! [`Document`], [`filters`] and [`encryption`] undo whatever transform was
//! applied to a stream's bytes, [`writer`] runs the pipeline in reverse, and
//! [`merge`] recombines two documents' object graphs into one.

pub mod destinations;
pub mod dictionary;
pub mod document;
pub mod encryption;
pub mod error;
pub mod filters;
pub mod merge;
pub mod name_tree;
pub mod object;
pub mod object_stream;
pub mod parser;
pub mod reader;
pub mod writer;
pub mod xref;

pub use destinations::Destination;
pub use dictionary::Dictionary;
pub use document::Document;
pub use error::{Error, Result};
pub use object::{FilterParams, Object, ObjectId, Stream, StringFormat};
pub use reader::{LoadOptions, PdfMetadata};
pub use writer::{IncrementalDocument, SaveOptions};
pub use xref::{Xref, XrefEntry};

//! Component F: the writer. The mechanical dual of [`crate::reader`] —
//! where the reader locates and decodes indirect objects, the writer lays
//! them back out and reconstructs a cross-reference table over them. Two
//! strategies are available: [`full::write_full`] rewrites the whole file,
//! and [`IncrementalDocument::save`] appends a new revision after a
//! previously loaded file's bytes.

mod full;
mod incremental;
mod object_stream_builder;
pub mod serialize;

#[cfg(test)]
mod tests;

pub use incremental::IncrementalDocument;
pub use object_stream_builder::{ObjectStreamBuilder, ObjectStreamConfig};

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::{Document, Result};

/// Configuration for [`Document::save_with_options`] / [`IncrementalDocument::save`],
/// gathering the writer's knobs the way [`crate::reader::LoadOptions`]
/// gathers the reader's.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub use_xref_stream: bool,
    pub write_object_streams: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            use_xref_stream: false,
            write_object_streams: false,
        }
    }
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> SaveOptionsBuilder {
        SaveOptionsBuilder::default()
    }
}

/// Builder for [`SaveOptions`], matching the `load_with_options`/`LoadOptions`
/// builder shape on the reader side of the crate.
#[derive(Debug, Clone, Default)]
pub struct SaveOptionsBuilder {
    options: SaveOptions,
}

impl SaveOptionsBuilder {
    pub fn use_xref_streams(mut self, enabled: bool) -> Self {
        self.options.use_xref_stream = enabled;
        self
    }

    pub fn use_object_streams(mut self, enabled: bool) -> Self {
        self.options.write_object_streams = enabled;
        self
    }

    pub fn build(self) -> SaveOptions {
        self.options
    }
}

impl Document {
    /// Serialize the whole document to `target` as a fresh rewrite, using
    /// the default [`SaveOptions`] (classic xref table, no object streams).
    pub fn save_to<W: Write>(&mut self, target: &mut W) -> Result<()> {
        self.save_with_options(target, SaveOptions::default())
    }

    pub fn save_with_options<W: Write>(&mut self, target: &mut W, options: SaveOptions) -> Result<()> {
        full::write_full(self, target, &options)
    }

    /// Serialize to a path, truncating or creating the file.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize to an in-memory buffer, the form most of the test suite
    /// reaches for.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.save_to(&mut buf)?;
        Ok(buf)
    }
}

//! Archive writer.
//!
//! Entries and extensions are collected in memory and serialized in a
//! single pass by [`PboWriter::finish`]: header, payloads in insertion
//! order, then the checksum trailer computed over everything before it.

use crate::extension::validate_extension;
use crate::header::Header;
use crate::record::{DEFAULT_MAX_NAME_LEN, validate_name};
use crate::trailer::write_trailer;
use lpbo_core::{
    ByteWriter, ChecksumAlgorithm, ChecksumWriter, Entry, Extension, PboError, Result,
    Sha1Checksum,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Options controlling how an archive is written.
#[derive(Clone)]
pub struct WriteOptions {
    /// Digest written to the trailer.
    pub checksum: Arc<dyn ChecksumAlgorithm>,
    /// Longest accepted entry name, in bytes.
    pub max_name_len: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            checksum: Arc::new(Sha1Checksum),
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

impl WriteOptions {
    /// Builder method to set the checksum algorithm.
    pub fn with_checksum(mut self, checksum: impl ChecksumAlgorithm + 'static) -> Self {
        self.checksum = Arc::new(checksum);
        self
    }

    /// Builder method to set the name length limit.
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }
}

impl std::fmt::Debug for WriteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteOptions")
            .field("checksum", &self.checksum.name())
            .field("max_name_len", &self.max_name_len)
            .finish()
    }
}

/// PBO archive builder.
pub struct PboWriter<W: Write> {
    writer: W,
    options: WriteOptions,
    header: Header,
    payloads: Vec<Vec<u8>>,
    names: HashSet<String>,
}

impl PboWriter<BufWriter<File>> {
    /// Create (or truncate) the archive at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> PboWriter<W> {
    /// Create a builder writing to `writer` with default options.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, WriteOptions::default())
    }

    /// Create a builder writing to `writer`.
    pub fn with_options(writer: W, options: WriteOptions) -> Self {
        Self {
            writer,
            options,
            header: Header {
                has_product: true,
                ..Header::default()
            },
            payloads: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Add an uncompressed file with no timestamp.
    pub fn add_file(&mut self, name: &str, data: impl Into<Vec<u8>>) -> Result<()> {
        self.add_file_with_timestamp(name, data, 0)
    }

    /// Add an uncompressed file.
    ///
    /// Names must be unique (exact comparison), non-empty, free of null
    /// bytes and within the configured length.
    pub fn add_file_with_timestamp(
        &mut self,
        name: &str,
        data: impl Into<Vec<u8>>,
        timestamp: u32,
    ) -> Result<()> {
        validate_name(name, self.options.max_name_len)?;
        if self.names.contains(name) {
            return Err(PboError::duplicate_name(name));
        }

        let data = data.into();
        let size = u32::try_from(data.len())
            .map_err(|_| PboError::entry_too_large(name, data.len() as u64))?;

        self.names.insert(name.to_owned());
        self.header
            .entries
            .push(Entry::file(name, size).with_timestamp(timestamp));
        self.payloads.push(data);
        Ok(())
    }

    /// Add an archive-scope key/value record.
    ///
    /// Records are written in insertion order; keys are checked when the
    /// archive is finished.
    pub fn add_extension(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.header.extensions.push(Extension::new(key, value));
    }

    /// Entries added so far.
    pub fn entries(&self) -> &[Entry] {
        &self.header.entries
    }

    /// Extensions added so far.
    pub fn extensions(&self) -> &[Extension] {
        &self.header.extensions
    }

    /// Serialize the archive and return the underlying writer.
    ///
    /// On failure the sink holds a partial archive and should be discarded.
    pub fn finish(self) -> Result<W> {
        for ext in &self.header.extensions {
            validate_extension(ext)?;
        }

        let checksum = self.options.checksum.as_ref();
        let mut out = ByteWriter::new(ChecksumWriter::new(self.writer, checksum));
        self.header.write(&mut out)?;
        let header_len = out.position();
        for payload in &self.payloads {
            out.write_bytes(payload)?;
        }
        let data_end = out.position();

        let (mut writer, digest) = out.into_inner().finish();
        write_trailer(&mut writer, &digest)?;
        writer.flush()?;

        debug!(
            entries = self.header.entries.len(),
            extensions = self.header.extensions.len(),
            header_len,
            data_end,
            checksum = checksum.name(),
            "wrote archive"
        );
        Ok(writer)
    }
}

/// Create a new archive at `path`.
pub fn create_new(path: impl AsRef<Path>) -> Result<PboWriter<BufWriter<File>>> {
    PboWriter::create(path)
}

//! Archive reader.
//!
//! Opening an archive parses the header and builds the payload index; it
//! never touches payload bytes or the trailer. The checksum is verified the
//! first time an entry is extracted and the outcome is cached for the
//! lifetime of the reader.

use crate::header::Header;
use crate::payload::{PayloadIndex, decode, read_stored};
use crate::record::DEFAULT_MAX_NAME_LEN;
use crate::trailer::{self, ChecksumStatus};
use lpbo_core::{
    ByteReader, ChecksumAlgorithm, Entry, Extension, NoDecoder, PayloadDecoder, PboError, Result,
    Sha1Checksum,
};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Options controlling how an archive is read.
#[derive(Clone)]
pub struct ReadOptions {
    /// Longest accepted name or extension string, in bytes.
    pub max_name_len: usize,
    /// Refuse to extract from archives without a checksum trailer.
    pub require_checksum: bool,
    /// Digest used to verify the trailer.
    pub checksum: Arc<dyn ChecksumAlgorithm>,
    /// Decoder for packed payloads.
    pub decoder: Arc<dyn PayloadDecoder>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_name_len: DEFAULT_MAX_NAME_LEN,
            require_checksum: false,
            checksum: Arc::new(Sha1Checksum),
            decoder: Arc::new(NoDecoder),
        }
    }
}

impl ReadOptions {
    /// Builder method to set the name length limit.
    pub fn with_max_name_len(mut self, max_name_len: usize) -> Self {
        self.max_name_len = max_name_len;
        self
    }

    /// Builder method to require a checksum trailer.
    pub fn with_require_checksum(mut self, require: bool) -> Self {
        self.require_checksum = require;
        self
    }

    /// Builder method to set the checksum algorithm.
    pub fn with_checksum(mut self, checksum: impl ChecksumAlgorithm + 'static) -> Self {
        self.checksum = Arc::new(checksum);
        self
    }

    /// Builder method to install a payload decoder.
    pub fn with_decoder(mut self, decoder: impl PayloadDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }
}

impl std::fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOptions")
            .field("max_name_len", &self.max_name_len)
            .field("require_checksum", &self.require_checksum)
            .field("checksum", &self.checksum.name())
            .field("decoder", &self.decoder.name())
            .finish()
    }
}

/// PBO archive reader.
pub struct PboReader<R: Read + Seek> {
    reader: R,
    header: Header,
    index: PayloadIndex,
    stream_len: u64,
    options: ReadOptions,
    checksum: Option<ChecksumStatus>,
}

impl PboReader<BufReader<File>> {
    /// Open the archive at `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, ReadOptions::default())
    }

    /// Open the archive at `path`.
    pub fn open_with(path: impl AsRef<Path>, options: ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => PboError::archive_not_found(path),
            _ => PboError::Io(e),
        })?;
        debug!(path = %path.display(), "opening archive");
        Self::with_options(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> PboReader<R> {
    /// Parse the archive in `reader` with default options.
    pub fn new(reader: R) -> Result<Self> {
        Self::with_options(reader, ReadOptions::default())
    }

    /// Parse the archive in `reader`.
    pub fn with_options(mut reader: R, options: ReadOptions) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let (header, data_offset) = {
            let mut bytes = ByteReader::new(&mut reader);
            let header = Header::read(&mut bytes, options.max_name_len)?;
            (header, bytes.position())
        };
        let stream_len = reader.seek(SeekFrom::End(0))?;
        let index = PayloadIndex::build(data_offset, &header.entries);

        debug!(
            entries = index.len(),
            data_offset,
            data_end = index.data_end(),
            stream_len,
            "built payload index"
        );

        Ok(Self {
            reader,
            header,
            index,
            stream_len,
            options,
            checksum: None,
        })
    }

    /// Parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Entries in stored order.
    pub fn entries(&self) -> &[Entry] {
        &self.header.entries
    }

    /// Archive-scope extensions in stored order.
    pub fn extensions(&self) -> &[Extension] {
        &self.header.extensions
    }

    /// Look up an extension value by key (case-insensitive).
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.header.extension(key)
    }

    /// The `prefix` extension, if present.
    pub fn prefix(&self) -> Option<&str> {
        self.extension("prefix")
    }

    /// Entry names in stored order.
    pub fn list(&self) -> impl Iterator<Item = &str> {
        self.header.entries.iter().map(|e| e.name.as_str())
    }

    /// Find an entry by exact name.
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.index
            .position(name)
            .and_then(|i| self.header.entries.get(i))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.header.entries.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.header.entries.is_empty()
    }

    /// Total length of the underlying stream.
    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    /// Options this reader was opened with.
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Verify the archive against its trailer.
    ///
    /// The result is computed once and cached.
    pub fn verify_checksum(&mut self) -> Result<ChecksumStatus> {
        if let Some(status) = &self.checksum {
            return Ok(status.clone());
        }

        let status = trailer::verify(
            &mut self.reader,
            self.options.checksum.as_ref(),
            self.index.data_end(),
            self.stream_len,
        )?;
        match &status {
            ChecksumStatus::Valid => debug!(algorithm = self.options.checksum.name(), "checksum ok"),
            ChecksumStatus::Absent => warn!("archive has no checksum trailer"),
            ChecksumStatus::Mismatch { .. } => warn!("archive checksum does not match"),
        }
        self.checksum = Some(status.clone());
        Ok(status)
    }

    /// Fail unless the checksum status permits extraction.
    pub fn check_integrity(&mut self) -> Result<()> {
        let require = self.options.require_checksum;
        self.verify_checksum()?.into_result(require)
    }

    /// Extract the entry called `name` into `sink`, returning the number of
    /// bytes written.
    pub fn extract_one<W: Write>(&mut self, name: &str, sink: &mut W) -> Result<u64> {
        let position = self
            .index
            .position(name)
            .ok_or_else(|| PboError::entry_not_found(name))?;
        let range = self
            .index
            .range(position)
            .ok_or_else(|| PboError::entry_not_found(name))?;

        // A header whose sizes overrun the stream cannot have a readable
        // trailer, so this reports a mismatch before the bounds check.
        self.check_integrity()?;
        if range.end() > self.stream_len {
            return Err(PboError::truncated(
                self.stream_len,
                (range.end() - self.stream_len) as usize,
            ));
        }

        let entry = &self.header.entries[position];
        let stored = read_stored(&mut self.reader, range)?;
        let data = decode(entry, stored, self.options.decoder.as_ref())?;
        sink.write_all(&data)?;

        debug!(name, bytes = data.len(), "extracted entry");
        Ok(data.len() as u64)
    }

    /// Extract the entry called `name` into memory.
    pub fn extract_to_vec(&mut self, name: &str) -> Result<Vec<u8>> {
        let capacity = self.entry(name).map_or(0, |e| e.decoded_size() as usize);
        let mut data = Vec::with_capacity(capacity.min(1 << 20));
        self.extract_one(name, &mut data)?;
        Ok(data)
    }

    /// Consume the reader and return the underlying stream.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> std::fmt::Debug for PboReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PboReader")
            .field("entries", &self.header.entries.len())
            .field("extensions", &self.header.extensions.len())
            .field("stream_len", &self.stream_len)
            .field("options", &self.options)
            .finish()
    }
}

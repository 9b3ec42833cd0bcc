//! Archive header model.
//!
//! The header is one linear stream: an optional product record with its
//! extension block, the entry records, and a single terminator. Parsing is a
//! small state machine so each phase only sees the records it accepts:
//!
//! ```text
//! Start ──product──▶ Extensions ──empty key──▶ Entries ──terminator──▶ Done
//!   │                                            ▲
//!   ├──file record───────────────────────────────┘
//!   └──terminator──────────────────────────────────────────────────────▶ Done
//! ```
//!
//! Archives without a product record predate header extensions and start
//! directly with entry records.

use crate::extension::{read_extensions, write_extensions};
use crate::record::{RecordKind, product_record, read_record, terminator, write_record};
use lpbo_core::{ByteReader, ByteWriter, Entry, Extension, PboError, Result};
use std::io::{Read, Write};
use tracing::debug;

/// Parser phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderState {
    /// Nothing read yet.
    Start,
    /// Product record seen; reading key/value pairs.
    Extensions,
    /// Reading entry records.
    Entries,
    /// Terminator consumed.
    Done,
}

/// A fully parsed or to-be-written header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Archive-scope metadata in stored order.
    pub extensions: Vec<Extension>,
    /// Entries in stored order, terminator excluded.
    pub entries: Vec<Entry>,
    /// Whether a product record introduces the extension block.
    pub has_product: bool,
}

impl Header {
    /// Parse a header, leaving `reader` at the first payload byte.
    pub fn read<R: Read>(reader: &mut ByteReader<R>, max_name_len: usize) -> Result<Self> {
        let mut header = Header::default();
        let mut state = HeaderState::Start;

        while state != HeaderState::Done {
            state = match state {
                HeaderState::Start => {
                    let record = next_record(reader, max_name_len, &header)?;
                    match RecordKind::of(&record) {
                        RecordKind::Product => {
                            header.has_product = true;
                            HeaderState::Extensions
                        }
                        RecordKind::Terminator => HeaderState::Done,
                        RecordKind::File => {
                            header.entries.push(record);
                            HeaderState::Entries
                        }
                        RecordKind::Invalid => return Err(empty_name_error(reader)),
                    }
                }
                HeaderState::Extensions => {
                    header.extensions = read_extensions(reader, max_name_len)?;
                    debug!(count = header.extensions.len(), "read header extensions");
                    HeaderState::Entries
                }
                HeaderState::Entries => {
                    let record = next_record(reader, max_name_len, &header)?;
                    match RecordKind::of(&record) {
                        RecordKind::Terminator => HeaderState::Done,
                        RecordKind::File => {
                            header.entries.push(record);
                            HeaderState::Entries
                        }
                        RecordKind::Product => {
                            return Err(PboError::malformed(
                                reader.position(),
                                "product record after the first header record",
                            ));
                        }
                        RecordKind::Invalid => return Err(empty_name_error(reader)),
                    }
                }
                HeaderState::Done => HeaderState::Done,
            };
        }

        debug!(
            entries = header.entries.len(),
            header_len = reader.position(),
            "parsed PBO header"
        );
        Ok(header)
    }

    /// Serialize the header.
    ///
    /// The product record and extension block are written whenever
    /// `has_product` is set or there are extensions to store.
    pub fn write<W: Write>(&self, writer: &mut ByteWriter<W>) -> Result<()> {
        if self.has_product || !self.extensions.is_empty() {
            write_record(writer, &product_record())?;
            write_extensions(writer, &self.extensions)?;
        }
        for entry in &self.entries {
            write_record(writer, entry)?;
        }
        write_record(writer, &terminator())
    }

    /// Total stored payload length (sum of `packed_size`).
    pub fn payload_len(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.packed_size)).sum()
    }

    /// Look up an extension value by key (case-insensitive).
    pub fn extension(&self, key: &str) -> Option<&str> {
        self.extensions
            .iter()
            .find(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value.as_str())
    }
}

/// Read the next record, turning a clean end of stream at a record boundary
/// into a "missing terminator" error.
fn next_record<R: Read>(
    reader: &mut ByteReader<R>,
    max_name_len: usize,
    header: &Header,
) -> Result<Entry> {
    let start = reader.position();
    read_record(reader, max_name_len).map_err(|e| {
        if e.is_truncation() && reader.position() == start {
            PboError::malformed(
                start,
                format!(
                    "stream ended after {} entries without a terminator",
                    header.entries.len()
                ),
            )
        } else {
            e
        }
    })
}

fn empty_name_error<R: Read>(reader: &ByteReader<R>) -> PboError {
    PboError::malformed(
        reader.position(),
        "record with an empty name is neither a product record nor a terminator",
    )
}

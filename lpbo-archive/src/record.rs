//! Entry header records.
//!
//! Every record in the header table has the same shape:
//!
//! ```text
//! name          C string
//! method        u32 LE   (0, "Cprs", "Vers", "Encr")
//! original_size u32 LE
//! reserved      u32 LE
//! timestamp     u32 LE
//! packed_size   u32 LE
//! ```
//!
//! Two empty-named records are control records rather than files: the
//! product record (method "Vers") that opens the extension block, and the
//! all-zero terminator that closes the header.

use encoding_rs::WINDOWS_1252;
use lpbo_core::{ByteReader, ByteWriter, Entry, PackingMethod, PboError, Result};
use std::io::{Read, Write};

/// Size of the fixed numeric part of a record.
pub const RECORD_FIELDS_LEN: usize = 20;

/// Default upper bound on name length when scanning for the null byte.
pub const DEFAULT_MAX_NAME_LEN: usize = 1024;

/// What a decoded record means to the header parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Empty name with method "Vers"; extension block follows.
    Product,
    /// Empty name, all fields zero; end of header.
    Terminator,
    /// A regular archive member.
    File,
    /// Empty name that is neither of the control records.
    Invalid,
}

impl RecordKind {
    /// Classify a decoded record.
    pub fn of(entry: &Entry) -> Self {
        if !entry.name.is_empty() {
            return Self::File;
        }
        if entry.method == PackingMethod::Product {
            return Self::Product;
        }
        if entry == &terminator() {
            Self::Terminator
        } else {
            Self::Invalid
        }
    }
}

/// The record that closes the header.
pub fn terminator() -> Entry {
    Entry::file("", 0)
}

/// The record that opens the extension block.
pub fn product_record() -> Entry {
    Entry::file("", 0).with_method(PackingMethod::Product)
}

/// Decode a name read from disk.
///
/// Names are UTF-8 when written by this crate; older tools wrote the
/// Windows code page, which is used as the fallback.
pub fn decode_name(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_owned(),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Read one record.
pub fn read_record<R: Read>(reader: &mut ByteReader<R>, max_name_len: usize) -> Result<Entry> {
    let name = decode_name(&reader.read_cstring(max_name_len)?);
    let method = PackingMethod::from_u32(reader.read_u32_le()?);
    let original_size = reader.read_u32_le()?;
    let reserved = reader.read_u32_le()?;
    let timestamp = reader.read_u32_le()?;
    let packed_size = reader.read_u32_le()?;

    Ok(Entry {
        name,
        method,
        original_size,
        reserved,
        timestamp,
        packed_size,
    })
}

/// Write one record in the same field order [`read_record`] expects.
pub fn write_record<W: Write>(writer: &mut ByteWriter<W>, entry: &Entry) -> Result<()> {
    writer.write_cstring(entry.name.as_bytes())?;
    writer.write_u32_le(entry.method.to_u32())?;
    writer.write_u32_le(entry.original_size)?;
    writer.write_u32_le(entry.reserved)?;
    writer.write_u32_le(entry.timestamp)?;
    writer.write_u32_le(entry.packed_size)?;
    Ok(())
}

/// Check that `name` can be stored as an entry name.
pub fn validate_name(name: &str, max_name_len: usize) -> Result<()> {
    if name.is_empty() {
        return Err(PboError::invalid_name(name, "entry names cannot be empty"));
    }
    if name.contains('\0') {
        return Err(PboError::invalid_name(name, "contains a null byte"));
    }
    if name.len() > max_name_len {
        return Err(PboError::invalid_name(
            name,
            format!("longer than {max_name_len} bytes"),
        ));
    }
    Ok(())
}

//! Header extension block.
//!
//! After the product record the header carries archive-scope metadata as
//! consecutive C-string pairs:
//!
//! ```text
//! key\0 value\0 key\0 value\0 ... \0
//! ```
//!
//! An empty key ends the block, and entry records follow immediately.

use crate::record::decode_name;
use lpbo_core::{ByteReader, ByteWriter, Extension, PboError, Result};
use std::io::{Read, Write};

/// Read extension pairs up to and including the empty key.
pub fn read_extensions<R: Read>(
    reader: &mut ByteReader<R>,
    max_len: usize,
) -> Result<Vec<Extension>> {
    let mut extensions = Vec::new();

    loop {
        let key = reader.read_cstring(max_len)?;
        if key.is_empty() {
            return Ok(extensions);
        }
        let value = reader.read_cstring(max_len)?;
        extensions.push(Extension::new(decode_name(&key), decode_name(&value)));
    }
}

/// Write extension pairs followed by the empty key.
pub fn write_extensions<W: Write>(
    writer: &mut ByteWriter<W>,
    extensions: &[Extension],
) -> Result<()> {
    for ext in extensions {
        writer.write_cstring(ext.key.as_bytes())?;
        writer.write_cstring(ext.value.as_bytes())?;
    }
    writer.write_cstring(b"")
}

/// Check that an extension can be written without ending the block early.
pub fn validate_extension(ext: &Extension) -> Result<()> {
    if ext.key.is_empty() {
        return Err(PboError::invalid_name(
            &ext.key,
            "extension keys cannot be empty",
        ));
    }
    for s in [&ext.key, &ext.value] {
        if s.contains('\0') {
            return Err(PboError::invalid_name(s.as_str(), "contains a null byte"));
        }
    }
    Ok(())
}

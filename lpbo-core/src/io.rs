//! Byte-level I/O for PBO headers.
//!
//! [`ByteReader`] and [`ByteWriter`] wrap any `Read`/`Write` and provide the
//! three primitives the PBO header is made of: little-endian `u32` fields,
//! null-terminated strings, and raw byte spans. Both track the absolute
//! stream position so errors can point at the offending offset.
//!
//! # Example
//!
//! ```
//! use lpbo_core::io::{ByteReader, ByteWriter};
//! use std::io::Cursor;
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = ByteWriter::new(&mut output);
//!     writer.write_cstring(b"config.cpp").unwrap();
//!     writer.write_u32_le(42).unwrap();
//! }
//!
//! let mut reader = ByteReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_cstring(64).unwrap(), b"config.cpp");
//! assert_eq!(reader.read_u32_le().unwrap(), 42);
//! assert_eq!(reader.position(), 15);
//! ```

use crate::error::{PboError, Result};
use std::io::{ErrorKind, Read, Write};

/// A sequential reader over a byte stream.
#[derive(Debug)]
pub struct ByteReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Absolute offset of the next byte.
    position: u64,
}

impl<R: Read> ByteReader<R> {
    /// Create a new `ByteReader` starting at offset 0.
    pub fn new(reader: R) -> Self {
        Self::with_position(reader, 0)
    }

    /// Create a `ByteReader` whose stream is already at `position`.
    pub fn with_position(reader: R, position: u64) -> Self {
        Self { reader, position }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `ByteReader` and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Offset of the next byte to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Fill `buf` completely or fail with [`PboError::TruncatedInput`].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = self.position;
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => return Err(PboError::truncated(start, buf.len() - filled)),
                Ok(n) => {
                    filled += n;
                    self.position += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Read `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a null-terminated string, returning its bytes without the null.
    ///
    /// At most `max_len` bytes are scanned before the terminator; a longer
    /// string is reported as a malformed header rather than read unbounded.
    pub fn read_cstring(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let start = self.position;
        let mut out = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            self.read_exact(&mut byte).map_err(|e| match e {
                PboError::TruncatedInput { .. } => PboError::truncated(start, 1),
                other => other,
            })?;
            if byte[0] == 0 {
                return Ok(out);
            }
            if out.len() == max_len {
                return Err(PboError::malformed(
                    start,
                    format!("string exceeds {max_len} bytes without a terminator"),
                ));
            }
            out.push(byte[0]);
        }
    }
}

/// A sequential writer over a byte stream.
#[derive(Debug)]
pub struct ByteWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Number of bytes written so far.
    position: u64,
}

impl<W: Write> ByteWriter<W> {
    /// Create a new `ByteWriter`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            position: 0,
        }
    }

    /// Get a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume this `ByteWriter` and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Write a little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_le_bytes())
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Write `bytes` followed by a null terminator.
    ///
    /// Strings containing an interior null cannot be represented and are
    /// rejected before anything is written.
    pub fn write_cstring(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.contains(&0) {
            return Err(PboError::invalid_name(
                String::from_utf8_lossy(bytes),
                "contains a null byte",
            ));
        }
        self.write_bytes(bytes)?;
        self.write_bytes(&[0])
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

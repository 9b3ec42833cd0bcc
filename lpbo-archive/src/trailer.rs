//! Checksum trailer.
//!
//! The last payload is followed by a single `0x00` marker byte and the
//! digest of every byte before the marker. Archives from the oldest tools
//! end right after the last payload and carry no trailer at all.

use lpbo_core::checksum::digest_region;
use lpbo_core::{ChecksumAlgorithm, PboError, Result};
use std::io::{Read, Seek, SeekFrom, Write};

/// Marker byte preceding the digest.
pub const TRAILER_MARKER: u8 = 0;

/// What follows the payload region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trailer {
    /// The stream ends exactly at the payload end.
    Absent,
    /// Marker and digest in the expected layout.
    Present(Vec<u8>),
    /// Anything else: wrong length, wrong marker, or payloads running past
    /// the end of the stream.
    Unreadable,
}

/// Outcome of verifying an archive against its trailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumStatus {
    /// Stored and computed digests agree.
    Valid,
    /// No trailer to check against.
    Absent,
    /// The trailer is unreadable or the digests differ.
    Mismatch {
        /// Stored digest (empty when unreadable).
        expected: Vec<u8>,
        /// Digest computed over the archive (empty when it could not be
        /// computed).
        computed: Vec<u8>,
    },
}

impl ChecksumStatus {
    /// Whether extraction may proceed.
    pub fn is_ok(&self, require_checksum: bool) -> bool {
        match self {
            Self::Valid => true,
            Self::Absent => !require_checksum,
            Self::Mismatch { .. } => false,
        }
    }

    /// Convert into a result, failing on mismatch (and on absence when a
    /// checksum is required).
    pub fn into_result(self, require_checksum: bool) -> Result<()> {
        match self {
            Self::Valid => Ok(()),
            Self::Absent if !require_checksum => Ok(()),
            Self::Absent => Err(PboError::checksum_missing()),
            Self::Mismatch { expected, computed } => {
                Err(PboError::checksum_mismatch(expected, computed))
            }
        }
    }
}

/// Read whatever follows the payload region.
pub fn read_trailer<R: Read + Seek>(
    reader: &mut R,
    data_end: u64,
    stream_len: u64,
    width: usize,
) -> Result<Trailer> {
    if stream_len == data_end {
        return Ok(Trailer::Absent);
    }
    if stream_len != data_end + 1 + width as u64 {
        return Ok(Trailer::Unreadable);
    }

    reader.seek(SeekFrom::Start(data_end))?;
    let mut buf = vec![0u8; 1 + width];
    reader.read_exact(&mut buf)?;
    if buf[0] != TRAILER_MARKER {
        return Ok(Trailer::Unreadable);
    }
    buf.remove(0);
    Ok(Trailer::Present(buf))
}

/// Verify the archive in `reader` against its trailer.
pub fn verify<R: Read + Seek>(
    reader: &mut R,
    algorithm: &dyn ChecksumAlgorithm,
    data_end: u64,
    stream_len: u64,
) -> Result<ChecksumStatus> {
    let expected = match read_trailer(reader, data_end, stream_len, algorithm.width())? {
        Trailer::Absent => return Ok(ChecksumStatus::Absent),
        Trailer::Unreadable => {
            return Ok(ChecksumStatus::Mismatch {
                expected: Vec::new(),
                computed: Vec::new(),
            });
        }
        Trailer::Present(digest) => digest,
    };

    reader.seek(SeekFrom::Start(0))?;
    let computed = digest_region(algorithm, reader, data_end)?;
    if computed == expected {
        Ok(ChecksumStatus::Valid)
    } else {
        Ok(ChecksumStatus::Mismatch { expected, computed })
    }
}

/// Append the marker and digest.
pub fn write_trailer<W: Write>(writer: &mut W, digest: &[u8]) -> Result<()> {
    writer.write_all(&[TRAILER_MARKER])?;
    writer.write_all(digest)?;
    Ok(())
}

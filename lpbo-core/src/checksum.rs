//! Checksum algorithms for the archive trailer.
//!
//! - **SHA-1**: the digest Arma tooling writes after the last payload (20 bytes)
//! - **CRC-32 (ISO 3309)**: a 4-byte alternative for archives that only
//!   need corruption detection
//!
//! [`ChecksumWriter`] hashes everything passing through a writer so the
//! archive builder can produce its trailer in the same pass that writes the
//! archive. [`digest_region`] does the same for the first `len` bytes of a
//! reader.

use crate::error::{PboError, Result};
use crate::traits::{ChecksumAlgorithm, ChecksumHasher};
use sha1::{Digest, Sha1};
use std::io::{self, Read, Write};

/// SHA-1, the default trailer digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1Checksum;

impl ChecksumAlgorithm for Sha1Checksum {
    fn name(&self) -> &'static str {
        "sha1"
    }

    fn width(&self) -> usize {
        20
    }

    fn hasher(&self) -> Box<dyn ChecksumHasher> {
        Box::new(Sha1Hasher(Sha1::new()))
    }
}

struct Sha1Hasher(Sha1);

impl ChecksumHasher for Sha1Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

/// CRC-32 lookup table (polynomial 0xEDB88320, reflected).
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// CRC-32, stored little-endian in the trailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Crc32Checksum;

impl ChecksumAlgorithm for Crc32Checksum {
    fn name(&self) -> &'static str {
        "crc32"
    }

    fn width(&self) -> usize {
        4
    }

    fn hasher(&self) -> Box<dyn ChecksumHasher> {
        Box::new(Crc32Hasher(0xFFFFFFFF))
    }
}

struct Crc32Hasher(u32);

impl ChecksumHasher for Crc32Hasher {
    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let index = ((self.0 ^ byte as u32) & 0xFF) as usize;
            self.0 = (self.0 >> 8) ^ CRC32_TABLE[index];
        }
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        (self.0 ^ 0xFFFFFFFF).to_le_bytes().to_vec()
    }
}

/// A writer that feeds every written byte into a checksum.
pub struct ChecksumWriter<W: Write> {
    inner: W,
    hasher: Box<dyn ChecksumHasher>,
}

impl<W: Write> ChecksumWriter<W> {
    /// Wrap `inner`, hashing with `algorithm`.
    pub fn new(inner: W, algorithm: &dyn ChecksumAlgorithm) -> Self {
        Self {
            inner,
            hasher: algorithm.hasher(),
        }
    }

    /// Return the digest of everything written so far and the inner writer.
    pub fn finish(self) -> (W, Vec<u8>) {
        (self.inner, self.hasher.finalize())
    }
}

impl<W: Write> Write for ChecksumWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Digest exactly `len` bytes from `reader`.
pub fn digest_region<R: Read>(
    algorithm: &dyn ChecksumAlgorithm,
    reader: &mut R,
    len: u64,
) -> Result<Vec<u8>> {
    let mut hasher = algorithm.hasher();
    let mut remaining = len;
    let mut buffer = vec![0u8; 64 * 1024];

    while remaining > 0 {
        let want = remaining.min(buffer.len() as u64) as usize;
        let n = match reader.read(&mut buffer[..want]) {
            Ok(0) => return Err(PboError::truncated(len - remaining, want)),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        hasher.update(&buffer[..n]);
        remaining -= n as u64;
    }

    Ok(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sha1_known_value() {
        let digest = Sha1Checksum.digest(b"abc");
        assert_eq!(digest.len(), 20);
        assert_eq!(
            digest,
            [
                0xa9, 0x99, 0x3e, 0x36, 0x47, 0x06, 0x81, 0x6a, 0xba, 0x3e, 0x25, 0x71, 0x78,
                0x50, 0xc2, 0x6c, 0x9c, 0xd0, 0xd8, 0x9d
            ]
        );
    }

    #[test]
    fn test_crc32_known_value() {
        let digest = Crc32Checksum.digest(b"Hello, World!");
        assert_eq!(digest, 0xEC4AC3D0u32.to_le_bytes());
    }

    #[test]
    fn test_checksum_writer_matches_digest() {
        let mut writer = ChecksumWriter::new(Vec::new(), &Sha1Checksum);
        writer.write_all(b"header").unwrap();
        writer.write_all(b"payload").unwrap();
        let (inner, digest) = writer.finish();

        assert_eq!(inner, b"headerpayload");
        assert_eq!(digest, Sha1Checksum.digest(b"headerpayload"));
    }

    #[test]
    fn test_digest_region() {
        let data = b"0123456789trailer".to_vec();
        let mut cursor = Cursor::new(&data);
        let digest = digest_region(&Crc32Checksum, &mut cursor, 10).unwrap();
        assert_eq!(digest, Crc32Checksum.digest(b"0123456789"));
    }

    #[test]
    fn test_digest_region_short() {
        let mut cursor = Cursor::new(vec![0u8; 4]);
        let err = digest_region(&Sha1Checksum, &mut cursor, 8).unwrap_err();
        assert!(err.is_truncation());
    }
}

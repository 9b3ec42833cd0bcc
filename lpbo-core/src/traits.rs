//! Strategy traits for the pluggable parts of the format.
//!
//! The PBO engine never hard-codes a compression codec or a digest. Packed
//! payloads are handed to a [`PayloadDecoder`], and the trailer is produced
//! and verified by a [`ChecksumAlgorithm`]. Both are injected through the
//! reader/writer options.

use crate::error::{PboError, Result};

/// Decodes packed (compressed) entry payloads.
///
/// Implementations must return exactly `original_size` bytes on success;
/// the reader reports any other length as a decode failure.
pub trait PayloadDecoder: Send + Sync {
    /// Short name of the codec, used in log and error messages.
    fn name(&self) -> &'static str;

    /// Decode `packed` into `original_size` bytes.
    fn decode(&self, packed: &[u8], original_size: usize) -> Result<Vec<u8>>;
}

/// Decoder used when no codec is installed.
///
/// Every packed payload fails with [`PboError::DecodeFailure`]; uncompressed
/// entries never reach a decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecoder;

impl PayloadDecoder for NoDecoder {
    fn name(&self) -> &'static str {
        "none"
    }

    fn decode(&self, _packed: &[u8], _original_size: usize) -> Result<Vec<u8>> {
        Err(PboError::decode_failure(
            "",
            "packed payloads require a decoder and none is installed",
        ))
    }
}

/// A digest algorithm with a fixed output width.
pub trait ChecksumAlgorithm: Send + Sync {
    /// Algorithm name, e.g. `"sha1"`.
    fn name(&self) -> &'static str;

    /// Digest width in bytes. Must match the length of every finalized digest.
    fn width(&self) -> usize;

    /// Start a new incremental computation.
    fn hasher(&self) -> Box<dyn ChecksumHasher>;

    /// Digest a complete buffer.
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = self.hasher();
        hasher.update(data);
        hasher.finalize()
    }
}

/// An in-progress digest computation.
pub trait ChecksumHasher {
    /// Feed more bytes.
    fn update(&mut self, data: &[u8]);

    /// Finish and return the digest.
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_decoder_fails() {
        let err = NoDecoder.decode(&[1, 2, 3], 10).unwrap_err();
        assert!(matches!(err, PboError::DecodeFailure { .. }));
        assert_eq!(NoDecoder.name(), "none");
    }
}

//! Payload store.
//!
//! Payloads follow the header back to back, in header order, each exactly
//! `packed_size` bytes long. Offsets are not stored anywhere; the index is
//! derived once after the header is parsed so any entry can be read with a
//! single seek.

use lpbo_core::{Entry, PackingMethod, PayloadDecoder, PboError, Result};
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

/// Byte range of one payload within the archive stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRange {
    /// Absolute offset of the first byte.
    pub offset: u64,
    /// Stored length in bytes.
    pub len: u64,
}

impl PayloadRange {
    /// Offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Offsets of every payload, keyed by entry position and name.
#[derive(Debug, Clone, Default)]
pub struct PayloadIndex {
    data_offset: u64,
    ranges: Vec<PayloadRange>,
    by_name: HashMap<String, usize>,
}

impl PayloadIndex {
    /// Build the index for `entries` whose payloads start at `data_offset`.
    ///
    /// When a name occurs more than once, lookups resolve to the first
    /// occurrence.
    pub fn build(data_offset: u64, entries: &[Entry]) -> Self {
        let mut ranges = Vec::with_capacity(entries.len());
        let mut by_name = HashMap::with_capacity(entries.len());
        let mut offset = data_offset;

        for (i, entry) in entries.iter().enumerate() {
            let len = u64::from(entry.packed_size);
            ranges.push(PayloadRange { offset, len });
            by_name.entry(entry.name.clone()).or_insert(i);
            offset += len;
        }

        Self {
            data_offset,
            ranges,
            by_name,
        }
    }

    /// Offset of the first payload byte.
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Offset one past the last payload byte.
    pub fn data_end(&self) -> u64 {
        self.ranges.last().map_or(self.data_offset, PayloadRange::end)
    }

    /// Range of the entry at `index`.
    pub fn range(&self, index: usize) -> Option<PayloadRange> {
        self.ranges.get(index).copied()
    }

    /// Position of the entry called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Number of indexed payloads.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Read the stored bytes of one payload.
pub fn read_stored<R: Read + Seek>(reader: &mut R, range: PayloadRange) -> Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(range.offset))?;
    let mut data = Vec::with_capacity(range.len.min(1 << 20) as usize);
    let read = reader.by_ref().take(range.len).read_to_end(&mut data)?;
    if (read as u64) < range.len {
        return Err(PboError::truncated(
            range.offset + read as u64,
            (range.len - read as u64) as usize,
        ));
    }
    Ok(data)
}

/// Turn stored bytes into the entry's content.
pub fn decode(entry: &Entry, stored: Vec<u8>, decoder: &dyn PayloadDecoder) -> Result<Vec<u8>> {
    match entry.method {
        PackingMethod::Uncompressed => Ok(stored),
        PackingMethod::Packed => {
            let expected = entry.original_size as usize;
            let decoded = decoder.decode(&stored, expected).map_err(|e| match e {
                PboError::DecodeFailure { message, .. } => {
                    PboError::decode_failure(&entry.name, message)
                }
                other => PboError::decode_failure(&entry.name, other.to_string()),
            })?;
            if decoded.len() != expected {
                return Err(PboError::decode_failure(
                    &entry.name,
                    format!(
                        "{} decoder produced {} bytes, expected {expected}",
                        decoder.name(),
                        decoded.len()
                    ),
                ));
            }
            Ok(decoded)
        }
        other => Err(PboError::decode_failure(
            &entry.name,
            format!("unsupported packing method {other}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpbo_core::NoDecoder;
    use std::io::Cursor;

    /// Test decoder that repeats each stored byte twice.
    struct Doubler;

    impl PayloadDecoder for Doubler {
        fn name(&self) -> &'static str {
            "doubler"
        }

        fn decode(&self, packed: &[u8], _original_size: usize) -> Result<Vec<u8>> {
            Ok(packed.iter().flat_map(|&b| [b, b]).collect())
        }
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry::file("a", 3),
            Entry::file("empty", 0),
            Entry::file("b", 5),
        ]
    }

    #[test]
    fn test_index_offsets() {
        let index = PayloadIndex::build(100, &entries());

        assert_eq!(index.len(), 3);
        assert_eq!(index.range(0), Some(PayloadRange { offset: 100, len: 3 }));
        assert_eq!(index.range(1), Some(PayloadRange { offset: 103, len: 0 }));
        assert_eq!(index.range(2), Some(PayloadRange { offset: 103, len: 5 }));
        assert_eq!(index.data_end(), 108);
        assert_eq!(index.position("b"), Some(2));
        assert_eq!(index.position("c"), None);
    }

    #[test]
    fn test_empty_index() {
        let index = PayloadIndex::build(21, &[]);
        assert!(index.is_empty());
        assert_eq!(index.data_end(), 21);
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let index = PayloadIndex::build(0, &[Entry::file("x", 1), Entry::file("x", 2)]);
        assert_eq!(index.position("x"), Some(0));
    }

    #[test]
    fn test_read_stored() {
        let mut cursor = Cursor::new(b"HEADERabcdefgh".to_vec());
        let data = read_stored(&mut cursor, PayloadRange { offset: 6, len: 3 }).unwrap();
        assert_eq!(data, b"abc");
    }

    #[test]
    fn test_read_stored_past_end() {
        let mut cursor = Cursor::new(b"0123".to_vec());
        let err = read_stored(&mut cursor, PayloadRange { offset: 2, len: 5 }).unwrap_err();
        assert!(matches!(
            err,
            PboError::TruncatedInput {
                offset: 4,
                expected: 3
            }
        ));
    }

    #[test]
    fn test_decode_packed() {
        let entry = Entry {
            original_size: 4,
            packed_size: 2,
            ..Entry::file("p", 0).with_method(PackingMethod::Packed)
        };
        assert_eq!(decode(&entry, vec![1, 2], &Doubler).unwrap(), vec![1, 1, 2, 2]);

        let wrong_size = Entry {
            original_size: 5,
            ..entry.clone()
        };
        assert!(matches!(
            decode(&wrong_size, vec![1, 2], &Doubler),
            Err(PboError::DecodeFailure { .. })
        ));

        let err = decode(&entry, vec![1, 2], &NoDecoder).unwrap_err();
        assert!(err.to_string().contains("p"));
    }

    #[test]
    fn test_decode_encrypted() {
        let entry = Entry::file("secret", 1).with_method(PackingMethod::Encrypted);
        assert!(matches!(
            decode(&entry, vec![0], &NoDecoder),
            Err(PboError::DecodeFailure { .. })
        ));
    }
}

//! Error types for lpbo operations.
//!
//! Every failure the PBO engine can report is a variant of [`PboError`]:
//! structural problems in the header, short reads, checksum failures,
//! payload decode failures, builder misuse, and I/O faults from the
//! underlying stream.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for lpbo operations.
#[derive(Debug, Error)]
pub enum PboError {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive file does not exist.
    #[error("Archive not found: {}", path.display())]
    ArchiveNotFound {
        /// Path that was opened.
        path: PathBuf,
    },

    /// Entry not found in archive.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// The header violates the format's structure.
    #[error("Malformed header at offset {offset}: {message}")]
    MalformedHeader {
        /// Byte offset where the problem was detected.
        offset: u64,
        /// Description of the violation.
        message: String,
    },

    /// The stream ended in the middle of a field.
    #[error("Truncated input at offset {offset}: expected {expected} more bytes")]
    TruncatedInput {
        /// Byte offset where the read started.
        offset: u64,
        /// Number of bytes that were expected but not available.
        expected: usize,
    },

    /// The checksum trailer does not match the archive contents.
    #[error("Checksum mismatch: stored {expected:02x?}, computed {computed:02x?}")]
    ChecksumMismatch {
        /// Digest stored in the trailer (empty if the trailer is unreadable).
        expected: Vec<u8>,
        /// Digest computed over the archive.
        computed: Vec<u8>,
    },

    /// A checksum trailer is required but the archive ends at its payloads.
    #[error("Archive has no checksum trailer")]
    ChecksumMissing,

    /// A packed payload could not be decoded.
    #[error("Cannot decode {name}: {message}")]
    DecodeFailure {
        /// Entry whose payload failed.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// An entry with the same name was already added.
    #[error("Duplicate entry name: {name}")]
    DuplicateName {
        /// The colliding name.
        name: String,
    },

    /// A name or extension string cannot be stored.
    #[error("Invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected string.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A payload does not fit the 32-bit size fields.
    #[error("Entry {name} is too large: {size} bytes")]
    EntryTooLarge {
        /// Entry name.
        name: String,
        /// Payload size in bytes.
        size: u64,
    },
}

/// Result type alias for lpbo operations.
pub type Result<T> = std::result::Result<T, PboError>;

impl PboError {
    /// Create an archive not found error.
    pub fn archive_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ArchiveNotFound { path: path.into() }
    }

    /// Create an entry not found error.
    pub fn entry_not_found(name: impl Into<String>) -> Self {
        Self::EntryNotFound { name: name.into() }
    }

    /// Create a malformed header error.
    pub fn malformed(offset: u64, message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            offset,
            message: message.into(),
        }
    }

    /// Create a truncated input error.
    pub fn truncated(offset: u64, expected: usize) -> Self {
        Self::TruncatedInput { offset, expected }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(expected: impl Into<Vec<u8>>, computed: impl Into<Vec<u8>>) -> Self {
        Self::ChecksumMismatch {
            expected: expected.into(),
            computed: computed.into(),
        }
    }

    /// Create a missing checksum error.
    pub fn checksum_missing() -> Self {
        Self::ChecksumMissing
    }

    /// Create a decode failure error.
    pub fn decode_failure(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DecodeFailure {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate name error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an entry too large error.
    pub fn entry_too_large(name: impl Into<String>, size: u64) -> Self {
        Self::EntryTooLarge {
            name: name.into(),
            size,
        }
    }

    /// Whether the error means "the stream ended too early".
    ///
    /// Header parsing accepts either this or [`PboError::MalformedHeader`]
    /// for a cut-off archive.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }
}

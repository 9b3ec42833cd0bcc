//! # lpbo Core
//!
//! Core components for the lpbo PBO archive library.
//!
//! This crate provides the building blocks the container format is made of:
//!
//! - [`io`]: Byte-level cursors for little-endian integers and C strings
//! - [`checksum`]: SHA-1 and CRC-32 trailer digests
//! - [`traits`]: Strategy traits for payload decoding and checksums
//! - [`entry`]: Archive entry metadata
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ CLI (lpbo-cli)                                          │
//! │     list / extract / create / test                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Container (lpbo-archive)                                │
//! │     header FSM, payload index, trailer, reader/writer   │
//! ├─────────────────────────────────────────────────────────┤
//! │ Primitives (this crate)                                 │
//! │     ByteReader/ByteWriter, checksums, strategy traits   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lpbo_core::checksum::Sha1Checksum;
//! use lpbo_core::traits::ChecksumAlgorithm;
//!
//! let digest = Sha1Checksum.digest(b"abc");
//! assert_eq!(digest.len(), Sha1Checksum.width());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod checksum;
pub mod entry;
pub mod error;
pub mod io;
pub mod traits;

// Re-exports for convenience
pub use checksum::{ChecksumWriter, Crc32Checksum, Sha1Checksum};
pub use entry::{Entry, Extension, NAME_SEPARATOR, PackingMethod};
pub use error::{PboError, Result};
pub use io::{ByteReader, ByteWriter};
pub use traits::{ChecksumAlgorithm, ChecksumHasher, NoDecoder, PayloadDecoder};

//! # lpbo Archive
//!
//! PBO container format support for lpbo.
//!
//! A PBO archive is a header of entry records, the payloads stored back to
//! back in header order, and a checksum trailer:
//!
//! ```text
//! [product record] [key\0 value\0]* \0     optional extension block
//! [entry record]*                          name\0 + five u32 LE fields
//! [terminator record]                      empty name, all zero
//! [payload 1] [payload 2] ...              packed_size bytes each
//! [0x00] [digest]                          SHA-1 by default
//! ```
//!
//! - [`record`]: one header record
//! - [`extension`]: the archive-scope key/value block
//! - [`header`]: the header state machine
//! - [`payload`]: payload offset index and decode hook
//! - [`trailer`]: checksum trailer
//! - [`reader`] / [`writer`]: the archive engine
//!
//! ## Example
//!
//! ```rust
//! use lpbo_archive::{PboReader, PboWriter};
//! use std::io::Cursor;
//!
//! let mut writer = PboWriter::new(Vec::new());
//! writer.add_extension("prefix", "x\\demo");
//! writer.add_file("a.txt", b"hi".to_vec()).unwrap();
//! writer.add_file("sub\\b.txt", b"yo".to_vec()).unwrap();
//! let bytes = writer.finish().unwrap();
//!
//! let mut reader = PboReader::new(Cursor::new(bytes)).unwrap();
//! assert_eq!(reader.list().collect::<Vec<_>>(), ["a.txt", "sub\\b.txt"]);
//! assert_eq!(reader.extract_to_vec("sub\\b.txt").unwrap(), b"yo");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod extension;
pub mod header;
pub mod payload;
pub mod reader;
pub mod record;
pub mod trailer;
pub mod writer;

// Re-exports
pub use header::{Header, HeaderState};
pub use payload::{PayloadIndex, PayloadRange};
pub use reader::{PboReader, ReadOptions};
pub use record::{DEFAULT_MAX_NAME_LEN, RecordKind};
pub use trailer::{ChecksumStatus, Trailer};
pub use writer::{PboWriter, WriteOptions, create_new};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Open the archive at `path` with default options.
pub fn open(path: impl AsRef<Path>) -> lpbo_core::Result<PboReader<BufReader<File>>> {
    PboReader::open(path)
}

//! Archive entry metadata.
//!
//! This module defines the [`Entry`] struct describing one member of a PBO
//! archive, the [`PackingMethod`] field that says how its payload is stored,
//! and the archive-scope [`Extension`] key/value pair.

use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Separator used by archive-internal names.
pub const NAME_SEPARATOR: char = '\\';

/// How an entry's payload is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackingMethod {
    /// Stored as-is.
    #[default]
    Uncompressed,
    /// Compressed ("Cprs"); needs a decoder.
    Packed,
    /// Product record ("Vers") opening the extension block.
    Product,
    /// Encrypted ("Encr"); recognised but never decodable.
    Encrypted,
    /// Any other value, passed through unmodified.
    Unknown(u32),
}

impl PackingMethod {
    /// On-disk value of [`PackingMethod::Packed`].
    pub const PACKED_MAGIC: u32 = 0x4370_7273;
    /// On-disk value of [`PackingMethod::Product`].
    pub const PRODUCT_MAGIC: u32 = 0x5665_7273;
    /// On-disk value of [`PackingMethod::Encrypted`].
    pub const ENCRYPTED_MAGIC: u32 = 0x456e_6372;

    /// Interpret an on-disk method field.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Uncompressed,
            Self::PACKED_MAGIC => Self::Packed,
            Self::PRODUCT_MAGIC => Self::Product,
            Self::ENCRYPTED_MAGIC => Self::Encrypted,
            other => Self::Unknown(other),
        }
    }

    /// On-disk value of this method.
    pub fn to_u32(self) -> u32 {
        match self {
            Self::Uncompressed => 0,
            Self::Packed => Self::PACKED_MAGIC,
            Self::Product => Self::PRODUCT_MAGIC,
            Self::Encrypted => Self::ENCRYPTED_MAGIC,
            Self::Unknown(value) => value,
        }
    }

    /// Get the method name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uncompressed => "stored",
            Self::Packed => "packed",
            Self::Product => "product",
            Self::Encrypted => "encrypted",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for PackingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(id) => write!(f, "unknown({id:#010x})"),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// An archive-scope metadata pair, e.g. `prefix = x\addons\foo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Key.
    pub key: String,
    /// Value.
    pub value: String,
}

impl Extension {
    /// Create a new extension record.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An entry in a PBO archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Archive-internal path, backslash separated.
    pub name: String,
    /// How the payload is stored.
    pub method: PackingMethod,
    /// Decoded payload size in bytes.
    pub original_size: u32,
    /// Format-defined field, passed through unmodified.
    pub reserved: u32,
    /// Seconds since the Unix epoch (0 = unknown).
    pub timestamp: u32,
    /// Stored payload size in bytes.
    pub packed_size: u32,
}

impl Entry {
    /// Create an uncompressed file entry.
    pub fn file(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            method: PackingMethod::Uncompressed,
            original_size: size,
            reserved: 0,
            timestamp: 0,
            packed_size: size,
        }
    }

    /// Builder method to set the timestamp.
    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder method to set the packing method.
    pub fn with_method(mut self, method: PackingMethod) -> Self {
        self.method = method;
        self
    }

    /// Check if the payload must be decoded before use.
    pub fn is_packed(&self) -> bool {
        self.method == PackingMethod::Packed
    }

    /// Size of the payload after decoding.
    ///
    /// Uncompressed entries written by some tools leave `original_size` at
    /// zero; the stored size is authoritative for them.
    pub fn decoded_size(&self) -> u32 {
        if self.method == PackingMethod::Uncompressed && self.original_size == 0 {
            self.packed_size
        } else {
            self.original_size
        }
    }

    /// Last modification time, if recorded.
    pub fn modified(&self) -> Option<SystemTime> {
        (self.timestamp != 0).then(|| UNIX_EPOCH + Duration::from_secs(u64::from(self.timestamp)))
    }

    /// Get the compression ratio (packed/decoded).
    pub fn compression_ratio(&self) -> f64 {
        let size = self.decoded_size();
        if size == 0 {
            1.0
        } else {
            f64::from(self.packed_size) / f64::from(size)
        }
    }

    /// Relative host path for extraction.
    ///
    /// Backslashes become host separators. Empty, `.`, `..`, root and drive
    /// components are dropped, so the result never leaves the extraction
    /// directory. Returns `None` if nothing usable remains.
    pub fn host_path(&self) -> Option<PathBuf> {
        let mut path = PathBuf::new();
        for part in self.name.split(['\\', '/']) {
            match Path::new(part).components().next() {
                Some(Component::Normal(s)) if !part.contains(':') => path.push(s),
                _ => {}
            }
        }
        (!path.as_os_str().is_empty()).then_some(path)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:>10} {:>10} {:>8} {}",
            self.decoded_size(),
            self.packed_size,
            self.method,
            self.name
        )
    }
}

/// Convert a host-relative path to an archive name (`a/b.txt` -> `a\b.txt`).
///
/// `..` removes the component before it and is dropped when there is none;
/// `.`, roots and drive prefixes are dropped. The result may be empty.
pub fn archive_name(path: &Path) -> String {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => parts.push(s.to_string_lossy()),
            Component::ParentDir => {
                parts.pop();
            }
            _ => {}
        }
    }
    parts.join(NAME_SEPARATOR.to_string().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_method_roundtrip_values() {
        assert_eq!(PackingMethod::from_u32(0), PackingMethod::Uncompressed);
        assert_eq!(PackingMethod::from_u32(0x43707273), PackingMethod::Packed);
        assert_eq!(PackingMethod::from_u32(0x56657273), PackingMethod::Product);
        assert_eq!(PackingMethod::from_u32(0x456e6372), PackingMethod::Encrypted);
        assert_eq!(PackingMethod::from_u32(7), PackingMethod::Unknown(7));
        assert_eq!(PackingMethod::Unknown(7).to_u32(), 7);
        assert_eq!(PackingMethod::Product.to_u32(), 0x56657273);
    }

    #[test]
    fn test_packing_method_display() {
        assert_eq!(format!("{}", PackingMethod::Packed), "packed");
        assert_eq!(format!("{}", PackingMethod::Unknown(1)), "unknown(0x00000001)");
    }

    #[test]
    fn test_entry_file() {
        let entry = Entry::file("data\\a.paa", 100).with_timestamp(1_600_000_000);
        assert!(!entry.is_packed());
        assert_eq!(entry.decoded_size(), 100);
        assert_eq!(entry.compression_ratio(), 1.0);
        assert!(entry.modified().is_some());
        assert!(Entry::file("x", 0).modified().is_none());
    }

    #[test]
    fn test_decoded_size_fallback() {
        let mut entry = Entry::file("a", 10);
        entry.original_size = 0;
        assert_eq!(entry.decoded_size(), 10);

        let packed = Entry {
            original_size: 40,
            packed_size: 10,
            ..Entry::file("b", 0).with_method(PackingMethod::Packed)
        };
        assert_eq!(packed.decoded_size(), 40);
        assert_eq!(packed.compression_ratio(), 0.25);
    }

    #[test]
    fn test_host_path() {
        let entry = Entry::file("sub\\b.txt", 2);
        assert_eq!(entry.host_path(), Some(Path::new("sub").join("b.txt")));

        let entry = Entry::file("..\\..\\etc\\passwd", 2);
        assert_eq!(entry.host_path(), Some(Path::new("etc").join("passwd")));

        let entry = Entry::file("C:\\Windows\\x.dll", 2);
        assert_eq!(entry.host_path(), Some(Path::new("Windows").join("x.dll")));

        assert_eq!(Entry::file("\\..\\", 0).host_path(), None);
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name(Path::new("sub/b.txt")), "sub\\b.txt");
        assert_eq!(archive_name(Path::new("./a.txt")), "a.txt");
        assert_eq!(archive_name(Path::new("/abs/x")), "abs\\x");
        assert_eq!(archive_name(Path::new("a/../b.txt")), "b.txt");
        assert_eq!(archive_name(Path::new("a/b/../../c/d.txt")), "c\\d.txt");
        assert_eq!(archive_name(Path::new("../x.txt")), "x.txt");
        assert_eq!(archive_name(Path::new("a/..")), "");
    }
}

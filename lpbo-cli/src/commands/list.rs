//! List command implementation.

use super::open_archive;
use crate::config::Config;
use crate::utils::print_entries;
use lpbo_archive::PboReader;
use lpbo_core::Entry;
use serde::Serialize;
use std::io::{self, Read, Seek, Write};

/// JSON serializable entry data for archive listings.
#[derive(Debug, Serialize)]
struct EntryJson<'a> {
    name: &'a str,
    method: &'static str,
    original_size: u32,
    packed_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<u32>,
}

impl<'a> EntryJson<'a> {
    fn from_entry(entry: &'a Entry) -> Self {
        Self {
            name: &entry.name,
            method: entry.method.name(),
            original_size: entry.decoded_size(),
            packed_size: entry.packed_size,
            timestamp: (entry.timestamp != 0).then_some(entry.timestamp),
        }
    }
}

/// JSON serializable extension pair.
#[derive(Debug, Serialize)]
struct ExtensionJson<'a> {
    key: &'a str,
    value: &'a str,
}

/// JSON output for archive listing.
#[derive(Debug, Serialize)]
struct ArchiveListJson<'a> {
    archive: String,
    extensions: Vec<ExtensionJson<'a>>,
    entries: Vec<EntryJson<'a>>,
}

pub fn cmd_list(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let reader = open_archive(config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_listing(&mut out, &reader, config)?;
    out.flush()?;
    Ok(())
}

/// Write the listing of `reader` to `out`.
///
/// Listing only reads the header; the checksum trailer is never consulted.
pub fn write_listing<W: Write, R: Read + Seek>(
    out: &mut W,
    reader: &PboReader<R>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let filters = config.filters()?;
    let entries = filters.apply(reader.entries());

    if config.json {
        let listing = ArchiveListJson {
            archive: config.archive.display().to_string(),
            extensions: reader
                .extensions()
                .iter()
                .map(|e| ExtensionJson {
                    key: &e.key,
                    value: &e.value,
                })
                .collect(),
            entries: entries.iter().map(|e| EntryJson::from_entry(e)).collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &listing)?;
        writeln!(out)?;
        return Ok(());
    }

    print_entries(out, reader.extensions(), &entries, config.verbose)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use lpbo_archive::PboWriter;
    use std::io::Cursor;

    fn sample() -> PboReader<Cursor<Vec<u8>>> {
        let mut writer = PboWriter::new(Vec::new());
        writer.add_extension("prefix", "x\\sample");
        writer.add_file("a.txt", b"hi".to_vec()).unwrap();
        writer.add_file("sub\\b.txt", b"yo".to_vec()).unwrap();
        PboReader::new(Cursor::new(writer.finish().unwrap())).unwrap()
    }

    fn listing(config: &Config) -> String {
        let mut out = Vec::new();
        write_listing(&mut out, &sample(), config).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_plain_listing() {
        let config = Config::new(Mode::List, "sample.pbo");
        assert_eq!(listing(&config), "a.txt\nsub\\b.txt\n");
    }

    #[test]
    fn test_filtered_listing() {
        let mut config = Config::new(Mode::List, "sample.pbo");
        config.include = vec!["sub/*".to_string()];
        assert_eq!(listing(&config), "sub\\b.txt\n");
    }

    #[test]
    fn test_json_listing() {
        let mut config = Config::new(Mode::List, "sample.pbo");
        config.json = true;

        let value: serde_json::Value = serde_json::from_str(&listing(&config)).unwrap();
        assert_eq!(value["archive"], "sample.pbo");
        assert_eq!(value["extensions"][0]["key"], "prefix");
        assert_eq!(value["entries"].as_array().unwrap().len(), 2);
        assert_eq!(value["entries"][1]["name"], "sub\\b.txt");
        assert_eq!(value["entries"][1]["packed_size"], 2);
        assert!(value["entries"][0].get("timestamp").is_none());
    }

    #[test]
    fn test_listing_ignores_bad_checksum() {
        let mut writer = PboWriter::new(Vec::new());
        writer.add_file("a.txt", b"hi".to_vec()).unwrap();
        let mut bytes = writer.finish().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        let reader = PboReader::new(Cursor::new(bytes)).unwrap();
        let mut out = Vec::new();
        write_listing(&mut out, &reader, &Config::new(Mode::List, "x.pbo")).unwrap();
        assert_eq!(out, b"a.txt\n");
    }
}

//! Extract command implementation.

use super::open_archive;
use crate::config::Config;
use crate::utils::create_progress_bar;
use filetime::FileTime;
use lpbo_archive::PboReader;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, Write};
use tracing::{debug, warn};

/// Counts reported after extraction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub bytes: u64,
    pub skipped: usize,
}

pub fn cmd_extract(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = open_archive(config)?;
    let summary = extract_all(&mut reader, config)?;

    if config.verbose {
        println!(
            "Extracted {} files ({} bytes) to {}",
            summary.files,
            summary.bytes,
            config.directory.display()
        );
        if summary.skipped > 0 {
            println!("Skipped {} entries", summary.skipped);
        }
    }
    Ok(())
}

/// Write every selected entry under `config.directory`.
///
/// Backslashes in entry names become host separators and intermediate
/// directories are created as needed. Names that cannot be mapped to a
/// relative path, and names mapping to a path already written, are skipped
/// with a warning. Each payload is decoded in memory before its file is
/// created, so a failing entry leaves nothing behind.
pub fn extract_all<R: Read + Seek>(
    reader: &mut PboReader<R>,
    config: &Config,
) -> Result<ExtractSummary, Box<dyn std::error::Error>> {
    reader.check_integrity()?;

    let filters = config.filters()?;
    let entries: Vec<_> = filters
        .apply(reader.entries())
        .into_iter()
        .cloned()
        .collect();

    let pb = create_progress_bar(entries.len() as u64, config.progress);
    pb.set_message("files");

    let mut summary = ExtractSummary::default();
    let mut seen = HashSet::new();

    for entry in &entries {
        pb.inc(1);

        let Some(relative) = entry.host_path() else {
            warn!(name = %entry.name, "entry name has no usable path, skipping");
            summary.skipped += 1;
            continue;
        };
        let target = config.directory.join(&relative);
        if !seen.insert(relative) {
            warn!(
                name = %entry.name,
                path = %target.display(),
                "entry maps to a path already extracted, keeping the first"
            );
            summary.skipped += 1;
            continue;
        }

        let data = reader.extract_to_vec(&entry.name)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = BufWriter::new(File::create(&target)?);
        out.write_all(&data)?;
        out.flush()?;
        drop(out);
        let written = data.len() as u64;

        if config.restore_mtime && entry.timestamp != 0 {
            let mtime = FileTime::from_unix_time(i64::from(entry.timestamp), 0);
            filetime::set_file_mtime(&target, mtime)?;
        }

        debug!(name = %entry.name, path = %target.display(), bytes = written, "extracted");
        if config.verbose {
            pb.println(format!("  Extracted: {} ({} bytes)", entry.name, written));
        }
        summary.files += 1;
        summary.bytes += written;
    }

    pb.finish_with_message("Done");
    Ok(summary)
}

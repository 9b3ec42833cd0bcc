//! Utility functions for the CLI.

use glob::Pattern;
use indicatif::{ProgressBar, ProgressStyle};
use lpbo_core::{Entry, Extension};
use std::io::{self, Write};

/// Create a progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb
}

/// Include/exclude glob patterns.
///
/// Patterns use `/` as the separator; entry names are matched with their
/// backslashes converted, so `-I 'scripts/*.sqf'` selects `scripts\init.sqf`.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Filters {
    /// Compile the patterns.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, glob::PatternError> {
        Ok(Self {
            include: include
                .iter()
                .map(|p| Pattern::new(p))
                .collect::<Result<_, _>>()?,
            exclude: exclude
                .iter()
                .map(|p| Pattern::new(p))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Check if an entry name passes the filters.
    /// - If include patterns are specified, the name must match at least one
    /// - If exclude patterns are specified, the name must not match any
    pub fn matches(&self, name: &str) -> bool {
        let name = name.replace('\\', "/");
        if self.exclude.iter().any(|p| p.matches(&name)) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|p| p.matches(&name))
    }

    /// Entries that pass the filters, in archive order.
    pub fn apply<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        entries.iter().filter(|e| self.matches(&e.name)).collect()
    }
}

/// Print entries in a formatted table.
pub fn print_entries<W: Write>(
    out: &mut W,
    extensions: &[Extension],
    entries: &[&Entry],
    verbose: bool,
) -> io::Result<()> {
    if !verbose {
        for entry in entries {
            writeln!(out, "{}", entry.name)?;
        }
        return Ok(());
    }

    for ext in extensions {
        writeln!(out, "{} = {}", ext.key, ext.value)?;
    }
    if !extensions.is_empty() {
        writeln!(out)?;
    }

    writeln!(
        out,
        "{:>10} {:>10} {:>8} {:>10}  Name",
        "Size", "Packed", "Method", "Timestamp",
    )?;
    writeln!(out, "{}", "-".repeat(60))?;

    let mut total_size = 0u64;
    let mut total_packed = 0u64;
    for entry in entries {
        let timestamp = if entry.timestamp == 0 {
            "-".to_string()
        } else {
            entry.timestamp.to_string()
        };
        writeln!(
            out,
            "{:>10} {:>10} {:>8} {:>10}  {}",
            entry.decoded_size(),
            entry.packed_size,
            entry.method.name(),
            timestamp,
            entry.name
        )?;
        total_size += u64::from(entry.decoded_size());
        total_packed += u64::from(entry.packed_size);
    }

    writeln!(out, "{}", "-".repeat(60))?;
    writeln!(
        out,
        "{:>10} {:>10}                      {} files",
        total_size,
        total_packed,
        entries.len()
    )
}

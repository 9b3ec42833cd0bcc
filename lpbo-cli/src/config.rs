//! Runtime configuration shared by every command.

use crate::utils::Filters;
use lpbo_archive::ReadOptions;
use std::path::PathBuf;

/// Default directory recursion limit when creating archives.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print entry names.
    List,
    /// Write entries to disk.
    Extract,
    /// Build a new archive.
    Create,
    /// Verify the checksum and decode every entry.
    Test,
}

/// Parsed command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub archive: PathBuf,
    /// Extraction root (`-C`).
    pub directory: PathBuf,
    /// Files and directories to pack.
    pub inputs: Vec<PathBuf>,
    pub verbose: bool,
    pub json: bool,
    pub progress: bool,
    /// Fail on unreadable inputs instead of skipping them.
    pub strict: bool,
    pub follow_links: bool,
    pub max_depth: usize,
    /// Extensions given with `-e KEY=VALUE`.
    pub extensions: Vec<(String, String)>,
    pub restore_mtime: bool,
    pub require_checksum: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Config {
    /// A configuration with every option at its default.
    pub fn new(mode: Mode, archive: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            archive: archive.into(),
            directory: PathBuf::from("."),
            inputs: Vec::new(),
            verbose: false,
            json: false,
            progress: false,
            strict: false,
            follow_links: false,
            max_depth: DEFAULT_MAX_DEPTH,
            extensions: Vec::new(),
            restore_mtime: true,
            require_checksum: false,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Engine options for reading the archive.
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::default().with_require_checksum(self.require_checksum)
    }

    /// Compiled include/exclude patterns.
    pub fn filters(&self) -> Result<Filters, glob::PatternError> {
        Filters::new(&self.include, &self.exclude)
    }
}

/// Parse a `KEY=VALUE` extension argument.
pub fn parse_extension(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    if key.is_empty() {
        return Err("extension key cannot be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extension() {
        assert_eq!(
            parse_extension("prefix=x\\addon").unwrap(),
            ("prefix".to_string(), "x\\addon".to_string())
        );
        assert_eq!(
            parse_extension("version=").unwrap(),
            ("version".to_string(), String::new())
        );
        assert_eq!(
            parse_extension("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_extension("novalue").is_err());
        assert!(parse_extension("=value").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::new(Mode::Extract, "a.pbo");
        assert_eq!(config.directory, PathBuf::from("."));
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.restore_mtime);
        assert!(!config.read_options().require_checksum);
    }
}

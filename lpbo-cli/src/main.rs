//! lpbo CLI - list, extract, and create Arma PBO archives.

mod commands;
mod config;
mod utils;

use clap::{ArgGroup, Parser};
use config::{Config, DEFAULT_MAX_DEPTH, Mode, parse_extension};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lpbo")]
#[command(author, version, about = "lpbo - An Arma PBO editor")]
#[command(long_about = "
lpbo lists, extracts and creates Arma PBO archives.

Examples:
  lpbo -l -f addon.pbo
  lpbo -x -f addon.pbo -C out
  lpbo -c -f addon.pbo config.cpp scripts '$PBOPREFIX$'
  lpbo -t -f addon.pbo
")]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["list", "extract", "create", "test"]),
))]
struct Cli {
    /// List contents of the archive
    #[arg(short = 'l', long)]
    list: bool,

    /// Extract contents of the archive
    #[arg(short = 'x', long)]
    extract: bool,

    /// Create a new archive
    #[arg(short = 'c', long)]
    create: bool,

    /// Test archive integrity
    #[arg(short = 't', long)]
    test: bool,

    /// Archive file to use
    #[arg(short = 'f', long = "file", value_name = "ARCHIVE")]
    archive: PathBuf,

    /// Change to directory (extraction only)
    #[arg(short = 'C', long = "directory", value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Files and directories to add (creation only)
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output the listing as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    /// Show progress bar
    #[arg(short = 'P', long)]
    progress: bool,

    /// Fail on unreadable inputs instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Follow symbolic links when walking directories
    #[arg(short = 'L', long)]
    follow_links: bool,

    /// Maximum directory recursion depth
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Add a header extension (repeatable)
    #[arg(short = 'e', long = "extension", value_name = "KEY=VALUE", value_parser = parse_extension)]
    extensions: Vec<(String, String)>,

    /// Do not restore entry timestamps on extracted files
    #[arg(long)]
    no_mtime: bool,

    /// Refuse archives without a checksum trailer
    #[arg(long)]
    require_checksum: bool,

    /// Include only entries matching pattern (glob syntax: *.sqf, scripts/*)
    #[arg(short = 'I', long)]
    include: Vec<String>,

    /// Exclude entries matching pattern (glob syntax)
    #[arg(short = 'X', long)]
    exclude: Vec<String>,

    /// Log level filter (overrides RUST_LOG), e.g. debug or lpbo_archive=trace
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.list {
            Mode::List
        } else if self.extract {
            Mode::Extract
        } else if self.create {
            Mode::Create
        } else {
            Mode::Test
        }
    }

    fn into_config(self) -> Config {
        let mut config = Config::new(self.mode(), self.archive);
        config.directory = self.directory;
        config.inputs = self.files;
        config.verbose = self.verbose;
        config.json = self.json;
        config.progress = self.progress;
        config.strict = self.strict;
        config.follow_links = self.follow_links;
        config.max_depth = self.max_depth;
        config.extensions = self.extensions;
        config.restore_mtime = !self.no_mtime;
        config.require_checksum = self.require_checksum;
        config.include = self.include;
        config.exclude = self.exclude;
        config
    }
}

/// Install the stderr log subscriber.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match config.mode {
        Mode::List => commands::cmd_list(config),
        Mode::Extract => commands::cmd_extract(config),
        Mode::Create => commands::cmd_create(config),
        Mode::Test => commands::cmd_test(config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = cli.into_config();
    tracing::debug!(?config, "parsed command line");

    if let Err(e) = run(&config) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Cli::try_parse_from(std::iter::once("lpbo").chain(args.iter().copied()))
            .map(Cli::into_config)
    }

    #[test]
    fn test_modes() {
        assert_eq!(parse(&["-l", "-f", "a.pbo"]).unwrap().mode, Mode::List);
        assert_eq!(parse(&["-x", "-f", "a.pbo"]).unwrap().mode, Mode::Extract);
        assert_eq!(parse(&["-t", "-f", "a.pbo"]).unwrap().mode, Mode::Test);

        let create = parse(&["-c", "-f", "a.pbo", "a.txt", "sub"]).unwrap();
        assert_eq!(create.mode, Mode::Create);
        assert_eq!(create.inputs, [PathBuf::from("a.txt"), PathBuf::from("sub")]);
    }

    #[test]
    fn test_combined_short_flags() {
        let config = parse(&["-xf", "a.pbo", "-C", "out"]).unwrap();
        assert_eq!(config.mode, Mode::Extract);
        assert_eq!(config.archive, PathBuf::from("a.pbo"));
        assert_eq!(config.directory, PathBuf::from("out"));
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(
            parse(&["-f", "a.pbo"]).unwrap_err().kind(),
            ErrorKind::MissingRequiredArgument
        );
        assert_eq!(
            parse(&["-l", "-x", "-f", "a.pbo"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
        assert_eq!(
            parse(&["-l", "-f", "a.pbo", "-f", "b.pbo"]).unwrap_err().kind(),
            ErrorKind::ArgumentConflict
        );
        assert!(parse(&["-l"]).is_err());
    }

    #[test]
    fn test_help_is_not_a_failure() {
        assert_eq!(parse(&["-h"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_options() {
        let config = parse(&[
            "-c",
            "-f",
            "a.pbo",
            "-e",
            "prefix=x\\y",
            "-e",
            "version=1",
            "--strict",
            "-L",
            "--max-depth",
            "3",
            "--no-mtime",
        ])
        .unwrap();

        assert_eq!(
            config.extensions,
            [
                ("prefix".to_string(), "x\\y".to_string()),
                ("version".to_string(), "1".to_string())
            ]
        );
        assert!(config.strict);
        assert!(config.follow_links);
        assert_eq!(config.max_depth, 3);
        assert!(!config.restore_mtime);
        assert!(parse(&["-c", "-f", "a.pbo", "-e", "broken"]).is_err());
    }
}

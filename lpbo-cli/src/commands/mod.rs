//! Command implementations for the lpbo CLI.

pub mod create;
pub mod extract;
pub mod list;

pub use create::cmd_create;
pub use extract::cmd_extract;
pub use list::cmd_list;
pub use test::cmd_test;

use crate::config::Config;
use lpbo_archive::PboReader;
use std::fs::File;
use std::io::BufReader;

/// Open the archive named by `-f`.
pub fn open_archive(config: &Config) -> lpbo_core::Result<PboReader<BufReader<File>>> {
    PboReader::open_with(&config.archive, config.read_options())
}

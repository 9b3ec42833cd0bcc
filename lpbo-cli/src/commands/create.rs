//! Create command implementation.

use crate::config::Config;
use crate::utils::create_progress_bar;
use lpbo_archive::PboWriter;
use lpbo_core::PboError;
use lpbo_core::entry::archive_name;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One file found while walking the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A regular file stored under `name`.
    File { name: String, path: PathBuf },
    /// A `$NAME$` file whose first line becomes an extension value.
    Extension { key: String, path: PathBuf },
}

/// Counts reported after creation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CreateSummary {
    pub files: usize,
    pub extensions: usize,
    pub bytes: u64,
    pub skipped: usize,
}

pub fn cmd_create(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let inputs = collect_inputs(config)?;
    let writer = PboWriter::create(&config.archive)?;
    let (_, summary) = build_archive(writer, &inputs, config)?;

    if config.verbose {
        println!(
            "Created {}: {} files ({} bytes), {} extensions",
            config.archive.display(),
            summary.files,
            summary.bytes,
            summary.extensions
        );
        if summary.skipped > 0 {
            println!("Skipped {} inputs", summary.skipped);
        }
    }
    Ok(())
}

/// Walk every input path and classify what it contains.
///
/// Directories are recursed up to `config.max_depth`; symlinked
/// directories are only followed with `--follow-links`, and loops are
/// reported instead of recursed.
pub fn collect_inputs(config: &Config) -> Result<Vec<Input>, Box<dyn std::error::Error>> {
    let mut inputs = Vec::new();

    for root in &config.inputs {
        let walker = WalkDir::new(root)
            .follow_links(config.follow_links)
            .max_depth(config.max_depth)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let message = match e.loop_ancestor() {
                        Some(ancestor) => format!(
                            "symlink loop at {} (points to {})",
                            e.path().map_or_else(String::new, |p| p.display().to_string()),
                            ancestor.display()
                        ),
                        None => e.to_string(),
                    };
                    skip_or_fail(config, &message)?;
                    continue;
                }
            };

            let path = entry.path();
            let is_file = entry.file_type().is_file()
                || (entry.file_type().is_symlink() && path.is_file());
            if !is_file {
                continue;
            }

            match classify(path) {
                Some(input) => inputs.push(input),
                None => skip_or_fail(config, &format!("{} has no archive name", path.display()))?,
            }
        }
    }

    debug!(count = inputs.len(), "collected inputs");
    Ok(inputs)
}

/// Decide whether `path` is an entry or an extension file.
///
/// `$NAME$` files are extensions at any depth; the key is `NAME` in
/// lowercase.
fn classify(path: &Path) -> Option<Input> {
    let file_name = path.file_name()?.to_str().unwrap_or_default();
    if let Some(key) = extension_key(file_name) {
        return Some(Input::Extension {
            key,
            path: path.to_path_buf(),
        });
    }

    let name = archive_name(path);
    (!name.is_empty()).then(|| Input::File {
        name,
        path: path.to_path_buf(),
    })
}

fn extension_key(file_name: &str) -> Option<String> {
    let inner = file_name.strip_prefix('$')?.strip_suffix('$')?;
    (!inner.is_empty()).then(|| inner.to_lowercase())
}

/// Feed `inputs` into `writer` and finish the archive.
pub fn build_archive<W: Write>(
    mut writer: PboWriter<W>,
    inputs: &[Input],
    config: &Config,
) -> Result<(W, CreateSummary), Box<dyn std::error::Error>> {
    let mut summary = CreateSummary::default();

    for (key, value) in &config.extensions {
        writer.add_extension(key.as_str(), value.as_str());
        summary.extensions += 1;
    }

    let pb = create_progress_bar(inputs.len() as u64, config.progress);
    pb.set_message("files");

    for input in inputs {
        pb.inc(1);
        match input {
            Input::Extension { key, path } => {
                let value = match read_first_line(path) {
                    Ok(value) => value,
                    Err(e) => {
                        skip_or_fail(config, &format!("{}: {e}", path.display()))?;
                        summary.skipped += 1;
                        continue;
                    }
                };
                if config.verbose {
                    pb.println(format!("  Extension: {key} = {value}"));
                }
                writer.add_extension(key.as_str(), value);
                summary.extensions += 1;
            }
            Input::File { name, path } => {
                let data = match fs::read(path) {
                    Ok(data) => data,
                    Err(e) => {
                        skip_or_fail(config, &format!("{}: {e}", path.display()))?;
                        summary.skipped += 1;
                        continue;
                    }
                };
                let len = data.len() as u64;
                match writer.add_file_with_timestamp(name, data, modified_secs(path)) {
                    Ok(()) => {}
                    Err(PboError::DuplicateName { .. }) if !config.strict => {
                        warn!(name = %name, path = %path.display(), "duplicate entry name, skipping");
                        summary.skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }
                if config.verbose {
                    pb.println(format!("  Added: {name} ({len} bytes)"));
                }
                summary.files += 1;
                summary.bytes += len;
            }
        }
    }

    let sink = writer.finish()?;
    pb.finish_with_message("Done");
    Ok((sink, summary))
}

/// Read the first line of a text file, without its line terminator.
fn read_first_line(path: &Path) -> std::io::Result<String> {
    let mut line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Modification time of `path` as seconds since the epoch, or 0.
fn modified_secs(path: &Path) -> u32 {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| u32::try_from(d.as_secs()).ok())
        .unwrap_or(0)
}

fn skip_or_fail(config: &Config, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    if config.strict {
        return Err(message.into());
    }
    warn!("{message}, skipping");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use lpbo_archive::PboReader;
    use std::io::Cursor;

    fn config(inputs: Vec<PathBuf>) -> Config {
        let mut config = Config::new(Mode::Create, "out.pbo");
        config.inputs = inputs;
        config
    }

    fn build(config: &Config) -> PboReader<Cursor<Vec<u8>>> {
        let inputs = collect_inputs(config).unwrap();
        let (bytes, _) = build_archive(PboWriter::new(Vec::new()), &inputs, config).unwrap();
        PboReader::new(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_extension_key() {
        assert_eq!(extension_key("$PBOPREFIX$"), Some("pboprefix".to_string()));
        assert_eq!(extension_key("$$"), None);
        assert_eq!(extension_key("$half"), None);
        assert_eq!(extension_key("plain.txt"), None);
    }

    #[test]
    fn test_classify_names() {
        let input = classify(Path::new("sub/b.txt")).unwrap();
        assert_eq!(
            input,
            Input::File {
                name: "sub\\b.txt".to_string(),
                path: PathBuf::from("sub/b.txt")
            }
        );
        assert!(matches!(
            classify(Path::new("deep/dir/$Version$")),
            Some(Input::Extension { key, .. }) if key == "version"
        ));
    }

    #[test]
    fn test_create_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("addon");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("a.txt"), "hi").unwrap();
        fs::write(root.join("sub").join("b.txt"), "yo").unwrap();
        fs::write(root.join("$PREFIX$"), "x\\addon\r\nignored\n").unwrap();

        let mut reader = build(&config(vec![root.clone()]));

        let base = archive_name(&root);
        let names: Vec<_> = reader.list().map(str::to_owned).collect();
        assert_eq!(names, [format!("{base}\\a.txt"), format!("{base}\\sub\\b.txt")]);
        assert_eq!(reader.prefix(), Some("x\\addon"));
        assert_eq!(
            reader.extract_to_vec(&format!("{base}\\sub\\b.txt")).unwrap(),
            b"yo"
        );
    }

    #[test]
    fn test_command_line_extensions_come_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("$VERSION$"), "2\n").unwrap();

        let mut config = config(vec![dir.path().to_path_buf()]);
        config.extensions = vec![("product".to_string(), "arma3".to_string())];
        let reader = build(&config);

        assert!(reader.is_empty());
        assert_eq!(reader.extensions()[0].key, "product");
        assert_eq!(reader.extension("version"), Some("2"));
    }

    #[test]
    fn test_missing_input_policy() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");

        assert!(collect_inputs(&config(vec![missing.clone()])).unwrap().is_empty());

        let mut strict = config(vec![missing]);
        strict.strict = true;
        assert!(collect_inputs(&strict).is_err());
    }

    #[test]
    fn test_max_depth() {
        let dir = tempfile::tempdir().unwrap();
        let deep = dir.path().join("a").join("b");
        fs::create_dir_all(&deep).unwrap();
        fs::write(dir.path().join("a").join("top.txt"), "t").unwrap();
        fs::write(deep.join("deep.txt"), "d").unwrap();

        let mut config = config(vec![dir.path().join("a")]);
        config.max_depth = 1;
        let inputs = collect_inputs(&config).unwrap();

        assert_eq!(inputs.len(), 1);
        assert!(matches!(&inputs[0], Input::File { name, .. } if name.ends_with("top.txt")));
    }

    #[test]
    fn test_duplicate_inputs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, "a").unwrap();

        let config = config(vec![file.clone(), file]);
        let reader = build(&config);
        assert_eq!(reader.len(), 1);
    }
}

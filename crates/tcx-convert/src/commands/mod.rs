pub mod archive;
pub mod batch;
pub mod convert;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::Config;

/// Reads an input file after checking it against the configured size limit.
pub(crate) fn read_input(path: &Path, config: &Config) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if metadata.len() > config.max_input_bytes {
        bail!(
            "{} is too large ({} bytes, limit {})",
            path.display(),
            metadata.len(),
            config.max_input_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// `dir/name.ext` -> `out_dir/<prefix>name.ext`, with `out_dir` defaulting to `dir`.
pub(crate) fn output_path(input: &Path, out_dir: Option<&Path>, prefix: &str) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .with_context(|| format!("{} has no file name", input.display()))?;
    let renamed = format!("{prefix}{}", file_name.to_string_lossy());
    Ok(match out_dir {
        Some(dir) => dir.join(renamed),
        None => input.with_file_name(renamed),
    })
}

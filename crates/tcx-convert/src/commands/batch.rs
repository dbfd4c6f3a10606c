use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tcx_transcoder::{looks_like_tcx, TcxTranscoder};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::{output_path, read_input};
use crate::config::Config;
use crate::report::{outcome_table, print_counts, FileOutcome};

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Directory searched recursively for .tcx files
    #[arg(short, long)]
    pub dir: PathBuf,
    /// Directory for converted files, mirroring the layout under `--dir`
    /// (defaults to each input's directory)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Where batch outputs go when `--out-dir` is given.
#[derive(Debug)]
struct OutputRoot {
    input_root: PathBuf,
    out_dir: PathBuf,
}

impl OutputRoot {
    /// Directory for the output of `input`: its directory relative to the
    /// batch root, recreated under `out_dir`.
    fn target_dir(&self, input: &Path) -> PathBuf {
        let relative = input
            .strip_prefix(&self.input_root)
            .ok()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new(""));
        self.out_dir.join(relative)
    }
}

pub async fn handle_batch_command(args: BatchArgs, config: &Config) -> Result<()> {
    let inputs = find_tcx_files(&args.dir)?;
    info!(dir = %args.dir.display(), files = inputs.len(), "starting batch conversion");

    if let Some(out_dir) = &args.out_dir {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
    }

    let permits = Arc::new(Semaphore::new(config.jobs));
    let config = Arc::new(config.clone());
    let output_root = args.out_dir.map(|out_dir| {
        Arc::new(OutputRoot {
            input_root: args.dir.clone(),
            out_dir,
        })
    });
    let mut tasks = JoinSet::new();

    for path in inputs {
        let permit = permits.clone().acquire_owned().await?;
        let config = config.clone();
        let output_root = output_root.clone();
        tasks.spawn_blocking(move || {
            let outcome = convert_one(&path, output_root.as_deref(), &config);
            drop(permit);
            outcome
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("conversion task panicked")?);
    }
    outcomes.sort_by(|a, b| a.name.cmp(&b.name));

    println!("{}", outcome_table(&outcomes));
    print_counts(&outcomes);
    Ok(())
}

fn find_tcx_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let pattern = dir.join("**/*.tcx");
    let pattern_str = pattern
        .to_str()
        .with_context(|| format!("{} is not valid UTF-8", pattern.display()))?;

    let mut files = Vec::new();
    for entry in glob::glob(pattern_str)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "could not read path from glob pattern"),
        }
    }
    Ok(files)
}

/// Converts one file; every failure is folded into the outcome so one bad
/// document never stops the batch.
fn convert_one(path: &Path, output_root: Option<&OutputRoot>, config: &Config) -> FileOutcome {
    let name = path.display().to_string();
    match try_convert(path, output_root, config) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!(file = %name, error = %format!("{err:#}"), "skipping file");
            FileOutcome::failed(name, format!("{err:#}"))
        }
    }
}

fn try_convert(
    path: &Path,
    output_root: Option<&OutputRoot>,
    config: &Config,
) -> Result<FileOutcome> {
    let content = read_input(path, config)?;
    if !looks_like_tcx(&content) {
        bail!("does not appear to be a valid TCX file");
    }
    let transcoded = TcxTranscoder::default().transcode(&content)?;
    let out_dir = output_root.map(|root| root.target_dir(path));
    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    let output = output_path(path, out_dir.as_deref(), &config.output_prefix)?;
    std::fs::write(&output, &transcoded.output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(file = %path.display(), output = %output.display(), "converted TCX file");
    Ok(FileOutcome::converted(path.display().to_string(), transcoded.summary))
}

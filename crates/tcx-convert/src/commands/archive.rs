use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tcx_transcoder::{transcode_archive, TcxTranscoder};
use tracing::{info, warn};

use super::{output_path, read_input};
use crate::config::Config;
use crate::report::{outcome_table, print_counts, FileOutcome};

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// ZIP archive containing .tcx files
    pub input: PathBuf,
    /// Where to write the archive of converted files
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn handle_archive_command(args: ArchiveArgs, config: &Config) -> Result<()> {
    let content = read_input(&args.input, config)?;
    let batch = transcode_archive(
        &content,
        &TcxTranscoder::default(),
        &config.output_prefix,
        config.max_input_bytes,
    )
    .with_context(|| format!("{} is not a valid ZIP archive", args.input.display()))?;

    let outcomes: Vec<FileOutcome> = batch
        .reports
        .iter()
        .map(|report| {
            let summary = batch
                .converted
                .iter()
                .find(|member| member.source_name == report.name)
                .map(|member| &member.summary);
            FileOutcome::from_member(report, summary)
        })
        .collect();

    if batch.converted.is_empty() {
        warn!(archive = %args.input.display(), "archive contained no convertible TCX files");
    } else {
        let output = match args.output {
            Some(path) => path,
            None => output_path(&args.input, None, &config.output_prefix)?,
        };
        let packed = batch.to_zip_archive()?;
        std::fs::write(&output, packed)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!(
            archive = %args.input.display(),
            output = %output.display(),
            converted = batch.converted_count(),
            failed = batch.failed_count(),
            "converted archive"
        );
    }

    println!("{}", outcome_table(&outcomes));
    print_counts(&outcomes);
    Ok(())
}

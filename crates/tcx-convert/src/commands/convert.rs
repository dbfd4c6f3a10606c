use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tcx_transcoder::{looks_like_tcx, TcxTranscoder};
use tracing::info;

use super::{output_path, read_input};
use crate::config::Config;
use crate::report::print_summary;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// TCX file to convert
    pub input: PathBuf,
    /// Where to write the converted file (defaults to a prefixed name next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Print the activity summary as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_convert_command(args: ConvertArgs, config: &Config) -> Result<()> {
    let content = read_input(&args.input, config)?;
    if !looks_like_tcx(&content) {
        bail!("{} does not appear to be a valid TCX file", args.input.display());
    }

    let transcoded = TcxTranscoder::default()
        .transcode(&content)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;

    let output = match args.output {
        Some(path) => path,
        None => output_path(&args.input, None, &config.output_prefix)?,
    };
    std::fs::write(&output, &transcoded.output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        input = %args.input.display(),
        output = %output.display(),
        bytes = transcoded.output.len(),
        "converted TCX file"
    );

    print_summary(&transcoded.summary, args.json)
}

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tcx_transcoder::DEFAULT_OUTPUT_PREFIX;

pub const CONFIG_PATH_ENV: &str = "TCX_CONVERT_CONFIG";
const MAX_INPUT_BYTES_ENV: &str = "TCX_MAX_INPUT_BYTES";
const JOBS_ENV: &str = "TCX_JOBS";
const OUTPUT_PREFIX_ENV: &str = "TCX_OUTPUT_PREFIX";

const DEFAULT_MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Inputs larger than this are rejected before they are read.
    pub max_input_bytes: u64,
    /// Upper bound on concurrent transcodes in batch mode.
    pub jobs: usize,
    pub output_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            jobs: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(4),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup(MAX_INPUT_BYTES_ENV) {
            self.max_input_bytes = value
                .trim()
                .parse()
                .with_context(|| format!("{MAX_INPUT_BYTES_ENV} must be a byte count"))?;
        }
        if let Some(value) = lookup(JOBS_ENV) {
            self.jobs = value
                .trim()
                .parse()
                .with_context(|| format!("{JOBS_ENV} must be a positive integer"))?;
        }
        if let Some(value) = lookup(OUTPUT_PREFIX_ENV) {
            self.output_prefix = value;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            bail!("jobs must be at least 1");
        }
        if self.output_prefix.contains(['/', '\\']) {
            bail!("output_prefix must not contain path separators");
        }
        Ok(())
    }
}

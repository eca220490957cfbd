use crate::error::{AnnotatorError, Result};
use clap::Args;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_PATH: &str = "gsk_hard_cot.json";
pub const DEFAULT_OUTPUT_DIR: &str = "annotated_data";
const FALLBACK_BENCHMARK_NAME: &str = "dataset";

/// Command line flags shared by the GUI and the headless CLI.
#[derive(Args, Debug, Clone)]
pub struct CliArgs {
    /// Path to input JSON file
    #[arg(long = "data_path", default_value = DEFAULT_DATA_PATH, global = true)]
    pub data_path: PathBuf,

    /// Output directory for annotated files
    #[arg(long = "output_dir", default_value = DEFAULT_OUTPUT_DIR, global = true)]
    pub output_dir: PathBuf,

    /// Also rewrite the input file with every saved change
    #[arg(long = "rewrite_input", global = true)]
    pub rewrite_input: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatorConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub rewrite_input: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            rewrite_input: false,
        }
    }
}

impl From<CliArgs> for AnnotatorConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            data_path: args.data_path,
            output_dir: args.output_dir,
            rewrite_input: args.rewrite_input,
        }
    }
}

impl AnnotatorConfig {
    pub fn new(data_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            output_dir: output_dir.into(),
            rewrite_input: false,
        }
    }

    pub fn benchmark_name(&self) -> String {
        benchmark_name(&self.data_path)
    }

    pub fn prepare_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| AnnotatorError::io(&self.output_dir, e))
    }
}

/// File name up to its first `.`: `gsk_hard_cot.json` gives `gsk_hard_cot`.
pub fn benchmark_name(data_path: &Path) -> String {
    data_path
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_BENCHMARK_NAME.to_string())
}

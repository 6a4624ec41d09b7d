pub mod cli;
pub mod toml_config;

use crate::core::report::parse_formats;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_input, validate_non_empty_string, validate_path,
    validate_range, validate_unique_names,
};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME_COLUMN: &str = "Name";
pub const DEFAULT_ARCHIVE_NAME: &str = "allocation_output.zip";

/// Checks shared by every configuration source.
pub fn validate_provider<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_input("input", config.input())?;
    validate_path("output_path", config.output_path())?;
    validate_non_empty_string("name_column", config.name_column())?;
    validate_unique_names("slots", config.slots())?;
    parse_formats(config.output_formats())?;

    if let Some(archive) = config.archive_name() {
        validate_file_extension("archive_name", archive, &["zip"])?;
    }
    if let Some(timeout) = config.request_timeout_seconds() {
        validate_range("timeout_seconds", timeout, 1, 600)?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "slot-alloc")]
#[command(about = "Allocate applicants to capacity-bounded slots from a preference score sheet")]
pub struct CliConfig {
    /// Score sheet: local CSV path or http(s) URL
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    /// Slot columns in order; defaults to every column except the name column
    #[arg(long, value_delimiter = ',')]
    pub slots: Vec<String>,

    #[arg(long, default_value = DEFAULT_NAME_COLUMN)]
    pub name_column: String,

    #[arg(long, value_delimiter = ',', default_value = "csv")]
    pub formats: Vec<String>,

    /// Bundle all output files into one zip archive
    #[arg(long)]
    pub compress: bool,

    #[arg(long, default_value = DEFAULT_ARCHIVE_NAME)]
    pub archive_name: String,

    /// HTTP timeout when the input is a URL
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn slots(&self) -> &[String] {
        &self.slots
    }

    fn name_column(&self) -> &str {
        &self.name_column
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn archive_name(&self) -> Option<&str> {
        self.compress.then_some(self.archive_name.as_str())
    }

    fn request_timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::app::pipelines::CsvPipeline;
pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::allocator::{allocate, AllocationContext};
pub use crate::core::engine::{PipelineEngine, RunSummary};
pub use crate::domain::model::{Allocation, AllocationEvent, AllocationOutcome, PreferenceInput, SlotAssignment};
pub use crate::utils::error::{AllocError, Result};

pub mod allocator;
pub mod engine;
pub mod preferences;
pub mod report;

pub use crate::domain::model::{AllocationOutcome, PreferenceInput};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;

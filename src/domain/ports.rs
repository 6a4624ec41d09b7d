use crate::domain::model::{AllocationOutcome, PreferenceInput};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Local path (relative to the storage root) or http(s) URL of the score sheet.
    fn input(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Slot columns in order. Empty means every column except the name column.
    fn slots(&self) -> &[String];
    fn name_column(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// Archive file name when outputs are bundled, `None` to write plain files.
    fn archive_name(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> Option<u64> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<PreferenceInput>;
    async fn transform(&self, input: PreferenceInput) -> Result<AllocationOutcome>;
    async fn load(&self, outcome: AllocationOutcome) -> Result<String>;
}

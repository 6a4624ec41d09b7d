use crate::core::allocator::allocate;
use crate::core::preferences::load_preferences;
use crate::core::report::{parse_formats, render, RenderedFile};
use crate::core::{AllocationOutcome, ConfigProvider, Pipeline, PreferenceInput, Storage};
use crate::utils::error::{AllocError, Result};
use crate::utils::validation::is_remote;
use chrono::Utc;
use reqwest::Client;
use std::io::Write;
use std::time::Duration;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Score sheet in, allocation table out.
pub struct CsvPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> CsvPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }

    async fn fetch_sheet(&self) -> Result<Vec<u8>> {
        let input = self.config.input();
        if !is_remote(input) {
            return self.storage.read_file(input).await;
        }

        tracing::debug!("Downloading score sheet from: {}", input);
        let mut request = self.client.get(input);
        if let Some(timeout) = self.config.request_timeout_seconds() {
            request = request.timeout(Duration::from_secs(timeout));
        }

        let response = request.send().await?;
        tracing::debug!("Response status: {}", response.status());
        if !response.status().is_success() {
            return Err(AllocError::HttpStatusError {
                status: response.status().as_u16(),
                url: input.to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn bundle(files: &[RenderedFile]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for file in files {
            zip.start_file(file.name.as_str(), SimpleFileOptions::default())?;
            zip.write_all(&file.contents)?;
        }
        Ok(zip.finish()?.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvPipeline<S, C> {
    async fn extract(&self) -> Result<PreferenceInput> {
        let data = self.fetch_sheet().await?;
        tracing::debug!("Score sheet is {} bytes", data.len());

        load_preferences(&data, self.config.name_column(), self.config.slots())
    }

    async fn transform(&self, input: PreferenceInput) -> Result<AllocationOutcome> {
        allocate(&input.applicants, &input.slots, &input.preferences)
    }

    async fn load(&self, outcome: AllocationOutcome) -> Result<String> {
        let formats = parse_formats(self.config.output_formats())?;
        let files = render(&outcome, &formats, Utc::now())?;

        if let Some(archive) = self.config.archive_name() {
            // 打包成單一 ZIP
            let zip_data = Self::bundle(&files)?;
            let path = self.output_file(archive);
            tracing::debug!("Writing {} files into {} ({} bytes)", files.len(), path, zip_data.len());
            self.storage.write_file(&path, &zip_data).await?;
            return Ok(path);
        }

        for file in &files {
            let path = self.output_file(&file.name);
            tracing::debug!("Writing {} ({} bytes)", path, file.contents.len());
            self.storage.write_file(&path, &file.contents).await?;
        }
        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const SHEET: &str = "\
Name,P1,P2,P3
S1,3,2,1
S2,3,1,2
S3,3,2,1
S4,3,,
";

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                AllocError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }
    }

    struct MockConfig {
        input: String,
        slots: Vec<String>,
        formats: Vec<String>,
        archive: Option<String>,
    }

    impl MockConfig {
        fn new(input: impl Into<String>) -> Self {
            Self {
                input: input.into(),
                slots: vec![],
                formats: vec!["csv".to_string()],
                archive: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn slots(&self) -> &[String] {
            &self.slots
        }

        fn name_column(&self) -> &str {
            "Name"
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn archive_name(&self) -> Option<&str> {
            self.archive.as_deref()
        }
    }

    #[tokio::test]
    async fn test_extract_from_storage() {
        let storage = MockStorage::default();
        storage.put("prefs.csv", SHEET.as_bytes()).await;
        let pipeline = CsvPipeline::new(storage, MockConfig::new("prefs.csv"));

        let input = pipeline.extract().await.unwrap();

        assert_eq!(input.applicants, vec!["S1", "S2", "S3", "S4"]);
        assert_eq!(input.slots, vec!["P1", "P2", "P3"]);
        assert_eq!(input.preferences["S2"], vec!["P1", "P3", "P2"]);
        assert_eq!(input.preferences["S4"], vec!["P1"]);
    }

    #[tokio::test]
    async fn test_extract_over_http() {
        let server = MockServer::start();
        let sheet_mock = server.mock(|when, then| {
            when.method(GET).path("/export.csv");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body(SHEET);
        });

        let pipeline = CsvPipeline::new(MockStorage::default(), MockConfig::new(server.url("/export.csv")));
        let input = pipeline.extract().await.unwrap();

        sheet_mock.assert();
        assert_eq!(input.applicants.len(), 4);
    }

    #[tokio::test]
    async fn test_extract_http_failure_is_reported() {
        let server = MockServer::start();
        let sheet_mock = server.mock(|when, then| {
            when.method(GET).path("/export.csv");
            then.status(404);
        });

        let pipeline = CsvPipeline::new(MockStorage::default(), MockConfig::new(server.url("/export.csv")));
        let err = pipeline.extract().await.unwrap_err();

        sheet_mock.assert();
        assert!(matches!(err, AllocError::HttpStatusError { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_transform_leaves_short_list_applicant_over() {
        let storage = MockStorage::default();
        storage.put("prefs.csv", SHEET.as_bytes()).await;
        let pipeline = CsvPipeline::new(storage, MockConfig::new("prefs.csv"));

        let input = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(input).await.unwrap();

        assert_eq!(outcome.capacity(), 2);
        assert_eq!(outcome.leftover_applicants, vec!["S4"]);
        assert_eq!(outcome.slot_of("S3"), Some("P2"));
    }

    #[tokio::test]
    async fn test_load_writes_plain_files() {
        let storage = MockStorage::default();
        storage.put("prefs.csv", SHEET.as_bytes()).await;
        let mut config = MockConfig::new("prefs.csv");
        config.formats = vec!["csv".to_string(), "tsv".to_string()];
        let pipeline = CsvPipeline::new(storage.clone(), config);

        let input = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(input).await.unwrap();
        let path = pipeline.load(outcome).await.unwrap();

        assert_eq!(path, "out");
        let result = String::from_utf8(storage.get_file("out/result.csv").await.unwrap()).unwrap();
        assert!(result.starts_with("P1,P2,P3\n"));
        assert!(storage.get_file("out/result.tsv").await.is_some());
        let leftovers = String::from_utf8(storage.get_file("out/leftovers.csv").await.unwrap()).unwrap();
        assert_eq!(leftovers, "applicant,preferences\nS4,P1\n");
    }

    #[tokio::test]
    async fn test_load_bundles_into_zip() {
        let storage = MockStorage::default();
        storage.put("prefs.csv", SHEET.as_bytes()).await;
        let mut config = MockConfig::new("prefs.csv");
        config.formats = vec!["csv".to_string(), "json".to_string()];
        config.archive = Some("bundle.zip".to_string());
        let pipeline = CsvPipeline::new(storage.clone(), config);

        let input = pipeline.extract().await.unwrap();
        let outcome = pipeline.transform(input).await.unwrap();
        let path = pipeline.load(outcome).await.unwrap();

        assert_eq!(path, "out/bundle.zip");
        let zip_bytes = storage.get_file("out/bundle.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();

        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();
        assert_eq!(
            file_names,
            vec!["allocation.json", "leftovers.csv", "result.csv"]
        );
    }
}

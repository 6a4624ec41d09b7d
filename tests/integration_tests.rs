use httpmock::prelude::*;
use slot_alloc::{CliConfig, CsvPipeline, LocalStorage, PipelineEngine, TomlConfig};
use std::io::Read;
use tempfile::TempDir;

const PREFERENCE_SHEET: &str = "\
Name,Project Preference [Parallel Training],Project Preference [Tune LLMs],Project Preference [RL]
S1,3,2,1
S2,3,1,2
S3,3,2,1
S4,3,2,1
S5,1,2,3
S6,2,3,1
";

fn cli_config(input: &str, output_path: &str) -> CliConfig {
    CliConfig {
        input: input.to_string(),
        output_path: output_path.to_string(),
        slots: vec![],
        name_column: "Name".to_string(),
        formats: vec!["csv".to_string(), "json".to_string()],
        compress: false,
        archive_name: "allocation_output.zip".to_string(),
        timeout_seconds: None,
        verbose: false,
        log_json: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_from_local_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("preference.csv"), PREFERENCE_SHEET).unwrap();

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = CsvPipeline::new(storage, cli_config("preference.csv", "out"));
    let engine = PipelineEngine::new(pipeline);

    let summary = engine.run().await.unwrap();

    assert_eq!(summary.output_path, "out");
    assert_eq!(summary.placed, 6);
    assert!(summary.is_complete());

    let result = std::fs::read_to_string(temp_dir.path().join("out/result.csv")).unwrap();
    let lines: Vec<&str> = result.lines().collect();
    assert_eq!(lines.len(), 3); // header + capacity rows
    assert_eq!(
        lines[0],
        "Project Preference [Parallel Training],Project Preference [Tune LLMs],Project Preference [RL]"
    );
    assert_eq!(lines[1], "S1 (1),S4 (2),S5 (1)");
    assert_eq!(lines[2], "S2 (1),S6 (1),S3 (3)");

    let leftovers = std::fs::read_to_string(temp_dir.path().join("out/leftovers.csv")).unwrap();
    assert_eq!(leftovers, "applicant,preferences\n");

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(temp_dir.path().join("out/allocation.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["capacity"], 2);
    assert!(json["generated_at"].is_string());
    assert_eq!(json["leftover_applicants"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_end_to_end_with_zip_bundle_and_monitoring() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("preference.csv"), PREFERENCE_SHEET).unwrap();

    let mut config = cli_config("preference.csv", "out");
    config.compress = true;
    config.formats = vec!["csv".to_string(), "tsv".to_string()];

    let pipeline = CsvPipeline::new(LocalStorage::new(temp_dir.path()), config);
    let engine = PipelineEngine::new_with_monitoring(pipeline, true);

    let summary = engine.run().await.unwrap();
    assert_eq!(summary.output_path, "out/allocation_output.zip");

    let zip_data = std::fs::read(temp_dir.path().join("out/allocation_output.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 4);

    let mut tsv = String::new();
    archive
        .by_name("result.tsv")
        .unwrap()
        .read_to_string(&mut tsv)
        .unwrap();
    assert!(tsv.lines().nth(1).unwrap().starts_with("S1 (1)\tS4 (2)"));
}

#[tokio::test]
async fn test_end_to_end_with_selected_slots_and_leftover() {
    let temp_dir = TempDir::new().unwrap();
    let sheet = "Name,Email,A,B\nAnn,ann@x.io,5,\nBen,ben@x.io,4,\nCat,cat@x.io,3,\n";
    std::fs::write(temp_dir.path().join("sheet.csv"), sheet).unwrap();

    let mut config = cli_config("sheet.csv", "out");
    config.slots = vec!["A".to_string(), "B".to_string()];
    config.formats = vec!["csv".to_string()];

    let pipeline = CsvPipeline::new(LocalStorage::new(temp_dir.path()), config);
    let summary = PipelineEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.placed, 2);
    assert_eq!(summary.leftover_applicants, vec!["Cat"]);
    assert!(summary.report.contains("Cat: [A]"));

    let result = std::fs::read_to_string(temp_dir.path().join("out/result.csv")).unwrap();
    assert_eq!(result, "A,B\nAnn (1),\nBen (1),\n");
    let leftovers = std::fs::read_to_string(temp_dir.path().join("out/leftovers.csv")).unwrap();
    assert_eq!(leftovers, "applicant,preferences\nCat,A\n");
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    let sheet_mock = server.mock(|when, then| {
        when.method(GET).path("/sheets/preference.csv");
        then.status(200)
            .header("Content-Type", "text/csv")
            .body(PREFERENCE_SHEET);
    });

    let mut config = cli_config(&server.url("/sheets/preference.csv"), "out");
    config.timeout_seconds = Some(10);

    let pipeline = CsvPipeline::new(LocalStorage::new(temp_dir.path()), config);
    let summary = PipelineEngine::new(pipeline).run().await.unwrap();

    sheet_mock.assert();
    assert!(summary.is_complete());
    assert!(temp_dir.path().join("out/result.csv").exists());
}

#[tokio::test]
async fn test_missing_input_file_fails_without_output() {
    let temp_dir = TempDir::new().unwrap();

    let pipeline = CsvPipeline::new(
        LocalStorage::new(temp_dir.path()),
        cli_config("absent.csv", "out"),
    );
    let err = PipelineEngine::new(pipeline).run().await.unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert!(!temp_dir.path().join("out").exists());
}

#[tokio::test]
async fn test_end_to_end_from_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("preference.csv"), PREFERENCE_SHEET).unwrap();

    let config = TomlConfig::from_toml_str(
        r#"
[run]
name = "cohort"

[source]
input = "preference.csv"
slots = ["Project Preference [RL]", "Project Preference [Tune LLMs]", "Project Preference [Parallel Training]"]

[output]
output_path = "results"
formats = ["csv"]
"#,
    )
    .unwrap();

    let pipeline = CsvPipeline::new(LocalStorage::new(temp_dir.path()), config);
    let summary = PipelineEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.output_path, "results");
    let result = std::fs::read_to_string(temp_dir.path().join("results/result.csv")).unwrap();
    assert!(result.starts_with(
        "Project Preference [RL],Project Preference [Tune LLMs],Project Preference [Parallel Training]\n"
    ));
}

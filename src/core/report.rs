use crate::domain::model::{Allocation, AllocationEvent, AllocationOutcome, SlotAssignment};
use crate::utils::error::{AllocError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

pub const RESULT_STEM: &str = "result";
pub const LEFTOVER_STEM: &str = "leftovers";
pub const JSON_FILE: &str = "allocation.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
}

impl OutputFormat {
    pub const ALL: [&'static str; 3] = ["csv", "tsv", "json"];

    fn delimiter(self) -> u8 {
        match self {
            OutputFormat::Tsv => b'\t',
            _ => b',',
        }
    }

    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AllocError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(AllocError::InvalidConfigValueError {
                field: "output_formats".to_string(),
                value: other.to_string(),
                reason: format!("Unsupported format. Valid formats: {}", Self::ALL.join(", ")),
            }),
        }
    }
}

pub fn parse_formats(formats: &[String]) -> Result<Vec<OutputFormat>> {
    let mut parsed = Vec::with_capacity(formats.len());
    for format in formats {
        let format = format.parse::<OutputFormat>()?;
        if !parsed.contains(&format) {
            parsed.push(format);
        }
    }
    Ok(parsed)
}

/// A file ready to be handed to storage or an archive.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub name: String,
    pub contents: Vec<u8>,
}

#[derive(Serialize)]
struct AllocationDocument<'a> {
    generated_at: DateTime<Utc>,
    capacity: usize,
    slots: &'a [SlotAssignment],
    leftover_applicants: &'a [String],
    leftover_preferences: &'a BTreeMap<String, Vec<String>>,
    events: &'a [AllocationEvent],
}

pub fn render(
    outcome: &AllocationOutcome,
    formats: &[OutputFormat],
    generated_at: DateTime<Utc>,
) -> Result<Vec<RenderedFile>> {
    let mut files = Vec::new();

    for &format in formats {
        match format {
            OutputFormat::Csv | OutputFormat::Tsv => {
                files.push(RenderedFile {
                    name: format!("{}.{}", RESULT_STEM, format.extension()),
                    contents: render_table(outcome, format.delimiter())?,
                });
                files.push(RenderedFile {
                    name: format!("{}.{}", LEFTOVER_STEM, format.extension()),
                    contents: render_leftovers(outcome, format.delimiter())?,
                });
            }
            OutputFormat::Json => {
                let document = AllocationDocument {
                    generated_at,
                    capacity: outcome.capacity,
                    slots: &outcome.slots,
                    leftover_applicants: &outcome.leftover_applicants,
                    leftover_preferences: &outcome.leftover_preferences,
                    events: &outcome.events,
                };
                files.push(RenderedFile {
                    name: JSON_FILE.to_string(),
                    contents: serde_json::to_vec_pretty(&document)?,
                });
            }
        }
    }

    Ok(files)
}

pub fn format_cell(entry: Option<&Allocation>) -> String {
    entry
        .map(|a| format!("{} ({})", a.applicant, a.rank))
        .unwrap_or_default()
}

/// One column per slot, `capacity` rows.
pub fn render_table(outcome: &AllocationOutcome, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(outcome.slots.iter().map(|s| s.slot.as_str()))?;
    for row in 0..outcome.capacity {
        writer.write_record(
            outcome
                .slots
                .iter()
                .map(|s| format_cell(s.entries.get(row).and_then(Option::as_ref))),
        )?;
    }

    finish_writer(writer)
}

pub fn render_leftovers(outcome: &AllocationOutcome, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(["applicant", "preferences"])?;
    for applicant in &outcome.leftover_applicants {
        let preferences = outcome
            .leftover_preferences
            .get(applicant)
            .map(|p| p.join(";"))
            .unwrap_or_default();
        writer.write_record([applicant.as_str(), preferences.as_str()])?;
    }

    finish_writer(writer)
}

fn finish_writer(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| {
        AllocError::IoError(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))
    })
}

/// Human-readable listing printed after a run.
pub fn console_summary(outcome: &AllocationOutcome) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "SLOT ALLOCATIONS (capacity {})", outcome.capacity);
    for slot in &outcome.slots {
        let cells: Vec<String> = slot
            .entries
            .iter()
            .map(|e| match e {
                Some(a) => format_cell(Some(a)),
                None => "-".to_string(),
            })
            .collect();
        let _ = writeln!(out, "  {}: {}", slot.slot, cells.join(", "));
    }

    if outcome.is_complete() {
        let _ = writeln!(out, "All applicants placed");
    } else {
        let _ = writeln!(out, "APPLICANTS LEFT ({})", outcome.leftover_count());
        for applicant in &outcome.leftover_applicants {
            let preferences = outcome
                .leftover_preferences
                .get(applicant)
                .map(|p| p.join(", "))
                .unwrap_or_default();
            let _ = writeln!(out, "  {}: [{}]", applicant, preferences);
        }
    }

    out
}

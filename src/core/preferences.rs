use crate::domain::model::{PreferenceInput, ScoreRow};
use crate::utils::error::{AllocError, Result};
use std::cmp::Ordering;

/// Reads a score sheet: one applicant per row, one numeric score per slot column.
///
/// When `slots` is empty every header except `name_column` is a slot column.
/// Returns the slot columns actually used, in order, with the parsed rows.
pub fn read_score_sheet(
    data: &[u8],
    name_column: &str,
    slots: &[String],
) -> Result<(Vec<String>, Vec<ScoreRow>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let column_of = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AllocError::MissingColumnError {
                column: name.to_string(),
            })
    };

    let name_idx = column_of(name_column)?;
    let slot_columns: Vec<String> = if slots.is_empty() {
        headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != name_idx)
            .map(|(_, h)| h.to_string())
            .collect()
    } else {
        slots.to_vec()
    };
    let slot_idx = slot_columns
        .iter()
        .map(|s| column_of(s.as_str()))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Score sheet columns: name='{}', {} slot columns",
        name_column,
        slot_columns.len()
    );

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let applicant = record.get(name_idx).unwrap_or("").to_string();
        if applicant.is_empty() {
            return Err(AllocError::ValidationError {
                message: format!("row {} has no applicant name", line + 2),
            });
        }

        let scores = slot_idx
            .iter()
            .zip(&slot_columns)
            .map(|(&idx, slot)| parse_score(record.get(idx).unwrap_or(""), &applicant, slot))
            .collect::<Result<Vec<_>>>()?;

        rows.push(ScoreRow { applicant, scores });
    }

    Ok((slot_columns, rows))
}

/// Empty cells and `nan` count as "no score".
fn parse_score(cell: &str, applicant: &str, slot: &str) -> Result<Option<f64>> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(AllocError::ScoreParseError {
            applicant: applicant.to_string(),
            slot: slot.to_string(),
            value: cell.to_string(),
        }),
    }
}

/// Slots ordered by score, highest first. Ties keep column order; unscored
/// slots are dropped.
pub fn rank_slots(row: &ScoreRow, slots: &[String]) -> Vec<String> {
    let mut scored: Vec<(f64, &String)> = row
        .scores
        .iter()
        .zip(slots)
        .filter_map(|(score, slot)| score.map(|s| (s, slot)))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, slot)| slot.clone()).collect()
}

pub fn derive_preferences(rows: &[ScoreRow], slots: &[String]) -> PreferenceInput {
    let applicants = rows.iter().map(|r| r.applicant.clone()).collect();
    let preferences = rows
        .iter()
        .map(|r| (r.applicant.clone(), rank_slots(r, slots)))
        .collect();

    PreferenceInput {
        applicants,
        slots: slots.to_vec(),
        preferences,
    }
}

pub fn load_preferences(data: &[u8], name_column: &str, slots: &[String]) -> Result<PreferenceInput> {
    let (slot_columns, rows) = read_score_sheet(data, name_column, slots)?;
    Ok(derive_preferences(&rows, &slot_columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Name,Email,Parallel Training,Tune LLMs,ArtGAN
Alice,a@x.io,3,5,1
Bob,b@x.io,,2,2
Carol,c@x.io,nan,,
";

    fn slots() -> Vec<String> {
        vec![
            "Parallel Training".to_string(),
            "Tune LLMs".to_string(),
            "ArtGAN".to_string(),
        ]
    }

    #[test]
    fn test_highest_score_ranks_first() {
        let input = load_preferences(SHEET.as_bytes(), "Name", &slots()).unwrap();

        assert_eq!(input.applicants, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(
            input.preferences["Alice"],
            vec!["Tune LLMs", "Parallel Training", "ArtGAN"]
        );
    }

    #[test]
    fn test_ties_keep_column_order_and_blanks_are_dropped() {
        let input = load_preferences(SHEET.as_bytes(), "Name", &slots()).unwrap();

        assert_eq!(input.preferences["Bob"], vec!["Tune LLMs", "ArtGAN"]);
        assert!(input.preferences["Carol"].is_empty());
    }

    #[test]
    fn test_all_other_columns_are_slots_when_none_given() {
        let sheet = "Name,P1,P2\nA,1,2\n";
        let input = load_preferences(sheet.as_bytes(), "Name", &[]).unwrap();

        assert_eq!(input.slots, vec!["P1", "P2"]);
        assert_eq!(input.preferences["A"], vec!["P2", "P1"]);
    }

    #[test]
    fn test_missing_slot_column_is_reported() {
        let wanted = vec!["Music Generation".to_string()];
        let err = load_preferences(SHEET.as_bytes(), "Name", &wanted).unwrap_err();

        assert!(matches!(err, AllocError::MissingColumnError { ref column } if column == "Music Generation"));
    }

    #[test]
    fn test_non_numeric_score_is_rejected() {
        let sheet = "Name,P1\nA,high\n";
        let err = load_preferences(sheet.as_bytes(), "Name", &[]).unwrap_err();

        assert!(matches!(err, AllocError::ScoreParseError { ref value, .. } if value == "high"));
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let sheet = "Name,P1\n,4\n";
        assert!(matches!(
            load_preferences(sheet.as_bytes(), "Name", &[]),
            Err(AllocError::ValidationError { .. })
        ));
    }
}

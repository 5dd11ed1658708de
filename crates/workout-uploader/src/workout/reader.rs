//! CSV ingestion into typed workout rows

use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::columns::{ColumnLayout, Metric};
use crate::error::{Result, UploaderError};

/// Unit marker stripped from load cells before parsing
const LOAD_UNIT: &str = "kg";

/// One CSV record
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutRow {
    pub exercise: String,
    /// Set label, numeric labels in canonical form; distinct values count as sets
    pub set: Option<String>,
    pub reps: Option<f64>,
    /// Load in kg
    pub load: Option<f64>,
    pub metrics: BTreeMap<Metric, f64>,
}

impl WorkoutRow {
    pub fn new(exercise: impl Into<String>) -> Self {
        Self {
            exercise: exercise.into(),
            set: None,
            reps: None,
            load: None,
            metrics: BTreeMap::new(),
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }
}

/// A parsed file: which columns it has, and its rows in file order
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub has_set_column: bool,
    pub has_load_column: bool,
    pub metrics: Vec<Metric>,
    pub rows: Vec<WorkoutRow>,
}

impl WorkoutLog {
    /// Distinct exercise names in first-seen order
    pub fn exercise_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for row in &self.rows {
            if !names.iter().any(|n| n == &row.exercise) {
                names.push(row.exercise.clone());
            }
        }
        names
    }

    /// Same layout, restricted to rows for one exercise
    pub fn filter_exercise(&self, exercise: &str) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .filter(|r| r.exercise == exercise)
                .cloned()
                .collect(),
            metrics: self.metrics.clone(),
            ..*self
        }
    }
}

/// Parse a CSV workout log from any reader
pub fn read_log<R: Read>(reader: R) -> Result<WorkoutLog> {
    let mut csv = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let layout = ColumnLayout::from_headers(csv.headers()?.iter())?;

    let mut rows = Vec::new();
    for (idx, record) in csv.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);
        rows.push(parse_row(&layout, &record, line)?);
    }

    Ok(WorkoutLog {
        has_set_column: layout.has_set_column(),
        has_load_column: layout.load.is_some(),
        metrics: layout.metrics.iter().map(|(m, _)| *m).collect(),
        rows,
    })
}

/// Parse a CSV workout log from disk
pub fn read_log_path(path: &Path) -> Result<WorkoutLog> {
    let file = File::open(path)?;
    read_log(file)
}

fn parse_row(layout: &ColumnLayout, record: &StringRecord, line: u64) -> Result<WorkoutRow> {
    let cell = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let mut row = WorkoutRow::new(cell(Some(layout.exercise)).unwrap_or_default());
    row.set = cell(layout.set).map(set_key);

    if let Some(raw) = cell(layout.reps) {
        row.reps = Some(parse_number(layout, layout.reps, raw, line)?);
    }
    if let Some(raw) = cell(layout.load) {
        let stripped = strip_unit(raw, LOAD_UNIT);
        row.load = Some(parse_number(layout, layout.load, stripped, line).map_err(|_| {
            UploaderError::Parse {
                line,
                column: layout.load.map(|i| layout.name(i)).unwrap_or("?").to_string(),
                value: raw.to_string(),
            }
        })?);
    }
    for (metric, idx) in &layout.metrics {
        if let Some(raw) = cell(Some(*idx)) {
            let value = parse_number(layout, Some(*idx), raw, line)?;
            row.metrics.insert(*metric, value);
        }
    }

    Ok(row)
}

/// Numeric set labels compare by value, so `1` and `1.0` are the same set
fn set_key(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{}", if v == 0.0 { 0.0 } else { v }),
        _ => raw.to_string(),
    }
}

/// Remove a trailing unit marker, case-insensitively
fn strip_unit<'a>(raw: &'a str, unit: &str) -> &'a str {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.ends_with(unit) {
        trimmed[..trimmed.len() - unit.len()].trim_end()
    } else {
        trimmed
    }
}

fn parse_number(layout: &ColumnLayout, idx: Option<usize>, raw: &str, line: u64) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| UploaderError::Parse {
            line,
            column: idx.map(|i| layout.name(i)).unwrap_or("?").to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_unit() {
        assert_eq!(strip_unit("10.0 kg", "kg"), "10.0");
        assert_eq!(strip_unit("50kg", "kg"), "50");
        assert_eq!(strip_unit("55 KG", "kg"), "55");
        assert_eq!(strip_unit("42.5", "kg"), "42.5");
    }

    #[test]
    fn test_read_basic_log() {
        let csv = "Exercise,Set,Reps,Load\nBench,1,5,50kg\nBench,2,5,55 kg\n";
        let log = read_log(csv.as_bytes()).unwrap();

        assert!(log.has_set_column);
        assert!(log.has_load_column);
        assert_eq!(log.rows.len(), 2);
        assert_eq!(log.rows[0].load, Some(50.0));
        assert_eq!(log.rows[1].load, Some(55.0));
        assert_eq!(log.rows[1].set.as_deref(), Some("2"));
        assert_eq!(log.rows[0].reps, Some(5.0));
    }

    #[test]
    fn test_numeric_set_labels_compare_by_value() {
        assert_eq!(set_key("1"), set_key("1.0"));
        assert_eq!(set_key("2.50"), "2.5");
        assert_eq!(set_key("A"), "A");

        let csv = "Exercise,Set,Reps\nBench,1,5\nBench,1.0,5\nBench,2,5\n";
        let log = read_log(csv.as_bytes()).unwrap();
        assert_eq!(log.rows[0].set, log.rows[1].set);
    }

    #[test]
    fn test_read_weight_kg_header() {
        let csv = "Exercise,Rep,Weight (kg)\nSquat,3,100.0 kg\n";
        let log = read_log(csv.as_bytes()).unwrap();
        assert_eq!(log.rows[0].load, Some(100.0));
        assert_eq!(log.rows[0].reps, Some(3.0));
        assert!(!log.has_set_column);
    }

    #[test]
    fn test_empty_cells_are_missing() {
        let csv = "Exercise,Set,Reps,Load,Mean Velocity (m/s)\nBench,1,,,\n";
        let log = read_log(csv.as_bytes()).unwrap();
        let row = &log.rows[0];
        assert_eq!(row.reps, None);
        assert_eq!(row.load, None);
        assert_eq!(row.metric(Metric::MeanVelocity), None);
        assert_eq!(log.metrics, vec![Metric::MeanVelocity]);
    }

    #[test]
    fn test_malformed_load_reports_column_and_value() {
        let csv = "Exercise,Set,Reps,Load\nBench,1,5,50kg\nBench,2,5,heavy\n";
        let err = read_log(csv.as_bytes()).unwrap_err();
        match err {
            UploaderError::Parse {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Load");
                assert_eq!(value, "heavy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_metric() {
        let csv = "Exercise,Mean Power (W)\nBench,fast\n";
        let err = read_log(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, UploaderError::Parse { ref column, .. } if column == "MeanPower(W)"));
    }

    #[test]
    fn test_missing_exercise_column() {
        let err = read_log("Set,Reps\n1,5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, UploaderError::MissingColumn(_)));
    }

    #[test]
    fn test_exercise_names_first_seen_order() {
        let csv = "Exercise\nSquat\nBench\nSquat\nDeadlift\n";
        let log = read_log(csv.as_bytes()).unwrap();
        assert_eq!(log.exercise_names(), vec!["Squat", "Bench", "Deadlift"]);
    }

    #[test]
    fn test_filter_exercise_keeps_layout() {
        let csv = "Exercise,Set\nSquat,1\nBench,1\nSquat,2\n";
        let log = read_log(csv.as_bytes()).unwrap();
        let squat = log.filter_exercise("Squat");
        assert_eq!(squat.rows.len(), 2);
        assert!(squat.has_set_column);
    }
}

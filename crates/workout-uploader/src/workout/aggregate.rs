//! Totals and per-exercise summaries over a workout log

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use tracing::{error, warn};

use super::columns::Metric;
use super::reader::{read_log, read_log_path, WorkoutLog, WorkoutRow};
use super::report;
use crate::error::{Result, UploaderError};

/// How the uploaded activity's elapsed time is chosen.
///
/// The CSV carries no timestamps, so this is configuration, never measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElapsedPolicy {
    /// Same duration for every upload
    Fixed { seconds: u32 },
    /// `seconds_per_row * rows`, never below `floor`
    PerRow { seconds_per_row: u32, floor: u32 },
}

impl Default for ElapsedPolicy {
    fn default() -> Self {
        ElapsedPolicy::Fixed { seconds: 60 }
    }
}

impl ElapsedPolicy {
    pub fn elapsed_for(&self, rows: usize) -> u32 {
        match *self {
            ElapsedPolicy::Fixed { seconds } => seconds,
            ElapsedPolicy::PerRow {
                seconds_per_row,
                floor,
            } => {
                let rows = u32::try_from(rows).unwrap_or(u32::MAX);
                seconds_per_row.saturating_mul(rows).max(floor)
            }
        }
    }
}

/// Mean of one performance column, rounded to the metric's precision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricMean {
    pub metric: Metric,
    pub mean: f64,
}

/// Totals for one exercise (or for a whole selection)
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub exercise: String,
    pub total_sets: usize,
    pub total_reps: f64,
    pub total_load: f64,
    pub metrics: Vec<MetricMean>,
}

impl ExerciseSummary {
    /// Summarize `rows`. Sets are distinct set values when the file has a set
    /// column, otherwise the row count.
    pub fn from_rows<'a, I>(exercise: impl Into<String>, rows: I, log: &WorkoutLog) -> Self
    where
        I: IntoIterator<Item = &'a WorkoutRow>,
    {
        let rows: Vec<&WorkoutRow> = rows.into_iter().collect();

        let total_sets = if log.has_set_column {
            rows.iter()
                .filter_map(|r| r.set.as_deref())
                .collect::<BTreeSet<_>>()
                .len()
        } else {
            rows.len()
        };

        let metrics = log
            .metrics
            .iter()
            .filter_map(|&metric| {
                let values: Vec<f64> = rows.iter().filter_map(|r| r.metric(metric)).collect();
                if values.is_empty() {
                    return None;
                }
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                Some(MetricMean {
                    metric,
                    mean: round_to(mean, metric.decimals()),
                })
            })
            .collect();

        Self {
            exercise: exercise.into(),
            total_sets,
            total_reps: rows.iter().filter_map(|r| r.reps).sum(),
            total_load: rows.iter().filter_map(|r| r.load).sum(),
            metrics,
        }
    }
}

/// Result of aggregating one file
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub description: String,
    pub elapsed_seconds: u32,
    pub total_load: f64,
    pub total_sets: usize,
    pub total_reps: f64,
    /// Every exercise in the file, first-seen order
    pub exercise_names: Vec<String>,
    /// The exercise totals were restricted to, if the selection matched
    pub selected_exercise: Option<String>,
    /// Per-exercise breakdown; a single entry in single-exercise mode
    pub exercises: Vec<ExerciseSummary>,
    /// Set when the file could not be parsed and totals are zero-filled
    pub degraded: bool,
}

impl Aggregation {
    /// Zero-filled stand-in used when the file cannot be parsed
    pub fn degraded(err: &UploaderError, elapsed: ElapsedPolicy) -> Self {
        Self {
            description: format!("Error parsing workout data: {}", err),
            elapsed_seconds: elapsed.elapsed_for(0),
            total_load: 0.0,
            total_sets: 0,
            total_reps: 0.0,
            exercise_names: Vec::new(),
            selected_exercise: None,
            exercises: Vec::new(),
            degraded: true,
        }
    }

    pub fn is_single_exercise(&self) -> bool {
        self.selected_exercise.is_some()
    }
}

/// Aggregates workout logs under one elapsed-time policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    elapsed: ElapsedPolicy,
}

impl Aggregator {
    pub fn new(elapsed: ElapsedPolicy) -> Self {
        Self { elapsed }
    }

    pub fn elapsed_policy(&self) -> ElapsedPolicy {
        self.elapsed
    }

    /// Aggregate a parsed log, optionally restricted to one exercise.
    ///
    /// A selection that does not name an exercise in the file is ignored and
    /// the whole file is reported per exercise.
    pub fn aggregate(&self, log: &WorkoutLog, selected: Option<&str>) -> Aggregation {
        let exercise_names = log.exercise_names();

        let selected = selected.map(str::trim).filter(|s| !s.is_empty());
        let selected = match selected {
            Some(name) if exercise_names.iter().any(|n| n == name) => Some(name.to_string()),
            Some(name) => {
                warn!(exercise = name, "Exercise not found in file, using all exercises");
                None
            }
            None => None,
        };

        let (totals, exercises) = match &selected {
            Some(name) => {
                let rows = log.rows.iter().filter(|r| &r.exercise == name);
                let summary = ExerciseSummary::from_rows(name.as_str(), rows, log);
                (summary.clone(), vec![summary])
            }
            None => {
                let totals = ExerciseSummary::from_rows("All Exercises", &log.rows, log);
                let exercises = exercise_names
                    .iter()
                    .map(|name| {
                        ExerciseSummary::from_rows(
                            name.as_str(),
                            log.rows.iter().filter(|r| &r.exercise == name),
                            log,
                        )
                    })
                    .collect();
                (totals, exercises)
            }
        };

        let row_count = match &selected {
            Some(name) => log.rows.iter().filter(|r| &r.exercise == name).count(),
            None => log.rows.len(),
        };

        let description = match &selected {
            Some(_) => report::single_exercise(&totals),
            None => report::multi_exercise(&totals, &exercises),
        };

        Aggregation {
            description,
            elapsed_seconds: self.elapsed.elapsed_for(row_count),
            total_load: totals.total_load,
            total_sets: totals.total_sets,
            total_reps: totals.total_reps,
            exercise_names,
            selected_exercise: selected,
            exercises,
            degraded: false,
        }
    }

    /// Parse and aggregate CSV text from a reader
    pub fn aggregate_reader<R: Read>(&self, reader: R, selected: Option<&str>) -> Result<Aggregation> {
        let log = read_log(reader)?;
        Ok(self.aggregate(&log, selected))
    }

    /// Parse and aggregate a CSV file, falling back to a degraded result.
    ///
    /// The error is logged and returned alongside so the caller can show it.
    pub fn aggregate_path_or_degraded(
        &self,
        path: &Path,
        selected: Option<&str>,
    ) -> (Aggregation, Option<UploaderError>) {
        match read_log_path(path) {
            Ok(log) => (self.aggregate(&log, selected), None),
            Err(e) => {
                error!(path = %path.display(), "Error parsing CSV: {}", e);
                (Aggregation::degraded(&e, self.elapsed), Some(e))
            }
        }
    }
}

/// Aggregate with the default elapsed-time policy
pub fn aggregate(log: &WorkoutLog, selected: Option<&str>) -> Aggregation {
    Aggregator::default().aggregate(log, selected)
}

fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

//! Activity name template
//!
//! `"{label} - {load}kg TT {sets} Sets {reps} Reps - {YYYY-MM-DD}"`, with load
//! and reps truncated to whole numbers.

use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::UploaderError;

/// Label used when neither a base name nor an exercise is given
pub const DEFAULT_LABEL: &str = "Workout";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<label>.+) - (?P<load>\d+)kg TT (?P<sets>\d+) Sets (?P<reps>\d+) Reps - (?P<date>\d{4}-\d{2}-\d{2})$",
        )
        .expect("activity name pattern is valid")
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityName {
    pub label: String,
    pub total_load: u64,
    pub total_sets: usize,
    pub total_reps: u64,
    pub date: NaiveDate,
}

impl ActivityName {
    pub fn from_totals(
        label: Option<&str>,
        total_load: f64,
        total_sets: usize,
        total_reps: f64,
        date: NaiveDate,
    ) -> Self {
        let label = label
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_LABEL);
        Self {
            label: label.to_string(),
            total_load: truncate(total_load),
            total_sets,
            total_reps: truncate(total_reps),
            date,
        }
    }
}

/// Whole-number part, clamped at zero
fn truncate(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

impl fmt::Display for ActivityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}kg TT {} Sets {} Reps - {}",
            self.label,
            self.total_load,
            self.total_sets,
            self.total_reps,
            self.date.format(DATE_FORMAT)
        )
    }
}

impl FromStr for ActivityName {
    type Err = UploaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || UploaderError::invalid_param(format!("Not an activity name: {}", s));
        let caps = name_pattern().captures(s.trim()).ok_or_else(invalid)?;

        Ok(Self {
            label: caps["label"].to_string(),
            total_load: caps["load"].parse().map_err(|_| invalid())?,
            total_sets: caps["sets"].parse().map_err(|_| invalid())?,
            total_reps: caps["reps"].parse().map_err(|_| invalid())?,
            date: NaiveDate::parse_from_str(&caps["date"], DATE_FORMAT).map_err(|_| invalid())?,
        })
    }
}

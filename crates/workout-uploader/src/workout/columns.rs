//! Column names and how they map to logical fields
//!
//! Every logical field has an ordered alias list; the first alias present in
//! the (normalized) header row wins. Resolution happens once per file.

use crate::error::{Result, UploaderError};

pub const EXERCISE_ALIASES: &[&str] = &["Exercise"];
pub const SET_ALIASES: &[&str] = &["Set"];
pub const REPS_ALIASES: &[&str] = &["Reps", "Rep"];
pub const LOAD_ALIASES: &[&str] = &["Load", "Weightkg", "Weight"];

/// Optional performance columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    MeanVelocity,
    PeakVelocity,
    MeanPower,
    PeakPower,
    Height,
    VerticalDistance,
}

impl Metric {
    /// Report order
    pub const ALL: [Metric; 6] = [
        Metric::MeanVelocity,
        Metric::PeakVelocity,
        Metric::MeanPower,
        Metric::PeakPower,
        Metric::Height,
        Metric::VerticalDistance,
    ];

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Metric::MeanVelocity => &["MeanVelocity(m/s)", "Average"],
            Metric::PeakVelocity => &["PeakVelocity(m/s)", "Best"],
            Metric::MeanPower => &["MeanPower(W)"],
            Metric::PeakPower => &["PeakPower(W)"],
            Metric::Height => &["Height(cm)"],
            Metric::VerticalDistance => &["VerticalDistance(cm)"],
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::MeanVelocity => "Mean Velocity",
            Metric::PeakVelocity => "Peak Velocity",
            Metric::MeanPower => "Mean Power",
            Metric::PeakPower => "Peak Power",
            Metric::Height => "Height",
            Metric::VerticalDistance => "Vertical Distance",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::MeanVelocity | Metric::PeakVelocity => "m/s",
            Metric::MeanPower | Metric::PeakPower => "W",
            Metric::Height | Metric::VerticalDistance => "cm",
        }
    }

    /// Decimal places used when reporting the mean
    pub fn decimals(&self) -> usize {
        match self {
            Metric::MeanPower | Metric::PeakPower => 0,
            _ => 2,
        }
    }
}

/// Strip all whitespace and rewrite a `(kg)` suffix to `kg`.
pub fn normalize_header(raw: &str) -> String {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    compact.replace("(kg)", "kg")
}

/// Index of the first alias present in `headers`
pub fn resolve(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

/// Header positions of every recognized column in one file
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub exercise: usize,
    pub set: Option<usize>,
    pub reps: Option<usize>,
    pub load: Option<usize>,
    pub metrics: Vec<(Metric, usize)>,
    /// Normalized header names, by position
    pub headers: Vec<String>,
}

impl ColumnLayout {
    /// Resolve a raw header row. The exercise column is required.
    pub fn from_headers<'a, I>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<String> = raw.into_iter().map(normalize_header).collect();

        let exercise = resolve(&headers, EXERCISE_ALIASES)
            .ok_or_else(|| UploaderError::MissingColumn(EXERCISE_ALIASES[0].to_string()))?;

        let metrics = Metric::ALL
            .iter()
            .filter_map(|m| resolve(&headers, m.aliases()).map(|idx| (*m, idx)))
            .collect();

        Ok(Self {
            exercise,
            set: resolve(&headers, SET_ALIASES),
            reps: resolve(&headers, REPS_ALIASES),
            load: resolve(&headers, LOAD_ALIASES),
            metrics,
            headers,
        })
    }

    pub fn has_set_column(&self) -> bool {
        self.set.is_some()
    }

    /// Normalized name of the column at `idx`
    pub fn name(&self, idx: usize) -> &str {
        self.headers.get(idx).map(String::as_str).unwrap_or("?")
    }
}

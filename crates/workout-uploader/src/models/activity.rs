//! Activity payloads for the Strava activities endpoint
//!
//! `UploadRequest` is what we post, `CreatedActivity` is the stored object the
//! API sends back.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::workout::{ActivityName, Aggregation};

/// Activity type used for every upload
pub const ACTIVITY_TYPE: &str = "WeightTraining";

/// Timestamp layout expected in `start_date_local`
const START_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Form body for creating a manual activity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadRequest {
    /// Templated activity name
    pub name: String,

    /// Activity type, always `WeightTraining`
    #[serde(rename = "type")]
    pub activity_type: String,

    /// Local start time, formatted as `YYYY-MM-DDTHH:MM:SSZ`
    pub start_date_local: String,

    /// Elapsed time in seconds
    pub elapsed_time: u32,

    /// Workout summary text
    pub description: String,
}

impl UploadRequest {
    pub fn new(
        name: impl Into<String>,
        start_local: NaiveDateTime,
        elapsed_time: u32,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            activity_type: ACTIVITY_TYPE.to_string(),
            start_date_local: start_local.format(START_DATE_FORMAT).to_string(),
            elapsed_time,
            description: description.into(),
        }
    }

    /// Build the payload for an aggregated workout starting at `start_local`.
    ///
    /// The name label is the user's base name, else the selected exercise,
    /// else the generic default.
    pub fn from_aggregation(
        aggregation: &Aggregation,
        base_name: Option<&str>,
        start_local: NaiveDateTime,
    ) -> Self {
        let label = base_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(aggregation.selected_exercise.as_deref());
        let name = ActivityName::from_totals(
            label,
            aggregation.total_load,
            aggregation.total_sets,
            aggregation.total_reps,
            start_local.date(),
        );

        Self::new(
            name.to_string(),
            start_local,
            aggregation.elapsed_seconds,
            aggregation.description.clone(),
        )
    }
}

/// Activity object returned after a successful create
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedActivity {
    /// Unique activity identifier
    pub id: u64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,

    #[serde(default)]
    pub start_date_local: Option<String>,

    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: Option<u64>,

    #[serde(default)]
    pub description: Option<String>,

    /// Every other field of the stored object
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CreatedActivity {
    /// Get a display-friendly name for the activity
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| "Unnamed Activity".to_string())
    }

    /// Link to the activity page
    pub fn web_url(&self) -> String {
        format!("https://www.strava.com/activities/{}", self.id)
    }

    /// Get elapsed time formatted as H:MM:SS or M:SS
    pub fn duration_formatted(&self) -> String {
        match self.elapsed_time {
            Some(total_secs) => {
                let hours = total_secs / 3600;
                let minutes = (total_secs % 3600) / 60;
                let seconds = total_secs % 60;
                if hours > 0 {
                    format!("{}:{:02}:{:02}", hours, minutes, seconds)
                } else {
                    format!("{}:{:02}", minutes, seconds)
                }
            }
            None => "-".to_string(),
        }
    }
}

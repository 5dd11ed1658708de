//! Workout CSV aggregation
//!
//! Turns a velocity-tracker or spreadsheet export into totals, per-exercise
//! summaries and the text used as the activity description.
//!
//! ```text
//! Exercise,Set,Reps,Load,Mean Velocity (m/s)
//! Bench,1,5,50 kg,0.61
//! Bench,2,5,55 kg,0.52
//! ```

pub mod aggregate;
pub mod columns;
pub mod naming;
pub mod reader;
pub mod report;

pub use aggregate::{
    aggregate, Aggregation, Aggregator, ElapsedPolicy, ExerciseSummary, MetricMean,
};
pub use columns::{ColumnLayout, Metric};
pub use naming::ActivityName;
pub use reader::{read_log, read_log_path, WorkoutLog, WorkoutRow};

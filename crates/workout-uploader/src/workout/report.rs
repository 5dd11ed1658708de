//! Human-readable activity description

use std::fmt::Write;

use super::aggregate::{ExerciseSummary, MetricMean};

const TITLE: &str = "Workout Summary";
const METRICS_TITLE: &str = "Performance Metrics";

/// Report for a single selected exercise
pub fn single_exercise(summary: &ExerciseSummary) -> String {
    let mut out = format!("{}\n\n", TITLE);
    let _ = writeln!(out, "- Exercise: {}", summary.exercise);
    push_totals(&mut out, summary);
    out.push('\n');

    let _ = writeln!(out, "{}", METRICS_TITLE);
    for metric in &summary.metrics {
        push_metric(&mut out, metric);
    }
    out
}

/// Report for the whole file with one block per exercise
pub fn multi_exercise(totals: &ExerciseSummary, exercises: &[ExerciseSummary]) -> String {
    let mut out = format!("{}\n\n", TITLE);
    let _ = writeln!(out, "- Exercises: {}", exercises.len());
    push_totals(&mut out, totals);

    for exercise in exercises {
        out.push('\n');
        let _ = writeln!(out, "{}", exercise.exercise);
        push_totals(&mut out, exercise);
        for metric in &exercise.metrics {
            push_metric(&mut out, metric);
        }
    }
    out
}

/// Format a count, dropping the fraction when it is whole
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn push_totals(out: &mut String, summary: &ExerciseSummary) {
    let _ = writeln!(out, "- Sets: {}", summary.total_sets);
    let _ = writeln!(out, "- Reps: {}", format_count(summary.total_reps));
    let _ = writeln!(out, "- Total Load: {:.2} kg", summary.total_load);
}

fn push_metric(out: &mut String, m: &MetricMean) {
    let _ = writeln!(
        out,
        "- **{}:** {:.*} {}",
        m.metric.display_name(),
        m.metric.decimals(),
        m.mean,
        m.metric.unit()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::columns::Metric;

    fn bench() -> ExerciseSummary {
        ExerciseSummary {
            exercise: "Bench".to_string(),
            total_sets: 2,
            total_reps: 10.0,
            total_load: 105.0,
            metrics: vec![
                MetricMean {
                    metric: Metric::MeanVelocity,
                    mean: 0.55,
                },
                MetricMean {
                    metric: Metric::PeakPower,
                    mean: 612.0,
                },
            ],
        }
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(10.0), "10");
        assert_eq!(format_count(7.5), "7.5");
        assert_eq!(format_count(0.0), "0");
    }

    #[test]
    fn test_single_exercise_report() {
        let text = single_exercise(&bench());
        assert_eq!(
            text,
            "Workout Summary\n\n\
             - Exercise: Bench\n\
             - Sets: 2\n\
             - Reps: 10\n\
             - Total Load: 105.00 kg\n\
             \n\
             Performance Metrics\n\
             - **Mean Velocity:** 0.55 m/s\n\
             - **Peak Power:** 612 W\n"
        );
    }

    #[test]
    fn test_multi_exercise_report() {
        let squat = ExerciseSummary {
            exercise: "Squat".to_string(),
            total_sets: 1,
            total_reps: 3.0,
            total_load: 140.0,
            metrics: Vec::new(),
        };
        let totals = ExerciseSummary {
            exercise: "All Exercises".to_string(),
            total_sets: 3,
            total_reps: 13.0,
            total_load: 245.0,
            metrics: Vec::new(),
        };

        let text = multi_exercise(&totals, &[bench(), squat]);
        assert_eq!(
            text,
            "Workout Summary\n\n\
             - Exercises: 2\n\
             - Sets: 3\n\
             - Reps: 13\n\
             - Total Load: 245.00 kg\n\
             \n\
             Bench\n\
             - Sets: 2\n\
             - Reps: 10\n\
             - Total Load: 105.00 kg\n\
             - **Mean Velocity:** 0.55 m/s\n\
             - **Peak Power:** 612 W\n\
             \n\
             Squat\n\
             - Sets: 1\n\
             - Reps: 3\n\
             - Total Load: 140.00 kg\n"
        );
    }
}

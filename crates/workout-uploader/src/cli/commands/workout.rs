//! Workout commands for workout-uploader

use chrono::Utc;
use serde_json::json;
use std::path::Path;

use super::auth::load_session;
use crate::cli::OutputFormat;
use crate::client::AuthPhase;
use crate::config::{CredentialStore, Settings};
use crate::error::{Result, UploaderError};
use crate::models::UploadRequest;
use crate::publish::{build_request, publish};
use crate::workout::{read_log_path, report::format_count, Aggregation};

/// List the exercises found in a file
pub async fn exercises(file: &str, format: OutputFormat) -> Result<()> {
    let path = existing_file(file)?;
    let log = read_log_path(path)?;
    let names = log.exercise_names();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
        OutputFormat::Text => {
            if names.is_empty() {
                println!("No exercises found.");
                return Ok(());
            }
            println!("{:<30} {:>6}", "Exercise", "Rows");
            println!("{}", "-".repeat(37));
            for name in &names {
                let rows = log.rows.iter().filter(|r| &r.exercise == name).count();
                println!("{:<30} {:>6}", truncate(name, 30), rows);
            }
        }
    }

    Ok(())
}

/// Show the name and description an upload would use
pub async fn preview(
    file: &str,
    exercise: Option<String>,
    name: Option<String>,
    format: OutputFormat,
    settings: &Settings,
) -> Result<()> {
    let aggregation = aggregate_file(file, exercise.as_deref(), settings)?;
    let request = UploadRequest::from_aggregation(
        &aggregation,
        name.as_deref(),
        chrono::Local::now().naive_local(),
    );
    print_preview(&aggregation, &request, format)
}

/// Aggregate a file and create the activity
pub async fn upload(
    file: &str,
    exercise: Option<String>,
    name: Option<String>,
    dry_run: bool,
    profile: Option<String>,
    format: OutputFormat,
    settings: &Settings,
) -> Result<()> {
    let aggregation = aggregate_file(file, exercise.as_deref(), settings)?;
    let request = build_request(&aggregation, name.as_deref())?;

    if dry_run {
        println!("Dry run, nothing uploaded.");
        return print_preview(&aggregation, &request, format);
    }

    let store = CredentialStore::new(profile)?;
    let mut session = load_session(&store)?;
    let oauth = settings.oauth_client()?;
    let api = settings.api_client()?;

    let result = publish(&mut session, &oauth, &api, &request, Utc::now()).await;

    // Persist whatever the session ended up with, including a refreshed token
    match (session.phase(), session.token()) {
        (AuthPhase::Authenticated, Some(token)) => store.save_token(token)?,
        (AuthPhase::Failed, _) => store.clear_token()?,
        _ => {}
    }

    let activity = result?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&activity)?),
        OutputFormat::Text => {
            println!("Activity '{}' created successfully!", activity.display_name());
            println!("Duration: {}", activity.duration_formatted());
            println!("View it at: {}", activity.web_url());
        }
    }

    Ok(())
}

/// Aggregate, turning parse failures into a visible message plus a degraded result
fn aggregate_file(file: &str, exercise: Option<&str>, settings: &Settings) -> Result<Aggregation> {
    let path = existing_file(file)?;
    let (aggregation, err) = settings
        .aggregator()
        .aggregate_path_or_degraded(path, exercise);

    if let Some(e) = err {
        eprintln!("Error parsing CSV: {}", e);
        if matches!(e, UploaderError::MissingColumn(_)) {
            eprintln!("Please make sure your CSV file has an 'Exercise' column.");
        }
    }

    Ok(aggregation)
}

fn existing_file(file: &str) -> Result<&Path> {
    let path = Path::new(file);
    if !path.is_file() {
        return Err(UploaderError::invalid_param(format!("File not found: {}", file)));
    }
    Ok(path)
}

fn print_preview(aggregation: &Aggregation, request: &UploadRequest, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "request": request,
                "total_load": aggregation.total_load,
                "total_sets": aggregation.total_sets,
                "total_reps": aggregation.total_reps,
                "exercise_names": aggregation.exercise_names,
                "selected_exercise": aggregation.selected_exercise,
                "degraded": aggregation.degraded,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("Generated Name: {}", request.name);
            println!(
                "Totals:         {} sets, {} reps, {:.2} kg",
                aggregation.total_sets,
                format_count(aggregation.total_reps),
                aggregation.total_load
            );
            println!("Elapsed Time:   {} s", request.elapsed_time);
            println!("{}", "-".repeat(40));
            print!("{}", request.description);
            if !request.description.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

/// Truncate string to max length
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("very long string here", 10), "very lo...");
    }

    #[test]
    fn test_existing_file_missing() {
        let err = existing_file("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_aggregate_file_degrades_on_bad_csv() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "Set,Reps\n1,5\n").unwrap();

        let agg = aggregate_file(path.to_str().unwrap(), None, &Settings::default()).unwrap();
        assert!(agg.degraded);
        assert_eq!(agg.total_sets, 0);
    }
}

//! Publish an aggregated workout as an activity

use chrono::{DateTime, Local, Utc};
use tracing::info;

use crate::client::{AuthSession, OAuthClient, StravaClient};
use crate::error::{Result, UploaderError};
use crate::models::{CreatedActivity, UploadRequest};
use crate::workout::Aggregation;

/// Payload for `aggregation`, starting now in local time
pub fn build_request(aggregation: &Aggregation, base_name: Option<&str>) -> Result<UploadRequest> {
    if aggregation.degraded {
        return Err(UploaderError::invalid_param(
            "Workout data could not be parsed; refusing to upload a zero-filled activity",
        ));
    }
    Ok(UploadRequest::from_aggregation(
        aggregation,
        base_name,
        Local::now().naive_local(),
    ))
}

/// Make sure the session token is valid at `now`, then create the activity.
pub async fn publish(
    session: &mut AuthSession,
    oauth: &OAuthClient,
    api: &StravaClient,
    request: &UploadRequest,
    now: DateTime<Utc>,
) -> Result<CreatedActivity> {
    let token = session.ensure_fresh(oauth, now).await?;
    let activity = api.create_activity(token, request).await?;
    info!(id = activity.id, "Activity created");
    Ok(activity)
}

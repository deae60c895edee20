use crate::error::PollError;
use crate::feeling::FeelingValue;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{Extension, Json, Path},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct SubmitFeelingRequest {
    pub feeling: FeelingValue,
}

/// Record today's feeling.
///
/// The body is parsed by hand so that an out of range feeling is reported as
/// such instead of as a generic payload rejection.
pub async fn submit_feeling(
    Extension(app_state): Extension<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, PollError> {
    let payload: SubmitFeelingRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Failed to parse request: {e}");
        PollError::InvalidRequest
    })?;

    let feeling = payload
        .feeling
        .validate()
        .inspect_err(|_| warn!(feeling = ?payload.feeling, "Rejected feeling"))?;

    app_state.engine.record_feeling(feeling).await?;

    info!(%feeling, "Feeling recorded");
    Ok(StatusCode::OK)
}

/// Aggregated counts for one day.
pub async fn get_poll_result(
    Extension(app_state): Extension<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse, PollError> {
    let result = app_state
        .engine
        .get_poll_result_for(&date)
        .await
        .inspect_err(|e| {
            if matches!(e, PollError::InvalidDate(_)) {
                warn!("Failed to parse date parameter {date}: {e}");
            }
        })?;

    Ok((StatusCode::OK, Json(result)))
}

//! Handlers for the `/warming` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use warmline_core::schedule::ScheduleStatus;
use warmline_core::types::DbId;
use warmline_db::repositories::WarmingActivityRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for activity listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for activity listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /warming/{instance_id}/activity`.
#[derive(Debug, Deserialize)]
pub struct ActivityListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/warming/{instance_id}/start
///
/// Enable warming for an instance. Returns 201 with the day-1 schedule.
/// Enabling twice yields 409 via the schedule's unique constraint.
pub async fn start_warming(
    State(state): State<AppState>,
    Path(instance_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = state.engine.start_warming(instance_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: schedule })))
}

/// POST /api/v1/warming/{instance_id}/stop
///
/// Disable warming and remove the schedule. The activity log is kept.
pub async fn stop_warming(
    State(state): State<AppState>,
    Path(instance_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.engine.stop_warming(instance_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/warming/{instance_id}/pause
pub async fn pause_warming(
    State(state): State<AppState>,
    Path(instance_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = state
        .engine
        .set_warming_status(instance_id, ScheduleStatus::Paused)
        .await?;
    Ok(Json(DataResponse { data: schedule }))
}

/// POST /api/v1/warming/{instance_id}/resume
pub async fn resume_warming(
    State(state): State<AppState>,
    Path(instance_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = state
        .engine
        .set_warming_status(instance_id, ScheduleStatus::Active)
        .await?;
    Ok(Json(DataResponse { data: schedule }))
}

// ---------------------------------------------------------------------------
// Dispatch & accounting
// ---------------------------------------------------------------------------

/// POST /api/v1/warming/dispatch
///
/// Run one dispatch cycle now. This is the entry point for the external
/// scheduler trigger; the response carries the per-schedule summary.
pub async fn run_dispatch_cycle(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let report = state.engine.run_dispatch_cycle().await?;
    Ok(Json(DataResponse { data: report }))
}

/// POST /api/v1/warming/{instance_id}/reply
///
/// Record an inbound reply from a warming target. Drives the response rate
/// used by the level classifier.
pub async fn record_reply(
    State(state): State<AppState>,
    Path(instance_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = state.engine.record_inbound_reply(instance_id).await?;
    Ok(Json(DataResponse { data: schedule }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/warming/{instance_id}
///
/// Current schedule, day progression, and warming level.
pub async fn get_warming_status(
    State(state): State<AppState>,
    Path(instance_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let status = state.engine.warming_status(instance_id).await?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /api/v1/warming/{instance_id}/activity
///
/// Paginated audit trail of dispatch attempts, newest first.
pub async fn list_activity(
    State(state): State<AppState>,
    Path(instance_id): Path<DbId>,
    Query(params): Query<ActivityListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let activities =
        WarmingActivityRepo::list_for_instance(&state.pool, instance_id, limit, offset).await?;
    Ok(Json(DataResponse { data: activities }))
}

//! Handlers for the `/campaigns` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use warmline_core::campaign::MessageStatus;
use warmline_core::distribution::SendingMode;
use warmline_core::error::CoreError;
use warmline_core::types::DbId;
use warmline_db::models::campaign::CreateCampaign;
use warmline_db::repositories::CampaignRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum page size for campaign listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for campaign listing.
const DEFAULT_LIMIT: i64 = 50;

/// Query parameters for `GET /campaigns`.
#[derive(Debug, Deserialize)]
pub struct CampaignListQuery {
    pub operator_id: DbId,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `POST /campaigns/preview-distribution`.
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub instance_ids: Vec<DbId>,
    pub sending_mode: String,
}

/// Body of `POST /campaigns/{id}/messages/{message_id}/result`.
#[derive(Debug, Deserialize)]
pub struct MessageResultRequest {
    pub status: String,
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Creation & lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns
///
/// Create a draft campaign with its recipient list staged. Returns 201.
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(input): Json<CreateCampaign>,
) -> AppResult<impl IntoResponse> {
    let campaign = state.engine.create_campaign(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// POST /api/v1/campaigns/{id}/start
///
/// Plan all assignments, materialize the message rows, and begin sending.
/// A campaign that is already sending yields 409 without touching any row.
pub async fn start_campaign(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = state.engine.start_campaign(id).await?;
    Ok(Json(DataResponse { data: campaign }))
}

/// POST /api/v1/campaigns/{id}/cancel
pub async fn cancel_campaign(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = state.engine.cancel_campaign(id).await?;
    Ok(Json(DataResponse { data: campaign }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/campaigns?operator_id=...
pub async fn list_campaigns(
    State(state): State<AppState>,
    Query(params): Query<CampaignListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let campaigns =
        CampaignRepo::list_for_operator(&state.pool, params.operator_id, limit, offset).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = CampaignRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Campaign",
            id,
        }))?;
    Ok(Json(DataResponse { data: campaign }))
}

/// GET /api/v1/campaigns/{id}/progress
///
/// Live counters, percent, elapsed time, and ETA for the polling UI.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let progress = state.engine.campaign_progress(id).await?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/campaigns/{id}/failed-messages
///
/// Per-recipient failure reasons for the campaign's failed-messages view.
pub async fn list_failed_messages(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let messages = state.engine.failed_messages(id).await?;
    Ok(Json(DataResponse { data: messages }))
}

// ---------------------------------------------------------------------------
// Planning preview & result ingestion
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns/preview-distribution
///
/// Expected per-instance percentages for a mode without starting anything.
pub async fn preview_distribution(
    State(state): State<AppState>,
    Json(input): Json<PreviewRequest>,
) -> AppResult<impl IntoResponse> {
    let mode = SendingMode::parse(&input.sending_mode).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown sending mode: '{}'", input.sending_mode))
    })?;
    let shares = state
        .engine
        .preview_distribution(&input.instance_ids, mode)
        .await?;
    Ok(Json(DataResponse { data: shares }))
}

/// POST /api/v1/campaigns/{id}/messages/{message_id}/result
///
/// Ingestion point for the external send pipeline: applies one message
/// status transition and folds it into the campaign counters.
pub async fn record_message_result(
    State(state): State<AppState>,
    Path((id, message_id)): Path<(DbId, DbId)>,
    Json(input): Json<MessageResultRequest>,
) -> AppResult<impl IntoResponse> {
    let status = MessageStatus::parse(&input.status).ok_or_else(|| {
        AppError::BadRequest(format!("Unknown message status: '{}'", input.status))
    })?;
    let message = state
        .engine
        .record_message_result(id, message_id, status, input.error_message)
        .await?;
    Ok(Json(DataResponse { data: message }))
}

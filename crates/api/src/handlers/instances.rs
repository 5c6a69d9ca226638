//! Handlers for the `/instances` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use warmline_db::models::instance::{CreateSendingInstance, SendingInstance};
use warmline_db::repositories::InstanceRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Instance row enriched with live gateway connectivity, for the
/// instance-selection UI.
#[derive(Debug, Serialize)]
pub struct InstanceWithConnectivity {
    #[serde(flatten)]
    pub instance: SendingInstance,
    pub connected: bool,
}

/// GET /api/v1/instances
///
/// All instances with their warming level and live connectivity.
pub async fn list_instances(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let instances = InstanceRepo::list(&state.pool).await?;

    let mut enriched = Vec::with_capacity(instances.len());
    for instance in instances {
        let connected = state
            .gateway
            .is_connected(instance.id)
            .await
            .unwrap_or(false);
        enriched.push(InstanceWithConnectivity {
            instance,
            connected,
        });
    }

    Ok(Json(DataResponse { data: enriched }))
}

/// POST /api/v1/instances
///
/// Register a sending instance. Duplicate (operator, label) pairs yield 409.
pub async fn register_instance(
    State(state): State<AppState>,
    Json(input): Json<CreateSendingInstance>,
) -> AppResult<impl IntoResponse> {
    let instance = InstanceRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: instance })))
}

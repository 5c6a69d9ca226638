//! Route definitions for the `/warming` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::warming;
use crate::state::AppState;

/// Routes mounted at `/warming`.
///
/// ```text
/// POST   /dispatch                 -> run_dispatch_cycle
/// POST   /{instance_id}/start      -> start_warming
/// POST   /{instance_id}/stop       -> stop_warming
/// POST   /{instance_id}/pause      -> pause_warming
/// POST   /{instance_id}/resume     -> resume_warming
/// POST   /{instance_id}/reply      -> record_reply
/// GET    /{instance_id}            -> get_warming_status
/// GET    /{instance_id}/activity   -> list_activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dispatch", post(warming::run_dispatch_cycle))
        .route("/{instance_id}/start", post(warming::start_warming))
        .route("/{instance_id}/stop", post(warming::stop_warming))
        .route("/{instance_id}/pause", post(warming::pause_warming))
        .route("/{instance_id}/resume", post(warming::resume_warming))
        .route("/{instance_id}/reply", post(warming::record_reply))
        .route("/{instance_id}", get(warming::get_warming_status))
        .route("/{instance_id}/activity", get(warming::list_activity))
}

//! Route definitions for the `/instances` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::instances;
use crate::state::AppState;

/// Routes mounted at `/instances`.
///
/// ```text
/// GET    /  -> list_instances
/// POST   /  -> register_instance
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(instances::list_instances).post(instances::register_instance),
    )
}

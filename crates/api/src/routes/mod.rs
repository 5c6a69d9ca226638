//! Route table composition.

pub mod campaigns;
pub mod health;
pub mod instances;
pub mod warming;

use axum::Router;

use crate::state::AppState;

/// All routes mounted under `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/warming", warming::router())
        .nest("/campaigns", campaigns::router())
        .nest("/instances", instances::router())
}

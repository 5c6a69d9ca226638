//! Route definitions for the `/campaigns` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
///
/// ```text
/// POST   /                                  -> create_campaign
/// GET    /                                  -> list_campaigns
/// POST   /preview-distribution              -> preview_distribution
/// GET    /{id}                              -> get_campaign
/// POST   /{id}/start                        -> start_campaign
/// POST   /{id}/cancel                       -> cancel_campaign
/// GET    /{id}/progress                     -> get_progress
/// GET    /{id}/failed-messages              -> list_failed_messages
/// POST   /{id}/messages/{message_id}/result -> record_message_result
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/preview-distribution",
            post(campaigns::preview_distribution),
        )
        .route("/{id}", get(campaigns::get_campaign))
        .route("/{id}/start", post(campaigns::start_campaign))
        .route("/{id}/cancel", post(campaigns::cancel_campaign))
        .route("/{id}/progress", get(campaigns::get_progress))
        .route("/{id}/failed-messages", get(campaigns::list_failed_messages))
        .route(
            "/{id}/messages/{message_id}/result",
            post(campaigns::record_message_result),
        )
}

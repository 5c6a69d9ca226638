use std::sync::Arc;

use warmline_engine::Engine;
use warmline_events::EventBus;
use warmline_gateway::MessageGateway;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: warmline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The warming & distribution engine.
    pub engine: Arc<Engine>,
    /// External messaging gateway (connectivity reads in handlers).
    pub gateway: Arc<dyn MessageGateway>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<EventBus>,
}

//! The warming & distribution engine.
//!
//! Owns the periodic dispatch cycle (one warming send per active schedule
//! per pass), the target resolver, warming lifecycle operations, and the
//! campaign services (planning, progress aggregation, result ingestion).
//!
//! The engine talks to the outside world only through its injected
//! [`MessageGateway`] and publishes domain events on the shared
//! [`EventBus`]; persistence goes through the `warmline-db` repositories.

pub mod campaign;
pub mod content;
pub mod dispatch;
pub mod targets;
pub mod warming;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;

use warmline_core::active_hours::DEFAULT_UTC_OFFSET_HOURS;
use warmline_core::error::CoreError;
use warmline_db::DbPool;
use warmline_events::EventBus;
use warmline_gateway::MessageGateway;

/// Errors surfaced by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level error (validation, conflict, not found).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

/// Tunables for the engine, loaded from the environment by the binary.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Operating timezone as a whole-hour UTC offset.
    pub utc_offset_hours: i32,
    /// Upper bound on schedules processed concurrently per cycle.
    pub dispatch_concurrency: usize,
    /// Timeout applied to every gateway call.
    pub gateway_timeout: Duration,
    /// Seed for the injected random source. `None` seeds from the OS;
    /// tests pass a fixed seed for reproducible picks and plans.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            dispatch_concurrency: 8,
            gateway_timeout: Duration::from_secs(30),
            rng_seed: None,
        }
    }
}

/// Shared engine handle.
///
/// Cheap to share via `Arc<Engine>`; all interior state is synchronized.
pub struct Engine {
    pool: DbPool,
    gateway: Arc<dyn MessageGateway>,
    events: Arc<EventBus>,
    config: EngineConfig,
    /// Injected random source used for daily target sampling, content and
    /// target picks, and campaign planning.
    rng: Mutex<StdRng>,
    /// Overlap guard: set while a dispatch cycle is in flight.
    cycle_running: AtomicBool,
}

impl Engine {
    pub fn new(
        pool: DbPool,
        gateway: Arc<dyn MessageGateway>,
        events: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            pool,
            gateway,
            events,
            config,
            rng: Mutex::new(rng),
            cycle_running: AtomicBool::new(false),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

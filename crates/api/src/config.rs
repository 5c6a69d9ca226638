use std::time::Duration;

use warmline_core::active_hours::{validate_utc_offset, DEFAULT_UTC_OFFSET_HOURS};
use warmline_engine::EngineConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the external messaging gateway.
    pub gateway_base_url: String,
    /// Timeout for every gateway call in seconds (default: `30`).
    pub gateway_timeout_secs: u64,
    /// Dispatch cycle interval in seconds (default: `300`).
    pub dispatch_interval_secs: u64,
    /// Bounded worker pool size for the dispatch cycle (default: `8`).
    pub dispatch_concurrency: usize,
    /// Operating timezone as a whole-hour UTC offset (default: `-3`).
    pub utc_offset_hours: i32,
    /// Optional fixed RNG seed (`DISPATCH_SEED`), for reproducible runs.
    pub dispatch_seed: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `3000`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                     |
    /// | `GATEWAY_BASE_URL`       | `http://localhost:8700`  |
    /// | `GATEWAY_TIMEOUT_SECS`   | `30`                     |
    /// | `DISPATCH_INTERVAL_SECS` | `300`                    |
    /// | `DISPATCH_CONCURRENCY`   | `8`                      |
    /// | `WARMING_UTC_OFFSET_HOURS` | `-3`                   |
    /// | `DISPATCH_SEED`          | unset (OS entropy)       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let gateway_base_url =
            std::env::var("GATEWAY_BASE_URL").unwrap_or_else(|_| "http://localhost:8700".into());

        let gateway_timeout_secs: u64 = std::env::var("GATEWAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("GATEWAY_TIMEOUT_SECS must be a valid u64");

        let dispatch_interval_secs: u64 = std::env::var("DISPATCH_INTERVAL_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("DISPATCH_INTERVAL_SECS must be a valid u64");

        let dispatch_concurrency: usize = std::env::var("DISPATCH_CONCURRENCY")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("DISPATCH_CONCURRENCY must be a valid usize");

        let utc_offset_hours: i32 = std::env::var("WARMING_UTC_OFFSET_HOURS")
            .unwrap_or_else(|_| DEFAULT_UTC_OFFSET_HOURS.to_string())
            .parse()
            .expect("WARMING_UTC_OFFSET_HOURS must be a valid i32");
        validate_utc_offset(utc_offset_hours)
            .expect("WARMING_UTC_OFFSET_HOURS must be a real-world UTC offset");

        let dispatch_seed: Option<u64> = std::env::var("DISPATCH_SEED")
            .ok()
            .map(|v| v.parse().expect("DISPATCH_SEED must be a valid u64"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            gateway_base_url,
            gateway_timeout_secs,
            dispatch_interval_secs,
            dispatch_concurrency,
            utc_offset_hours,
            dispatch_seed,
        }
    }

    /// Derive the engine tunables from the server configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            utc_offset_hours: self.utc_offset_hours,
            dispatch_concurrency: self.dispatch_concurrency,
            gateway_timeout: Duration::from_secs(self.gateway_timeout_secs),
            rng_seed: self.dispatch_seed,
        }
    }
}

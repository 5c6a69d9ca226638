//! Shared fixtures for engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Timelike, Utc};
use sqlx::PgPool;
use warmline_core::active_hours::local_date;
use warmline_db::models::instance::CreateSendingInstance;
use warmline_db::models::warming_contact::CreateWarmingContact;
use warmline_db::models::warming_content::CreateWarmingContent;
use warmline_engine::{Engine, EngineConfig};
use warmline_events::EventBus;
use warmline_gateway::mock::MockGateway;
use warmline_gateway::MessageGateway;

/// A UTC offset that puts the local wall clock at `target_hour` right now,
/// so active-hours behaviour is deterministic regardless of when the test
/// runs.
pub fn offset_with_local_hour(target_hour: u32) -> i32 {
    let utc_hour = Utc::now().hour() as i32;
    let mut offset = target_hour as i32 - utc_hour;
    if offset > 14 {
        offset -= 24;
    }
    if offset < -12 {
        offset += 24;
    }
    offset
}

/// The engine's notion of "today" for a given offset.
pub fn local_today(offset_hours: i32) -> NaiveDate {
    local_date(Utc::now(), offset_hours)
}

/// Build a seeded engine over the mock gateway with the local clock pinned
/// to `local_hour`.
pub fn build_engine(pool: &PgPool, gateway: Arc<MockGateway>, local_hour: u32) -> Engine {
    Engine::new(
        pool.clone(),
        gateway as Arc<dyn MessageGateway>,
        Arc::new(EventBus::default()),
        EngineConfig {
            utc_offset_hours: offset_with_local_hour(local_hour),
            dispatch_concurrency: 4,
            gateway_timeout: Duration::from_secs(5),
            rng_seed: Some(42),
        },
    )
}

pub async fn new_instance(pool: &PgPool, operator_id: i64, label: &str) -> i64 {
    warmline_db::repositories::InstanceRepo::create(
        pool,
        &CreateSendingInstance {
            operator_id,
            label: label.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn new_contact(pool: &PgPool, operator_id: i64, phone: &str) {
    warmline_db::repositories::WarmingContactRepo::create(
        pool,
        &CreateWarmingContact {
            operator_id,
            phone: phone.to_string(),
            display_name: None,
        },
    )
    .await
    .unwrap();
}

pub async fn new_global_text(pool: &PgPool, body: &str) {
    warmline_db::repositories::WarmingContentRepo::create(
        pool,
        &CreateWarmingContent {
            operator_id: None,
            content_type: "text".to_string(),
            body: Some(body.to_string()),
            media_url: None,
        },
    )
    .await
    .unwrap();
}

pub async fn new_global_image(pool: &PgPool, media_url: &str) {
    warmline_db::repositories::WarmingContentRepo::create(
        pool,
        &CreateWarmingContent {
            operator_id: None,
            content_type: "image".to_string(),
            body: None,
            media_url: Some(media_url.to_string()),
        },
    )
    .await
    .unwrap();
}

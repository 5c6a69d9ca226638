//! Warming lifecycle operations: enable/disable warming for an instance,
//! pause/resume, inbound reply accounting, and status reporting.

use serde::Serialize;

use warmline_core::error::CoreError;
use warmline_core::progression::{progression_for, DayProgression};
use warmline_core::schedule::ScheduleStatus;
use warmline_core::types::DbId;
use warmline_core::warming_level::classify;
use warmline_db::models::instance::SendingInstance;
use warmline_db::models::warming_schedule::WarmingSchedule;
use warmline_db::repositories::{InstanceRepo, WarmingScheduleRepo};
use warmline_events::PlatformEvent;

use crate::{Engine, EngineResult};

/// Schedule snapshot with its derived progression and level, for the
/// warming status endpoint.
#[derive(Debug, Serialize)]
pub struct WarmingStatus {
    pub schedule: WarmingSchedule,
    pub progression: DayProgression,
    pub warming_level: i16,
}

impl Engine {
    /// Enable warming for an instance: creates an active day-1 schedule.
    ///
    /// A second enable for the same instance trips the
    /// `uq_warming_schedules_instance` constraint, which the API surfaces
    /// as a conflict.
    pub async fn start_warming(&self, instance_id: DbId) -> EngineResult<WarmingSchedule> {
        let instance = InstanceRepo::find_by_id(&self.pool, instance_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SendingInstance",
                id: instance_id,
            })?;

        let schedule = WarmingScheduleRepo::create(&self.pool, instance.id).await?;

        tracing::info!(instance_id, schedule_id = schedule.id, "Warming started");
        self.events.publish(
            PlatformEvent::new("warming.started").with_source("schedule", schedule.id),
        );
        Ok(schedule)
    }

    /// Disable warming: removes the schedule. The activity log is kept.
    pub async fn stop_warming(&self, instance_id: DbId) -> EngineResult<()> {
        let deleted = WarmingScheduleRepo::delete_by_instance(&self.pool, instance_id).await?;
        if !deleted {
            return Err(CoreError::NotFound {
                entity: "WarmingSchedule",
                id: instance_id,
            }
            .into());
        }

        tracing::info!(instance_id, "Warming stopped");
        self.events
            .publish(PlatformEvent::new("warming.stopped").with_source("instance", instance_id));
        Ok(())
    }

    /// Pause or resume a schedule without touching its counters.
    pub async fn set_warming_status(
        &self,
        instance_id: DbId,
        status: ScheduleStatus,
    ) -> EngineResult<WarmingSchedule> {
        let schedule = WarmingScheduleRepo::set_status(&self.pool, instance_id, status)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "WarmingSchedule",
                id: instance_id,
            })?;
        tracing::info!(instance_id, status = status.as_str(), "Warming status changed");
        Ok(schedule)
    }

    /// Count an inbound reply for the instance and reclassify its level.
    ///
    /// Called by the inbound pipeline whenever a warming target answers;
    /// replies drive the response rate that gates levels 2-5.
    pub async fn record_inbound_reply(&self, instance_id: DbId) -> EngineResult<WarmingSchedule> {
        let schedule = WarmingScheduleRepo::increment_received(&self.pool, instance_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "WarmingSchedule",
                id: instance_id,
            })?;

        let instance = InstanceRepo::find_by_id(&self.pool, instance_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SendingInstance",
                id: instance_id,
            })?;
        self.reclassify_level(&instance, &schedule).await?;
        Ok(schedule)
    }

    /// Current schedule, progression, and level for an instance.
    pub async fn warming_status(&self, instance_id: DbId) -> EngineResult<WarmingStatus> {
        let schedule = WarmingScheduleRepo::find_by_instance(&self.pool, instance_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "WarmingSchedule",
                id: instance_id,
            })?;
        let instance = InstanceRepo::find_by_id(&self.pool, instance_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SendingInstance",
                id: instance_id,
            })?;

        Ok(WarmingStatus {
            progression: progression_for(schedule.current_day),
            warming_level: instance.warming_level,
            schedule,
        })
    }

    /// Advance `current_day` and reset the daily counters for every
    /// schedule whose target belongs to a past local calendar day.
    ///
    /// Invoked by the background rollover job; also safe to call manually.
    /// Returns the number of schedules rolled over.
    pub async fn run_daily_rollover(&self) -> EngineResult<u64> {
        let today = warmline_core::active_hours::local_date(
            chrono::Utc::now(),
            self.config.utc_offset_hours,
        );
        let rolled = WarmingScheduleRepo::rollover_due(&self.pool, today).await?;
        if rolled > 0 {
            tracing::info!(rolled, "Daily warming rollover applied");
        }
        Ok(rolled)
    }

    /// Recompute the instance's warming level from the schedule counters
    /// and persist it when it changed. Levels only move up here; the
    /// classifier itself never demotes, and neither does this write path.
    pub(crate) async fn reclassify_level(
        &self,
        instance: &SendingInstance,
        schedule: &WarmingSchedule,
    ) -> EngineResult<()> {
        let level = classify(
            schedule.current_day,
            schedule.total_messages_sent,
            schedule.total_messages_received,
        );
        if level <= instance.warming_level {
            return Ok(());
        }

        InstanceRepo::update_warming_level(&self.pool, instance.id, level).await?;
        tracing::info!(
            instance_id = instance.id,
            from = instance.warming_level,
            to = level,
            "Warming level changed"
        );
        self.events.publish(
            PlatformEvent::new("warming.level.changed")
                .with_source("instance", instance.id)
                .with_payload(serde_json::json!({
                    "from": instance.warming_level,
                    "to": level,
                })),
        );
        Ok(())
    }
}

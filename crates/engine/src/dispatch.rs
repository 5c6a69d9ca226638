//! The warming dispatch cycle.
//!
//! One invocation makes a single pass over all active schedules and sends
//! at most one warming message per schedule: check the active-hours gate,
//! ensure today's target is sampled, resolve targets, pick content and
//! target at random, send through the gateway, log the attempt, and update
//! counters on success.
//!
//! Schedules are processed concurrently up to a bounded limit and fully
//! isolated from each other: one schedule's failure is captured in its
//! result entry and never aborts the pass. An atomic flag rejects a cycle
//! that starts while the previous one is still running, so overlapping
//! trigger firings cannot double-count.

use std::sync::atomic::Ordering;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use rand::Rng;
use serde::Serialize;

use warmline_core::active_hours::{is_within_active_hours, local_date};
use warmline_core::error::CoreError;
use warmline_core::progression::progression_for;
use warmline_core::schedule::validate_current_day;
use warmline_core::types::DbId;
use warmline_db::models::warming_activity::NewWarmingActivity;
use warmline_db::models::warming_schedule::WarmingSchedule;
use warmline_db::repositories::{
    InstanceRepo, WarmingActivityRepo, WarmingContentRepo, WarmingScheduleRepo,
};
use warmline_events::PlatformEvent;

use crate::content::{outbound_from, preview_of};
use crate::targets::{is_connected_quietly, resolve_targets};
use crate::{Engine, EngineResult};

// ---------------------------------------------------------------------------
// Cycle report
// ---------------------------------------------------------------------------

/// How a cycle invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// The pass ran; see the per-schedule results.
    Completed,
    /// A previous invocation was still in flight; nothing was touched.
    AlreadyRunning,
    /// Outside the daily active window; nothing was touched.
    OutsideActiveHours,
}

/// Outcome for one schedule within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleOutcome {
    /// One message went out and was counted.
    Sent {
        target_phone: String,
        content_type: String,
    },
    /// Today's target was already met.
    TargetMet,
    /// The owning instance has no live session.
    InstanceNotConnected,
    /// No eligible targets this cycle.
    NoTargets,
    /// No eligible content for the day's unlocked types.
    NoContent,
    /// The gateway send failed or timed out; logged, not counted.
    SendFailed { error: String },
    /// Processing this schedule failed; the rest of the pass continued.
    Error { error: String },
}

/// Per-schedule result entry in the cycle summary.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResult {
    pub schedule_id: DbId,
    pub instance_id: DbId,
    pub outcome: ScheduleOutcome,
}

/// Summary of one dispatch cycle invocation, returned for observability.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub status: CycleStatus,
    pub results: Vec<ScheduleResult>,
}

impl CycleReport {
    fn empty(status: CycleStatus) -> Self {
        Self {
            status,
            results: Vec::new(),
        }
    }

    /// Number of schedules that produced a send this pass.
    pub fn sent_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ScheduleOutcome::Sent { .. }))
            .count()
    }
}

/// Resets the overlap flag when the cycle ends, on every exit path.
struct CycleGuard<'a>(&'a Engine);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.cycle_running.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// Cycle
// ---------------------------------------------------------------------------

impl Engine {
    /// Run one dispatch cycle over all active schedules.
    pub async fn run_dispatch_cycle(&self) -> EngineResult<CycleReport> {
        if !is_within_active_hours(Utc::now(), self.config.utc_offset_hours) {
            tracing::debug!("Dispatch cycle skipped: outside active hours");
            return Ok(CycleReport::empty(CycleStatus::OutsideActiveHours));
        }

        if self
            .cycle_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("Dispatch cycle skipped: previous cycle still running");
            return Ok(CycleReport::empty(CycleStatus::AlreadyRunning));
        }
        let _guard = CycleGuard(self);

        let schedules = WarmingScheduleRepo::list_active(&self.pool).await?;
        tracing::info!(count = schedules.len(), "Dispatch cycle started");

        let results: Vec<ScheduleResult> = stream::iter(schedules)
            .map(|schedule| async move {
                let schedule_id = schedule.id;
                let instance_id = schedule.instance_id;
                let outcome = match self.process_schedule(schedule).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::error!(
                            schedule_id,
                            instance_id,
                            error = %e,
                            "Schedule processing failed"
                        );
                        ScheduleOutcome::Error {
                            error: e.to_string(),
                        }
                    }
                };
                ScheduleResult {
                    schedule_id,
                    instance_id,
                    outcome,
                }
            })
            .buffer_unordered(self.config.dispatch_concurrency.max(1))
            .collect()
            .await;

        let report = CycleReport {
            status: CycleStatus::Completed,
            results,
        };
        tracing::info!(
            schedules = report.results.len(),
            sent = report.sent_count(),
            "Dispatch cycle finished"
        );
        Ok(report)
    }

    /// Process one schedule: at most one send, fully isolated.
    async fn process_schedule(&self, schedule: WarmingSchedule) -> EngineResult<ScheduleOutcome> {
        validate_current_day(schedule.current_day)?;

        if !is_connected_quietly(
            self.gateway.as_ref(),
            self.config.gateway_timeout,
            schedule.instance_id,
        )
        .await
        {
            return Ok(ScheduleOutcome::InstanceNotConnected);
        }

        let progression = progression_for(schedule.current_day);
        let today = local_date(Utc::now(), self.config.utc_offset_hours);

        // Sample a fresh daily target if none belongs to today yet.
        let schedule = if schedule.target_date != Some(today)
            || schedule.messages_target_today.is_none()
        {
            let target = {
                let mut rng = self.rng.lock().await;
                rng.random_range(progression.min..=progression.max)
            };
            tracing::info!(
                schedule_id = schedule.id,
                day = schedule.current_day,
                target,
                "Sampled daily warming target"
            );
            WarmingScheduleRepo::set_daily_target(&self.pool, schedule.id, target, today)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "WarmingSchedule",
                    id: schedule.id,
                })?
        } else {
            schedule
        };

        let target_today = schedule.messages_target_today.unwrap_or(0);
        if schedule.messages_sent_today >= target_today {
            return Ok(ScheduleOutcome::TargetMet);
        }

        let instance = InstanceRepo::find_by_id(&self.pool, schedule.instance_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "SendingInstance",
                id: schedule.instance_id,
            })?;

        let targets = resolve_targets(
            &self.pool,
            self.gateway.as_ref(),
            self.config.gateway_timeout,
            instance.id,
            instance.operator_id,
        )
        .await?;
        if targets.is_empty() {
            tracing::info!(schedule_id = schedule.id, "No eligible warming targets");
            return Ok(ScheduleOutcome::NoTargets);
        }

        let allowed: Vec<&str> = progression.allowed_types.iter().map(|t| t.as_str()).collect();
        let contents =
            WarmingContentRepo::list_eligible(&self.pool, instance.operator_id, &allowed).await?;
        if contents.is_empty() {
            tracing::info!(schedule_id = schedule.id, "No eligible warming content");
            return Ok(ScheduleOutcome::NoContent);
        }

        let (content_idx, target_idx) = {
            let mut rng = self.rng.lock().await;
            (
                rng.random_range(0..contents.len()),
                rng.random_range(0..targets.len()),
            )
        };
        let content = &contents[content_idx];
        let target = &targets[target_idx];
        let outbound = outbound_from(content)?;

        // Send, treating gateway errors and timeouts as a failed attempt.
        let (success, error_message) = match tokio::time::timeout(
            self.config.gateway_timeout,
            self.gateway.send_message(instance.id, &target.phone, &outbound),
        )
        .await
        {
            Ok(Ok(outcome)) => (outcome.success, outcome.error),
            Ok(Err(e)) => (false, Some(e.to_string())),
            Err(_) => (false, Some("Gateway send timed out".to_string())),
        };

        // The attempt is logged whatever its outcome.
        let activity = WarmingActivityRepo::insert(
            &self.pool,
            &NewWarmingActivity {
                schedule_id: schedule.id,
                instance_id: instance.id,
                activity_type: outbound.content_type.activity_type().to_string(),
                target_phone: target.phone.clone(),
                content_preview: preview_of(content),
                success,
                error_message: error_message.clone(),
            },
        )
        .await?;

        self.events.publish(
            PlatformEvent::new("warming.activity.recorded")
                .with_source("schedule", schedule.id)
                .with_payload(serde_json::json!({
                    "activity_id": activity.id,
                    "instance_id": instance.id,
                    "activity_type": activity.activity_type,
                    "success": success,
                })),
        );

        if !success {
            let error = error_message.unwrap_or_else(|| "Send failed".to_string());
            tracing::warn!(
                schedule_id = schedule.id,
                instance_id = instance.id,
                error = %error,
                "Warming send failed"
            );
            return Ok(ScheduleOutcome::SendFailed { error });
        }

        // Count the send; the conditional update keeps the counter capped at
        // the target even under overlapping cycles.
        match WarmingScheduleRepo::try_increment_sent(&self.pool, schedule.id).await? {
            Some(updated) => self.reclassify_level(&instance, &updated).await?,
            None => tracing::debug!(
                schedule_id = schedule.id,
                "Counter already at target, increment skipped"
            ),
        }

        Ok(ScheduleOutcome::Sent {
            target_phone: target.phone.clone(),
            content_type: outbound.content_type.as_str().to_string(),
        })
    }
}

//! Campaign services: creation, start (planning), cancellation, result
//! ingestion, and progress aggregation.
//!
//! Planning runs exactly once, at start: every recipient gets its instance
//! assignment up front and keeps it for the lifetime of the campaign. The
//! aggregator then folds per-message results reported by the external send
//! pipeline into the campaign counters.

use chrono::Utc;
use serde::Serialize;

use warmline_core::campaign::{
    estimated_remaining_seconds, is_send_complete, progress_percent, CampaignStatus,
    MessageStatus,
};
use warmline_core::distribution::{
    expected_shares, plan_assignments, InstanceShare, InstanceWeight, SendingMode,
};
use warmline_core::error::CoreError;
use warmline_core::types::DbId;
use warmline_db::models::campaign::{Campaign, CampaignRecipient, CreateCampaign};
use warmline_db::models::campaign_message::CampaignMessage;
use warmline_db::models::instance::SendingInstance;
use warmline_db::repositories::{CampaignMessageRepo, CampaignRepo, InstanceRepo};
use warmline_events::PlatformEvent;

use crate::targets::is_connected_quietly;
use crate::{Engine, EngineResult};

// ---------------------------------------------------------------------------
// Progress payload
// ---------------------------------------------------------------------------

/// Live progress snapshot for a campaign.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignProgress {
    pub campaign_id: DbId,
    pub status: String,
    pub total_contacts: i32,
    pub sent: i32,
    pub delivered: i32,
    pub failed: i32,
    /// `round(100 * sent / total_contacts)`; failures do not advance it.
    pub progress_percent: i32,
    /// Seconds since `started_at` (until `completed_at` once terminal).
    pub elapsed_seconds: Option<i64>,
    /// Extrapolated from the send rate; absent before the first send and
    /// once the campaign is no longer sending.
    pub estimated_remaining_seconds: Option<i64>,
}

impl Engine {
    // -----------------------------------------------------------------------
    // Creation & start
    // -----------------------------------------------------------------------

    /// Create a draft campaign with its recipient list staged.
    pub async fn create_campaign(&self, input: CreateCampaign) -> EngineResult<Campaign> {
        if input.recipients.is_empty() {
            return Err(CoreError::Validation(
                "Campaign must have at least one recipient".to_string(),
            )
            .into());
        }
        if input.instance_ids.is_empty() {
            return Err(CoreError::Validation(
                "Campaign must select at least one instance".to_string(),
            )
            .into());
        }
        let mut deduped = input.instance_ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        if deduped.len() != input.instance_ids.len() {
            return Err(CoreError::Validation(
                "Campaign instance selection contains duplicates".to_string(),
            )
            .into());
        }
        if SendingMode::parse(&input.sending_mode).is_none() {
            return Err(CoreError::Validation(format!(
                "Unknown sending mode: '{}'",
                input.sending_mode
            ))
            .into());
        }
        self.fetch_all_instances(&input.instance_ids).await?;

        let recipients_json = serde_json::to_value(&input.recipients).map_err(|e| {
            CoreError::Internal(format!("Failed to serialize recipients: {e}"))
        })?;
        let campaign = CampaignRepo::create(&self.pool, &input, &recipients_json).await?;

        tracing::info!(
            campaign_id = campaign.id,
            total_contacts = campaign.total_contacts,
            mode = %campaign.sending_mode,
            "Campaign created"
        );
        Ok(campaign)
    }

    /// Start a draft campaign: plan every assignment, materialize the
    /// message rows, and move to `sending`.
    ///
    /// Starting a campaign that is already sending (or otherwise past
    /// draft) is rejected before any message row is written.
    pub async fn start_campaign(&self, campaign_id: DbId) -> EngineResult<Campaign> {
        let campaign = self.fetch_campaign(campaign_id).await?;
        let status = parse_campaign_status(&campaign)?;
        status.validate_transition(CampaignStatus::Sending)?;

        let instances = self.fetch_all_instances(&campaign.instance_ids).await?;

        // The operator selected connected instances; verify that still
        // holds before committing the plan.
        let mut disconnected = Vec::new();
        for instance in &instances {
            if !is_connected_quietly(
                self.gateway.as_ref(),
                self.config.gateway_timeout,
                instance.id,
            )
            .await
            {
                disconnected.push(instance.id);
            }
        }
        if !disconnected.is_empty() {
            return Err(CoreError::Validation(format!(
                "Selected instances are not connected: {disconnected:?}"
            ))
            .into());
        }

        let recipients: Vec<CampaignRecipient> =
            serde_json::from_value(campaign.recipients.clone()).map_err(|e| {
                CoreError::Internal(format!(
                    "Campaign {campaign_id} has a corrupted recipient list: {e}"
                ))
            })?;
        let mode = parse_sending_mode(&campaign)?;
        let weights: Vec<InstanceWeight> = instances
            .iter()
            .map(|i| InstanceWeight {
                instance_id: i.id,
                warming_level: i.warming_level,
            })
            .collect();

        let assignments = {
            let mut rng = self.rng.lock().await;
            plan_assignments(recipients.len(), &weights, mode, &mut *rng)?
        };

        // Win the start race before writing any message row; the loser sees
        // None here and nothing else happens.
        let started = CampaignRepo::mark_sending(&self.pool, campaign_id)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict(format!("Campaign {campaign_id} was already started"))
            })?;

        if let Err(e) =
            CampaignMessageRepo::bulk_insert(&self.pool, campaign_id, &recipients, &assignments)
                .await
        {
            tracing::error!(campaign_id, error = %e, "Failed to materialize campaign messages");
            // Best effort: leave the campaign in a terminal failed state
            // rather than stuck in sending with no messages.
            let _ = CampaignRepo::mark_failed(&self.pool, campaign_id).await;
            return Err(e.into());
        }

        tracing::info!(
            campaign_id,
            recipients = recipients.len(),
            instances = instances.len(),
            mode = mode.as_str(),
            "Campaign started"
        );
        self.events.publish(
            PlatformEvent::new("campaign.started")
                .with_source("campaign", campaign_id)
                .with_payload(serde_json::json!({
                    "total_contacts": started.total_contacts,
                    "sending_mode": started.sending_mode,
                })),
        );
        Ok(started)
    }

    /// Cancel a draft or sending campaign.
    ///
    /// Assignments are not revisited: in-flight sends may still report
    /// results, but queued messages stay queued forever.
    pub async fn cancel_campaign(&self, campaign_id: DbId) -> EngineResult<Campaign> {
        match CampaignRepo::cancel(&self.pool, campaign_id).await? {
            Some(campaign) => {
                tracing::info!(campaign_id, "Campaign cancelled");
                self.events.publish(
                    PlatformEvent::new("campaign.cancelled").with_source("campaign", campaign_id),
                );
                Ok(campaign)
            }
            None => {
                let campaign = self.fetch_campaign(campaign_id).await?;
                Err(CoreError::Conflict(format!(
                    "Campaign {campaign_id} is {} and cannot be cancelled",
                    campaign.status
                ))
                .into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Result ingestion & progress
    // -----------------------------------------------------------------------

    /// Record one message status transition reported by the send pipeline
    /// and fold it into the campaign counters.
    pub async fn record_message_result(
        &self,
        campaign_id: DbId,
        message_id: DbId,
        new_status: MessageStatus,
        error_message: Option<String>,
    ) -> EngineResult<CampaignMessage> {
        let message = CampaignMessageRepo::find_by_id(&self.pool, message_id)
            .await?
            .filter(|m| m.campaign_id == campaign_id)
            .ok_or(CoreError::NotFound {
                entity: "CampaignMessage",
                id: message_id,
            })?;

        let from = MessageStatus::parse(&message.status).ok_or_else(|| {
            CoreError::Internal(format!(
                "Message {message_id} has unknown status '{}'",
                message.status
            ))
        })?;
        from.validate_transition(new_status)?;

        let updated = CampaignMessageRepo::transition(
            &self.pool,
            message_id,
            from,
            new_status,
            error_message.as_deref(),
        )
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!(
                "Message {message_id} was updated concurrently"
            ))
        })?;

        let (d_sent, d_delivered, d_failed) = match new_status {
            MessageStatus::Sent => (1, 0, 0),
            MessageStatus::Delivered => (0, 1, 0),
            MessageStatus::Failed => (0, 0, 1),
            MessageStatus::Queued | MessageStatus::Sending => (0, 0, 0),
        };

        if (d_sent, d_delivered, d_failed) != (0, 0, 0) {
            let campaign =
                CampaignRepo::apply_result_deltas(&self.pool, campaign_id, d_sent, d_delivered, d_failed)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: "Campaign",
                        id: campaign_id,
                    })?;

            if is_send_complete(
                campaign.sent as i64,
                campaign.failed as i64,
                campaign.total_contacts as i64,
            ) {
                if let Some(completed) =
                    CampaignRepo::complete_if_done(&self.pool, campaign_id).await?
                {
                    tracing::info!(
                        campaign_id,
                        sent = completed.sent,
                        failed = completed.failed,
                        "Campaign completed"
                    );
                    self.events.publish(
                        PlatformEvent::new("campaign.completed")
                            .with_source("campaign", campaign_id)
                            .with_payload(serde_json::json!({
                                "sent": completed.sent,
                                "failed": completed.failed,
                            })),
                    );
                }
            }
        }

        Ok(updated)
    }

    /// Live progress snapshot for the polling UI.
    pub async fn campaign_progress(&self, campaign_id: DbId) -> EngineResult<CampaignProgress> {
        let campaign = self.fetch_campaign(campaign_id).await?;
        let status = parse_campaign_status(&campaign)?;

        let elapsed_seconds = campaign.started_at.map(|started| {
            let end = campaign.completed_at.unwrap_or_else(Utc::now);
            (end - started).num_seconds()
        });

        let estimated_remaining_seconds = match (status, elapsed_seconds) {
            (CampaignStatus::Sending, Some(elapsed)) => estimated_remaining_seconds(
                campaign.total_contacts as i64,
                campaign.sent as i64,
                elapsed,
            ),
            _ => None,
        };

        Ok(CampaignProgress {
            campaign_id: campaign.id,
            status: campaign.status.clone(),
            total_contacts: campaign.total_contacts,
            sent: campaign.sent,
            delivered: campaign.delivered,
            failed: campaign.failed,
            progress_percent: progress_percent(
                campaign.sent as i64,
                campaign.total_contacts as i64,
            ),
            elapsed_seconds,
            estimated_remaining_seconds,
        })
    }

    /// Failed messages with their per-recipient failure reasons.
    pub async fn failed_messages(
        &self,
        campaign_id: DbId,
    ) -> EngineResult<Vec<CampaignMessage>> {
        self.fetch_campaign(campaign_id).await?;
        Ok(CampaignMessageRepo::list_failed(&self.pool, campaign_id).await?)
    }

    /// Expected per-instance traffic shares for a mode, without planning.
    pub async fn preview_distribution(
        &self,
        instance_ids: &[DbId],
        mode: SendingMode,
    ) -> EngineResult<Vec<InstanceShare>> {
        let instances = self.fetch_all_instances(instance_ids).await?;
        let weights: Vec<InstanceWeight> = instances
            .iter()
            .map(|i| InstanceWeight {
                instance_id: i.id,
                warming_level: i.warming_level,
            })
            .collect();
        Ok(expected_shares(&weights, mode))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn fetch_campaign(&self, campaign_id: DbId) -> EngineResult<Campaign> {
        Ok(CampaignRepo::find_by_id(&self.pool, campaign_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Campaign",
                id: campaign_id,
            })?)
    }

    /// Fetch the selected instances, failing if any id is unknown.
    async fn fetch_all_instances(
        &self,
        instance_ids: &[DbId],
    ) -> EngineResult<Vec<SendingInstance>> {
        let instances = InstanceRepo::find_by_ids(&self.pool, instance_ids).await?;
        let found: Vec<DbId> = instances.iter().map(|i| i.id).collect();
        let missing: Vec<DbId> = instance_ids
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "Unknown instances: {missing:?}"
            ))
            .into());
        }
        if instances.len() != instance_ids.len() {
            return Err(CoreError::Validation(
                "Instance selection contains duplicates".to_string(),
            )
            .into());
        }
        Ok(instances)
    }
}

fn parse_campaign_status(campaign: &Campaign) -> Result<CampaignStatus, CoreError> {
    CampaignStatus::parse(&campaign.status).ok_or_else(|| {
        CoreError::Internal(format!(
            "Campaign {} has unknown status '{}'",
            campaign.id, campaign.status
        ))
    })
}

fn parse_sending_mode(campaign: &Campaign) -> Result<SendingMode, CoreError> {
    SendingMode::parse(&campaign.sending_mode).ok_or_else(|| {
        CoreError::Internal(format!(
            "Campaign {} has unknown sending mode '{}'",
            campaign.id, campaign.sending_mode
        ))
    })
}

//! Campaign and campaign-message status machines plus progress math.
//!
//! A campaign is a bulk send job with one message row per recipient. The
//! external send pipeline reports per-message transitions; the aggregator
//! maintains running counts and derives progress/ETA from them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Campaign status
// ---------------------------------------------------------------------------

/// Lifecycle state of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Sending,
    Completed,
    Cancelled,
    Failed,
}

impl CampaignStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sending => "sending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sending" => Some(Self::Sending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Valid target states reachable from this state.
    ///
    /// Terminal states (completed, cancelled, failed) return an empty slice.
    pub fn valid_transitions(self) -> &'static [CampaignStatus] {
        match self {
            Self::Draft => &[Self::Sending, Self::Cancelled],
            Self::Sending => &[Self::Completed, Self::Cancelled, Self::Failed],
            Self::Completed | Self::Cancelled | Self::Failed => &[],
        }
    }

    pub fn can_transition(self, to: CampaignStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    /// Validate a transition, returning a descriptive conflict error.
    pub fn validate_transition(self, to: CampaignStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Invalid campaign transition: {} -> {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Message status
// ---------------------------------------------------------------------------

/// Delivery state of one campaign message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Queued,
    Sending,
    Sent,
    Delivered,
    Failed,
}

impl MessageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(Self::Queued),
            "sending" => Some(Self::Sending),
            "sent" => Some(Self::Sent),
            "delivered" => Some(Self::Delivered),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Valid target states. The pipeline may skip the transient `sending`
    /// state and report `queued -> sent` directly; `sent -> delivered`
    /// depends on whether the gateway emits delivery receipts.
    pub fn valid_transitions(self) -> &'static [MessageStatus] {
        match self {
            Self::Queued => &[Self::Sending, Self::Sent, Self::Failed],
            Self::Sending => &[Self::Sent, Self::Failed],
            Self::Sent => &[Self::Delivered],
            Self::Delivered | Self::Failed => &[],
        }
    }

    pub fn can_transition(self, to: MessageStatus) -> bool {
        self.valid_transitions().contains(&to)
    }

    pub fn validate_transition(self, to: MessageStatus) -> Result<(), CoreError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(CoreError::Conflict(format!(
                "Invalid message transition: {} -> {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Progress math
// ---------------------------------------------------------------------------

/// Overall progress as a rounded percentage of `sent` over `total`.
///
/// Failures do not count toward progress; a campaign whose sends all fail
/// reports 0% even though it terminates.
pub fn progress_percent(sent: i64, total_contacts: i64) -> i32 {
    if total_contacts <= 0 {
        return 0;
    }
    (100.0 * sent as f64 / total_contacts as f64).round() as i32
}

/// Estimated seconds remaining, extrapolated from the send rate so far.
///
/// Undefined (None) before the first successful send to avoid division by
/// zero. Computed from `sent` only, never `sent + failed`.
pub fn estimated_remaining_seconds(
    total_contacts: i64,
    sent: i64,
    elapsed_seconds: i64,
) -> Option<i64> {
    if sent <= 0 {
        return None;
    }
    let remaining = (total_contacts - sent).max(0);
    Some((remaining as f64 / sent as f64 * elapsed_seconds as f64).round() as i64)
}

/// Whether every message has reached a terminal send outcome.
pub fn is_send_complete(sent: i64, failed: i64, total_contacts: i64) -> bool {
    total_contacts > 0 && sent + failed >= total_contacts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- campaign transitions --

    #[test]
    fn draft_can_start_sending() {
        assert!(CampaignStatus::Draft.can_transition(CampaignStatus::Sending));
    }

    #[test]
    fn sending_cannot_restart() {
        assert!(!CampaignStatus::Sending.can_transition(CampaignStatus::Sending));
        let err = CampaignStatus::Sending
            .validate_transition(CampaignStatus::Sending)
            .unwrap_err();
        assert!(err.to_string().contains("sending -> sending"));
    }

    #[test]
    fn sending_can_complete_cancel_or_fail() {
        assert!(CampaignStatus::Sending.can_transition(CampaignStatus::Completed));
        assert!(CampaignStatus::Sending.can_transition(CampaignStatus::Cancelled));
        assert!(CampaignStatus::Sending.can_transition(CampaignStatus::Failed));
    }

    #[test]
    fn terminal_campaign_states_have_no_transitions() {
        assert!(CampaignStatus::Completed.valid_transitions().is_empty());
        assert!(CampaignStatus::Cancelled.valid_transitions().is_empty());
        assert!(CampaignStatus::Failed.valid_transitions().is_empty());
    }

    #[test]
    fn completed_cannot_go_back_to_sending() {
        assert!(!CampaignStatus::Completed.can_transition(CampaignStatus::Sending));
    }

    // -- message transitions --

    #[test]
    fn queued_can_skip_straight_to_sent() {
        assert!(MessageStatus::Queued.can_transition(MessageStatus::Sent));
    }

    #[test]
    fn sent_can_be_delivered() {
        assert!(MessageStatus::Sent.can_transition(MessageStatus::Delivered));
    }

    #[test]
    fn failed_message_is_terminal() {
        assert!(MessageStatus::Failed.valid_transitions().is_empty());
    }

    #[test]
    fn delivered_message_is_terminal() {
        assert!(MessageStatus::Delivered.valid_transitions().is_empty());
    }

    #[test]
    fn sent_cannot_fail_afterwards() {
        assert!(!MessageStatus::Sent.can_transition(MessageStatus::Failed));
    }

    // -- status string forms --

    #[test]
    fn statuses_round_trip_through_string_form() {
        for s in [
            CampaignStatus::Draft,
            CampaignStatus::Sending,
            CampaignStatus::Completed,
            CampaignStatus::Cancelled,
            CampaignStatus::Failed,
        ] {
            assert_eq!(CampaignStatus::parse(s.as_str()), Some(s));
        }
        for s in [
            MessageStatus::Queued,
            MessageStatus::Sending,
            MessageStatus::Sent,
            MessageStatus::Delivered,
            MessageStatus::Failed,
        ] {
            assert_eq!(MessageStatus::parse(s.as_str()), Some(s));
        }
    }

    // -- progress math --

    #[test]
    fn progress_counts_sent_only() {
        // 40 sent + 5 failed out of 100: progress is 40, not 45.
        assert_eq!(progress_percent(40, 100), 40);
    }

    #[test]
    fn progress_with_zero_total_is_zero() {
        assert_eq!(progress_percent(0, 0), 0);
    }

    #[test]
    fn progress_rounds_to_nearest() {
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
    }

    #[test]
    fn eta_undefined_before_first_send() {
        assert_eq!(estimated_remaining_seconds(100, 0, 60), None);
    }

    #[test]
    fn eta_extrapolates_from_sent_rate() {
        // 40 sent in 80s -> 2s per message -> 60 remaining -> 120s.
        assert_eq!(estimated_remaining_seconds(100, 40, 80), Some(120));
    }

    #[test]
    fn eta_ignores_failures() {
        // Failures neither speed up nor slow down the estimate: only `sent`
        // enters the computation, so the caller passes sent = 40 regardless
        // of how many failed.
        assert_eq!(estimated_remaining_seconds(100, 40, 80), Some(120));
    }

    #[test]
    fn eta_zero_when_everything_sent() {
        assert_eq!(estimated_remaining_seconds(100, 100, 200), Some(0));
    }

    #[test]
    fn send_complete_requires_full_coverage() {
        assert!(is_send_complete(95, 5, 100));
        assert!(is_send_complete(100, 0, 100));
        assert!(!is_send_complete(94, 5, 100));
        assert!(!is_send_complete(0, 0, 0));
    }
}

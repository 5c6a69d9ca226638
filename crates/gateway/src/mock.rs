//! In-memory mock gateway for deterministic testing.
//!
//! Connectivity and bound identities are injected per instance; sends are
//! captured for assertion. An optional failure message makes every
//! subsequent send fail, exercising the engine's failed-attempt path.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use warmline_core::progression::ContentType;
use warmline_core::types::DbId;

use crate::{GatewayError, MessageGateway, OutboundContent, SendOutcome};

/// One captured send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub instance_id: DbId,
    pub phone: String,
    pub content_type: ContentType,
}

#[derive(Default)]
struct MockState {
    connected: HashSet<DbId>,
    identities: HashMap<DbId, String>,
    send_failure: Option<String>,
    sent: Vec<SentMessage>,
}

/// A scriptable [`MessageGateway`] for tests.
#[derive(Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an instance as connected with the given bound phone identity.
    pub async fn connect(&self, instance_id: DbId, phone: &str) {
        let mut state = self.state.lock().await;
        state.connected.insert(instance_id);
        state.identities.insert(instance_id, phone.to_string());
    }

    /// Mark an instance as disconnected.
    pub async fn disconnect(&self, instance_id: DbId) {
        let mut state = self.state.lock().await;
        state.connected.remove(&instance_id);
        state.identities.remove(&instance_id);
    }

    /// Make every subsequent send fail with `error`.
    pub async fn fail_sends(&self, error: &str) {
        self.state.lock().await.send_failure = Some(error.to_string());
    }

    /// Restore successful sends.
    pub async fn succeed_sends(&self) {
        self.state.lock().await.send_failure = None;
    }

    /// All sends captured so far, in order.
    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.state.lock().await.sent.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.state.lock().await.sent.len()
    }
}

#[async_trait]
impl MessageGateway for MockGateway {
    async fn is_connected(&self, instance_id: DbId) -> Result<bool, GatewayError> {
        Ok(self.state.lock().await.connected.contains(&instance_id))
    }

    async fn bound_phone_identity(
        &self,
        instance_id: DbId,
    ) -> Result<Option<String>, GatewayError> {
        Ok(self.state.lock().await.identities.get(&instance_id).cloned())
    }

    async fn send_message(
        &self,
        instance_id: DbId,
        phone: &str,
        content: &OutboundContent,
    ) -> Result<SendOutcome, GatewayError> {
        let mut state = self.state.lock().await;

        if let Some(error) = &state.send_failure {
            return Ok(SendOutcome {
                success: false,
                message_id: None,
                error: Some(error.clone()),
            });
        }

        state.sent.push(SentMessage {
            instance_id,
            phone: phone.to_string(),
            content_type: content.content_type,
        });
        let message_id = format!("mock-{}", state.sent.len());

        Ok(SendOutcome {
            success: true,
            message_id: Some(message_id),
            error: None,
        })
    }
}

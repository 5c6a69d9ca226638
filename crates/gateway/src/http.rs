//! HTTP client implementation of [`MessageGateway`].
//!
//! Talks to the gateway service's REST surface. Every request carries the
//! configured timeout; a timed-out call surfaces as a
//! [`GatewayError::Request`] and is treated by the engine as a failed
//! attempt, never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use warmline_core::types::DbId;

use crate::{GatewayError, MessageGateway, OutboundContent, SendOutcome};

/// Response body of `GET /instances/{id}/connection`.
#[derive(Debug, Deserialize)]
struct ConnectionStatus {
    connected: bool,
}

/// Response body of `GET /instances/{id}/identity`.
#[derive(Debug, Deserialize)]
struct BoundIdentity {
    phone: Option<String>,
}

/// HTTP client for the external messaging gateway.
pub struct HttpGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpGateway {
    /// Build a client for the gateway at `base_url` with a per-request
    /// timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl MessageGateway for HttpGateway {
    async fn is_connected(&self, instance_id: DbId) -> Result<bool, GatewayError> {
        let url = self.url(&format!("/instances/{instance_id}/connection"));
        let status: ConnectionStatus = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::Response(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::Response(e.to_string()))?;
        Ok(status.connected)
    }

    async fn bound_phone_identity(
        &self,
        instance_id: DbId,
    ) -> Result<Option<String>, GatewayError> {
        let url = self.url(&format!("/instances/{instance_id}/identity"));
        let identity: BoundIdentity = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::Response(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::Response(e.to_string()))?;
        Ok(identity.phone)
    }

    async fn send_message(
        &self,
        instance_id: DbId,
        phone: &str,
        content: &OutboundContent,
    ) -> Result<SendOutcome, GatewayError> {
        let url = self.url(&format!("/instances/{instance_id}/messages"));

        // Client-generated reference so the gateway can deduplicate if the
        // response is lost after the send went through.
        let client_ref = uuid::Uuid::new_v4().to_string();

        let body = serde_json::json!({
            "to": phone,
            "client_ref": client_ref,
            "content_type": content.content_type,
            "body": content.body,
            "media_url": content.media_url,
        });

        let outcome: SendOutcome = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| GatewayError::Response(e.to_string()))?
            .json()
            .await
            .map_err(|e| GatewayError::Response(e.to_string()))?;

        tracing::debug!(
            instance_id,
            to = %phone,
            success = outcome.success,
            "Gateway send completed"
        );

        Ok(outcome)
    }
}

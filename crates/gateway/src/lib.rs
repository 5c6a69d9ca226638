//! Abstraction over the external messaging network gateway.
//!
//! The scheduler never speaks the messaging protocol itself; everything
//! goes through [`MessageGateway`]: connectivity checks, bound phone
//! identity lookups, and message sends. The production implementation is
//! [`HttpGateway`]; tests drive the engine with [`mock::MockGateway`].

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use warmline_core::progression::ContentType;
use warmline_core::types::DbId;

pub use http::HttpGateway;

/// Errors from the gateway transport.
///
/// The engine treats any gateway error as a failed attempt: logged, never
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request could not be performed (connection refused, timeout at
    /// the HTTP layer, etc.).
    #[error("Gateway request failed: {0}")]
    Request(String),

    /// The gateway answered with something we could not interpret.
    #[error("Unexpected gateway response: {0}")]
    Response(String),
}

/// Content payload for an outbound message.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundContent {
    pub content_type: ContentType,
    /// Inline text, when the content is textual.
    pub body: Option<String>,
    /// Media reference, for image/audio/video content.
    pub media_url: Option<String>,
}

/// Result of a send attempt as reported by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct SendOutcome {
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

/// Capabilities the external messaging gateway provides to this core.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Whether the instance currently holds a live connected session.
    async fn is_connected(&self, instance_id: DbId) -> Result<bool, GatewayError>;

    /// The phone identity currently bound to the instance's session.
    ///
    /// Only meaningful while the instance is connected; disconnected
    /// instances report `None`.
    async fn bound_phone_identity(
        &self,
        instance_id: DbId,
    ) -> Result<Option<String>, GatewayError>;

    /// Send one message from the instance to `phone`.
    async fn send_message(
        &self,
        instance_id: DbId,
        phone: &str,
        content: &OutboundContent,
    ) -> Result<SendOutcome, GatewayError>;
}

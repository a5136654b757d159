pub mod discord;

use async_trait::async_trait;
use thiserror::Error;

/// A message received from the chat platform
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Platform-specific user ID as string
    pub author_id: String,
    /// Display tag of the author (e.g. "alice" or "alice#1234")
    pub author_name: String,
    /// Avatar URL shown next to the author name on the reposted card
    pub author_avatar_url: Option<String>,
    /// The message text
    pub content: String,
    /// Platform-specific channel ID as string
    pub channel_id: String,
    /// Platform-specific message ID as string
    pub message_id: String,
    /// Whether the sender is a bot or other automated account
    pub is_bot: bool,
}

/// Rich card shown in place of a deleted message
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedCard {
    pub description: String,
    pub color: u32,
    pub author_name: String,
    pub author_icon_url: Option<String>,
}

/// Content of a single send request
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingMessage {
    Text(String),
    Embed(EmbedCard),
}

/// Capability a request needed but the bot did not have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageMessages,
    SendMessages,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::ManageMessages => write!(f, "Manage Messages"),
            Capability::SendMessages => write!(f, "Send Messages"),
        }
    }
}

/// Failure of a gateway request, classified by the platform adapter
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("missing '{0}' permission")]
    MissingPermission(Capability),
    #[error("message not found")]
    MessageNotFound,
    #[error("{0}")]
    Other(String),
}

/// Requests the relay issues against the chat platform
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn delete_message(&self, channel_id: &str, message_id: &str)
        -> Result<(), GatewayError>;

    async fn send_message(
        &self,
        channel_id: &str,
        message: OutgoingMessage,
    ) -> Result<(), GatewayError>;

    /// Human-readable channel name for log lines, if it can be resolved
    async fn channel_name(&self, _channel_id: &str) -> Option<String> {
        None
    }
}

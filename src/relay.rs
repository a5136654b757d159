use tracing::{debug, error, info, warn};

use crate::config::RelayConfig;
use crate::links::{self, LinkMatch};
use crate::platform::{ChatGateway, EmbedCard, GatewayError, InboundMessage, OutgoingMessage};

/// Which branch `LinkRelayHandler::handle` took for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Sent by a bot; never touched
    Ignored,
    /// No rewritable link in the text
    NoLinks,
    /// Replacement posted. `original_deleted` is false when the delete request failed.
    Relayed { links: usize, original_deleted: bool },
    /// The replacement could not be posted, or the original vanished before deletion
    Failed,
}

/// Replacement content for one message: the original text on a card, then the muted link line.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteResult {
    pub card: EmbedCard,
    pub link_line: String,
}

impl RewriteResult {
    pub fn compose(message: &InboundMessage, links: &[LinkMatch], color: u32) -> Self {
        let rewritten: Vec<String> = links
            .iter()
            .map(|link| format!("[.]({})", link.rewritten()))
            .collect();

        Self {
            card: EmbedCard {
                description: message.content.clone(),
                color,
                author_name: message.author_name.clone(),
                author_icon_url: message.author_avatar_url.clone(),
            },
            link_line: format!("-# {}", rewritten.join(" ")),
        }
    }

    /// Send requests in the order they must be issued
    pub fn into_messages(self) -> [OutgoingMessage; 2] {
        [
            OutgoingMessage::Embed(self.card),
            OutgoingMessage::Text(self.link_line),
        ]
    }
}

/// Per-message handler: detect supported links, delete the original, repost it fixed.
pub struct LinkRelayHandler {
    embed_color: u32,
    apology: bool,
}

impl LinkRelayHandler {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            embed_color: config.embed_color_value(),
            apology: config.apology,
        }
    }

    /// Process one inbound message. Every failure is logged here; nothing propagates.
    pub async fn handle(&self, gateway: &dyn ChatGateway, message: &InboundMessage) -> RelayOutcome {
        if message.is_bot {
            return RelayOutcome::Ignored;
        }

        if !links::mentions_supported_domain(&message.content) {
            return RelayOutcome::NoLinks;
        }

        let found = links::find_links(&message.content);
        if found.is_empty() {
            debug!(
                "Message {} from {} mentions a supported domain but has no rewritable link",
                message.message_id, message.author_name
            );
            return RelayOutcome::NoLinks;
        }

        info!(
            "Rewriting {} link(s) in message {} from {}",
            found.len(),
            message.message_id,
            message.author_name
        );
        for link in &found {
            debug!("  [{}] {} -> {}", link.platform, link.matched, link.rewritten());
        }

        let rewrite = RewriteResult::compose(message, &found, self.embed_color);

        let original_deleted = match gateway
            .delete_message(&message.channel_id, &message.message_id)
            .await
        {
            Ok(()) => true,
            Err(GatewayError::MessageNotFound) => {
                self.log_failure(gateway, message, "delete", &GatewayError::MessageNotFound)
                    .await;
                return RelayOutcome::Failed;
            }
            Err(e) => {
                // Still repost so the fixed link is not lost
                self.log_failure(gateway, message, "delete", &e).await;
                false
            }
        };

        for outgoing in rewrite.into_messages() {
            if let Err(e) = gateway.send_message(&message.channel_id, outgoing).await {
                self.log_failure(gateway, message, "send", &e).await;
                if matches!(e, GatewayError::Other(_)) {
                    self.apologize(gateway, message).await;
                }
                return RelayOutcome::Failed;
            }
        }

        info!(
            "Relayed message {} from {} in channel {}",
            message.message_id, message.author_name, message.channel_id
        );

        RelayOutcome::Relayed {
            links: found.len(),
            original_deleted,
        }
    }

    async fn log_failure(
        &self,
        gateway: &dyn ChatGateway,
        message: &InboundMessage,
        step: &str,
        err: &GatewayError,
    ) {
        let channel = match gateway.channel_name(&message.channel_id).await {
            Some(name) => format!("#{} (ID: {})", name, message.channel_id),
            None => format!("ID: {}", message.channel_id),
        };

        match err {
            GatewayError::MissingPermission(capability) => warn!(
                "Permission error during {}: missing '{}' in channel {} (message {}, author {})",
                step, capability, channel, message.message_id, message.author_name
            ),
            GatewayError::MessageNotFound => warn!(
                "Message {} in channel {} was already gone before it could be deleted (author {})",
                message.message_id, channel, message.author_name
            ),
            GatewayError::Other(detail) => error!(
                "Failed during {} for message {} from {} in channel {}: {}",
                step, message.message_id, message.author_name, channel, detail
            ),
        }
    }

    /// Best-effort notice to the author; its own failure is swallowed.
    async fn apologize(&self, gateway: &dyn ChatGateway, message: &InboundMessage) {
        if !self.apology {
            return;
        }

        let notice = OutgoingMessage::Text(apology_text(&message.author_id));
        if let Err(e) = gateway.send_message(&message.channel_id, notice).await {
            debug!("Apology to {} not delivered: {}", message.author_name, e);
        }
    }
}

fn apology_text(author_id: &str) -> String {
    format!("Sorry <@{}>, I couldn't fix your link.", author_id)
}

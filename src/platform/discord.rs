use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::builder::{CreateEmbed, CreateEmbedAuthor, CreateMessage};
use serenity::client::{Client, Context, EventHandler};
use serenity::http::{Http, HttpError};
use serenity::model::channel::Message;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::{ChannelId, MessageId};
use serenity::model::ModelError;
use serenity::Error as SerenityError;
use tracing::{debug, info};

use crate::platform::{Capability, ChatGateway, GatewayError, InboundMessage, OutgoingMessage};
use crate::relay::LinkRelayHandler;

/// Discord JSON error code: Missing Permissions
const MISSING_PERMISSIONS: isize = 50013;
/// Discord JSON error code: Unknown Message
const UNKNOWN_MESSAGE: isize = 10008;

/// Map a Discord JSON error code to the relay's error kinds
fn classify_code(code: isize, capability: Capability) -> Option<GatewayError> {
    match code {
        MISSING_PERMISSIONS => Some(GatewayError::MissingPermission(capability)),
        UNKNOWN_MESSAGE => Some(GatewayError::MessageNotFound),
        _ => None,
    }
}

/// `capability` is what the failed request needed, reported on permission errors.
fn classify(err: SerenityError, capability: Capability) -> GatewayError {
    let known = match &err {
        SerenityError::Http(HttpError::UnsuccessfulRequest(response)) => {
            classify_code(response.error.code, capability)
        }
        // Raised locally by serenity's cache-based permission checks
        SerenityError::Model(ModelError::InvalidPermissions { .. }) => {
            Some(GatewayError::MissingPermission(capability))
        }
        _ => None,
    };

    known.unwrap_or_else(|| GatewayError::Other(err.to_string()))
}

/// Snowflakes arrive as strings from the platform-agnostic layer; zero is never a valid id.
fn parse_id(raw: &str) -> Result<u64, GatewayError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| GatewayError::Other(format!("invalid Discord id: {:?}", raw)))
}

fn build_message(message: OutgoingMessage) -> CreateMessage {
    match message {
        OutgoingMessage::Text(text) => CreateMessage::new().content(text),
        OutgoingMessage::Embed(card) => {
            let mut author = CreateEmbedAuthor::new(card.author_name);
            if let Some(icon) = card.author_icon_url {
                author = author.icon_url(icon);
            }
            let embed = CreateEmbed::new()
                .description(card.description)
                .colour(card.color)
                .author(author);
            CreateMessage::new().embed(embed)
        }
    }
}

fn to_inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        author_id: msg.author.id.get().to_string(),
        author_name: msg.author.tag(),
        author_avatar_url: Some(msg.author.face()),
        content: msg.content.clone(),
        channel_id: msg.channel_id.get().to_string(),
        message_id: msg.id.get().to_string(),
        is_bot: msg.author.bot || msg.webhook_id.is_some(),
    }
}

/// Discord REST requests behind the `ChatGateway` seam
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatGateway for DiscordGateway {
    async fn delete_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), GatewayError> {
        let channel = ChannelId::new(parse_id(channel_id)?);
        let message = MessageId::new(parse_id(message_id)?);
        channel
            .delete_message(&*self.http, message)
            .await
            .map_err(|e| classify(e, Capability::ManageMessages))
    }

    async fn send_message(
        &self,
        channel_id: &str,
        message: OutgoingMessage,
    ) -> Result<(), GatewayError> {
        let channel = ChannelId::new(parse_id(channel_id)?);
        channel
            .send_message(&*self.http, build_message(message))
            .await
            .map(|_| ())
            .map_err(|e| classify(e, Capability::SendMessages))
    }

    async fn channel_name(&self, channel_id: &str) -> Option<String> {
        let channel = ChannelId::new(parse_id(channel_id).ok()?);
        let resolved = channel.to_channel(&*self.http).await.ok()?;
        resolved.guild().map(|c| c.name)
    }
}

struct Handler {
    relay: LinkRelayHandler,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("Ready! Logged in as {}", ready.user.name);
        info!("Bot is in {} server(s)", ready.guilds.len());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let gateway = DiscordGateway::new(ctx.http.clone());
        let outcome = self.relay.handle(&gateway, &to_inbound(&msg)).await;
        debug!("Message {} handled: {:?}", msg.id, outcome);
    }
}

/// Log in and run the Discord gateway until Ctrl-C or a fatal client error.
pub async fn run(token: &str, relay: LinkRelayHandler) -> Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler { relay })
        .await
        .context("Failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutting down Discord gateway...");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting Discord platform...");
    client
        .start()
        .await
        .context("Failed to log in to Discord")?;

    info!("Discord gateway closed");
    Ok(())
}

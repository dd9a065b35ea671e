//! Discord adapter (serenity REST client).
//!
//! This crate implements the `mgmt-core` ChatPlatform port over serenity's
//! `Http`, which also owns Discord's per-route ratelimits and 429 retries.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use serenity::http::{Http, MessagePagination};
use serenity::model::channel::{Channel as DiscordChannel, GuildChannel};
use serenity::model::id;
use tracing::debug;

pub mod convert;
pub mod permissions;

use mgmt_core::{
    domain::{Channel, ChannelId, Message, MessageId, UserId},
    errors::Error,
    permissions::Permissions,
    platform::{ChatPlatform, HistoryQuery},
    Result,
};

/// Discord accepts between 2 and 100 ids per bulk delete.
const BULK_DELETE_MAX: usize = 100;

/// Discord caps a history page at 100 messages.
const PAGE_MAX: usize = 100;

#[derive(Clone)]
pub struct DiscordClient {
    http: Arc<Http>,
}

impl DiscordClient {
    /// Serenity prefixes the token with `Bot ` and keeps one ratelimiter per client.
    pub fn new(token: &str) -> Self {
        Self {
            http: Arc::new(Http::new(token.trim())),
        }
    }

    async fn fetch_channel(&self, channel_id: id::ChannelId) -> Result<DiscordChannel> {
        debug!(%channel_id, "discord get channel");
        self.http
            .get_channel(channel_id)
            .await
            .map_err(discord_error("get channel"))
    }

    async fn guild_channel(&self, channel_id: id::ChannelId) -> Result<GuildChannel> {
        match self.fetch_channel(channel_id).await? {
            DiscordChannel::Guild(channel) => Ok(channel),
            _ => Err(Error::Platform(format!("channel {channel_id} is not a guild channel"))),
        }
    }
}

fn discord_error(action: &'static str) -> impl Fn(serenity::Error) -> Error {
    move |e| Error::Platform(format!("discord {action} failed: {e}"))
}

/// One delete call against the Discord API.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Batch {
    Single(id::MessageId),
    Bulk(Vec<id::MessageId>),
}

/// Split ids into bulk-delete calls; a lone id is deleted on its own.
fn batches(ids: &[id::MessageId]) -> Vec<Batch> {
    ids.chunks(BULK_DELETE_MAX)
        .map(|chunk| match chunk {
            [only] => Batch::Single(*only),
            _ => Batch::Bulk(chunk.to_vec()),
        })
        .collect()
}

#[async_trait]
impl ChatPlatform for DiscordClient {
    async fn channel(&self, channel_id: &ChannelId) -> Result<Channel> {
        let channel = self.fetch_channel(convert::channel_id(channel_id)?).await?;
        convert::channel(&channel)
    }

    /// Discord only honours one of `before`/`after`; `after` wins so the
    /// cleanup walks forward toward the channel's last message.
    async fn channel_messages(
        &self,
        channel_id: &ChannelId,
        query: &HistoryQuery,
    ) -> Result<Vec<Message>> {
        let target = if !query.after.is_empty() {
            Some(MessagePagination::After(convert::cursor_id(&query.after)?))
        } else if !query.before.is_empty() {
            Some(MessagePagination::Before(convert::cursor_id(&query.before)?))
        } else {
            None
        };
        let limit = u8::try_from(query.limit.clamp(1, PAGE_MAX)).unwrap_or(u8::MAX);

        debug!(
            %channel_id,
            before = %query.before,
            after = %query.after,
            limit,
            "discord get messages"
        );
        let page = self
            .http
            .get_messages(convert::channel_id(channel_id)?, target, Some(limit))
            .await
            .map_err(discord_error("get messages"))?;

        page.iter().map(convert::message).collect()
    }

    async fn delete_message(&self, channel_id: &ChannelId, message_id: &MessageId) -> Result<()> {
        debug!(%channel_id, %message_id, "discord delete message");
        self.http
            .delete_message(
                convert::channel_id(channel_id)?,
                convert::message_id(message_id)?,
                None,
            )
            .await
            .map_err(discord_error("delete message"))
    }

    async fn bulk_delete_messages(
        &self,
        channel_id: &ChannelId,
        message_ids: &[MessageId],
    ) -> Result<()> {
        let channel = convert::channel_id(channel_id)?;
        let ids = message_ids
            .iter()
            .map(convert::message_id)
            .collect::<Result<Vec<_>>>()?;

        for batch in batches(&ids) {
            match batch {
                Batch::Single(message_id) => {
                    debug!(%channel_id, %message_id, "discord delete message");
                    self.http
                        .delete_message(channel, message_id, None)
                        .await
                        .map_err(discord_error("delete message"))?;
                }
                Batch::Bulk(chunk) => {
                    debug!(%channel_id, count = chunk.len(), "discord bulk delete");
                    let messages: Vec<String> = chunk.iter().map(ToString::to_string).collect();
                    let body = json!({ "messages": messages });
                    self.http
                        .delete_messages(channel, &body, None)
                        .await
                        .map_err(discord_error("bulk delete"))?;
                }
            }
        }
        Ok(())
    }

    async fn send_message(&self, channel_id: &ChannelId, content: &str) -> Result<MessageId> {
        debug!(%channel_id, "discord send message");
        let sent = convert::channel_id(channel_id)?
            .say(&self.http, content)
            .await
            .map_err(discord_error("send message"))?;
        Ok(MessageId(sent.id.to_string()))
    }

    /// Thread permissions come from the parent channel; DMs grant nothing.
    async fn user_channel_permissions(
        &self,
        user_id: &UserId,
        channel_id: &ChannelId,
    ) -> Result<Permissions> {
        let channel = match self.fetch_channel(convert::channel_id(channel_id)?).await? {
            DiscordChannel::Guild(channel) => channel,
            _ => {
                debug!(%channel_id, "not a guild channel, no permissions");
                return Ok(Permissions::NONE);
            }
        };

        let source_id = permissions::overwrite_source(channel.id, channel.kind, channel.parent_id)?;
        let source = if source_id == channel.id {
            channel
        } else {
            debug!(%channel_id, parent_id = %source_id, "resolving thread permissions");
            self.guild_channel(source_id).await?
        };

        let guild = self
            .http
            .get_guild(source.guild_id)
            .await
            .map_err(discord_error("get guild"))?;
        let member = self
            .http
            .get_member(source.guild_id, convert::user_id(user_id)?)
            .await
            .map_err(discord_error("get member"))?;

        let computed = guild.user_permissions_in(&source, &member);
        let effective = permissions::restrict_timed_out(
            computed,
            member.communication_disabled_until,
            Utc::now(),
        );
        Ok(Permissions(effective.bits()))
    }
}

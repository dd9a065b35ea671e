//! Mapping between serenity's Discord model and the core domain.

use std::num::NonZeroU64;

use chrono::{DateTime, Utc};
use serenity::model::channel::{Channel as DiscordChannel, Message as DiscordMessage, ReactionType};
use serenity::model::id;

use mgmt_core::{
    domain::{Channel, ChannelId, Message, MessageId, Reaction, UserId},
    errors::Error,
    Result,
};

/// Parse a Discord id exactly as received. Zero and padded ids are rejected.
fn snowflake(raw: &str) -> Result<u64> {
    raw.parse::<NonZeroU64>()
        .map(NonZeroU64::get)
        .map_err(|e| Error::Decode(format!("invalid discord id {raw:?}: {e}")))
}

pub fn channel_id(raw: &ChannelId) -> Result<id::ChannelId> {
    snowflake(raw.as_str()).map(id::ChannelId::new)
}

pub fn user_id(raw: &UserId) -> Result<id::UserId> {
    snowflake(raw.as_str()).map(id::UserId::new)
}

pub fn message_id(raw: &MessageId) -> Result<id::MessageId> {
    snowflake(raw.as_str()).map(id::MessageId::new)
}

/// History cursor bound. The opening cursor is `after=0`; Discord ids are
/// never zero, so it maps to the smallest valid id.
pub fn cursor_id(raw: &str) -> Result<id::MessageId> {
    raw.parse::<u64>()
        .map(|v| id::MessageId::new(v.max(1)))
        .map_err(|e| Error::Decode(format!("invalid history cursor {raw:?}: {e}")))
}

/// Creation time encoded in a message id.
pub fn created_at(message_id: id::MessageId) -> Result<DateTime<Utc>> {
    let secs = message_id.created_at().unix_timestamp();
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        Error::Decode(format!("message {message_id} has an out of range timestamp"))
    })
}

pub fn reaction(reaction_type: &ReactionType) -> Option<Reaction> {
    let emoji = match reaction_type {
        ReactionType::Unicode(name) => name.clone(),
        ReactionType::Custom { name, .. } => name.clone()?,
        _ => return None,
    };
    Some(Reaction { emoji })
}

pub fn message(msg: &DiscordMessage) -> Result<Message> {
    Ok(Message {
        id: MessageId(msg.id.to_string()),
        channel_id: ChannelId(msg.channel_id.to_string()),
        created_at: created_at(msg.id)?,
        pinned: msg.pinned,
        reactions: msg
            .reactions
            .iter()
            .filter_map(|r| reaction(&r.reaction_type))
            .collect(),
    })
}

pub fn channel(channel: &DiscordChannel) -> Result<Channel> {
    let (id, last_message_id) = match channel {
        DiscordChannel::Guild(c) => (c.id, c.last_message_id),
        DiscordChannel::Private(c) => (c.id, c.last_message_id),
        _ => return Err(Error::Platform("unsupported discord channel kind".to_string())),
    };
    Ok(Channel {
        id: ChannelId(id.to_string()),
        last_message_id: last_message_id.map(|m| MessageId(m.to_string())),
    })
}

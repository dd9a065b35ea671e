//! Pieces of the effective-permission lookup that serenity leaves to callers.
//!
//! Threads carry no overwrites of their own: Discord resolves them against the
//! parent channel. Timed-out members keep only read access.

use chrono::{DateTime, Utc};
use serenity::model::channel::ChannelType;
use serenity::model::id::ChannelId;
use serenity::model::{Permissions, Timestamp};

use mgmt_core::{errors::Error, Result};

pub fn is_thread(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
    )
}

/// Channel whose overwrites apply to `channel`.
pub fn overwrite_source(
    channel: ChannelId,
    kind: ChannelType,
    parent_id: Option<ChannelId>,
) -> Result<ChannelId> {
    if !is_thread(kind) {
        return Ok(channel);
    }
    parent_id.ok_or_else(|| Error::Platform(format!("thread {channel} has no parent channel")))
}

/// Strip everything but read access from a member whose timeout is still running.
///
/// Administrators (and the owner, who holds every bit) are exempt.
pub fn restrict_timed_out(
    permissions: Permissions,
    timed_out_until: Option<Timestamp>,
    now: DateTime<Utc>,
) -> Permissions {
    let timed_out =
        timed_out_until.is_some_and(|until| until.unix_timestamp() > now.timestamp());
    if !timed_out || permissions.contains(Permissions::ADMINISTRATOR) {
        return permissions;
    }
    permissions & (Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY)
}

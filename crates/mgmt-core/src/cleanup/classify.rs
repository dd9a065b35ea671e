use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    cleanup::CleanupPolicy,
    domain::{Message, MessageId},
};

/// Deletable ids of one page, in page order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub bulk: Vec<MessageId>,
    pub single: Vec<MessageId>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.bulk.is_empty() && self.single.is_empty()
    }
}

/// Pinned messages and messages carrying the keep reaction are never deleted.
pub fn is_exempt(message: &Message, keep_emoji: &str) -> bool {
    if message.pinned {
        info!(
            channel_id = %message.channel_id,
            message_id = %message.id,
            "skipping pinned message"
        );
        return true;
    }

    if message.has_reaction(keep_emoji) {
        info!(
            channel_id = %message.channel_id,
            message_id = %message.id,
            reaction = keep_emoji,
            "skipping message with reaction"
        );
        return true;
    }

    false
}

/// Split a page into bulk and single deletions.
///
/// A message is bulk-eligible only if it was created strictly after
/// `now - policy.bulk_max_age`.
pub fn classify(
    messages: &[Message],
    now: DateTime<Utc>,
    policy: &CleanupPolicy,
) -> Classification {
    let cutoff = now - policy.bulk_max_age;
    let mut out = Classification::default();

    for message in messages {
        if is_exempt(message, &policy.keep_emoji) {
            continue;
        }

        if message.created_at > cutoff {
            out.bulk.push(message.id.clone());
        } else {
            out.single.push(message.id.clone());
        }
    }

    out
}

use std::fmt;

use chrono::{DateTime, Utc};

/// Discord user id (snowflake, kept as received).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

/// Discord channel id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub String);

/// Discord message id. Ids grow with creation time.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

macro_rules! id_display {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl $ty {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

id_display!(UserId, ChannelId, MessageId);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reaction {
    pub emoji: String,
}

/// A fetched channel message. Never mutated, only read.
///
/// `created_at` is decoded from the id by the platform adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub created_at: DateTime<Utc>,
    pub pinned: bool,
    pub reactions: Vec<Reaction>,
}

impl Message {
    pub fn has_reaction(&self, emoji: &str) -> bool {
        self.reactions.iter().any(|r| r.emoji == emoji)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    /// Termination sentinel for the cleanup loop.
    pub last_message_id: Option<MessageId>,
}

use async_trait::async_trait;

use crate::{
    domain::{Channel, ChannelId, Message, MessageId, UserId},
    permissions::Permissions,
    Result,
};

/// Window bounds for one page of channel history.
///
/// Empty strings mean "unbounded", matching how the cursor is threaded through
/// the cleanup loop.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryQuery {
    pub limit: usize,
    pub before: String,
    pub after: String,
}

/// Hexagonal port for the chat platform.
///
/// Discord is the only implementation; the fake in tests records calls.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn channel(&self, channel_id: &ChannelId) -> Result<Channel>;

    /// Fetch a page of messages, newest first.
    async fn channel_messages(
        &self,
        channel_id: &ChannelId,
        query: &HistoryQuery,
    ) -> Result<Vec<Message>>;

    async fn delete_message(&self, channel_id: &ChannelId, message_id: &MessageId) -> Result<()>;

    async fn bulk_delete_messages(
        &self,
        channel_id: &ChannelId,
        message_ids: &[MessageId],
    ) -> Result<()>;

    async fn send_message(&self, channel_id: &ChannelId, content: &str) -> Result<MessageId>;

    /// Effective permissions of a user in a channel.
    async fn user_channel_permissions(
        &self,
        user_id: &UserId,
        channel_id: &ChannelId,
    ) -> Result<Permissions>;
}

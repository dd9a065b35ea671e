use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    cleanup::{classify, delete_messages, Classification, CleanupPolicy},
    domain::{Channel, ChannelId, Message, UserId},
    errors::Error,
    platform::{ChatPlatform, HistoryQuery},
    Result,
};

/// Message-id window for the next history page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub before: String,
    pub after: String,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            before: String::new(),
            after: "0".to_string(),
        }
    }
}

/// Ephemeral per-request state. Discarded when the cleanup ends.
#[derive(Clone, Debug, Default)]
pub struct CleanupSession {
    pub bulk_total: usize,
    pub single_total: usize,
    pub warning_sent: bool,
    pub cursor: Cursor,
}

impl CleanupSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page to the running totals.
    ///
    /// Returns `true` exactly once per session: the first time the single
    /// total exceeds `warning_threshold`.
    pub fn record(&mut self, classification: &Classification, warning_threshold: usize) -> bool {
        self.bulk_total += classification.bulk.len();
        self.single_total += classification.single.len();

        if !self.warning_sent && self.single_total > warning_threshold {
            self.warning_sent = true;
            return true;
        }
        false
    }

    /// Move the cursor past a (newest-first) page. Returns `false` if the
    /// cursor did not change, i.e. the next fetch would repeat this one.
    pub fn advance(&mut self, page: &[Message]) -> bool {
        let (Some(newest), Some(oldest)) = (page.first(), page.last()) else {
            return false;
        };

        let next = Cursor {
            before: newest.id.0.clone(),
            after: oldest.id.0.clone(),
        };
        if next == self.cursor {
            return false;
        }
        self.cursor = next;
        true
    }

    /// The newest fetched message is the channel's last known message.
    pub fn reached(&self, channel: &Channel) -> bool {
        channel
            .last_message_id
            .as_ref()
            .is_some_and(|last| last.0 == self.cursor.before)
    }
}

/// Aggregate outcome of a finished cleanup. Only ever logged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub pages: usize,
    pub bulk_total: usize,
    pub single_total: usize,
    pub warning_sent: bool,
}

enum State {
    Fetching,
    Classifying(Vec<Message>),
    Deleting(Vec<Message>, Classification),
    Done,
    Failed(Error),
}

/// Pages through a channel's history and deletes everything deletable.
///
/// Stages never overlap: fetch, classify, delete, repeat. There is no
/// cancellation; a run ends on an empty page, on reaching the channel's last
/// message, or on the first error.
pub struct PaginationDriver {
    platform: Arc<dyn ChatPlatform>,
    policy: CleanupPolicy,
}

impl PaginationDriver {
    pub fn new(platform: Arc<dyn ChatPlatform>, policy: CleanupPolicy) -> Self {
        Self { platform, policy }
    }

    pub async fn run(&self, user_id: &UserId, channel_id: &ChannelId) -> Result<CleanupReport> {
        info!(%user_id, %channel_id, "received clean request");

        let channel = self.platform.channel(channel_id).await?;
        let mut session = CleanupSession::new();
        let mut pages = 0usize;
        let mut state = State::Fetching;

        loop {
            state = match state {
                State::Fetching => match self.fetch(user_id, channel_id, &session).await {
                    Ok(page) if page.is_empty() => State::Done,
                    Ok(page) => {
                        pages += 1;
                        State::Classifying(page)
                    }
                    Err(e) => State::Failed(e),
                },
                State::Classifying(page) => {
                    let classification = classify(&page, Utc::now(), &self.policy);
                    State::Deleting(page, classification)
                }
                State::Deleting(page, classification) => {
                    match self.delete(channel_id, &mut session, &classification).await {
                        Ok(()) => self.next_state(&channel, &mut session, &page),
                        Err(e) => State::Failed(e),
                    }
                }
                State::Done => break,
                State::Failed(e) => {
                    warn!(
                        %user_id,
                        %channel_id,
                        single_total = session.single_total,
                        bulk_total = session.bulk_total,
                        "cleanup stopped early"
                    );
                    return Err(e);
                }
            };
        }

        info!(
            %user_id,
            %channel_id,
            single_total = session.single_total,
            bulk_total = session.bulk_total,
            pages,
            "finished cleaning"
        );

        Ok(CleanupReport {
            pages,
            bulk_total: session.bulk_total,
            single_total: session.single_total,
            warning_sent: session.warning_sent,
        })
    }

    async fn fetch(
        &self,
        user_id: &UserId,
        channel_id: &ChannelId,
        session: &CleanupSession,
    ) -> Result<Vec<Message>> {
        let query = HistoryQuery {
            limit: self.policy.page_size,
            before: session.cursor.before.clone(),
            after: session.cursor.after.clone(),
        };

        info!(
            %user_id,
            %channel_id,
            before = %query.before,
            after = %query.after,
            limit = query.limit,
            "looking for messages in channel"
        );

        let page = self.platform.channel_messages(channel_id, &query).await?;

        if !page.is_empty() {
            info!(
                %user_id,
                %channel_id,
                before = %query.before,
                after = %query.after,
                limit = query.limit,
                count = page.len(),
                "found messages in channel"
            );
        }
        Ok(page)
    }

    async fn delete(
        &self,
        channel_id: &ChannelId,
        session: &mut CleanupSession,
        classification: &Classification,
    ) -> Result<()> {
        if session.record(classification, self.policy.warning_threshold) {
            info!(
                %channel_id,
                single_total = session.single_total,
                "sending rate limit warning"
            );
            self.platform
                .send_message(channel_id, &self.policy.warning_message)
                .await?;
        }

        delete_messages(self.platform.as_ref(), channel_id, classification).await
    }

    fn next_state(
        &self,
        channel: &Channel,
        session: &mut CleanupSession,
        page: &[Message],
    ) -> State {
        if !session.advance(page) {
            warn!(
                channel_id = %channel.id,
                before = %session.cursor.before,
                after = %session.cursor.after,
                "history cursor did not move, stopping"
            );
            return State::Done;
        }
        if session.reached(channel) {
            return State::Done;
        }
        State::Fetching
    }
}

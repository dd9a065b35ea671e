//! In-memory [`ChatPlatform`] used by the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::{
    domain::{Channel, ChannelId, Message, MessageId, UserId},
    errors::Error,
    permissions::Permissions,
    platform::{ChatPlatform, HistoryQuery},
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Channel,
    Fetch(HistoryQuery),
    Delete(MessageId),
    BulkDelete(Vec<MessageId>),
    Send(String),
    Permissions(UserId),
}

/// Fake channel history.
///
/// Paging follows Discord's `after` semantics: the oldest `limit` messages
/// newer than `after`, returned newest first.
pub struct FakePlatform {
    channel_id: ChannelId,
    permissions: Permissions,
    permissions_error: Option<String>,
    fetch_error: Option<String>,
    repeating_pages: bool,
    history: Mutex<Vec<Message>>,
    next_id: Mutex<u64>,
    last_message_id: Mutex<Option<MessageId>>,
    delete_error_on: Mutex<Option<MessageId>>,
    calls: Mutex<Vec<Call>>,
}

fn sort_key(id: &MessageId) -> u64 {
    id.0.parse::<u64>().unwrap_or(u64::MAX)
}

impl FakePlatform {
    pub fn new(channel_id: &str) -> Self {
        Self {
            channel_id: ChannelId(channel_id.to_string()),
            permissions: Permissions::MANAGE_MESSAGES,
            permissions_error: None,
            fetch_error: None,
            repeating_pages: false,
            history: Mutex::new(Vec::new()),
            next_id: Mutex::new(1_000),
            last_message_id: Mutex::new(None),
            delete_error_on: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn failing_permissions(mut self, reason: &str) -> Self {
        self.permissions_error = Some(reason.to_string());
        self
    }

    pub fn failing_fetch(mut self, reason: &str) -> Self {
        self.fetch_error = Some(reason.to_string());
        self
    }

    /// Ignore the cursor and always serve the newest page.
    pub fn repeating_pages(mut self) -> Self {
        self.repeating_pages = true;
        self
    }

    pub fn fail_delete(&self, id: &MessageId) {
        *self.delete_error_on.lock().unwrap() = Some(id.clone());
    }

    /// Append `n` messages created roughly `age` ago, oldest first.
    ///
    /// Ids keep growing across calls, so later pushes sort after earlier ones.
    pub fn push_aged(&self, n: usize, age: Duration) -> Vec<MessageId> {
        let start = Utc::now() - age;
        let mut next_id = self.next_id.lock().unwrap();
        let mut history = self.history.lock().unwrap();
        let mut ids = Vec::with_capacity(n);

        for i in 0..n {
            let id = MessageId(next_id.to_string());
            *next_id += 1;
            history.push(Message {
                id: id.clone(),
                channel_id: self.channel_id.clone(),
                created_at: start + Duration::milliseconds(i as i64),
                pinned: false,
                reactions: Vec::new(),
            });
            ids.push(id);
        }

        *self.last_message_id.lock().unwrap() = history.last().map(|m| m.id.clone());
        ids
    }

    pub fn pin(&self, id: &MessageId) {
        let mut history = self.history.lock().unwrap();
        if let Some(m) = history.iter_mut().find(|m| &m.id == id) {
            m.pinned = true;
        }
    }

    pub fn set_last_message(&self, id: Option<MessageId>) {
        *self.last_message_id.lock().unwrap() = id;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(_)))
            .count()
    }

    pub fn single_deletes(&self) -> Vec<MessageId> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn bulk_deletes(&self) -> Vec<Vec<MessageId>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::BulkDelete(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Ids still in the channel, oldest first.
    pub fn remaining(&self) -> Vec<MessageId> {
        self.history
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.id.clone())
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn remove(&self, ids: &[MessageId]) {
        self.history
            .lock()
            .unwrap()
            .retain(|m| !ids.contains(&m.id));
    }
}

#[async_trait]
impl ChatPlatform for FakePlatform {
    async fn channel(&self, channel_id: &ChannelId) -> Result<Channel> {
        self.record(Call::Channel);
        Ok(Channel {
            id: channel_id.clone(),
            last_message_id: self.last_message_id.lock().unwrap().clone(),
        })
    }

    async fn channel_messages(
        &self,
        _channel_id: &ChannelId,
        query: &HistoryQuery,
    ) -> Result<Vec<Message>> {
        self.record(Call::Fetch(query.clone()));
        if let Some(reason) = &self.fetch_error {
            return Err(Error::Platform(reason.clone()));
        }

        let history = self.history.lock().unwrap();
        let mut page: Vec<Message> = if self.repeating_pages || query.after.is_empty() {
            let before = query.before.parse::<u64>().ok();
            let older: Vec<&Message> = history
                .iter()
                .filter(|m| {
                    self.repeating_pages || before.map_or(true, |b| sort_key(&m.id) < b)
                })
                .collect();
            let skip = older.len().saturating_sub(query.limit);
            older.into_iter().skip(skip).cloned().collect()
        } else {
            let after = query.after.parse::<u64>().unwrap_or(0);
            history
                .iter()
                .filter(|m| sort_key(&m.id) > after)
                .take(query.limit)
                .cloned()
                .collect()
        };
        page.reverse();
        Ok(page)
    }

    async fn delete_message(&self, _channel_id: &ChannelId, message_id: &MessageId) -> Result<()> {
        self.record(Call::Delete(message_id.clone()));
        if self.delete_error_on.lock().unwrap().as_ref() == Some(message_id) {
            return Err(Error::Platform(format!("cannot delete {message_id}")));
        }
        self.remove(std::slice::from_ref(message_id));
        Ok(())
    }

    async fn bulk_delete_messages(
        &self,
        _channel_id: &ChannelId,
        message_ids: &[MessageId],
    ) -> Result<()> {
        self.record(Call::BulkDelete(message_ids.to_vec()));
        self.remove(message_ids);
        Ok(())
    }

    async fn send_message(&self, _channel_id: &ChannelId, content: &str) -> Result<MessageId> {
        self.record(Call::Send(content.to_string()));
        Ok(MessageId("1".to_string()))
    }

    async fn user_channel_permissions(
        &self,
        user_id: &UserId,
        _channel_id: &ChannelId,
    ) -> Result<Permissions> {
        self.record(Call::Permissions(user_id.clone()));
        if let Some(reason) = &self.permissions_error {
            return Err(Error::Platform(reason.clone()));
        }
        Ok(self.permissions)
    }
}

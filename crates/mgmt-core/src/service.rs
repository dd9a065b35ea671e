use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    cleanup::{CleanupPolicy, CleanupReport, PaginationDriver},
    domain::{ChannelId, UserId},
    permissions::validate_permissions,
    platform::ChatPlatform,
    Result,
};

/// What the inbound handler needs from the management core.
#[async_trait]
pub trait ManagementService: Send + Sync {
    async fn validate_permissions(&self, user_id: &UserId, channel_id: &ChannelId) -> Result<()>;

    /// Clean a channel. Long-running; callers spawn it.
    async fn clean(&self, user_id: &UserId, channel_id: &ChannelId) -> Result<CleanupReport>;
}

/// [`ManagementService`] over a [`ChatPlatform`].
pub struct DefaultService {
    platform: Arc<dyn ChatPlatform>,
    policy: CleanupPolicy,
}

impl DefaultService {
    pub fn new(platform: Arc<dyn ChatPlatform>, policy: CleanupPolicy) -> Self {
        Self { platform, policy }
    }
}

#[async_trait]
impl ManagementService for DefaultService {
    async fn validate_permissions(&self, user_id: &UserId, channel_id: &ChannelId) -> Result<()> {
        validate_permissions(self.platform.as_ref(), user_id, channel_id).await
    }

    async fn clean(&self, user_id: &UserId, channel_id: &ChannelId) -> Result<CleanupReport> {
        PaginationDriver::new(self.platform.clone(), self.policy.clone())
            .run(user_id, channel_id)
            .await
    }
}

//! Permission bitset + the moderation permission check.

use std::fmt;

use tracing::info;

use crate::{
    domain::{ChannelId, UserId},
    errors::Error,
    platform::ChatPlatform,
    Result,
};

/// Discord permission bitset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Permissions(pub u64);

impl Permissions {
    pub const NONE: Permissions = Permissions(0);
    pub const MANAGE_MESSAGES: Permissions = Permissions(0x0000_2000);

    pub fn contains(self, other: Permissions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Require MANAGE_MESSAGES for `user_id` in `channel_id`.
///
/// Lookup failures are returned as-is; only a missing bit becomes
/// [`Error::Validation`].
pub async fn validate_permissions(
    platform: &dyn ChatPlatform,
    user_id: &UserId,
    channel_id: &ChannelId,
) -> Result<()> {
    info!(%user_id, %channel_id, "checking user permissions");

    let required = Permissions::MANAGE_MESSAGES;
    let permissions = platform.user_channel_permissions(user_id, channel_id).await?;

    if !permissions.contains(required) {
        info!(
            %user_id,
            %channel_id,
            user_permissions = %permissions,
            required_permissions = %required,
            "user did not have required permissions"
        );
        return Err(Error::user_permissions());
    }

    info!(
        %user_id,
        %channel_id,
        user_permissions = %permissions,
        required_permissions = %required,
        "user has required permissions"
    );
    Ok(())
}

use std::sync::Arc;

use tracing::{error, info};

use mgmt_core::{
    domain::{ChannelId, UserId},
    service::ManagementService,
    Error,
};

use crate::{
    contract::{Reaction, Request, Response},
    formatter::format_error,
};

pub const APP_ID: &str = "intent.endpoint.management";

/// Turns `clean` intents into background cleanups.
pub struct Handler {
    service: Arc<dyn ManagementService>,
    ack_emoji: String,
}

impl Handler {
    pub fn new(service: Arc<dyn ManagementService>, ack_emoji: impl Into<String>) -> Self {
        Self {
            service,
            ack_emoji: ack_emoji.into(),
        }
    }

    /// Check permissions, start the cleanup, and acknowledge right away.
    ///
    /// The cleanup is spawned and never awaited; its outcome only reaches the
    /// logs.
    pub async fn clean(&self, request: Request) -> Result<Response, Error> {
        let user_id = UserId(request.author.id.clone());
        let channel_id = ChannelId(request.channel_id.clone());

        if let Err(e) = self
            .service
            .validate_permissions(&user_id, &channel_id)
            .await
        {
            return format_error(e);
        }

        let service = self.service.clone();
        tokio::spawn(async move {
            match service.clean(&user_id, &channel_id).await {
                Ok(report) => info!(
                    component = APP_ID,
                    %user_id,
                    %channel_id,
                    pages = report.pages,
                    single_total = report.single_total,
                    bulk_total = report.bulk_total,
                    "clean finished"
                ),
                Err(e) => error!(
                    component = APP_ID,
                    %user_id,
                    %channel_id,
                    error = %e,
                    "failed to clean"
                ),
            }
        });

        Ok(Response::reaction(Reaction {
            message_id: request.id,
            channel_id: request.channel_id,
            emoji_id: self.ack_emoji.clone(),
        }))
    }
}

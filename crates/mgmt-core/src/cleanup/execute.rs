use tracing::info;

use crate::{
    cleanup::Classification,
    domain::ChannelId,
    platform::ChatPlatform,
    Result,
};

/// Delete one page worth of messages: singles in order, then one bulk call.
///
/// Stops at the first failure. Messages already deleted stay deleted; a
/// retried cleanup just won't find them anymore.
pub async fn delete_messages(
    platform: &dyn ChatPlatform,
    channel_id: &ChannelId,
    classification: &Classification,
) -> Result<()> {
    let Classification { bulk, single } = classification;

    if classification.is_empty() {
        info!(%channel_id, "no deletable messages");
        return Ok(());
    }

    info!(
        %channel_id,
        bulk_message_delete_count = bulk.len(),
        single_message_delete_count = single.len(),
        "found deletable messages"
    );

    info!(%channel_id, "beginning single message delete");
    for message_id in single {
        platform.delete_message(channel_id, message_id).await?;
        info!(%channel_id, %message_id, "deleted message");
    }
    info!(%channel_id, "finished single message delete");

    if !bulk.is_empty() {
        info!(%channel_id, "beginning bulk message delete");
        platform.bulk_delete_messages(channel_id, bulk).await?;
        info!(%channel_id, "finished bulk message delete");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageId;
    use crate::testing::{Call, FakePlatform};
    use crate::Error;

    fn ids(raw: &[&str]) -> Vec<MessageId> {
        raw.iter().map(|s| MessageId(s.to_string())).collect()
    }

    fn channel() -> ChannelId {
        ChannelId("c1".to_string())
    }

    #[tokio::test]
    async fn empty_classification_makes_no_calls() {
        let platform = FakePlatform::new("c1");
        delete_messages(&platform, &channel(), &Classification::default())
            .await
            .unwrap();
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn singles_run_in_order_before_bulk() {
        let platform = FakePlatform::new("c1");
        let c = Classification {
            bulk: ids(&["30", "20"]),
            single: ids(&["2", "1"]),
        };
        delete_messages(&platform, &channel(), &c).await.unwrap();

        assert_eq!(
            platform.calls(),
            vec![
                Call::Delete(MessageId("2".into())),
                Call::Delete(MessageId("1".into())),
                Call::BulkDelete(ids(&["30", "20"])),
            ]
        );
    }

    #[tokio::test]
    async fn no_bulk_call_without_bulk_ids() {
        let platform = FakePlatform::new("c1");
        let c = Classification {
            bulk: Vec::new(),
            single: ids(&["1"]),
        };
        delete_messages(&platform, &channel(), &c).await.unwrap();
        assert_eq!(platform.calls(), vec![Call::Delete(MessageId("1".into()))]);
    }

    #[tokio::test]
    async fn first_single_failure_aborts() {
        let platform = FakePlatform::new("c1");
        platform.fail_delete(&MessageId("2".into()));
        let c = Classification {
            bulk: ids(&["30"]),
            single: ids(&["1", "2", "3"]),
        };
        let err = delete_messages(&platform, &channel(), &c).await.unwrap_err();
        assert!(matches!(err, Error::Platform(_)));

        // "1" went through, "2" was attempted, nothing after it.
        assert_eq!(
            platform.calls(),
            vec![
                Call::Delete(MessageId("1".into())),
                Call::Delete(MessageId("2".into())),
            ]
        );
    }
}

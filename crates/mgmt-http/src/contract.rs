//! Request/response envelopes exchanged with the bot platform.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// An intent invocation: who asked, where, and which message to react to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Id of the message that triggered the request.
    pub id: String,
    pub author: Author,
    pub channel_id: String,
    #[serde(default)]
    pub server_id: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub message_id: String,
    pub channel_id: String,
    pub emoji_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<Reaction>,
}

impl Response {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message {
                content: content.into(),
            }],
            ..Default::default()
        }
    }

    pub fn reaction(reaction: Reaction) -> Self {
        Self {
            reactions: vec![reaction],
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_reads_camel_case_and_tolerates_extra_fields() {
        let req: Request = serde_json::from_value(json!({
            "id": "m1",
            "source": "discord",
            "author": { "id": "u1", "name": "mod" },
            "channelId": "c1",
            "serverId": "g1",
            "content": "!clean"
        }))
        .unwrap();

        assert_eq!(req.author.id, "u1");
        assert_eq!(req.channel_id, "c1");
        assert_eq!(req.server_id, "g1");
    }

    #[test]
    fn reaction_response_omits_messages() {
        let resp = Response::reaction(Reaction {
            message_id: "m1".into(),
            channel_id: "c1".into(),
            emoji_id: "\u{1f9f9}".into(),
        });
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({
                "reactions": [{ "messageId": "m1", "channelId": "c1", "emojiId": "\u{1f9f9}" }]
            })
        );
    }
}

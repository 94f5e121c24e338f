use crate::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One typed part of a message body.
///
/// On the wire: `{"type": "text" | "file", "content": "..."}`. File parts
/// carry the uploaded file's URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum MessageContent {
    Text(String),
    File(String),
}

impl MessageContent {
    pub fn is_text(&self) -> bool {
        matches!(self, MessageContent::Text(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            MessageContent::File(_) => None,
        }
    }
}

/// Languages the backend can hold a conversation in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "vi")]
    Vietnamese,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "de")]
    German,
}

/// The message a chat was opened with; replayed by the room when the
/// server reports it has not been sent yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitMessage {
    pub contents: Vec<MessageContent>,
    pub is_thinking: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub init_msg: InitMessage,
    pub language: String,
    #[serde(default)]
    pub msg_sent: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatListResponse {
    pub chats: Vec<Chat>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChatRequest {
    pub init_msg: InitMessage,
    pub language: LanguageCode,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateChatTitleRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub chat_id: String,
    pub sender: Option<User>,
    pub contents: Vec<MessageContent>,
    #[serde(default)]
    pub is_edited: Option<bool>,
    #[serde(default)]
    pub is_bot: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_content_wire_shape() {
        let part = MessageContent::Text("hello".into());
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "text", "content": "hello"})
        );

        let part: MessageContent =
            serde_json::from_value(serde_json::json!({"type": "file", "content": "/f/a.png"}))
                .unwrap();
        assert_eq!(part, MessageContent::File("/f/a.png".into()));
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(
            serde_json::to_string(&LanguageCode::Japanese).unwrap(),
            "\"ja\""
        );
    }
}

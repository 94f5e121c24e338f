//! Chat room state: ordered message log plus the streaming reducer that
//! folds SSE chunks into a growing assistant message.

use crate::config::ApiSettings;
use crate::http::ApiClient;
use crate::models::chat::{Message, MessageContent};
use crate::pagination::PageQuery;
use crate::services::ChatService;
use crate::stream::{ChatStream, SseClient, StreamChunk};
use chrono::{DateTime, Utc};
use client_core::error::ApiError;
use uuid::Uuid;

/// A message as the room sees it, user- or bot-authored.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageView {
    pub id: String,
    pub contents: Vec<MessageContent>,
    pub is_thinking: Option<bool>,
    pub from_bot: bool,
    pub timestamp: DateTime<Utc>,
}

impl MessageView {
    fn from_history(message: Message) -> Self {
        Self {
            id: message.id,
            contents: message.contents,
            is_thinking: None,
            from_bot: message.is_bot.unwrap_or(false),
            timestamp: message.created_at,
        }
    }
}

/// Append-only ordered message list for one chat.
///
/// User messages land atomically; streamed bot chunks merge into the last
/// message when it shares their identity, in arrival order. There is no
/// reordering and no dedup by sequence number: the stream is a single
/// linear connection per outgoing message.
#[derive(Debug)]
pub struct MessageLog {
    chat_id: String,
    messages: Vec<MessageView>,
}

impl MessageLog {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            messages: Vec::new(),
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn messages(&self) -> &[MessageView] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replace the log with the server-side history.
    pub fn load_history(&mut self, messages: Vec<Message>) {
        self.messages = messages.into_iter().map(MessageView::from_history).collect();
    }

    /// Append a user-authored message.
    pub fn push_user(&mut self, contents: Vec<MessageContent>, is_thinking: bool) -> &MessageView {
        self.messages.push(MessageView {
            id: Uuid::new_v4().to_string(),
            contents,
            is_thinking: Some(is_thinking),
            from_bot: false,
            timestamp: Utc::now(),
        });
        self.messages.last().expect("just pushed")
    }

    /// Fold one streamed chunk into the log.
    ///
    /// If the last message is bot-authored and shares the chunk's identity,
    /// the chunk text extends its trailing text part (or opens a new text
    /// part after a file reference). Anything else starts a new bot
    /// message; an empty chunk starts it with no parts. Chunks for other
    /// chats are ignored.
    pub fn apply_chunk(&mut self, chunk: &StreamChunk) -> bool {
        if chunk.chat_id != self.chat_id {
            return false;
        }

        if let Some(last) = self.messages.last_mut() {
            if last.from_bot && last.id == chunk.id {
                match last.contents.last_mut() {
                    Some(MessageContent::Text(text)) => text.push_str(&chunk.message),
                    _ => last.contents.push(MessageContent::Text(chunk.message.clone())),
                }
                return true;
            }
        }

        let contents = if chunk.message.is_empty() {
            Vec::new()
        } else {
            vec![MessageContent::Text(chunk.message.clone())]
        };
        self.messages.push(MessageView {
            id: chunk.id.clone(),
            contents,
            is_thinking: None,
            from_bot: true,
            timestamp: Utc::now(),
        });
        true
    }

    pub fn apply_chunks<'a>(&mut self, chunks: impl IntoIterator<Item = &'a StreamChunk>) {
        for chunk in chunks {
            self.apply_chunk(chunk);
        }
    }
}

/// One open chat: history, composition, and the live stream.
pub struct ChatRoom {
    chat_id: String,
    service: ChatService,
    sse: SseClient,
    log: MessageLog,
}

impl ChatRoom {
    /// Open a room and load its message history.
    pub async fn open(
        client: &ApiClient,
        settings: &ApiSettings,
        chat_id: &str,
    ) -> Result<Self, ApiError> {
        let mut room = Self {
            chat_id: chat_id.to_string(),
            service: ChatService::new(client.clone()),
            sse: SseClient::new(settings, client.session().clone())?,
            log: MessageLog::new(chat_id),
        };
        room.reload_history().await?;
        Ok(room)
    }

    pub async fn reload_history(&mut self) -> Result<(), ApiError> {
        let response = self
            .service
            .messages(&self.chat_id, &PageQuery::default())
            .await?;
        self.log.load_history(response.messages);
        Ok(())
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn messages(&self) -> &[MessageView] {
        self.log.messages()
    }

    pub fn log_mut(&mut self) -> &mut MessageLog {
        &mut self.log
    }

    /// Append the user message and open the reply stream.
    pub async fn send(
        &mut self,
        contents: Vec<MessageContent>,
        is_thinking: bool,
    ) -> Result<ChatStream, ApiError> {
        self.log.push_user(contents.clone(), is_thinking);
        self.sse
            .send_message(&self.chat_id, &contents, is_thinking)
            .await
    }

    /// Replay the chat's opening message when the server reports it was
    /// never processed (a freshly created chat).
    pub async fn send_pending_init(&mut self) -> Result<Option<ChatStream>, ApiError> {
        let chat = self.service.get(&self.chat_id).await?;
        if chat.msg_sent == Some(false) {
            let init = chat.init_msg;
            let stream = self.send(init.contents, init.is_thinking).await?;
            return Ok(Some(stream));
        }
        Ok(None)
    }

    /// Drain a reply stream into the log.
    pub async fn collect(&mut self, mut stream: ChatStream) -> Result<(), ApiError> {
        while let Some(chunk) = stream.next_chunk().await {
            self.log.apply_chunk(&chunk?);
        }
        Ok(())
    }
}

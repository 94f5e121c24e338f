//! Per-message SSE stream.
//!
//! Sending a chat message opens one server-sent-event stream; the server
//! answers with incremental chunks of the assistant reply until it closes
//! the connection.

use crate::auth::SessionGuard;
use crate::config::ApiSettings;
use crate::models::chat::MessageContent;
use client_core::error::ApiError;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

/// The only stream flavor the backend currently serves.
pub const CHAT_TYPE: &str = "chat";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendMessageBody<'a> {
    id: Uuid,
    chat_id: &'a str,
    contents: &'a [MessageContent],
    is_thinking: bool,
}

/// One incremental piece of an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamChunk {
    pub chat_id: String,
    pub id: String,
    pub message: String,
}

/// Opens SSE streams against the backend.
pub struct SseClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionGuard>,
}

impl SseClient {
    pub fn new(settings: &ApiSettings, session: Arc<SessionGuard>) -> Result<Self, ApiError> {
        // Connect timeout only. An overall request timeout would cut long
        // generations short mid-stream.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base().to_string(),
            session,
        })
    }

    /// POST a message and stream back the assistant's reply chunks.
    pub async fn send_message(
        &self,
        chat_id: &str,
        contents: &[MessageContent],
        is_thinking: bool,
    ) -> Result<ChatStream, ApiError> {
        let token = self.session.bearer().await?;
        let url = format!("{}/sse?chatType={CHAT_TYPE}", self.base_url);
        let body = SendMessageBody {
            id: Uuid::new_v4(),
            chat_id,
            contents,
            is_thinking,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, message));
        }

        tracing::debug!(chat_id, "Chat stream opened");

        let (tx, rx) = mpsc::channel(32);
        let reader = tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        for data in drain_events(&mut buffer) {
                            match serde_json::from_str::<StreamChunk>(&data) {
                                Ok(chunk) => {
                                    if tx.send(Ok(chunk)).await.is_err() {
                                        // Receiver dropped, stop reading.
                                        return;
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "Skipping undecodable SSE event");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(ApiError::Stream(e.to_string()))).await;
                        return;
                    }
                }
            }
        });

        Ok(ChatStream {
            rx: ReceiverStream::new(rx),
            reader,
        })
    }
}

/// Pull complete SSE events out of the buffer and return their `data:`
/// payloads. Partial events stay buffered for the next read.
fn drain_events(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();

    // Some servers terminate lines with CRLF. A trailing lone `\r` is a
    // pair split across reads; it picks up its `\n` on the next call.
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }

    while let Some(event_end) = buffer.find("\n\n") {
        let event = buffer[..event_end].to_string();
        *buffer = buffer[event_end + 2..].to_string();

        for line in event.lines() {
            if let Some(data) = line.strip_prefix("data:") {
                payloads.push(data.trim_start().to_string());
            }
        }
    }

    payloads
}

/// The assistant's reply as a stream of [`StreamChunk`]s.
///
/// Dropping the stream aborts the reader task and with it the underlying
/// connection.
pub struct ChatStream {
    rx: ReceiverStream<Result<StreamChunk, ApiError>>,
    reader: tokio::task::JoinHandle<()>,
}

impl ChatStream {
    /// The next chunk, or `None` once the server has closed the stream.
    pub async fn next_chunk(&mut self) -> Option<Result<StreamChunk, ApiError>> {
        self.rx.next().await
    }

    pub fn abort(&self) {
        self.reader.abort();
    }
}

impl futures::Stream for ChatStream {
    type Item = Result<StreamChunk, ApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

impl Drop for ChatStream {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_complete_events() {
        let mut buffer = String::from(
            "data: {\"chatId\":\"c1\",\"id\":\"m1\",\"message\":\"he\"}\n\ndata: {\"chatId\":\"c1\",\"id\":\"m1\",\"message\":\"llo\"}\n\n",
        );
        let payloads = drain_events(&mut buffer);
        assert_eq!(payloads.len(), 2);
        assert!(buffer.is_empty());

        let chunk: StreamChunk = serde_json::from_str(&payloads[0]).unwrap();
        assert_eq!(chunk.chat_id, "c1");
        assert_eq!(chunk.message, "he");
    }

    #[test]
    fn test_partial_event_stays_buffered() {
        let mut buffer = String::from("data: {\"chatId\":\"c1\",\"id\":\"m1\",");
        assert!(drain_events(&mut buffer).is_empty());
        assert!(!buffer.is_empty());

        buffer.push_str("\"message\":\"hi\"}\n\n");
        let payloads = drain_events(&mut buffer);
        assert_eq!(payloads.len(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_crlf_event_boundaries() {
        let mut buffer = String::from(
            "data: {\"chatId\":\"c1\",\"id\":\"m1\",\"message\":\"hi\"}\r\n\r\n",
        );
        let payloads = drain_events(&mut buffer);
        assert_eq!(payloads.len(), 1);
        assert!(buffer.is_empty());

        // CRLF pair split across two reads.
        let mut buffer = String::from("data: {}\r");
        assert!(drain_events(&mut buffer).is_empty());
        buffer.push_str("\n\r\n");
        assert_eq!(drain_events(&mut buffer), vec!["{}".to_string()]);
    }

    #[test]
    fn test_non_data_lines_ignored() {
        let mut buffer = String::from(": keep-alive\nevent: message\ndata: {}\n\n");
        let payloads = drain_events(&mut buffer);
        assert_eq!(payloads, vec!["{}".to_string()]);
    }
}

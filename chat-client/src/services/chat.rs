use crate::http::ApiClient;
use crate::models::chat::{
    AddChatRequest, Chat, ChatListResponse, MessagesResponse, UpdateChatTitleRequest,
};
use crate::pagination::PageQuery;
use client_core::error::ApiError;

#[derive(Clone)]
pub struct ChatService {
    client: ApiClient,
}

impl ChatService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Paginated chat list for the sidebar, newest first server-side.
    pub async fn history(&self, query: &PageQuery) -> Result<ChatListResponse, ApiError> {
        self.client.get_json("chats", &query.params()).await
    }

    pub async fn create(&self, request: &AddChatRequest) -> Result<Chat, ApiError> {
        self.client.post_json("chats", request).await
    }

    pub async fn get(&self, id: &str) -> Result<Chat, ApiError> {
        self.client.get_json(&format!("chats/{id}"), &[]).await
    }

    pub async fn update_title(&self, id: &str, title: impl Into<String>) -> Result<Chat, ApiError> {
        let request = UpdateChatTitleRequest {
            title: title.into(),
        };
        self.client
            .patch_json(&format!("chats/{id}"), &request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete(&format!("chats/{id}")).await
    }

    pub async fn messages(
        &self,
        chat_id: &str,
        query: &PageQuery,
    ) -> Result<MessagesResponse, ApiError> {
        self.client
            .get_json(&format!("chats/{chat_id}/messages"), &query.params())
            .await
    }
}

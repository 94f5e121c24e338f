use crate::http::ApiClient;
use crate::models::user::{DeleteUserResponse, UpdateUserRequest, User, UserListResponse};
use crate::pagination::PageQuery;
use client_core::error::ApiError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Clone)]
pub struct UserService {
    client: ApiClient,
}

impl UserService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &PageQuery) -> Result<UserListResponse, ApiError> {
        self.client.get_json("users", &query.params()).await
    }

    pub async fn get(&self, id: &str) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self.client.get_json(&format!("users/{id}"), &[]).await?;
        Ok(envelope.user)
    }

    pub async fn update(&self, id: &str, request: &UpdateUserRequest) -> Result<User, ApiError> {
        let envelope: UserEnvelope = self
            .client
            .put_json(&format!("users/{id}"), request)
            .await?;
        Ok(envelope.user)
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteUserResponse, ApiError> {
        self.client.delete_json(&format!("users/{id}")).await
    }
}

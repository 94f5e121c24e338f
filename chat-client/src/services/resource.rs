use crate::http::ApiClient;
use crate::models::resource::Resource;
use client_core::error::ApiError;

#[derive(Clone)]
pub struct ResourceService {
    client: ApiClient,
}

impl ResourceService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Resources belonging to a module, optionally narrowed by kind.
    pub async fn list(&self, module: &str, kind: Option<&str>) -> Result<Vec<Resource>, ApiError> {
        let mut query = Vec::new();
        if let Some(kind) = kind {
            query.push(("type", kind.to_string()));
        }
        self.client
            .get_json(&format!("resources/{module}"), &query)
            .await
    }
}

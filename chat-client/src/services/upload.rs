use crate::http::ApiClient;
use crate::models::upload::UploadResponse;
use client_core::error::ApiError;
use reqwest::multipart::{Form, Part};

#[derive(Clone)]
pub struct UploadService {
    client: ApiClient,
}

impl UploadService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Upload a file as a multipart `file` field.
    ///
    /// The returned URL is what a file message part carries. Uploads are
    /// never retried.
    pub async fn upload(
        &self,
        file_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let part = Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| ApiError::BadRequest(format!("invalid mime type: {e}")))?;
        let form = Form::new().part("file", part);

        self.client.post_multipart("uploads", form).await
    }
}

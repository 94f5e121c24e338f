//! chat-client: client SDK for the chat backend.
//!
//! Wraps the REST endpoints behind typed service calls, keeps the session
//! bearer token fresh across concurrent callers, consumes the per-message
//! SSE stream, and folds streamed chunks into an ordered message log.
pub mod auth;
pub mod cache;
pub mod config;
pub mod http;
pub mod models;
pub mod pagination;
pub mod room;
pub mod services;
pub mod stream;

pub use client_core::error::ApiError;
pub use http::ApiClient;

//! Request/response records mirrored from the remote API.
pub mod auth;
pub mod chat;
pub mod resource;
pub mod upload;
pub mod user;

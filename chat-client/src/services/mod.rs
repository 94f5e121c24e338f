//! Typed wrappers over the backend's REST endpoints.
pub mod auth;
pub mod chat;
pub mod resource;
pub mod upload;
pub mod user;

pub use auth::AuthService;
pub use chat::ChatService;
pub use resource::ResourceService;
pub use upload::UploadService;
pub use user::UserService;

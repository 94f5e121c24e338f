//! client-core: Shared infrastructure for the chat client SDK.
pub mod error;
pub mod observability;
pub mod retry;

pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

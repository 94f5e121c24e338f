pub mod jwt;
pub mod session;
pub mod token_store;

pub use session::SessionGuard;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

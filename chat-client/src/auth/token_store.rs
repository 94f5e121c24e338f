use crate::models::auth::TokenPair;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

/// Storage keys, kept identical to what the web client persists under.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key-value persistence for the session token pair.
///
/// The browser client keeps these in local storage; embedders here choose
/// between [`MemoryTokenStore`] and [`FileTokenStore`], or bring their own.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);

    fn access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    fn token_pair(&self) -> Option<TokenPair> {
        Some(TokenPair {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
        })
    }

    fn set_tokens(&self, pair: &TokenPair) {
        self.set(ACCESS_TOKEN_KEY, &pair.access_token);
        self.set(REFRESH_TOKEN_KEY, &pair.refresh_token);
    }

    fn clear(&self) {
        self.remove(ACCESS_TOKEN_KEY);
        self.remove(REFRESH_TOKEN_KEY);
    }
}

/// Process-local token store; sessions end with the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().expect("token store poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .expect("token store poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().expect("token store poisoned").remove(key);
    }
}

/// Token store persisted as a JSON map on disk.
///
/// Persistence failures are logged and swallowed; the in-memory view stays
/// authoritative for the current process.
pub struct FileTokenStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable token file");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let result = serde_json::to_vec_pretty(entries)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(&self.path, bytes));

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist tokens");
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().expect("token store poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write().expect("token store poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().expect("token store poisoned");
        entries.remove(key);
        self.persist(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
        }
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.token_pair().is_none());

        store.set_tokens(&pair());
        assert_eq!(store.access_token().as_deref(), Some("access"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh"));
        assert_eq!(store.token_pair(), Some(pair()));

        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }

    #[test]
    fn test_pair_requires_both_tokens() {
        let store = MemoryTokenStore::new();
        store.set(ACCESS_TOKEN_KEY, "access");
        assert!(store.token_pair().is_none());
    }

    #[test]
    fn test_file_store_reloads() {
        let dir = std::env::temp_dir().join(format!("token-store-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tokens.json");

        {
            let store = FileTokenStore::new(path.clone());
            store.set_tokens(&pair());
        }

        let reloaded = FileTokenStore::new(path);
        assert_eq!(reloaded.token_pair(), Some(pair()));
    }
}

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::Result;
use crate::core::Credential;
use crate::storage::{TokenStorage, TOKEN_KEY};

/// Process local storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(TOKEN_KEY.to_owned(), token.into());
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Copy of the persisted entries.
    pub async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<Credential>> {
        Ok(self
            .entries
            .lock()
            .await
            .get(TOKEN_KEY)
            .map(|token| Credential::new(token.as_str())))
    }

    async fn store(&self, token: &Credential) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(TOKEN_KEY.to_owned(), token.expose().to_owned());
        Ok(())
    }

    async fn erase(&self) -> Result<()> {
        self.entries.lock().await.remove(TOKEN_KEY);
        Ok(())
    }
}

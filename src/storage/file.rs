use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::common::{debug, ErrorKind, Result};
use crate::config::filepath;
use crate::core::Credential;
use crate::storage::{TokenStorage, TOKEN_KEY};

/// Keeps the session entries as a json object in `<dir>/session.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(filepath::SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        match fs::read(&self.path).await {
            Ok(buf) => serde_json::from_slice(&buf).map_err(|err| {
                ErrorKind::StorageDecode {
                    description: format!("{}: {}", self.path.display(), err),
                }
                .into()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path).await {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
                _ => Ok(()),
            };
        }

        let buf = serde_json::to_vec(entries).map_err(|err| ErrorKind::StorageDecode {
            description: err.to_string(),
        })?;

        // Write then rename so a crash never leaves a truncated file behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, buf).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileStorage {
    async fn load(&self) -> Result<Option<Credential>> {
        let entries = self.read_entries().await?;
        Ok(entries
            .get(TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(|token| Credential::new(token.as_str())))
    }

    async fn store(&self, token: &Credential) -> Result<()> {
        let mut entries = self.read_entries().await?;
        entries.insert(TOKEN_KEY.to_owned(), token.expose().to_owned());
        self.write_entries(&entries).await?;
        debug!(path = %self.path.display(), "Token persisted");
        Ok(())
    }

    async fn erase(&self) -> Result<()> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            // An unreadable slot is dropped as a whole.
            Err(_) => BTreeMap::new(),
        };
        entries.remove(TOKEN_KEY);
        self.write_entries(&entries).await?;
        debug!(path = %self.path.display(), "Token erased");
        Ok(())
    }
}

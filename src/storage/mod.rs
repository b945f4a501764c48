//! The durable single-slot store holding the bearer token across restarts.

use async_trait::async_trait;

use crate::common::Result;
use crate::core::Credential;

mod file;
pub use file::FileStorage;

mod memory;
pub use memory::MemoryStorage;

/// Key of the persisted bearer token.
pub const TOKEN_KEY: &str = "token";

#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Persisted token, `None` when logged out.
    async fn load(&self) -> Result<Option<Credential>>;
    async fn store(&self, token: &Credential) -> Result<()>;
    /// Erase the persisted token. Erasing an empty slot is not an error.
    async fn erase(&self) -> Result<()>;
}

use std::path::Path;
use std::sync::Arc;

use tokio::fs;

use crate::client::http::HttpTransport;
use crate::client::Transport;
use crate::common::{debug, Result};
use crate::config::Config;
use crate::core::SessionStore;
use crate::gateway::{ForcingPolicy, Gateway};
use crate::navigation::{self, Access, Location, Route, HOME_PATH};
use crate::storage::{FileStorage, TokenStorage};

/// Everything the front end needs once the session has been restored.
pub struct Context {
    pub session: Arc<SessionStore>,
    pub gateway: Gateway,
    pub location: Arc<Location>,
    login_path: String,
}

impl Context {
    /// Route guard for the current session, redirecting to the configured
    /// login page.
    pub fn guard(&self, route: Route) -> Access<'_> {
        navigation::guard(route, &self.session.snapshot(), &self.login_path)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

pub struct Initializer {
    pub config: Config,
    transport: Option<Arc<dyn Transport>>,
    storage: Option<Arc<dyn TokenStorage>>,
    initial_page: String,
}

impl std::fmt::Debug for Initializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Initializer")
            .field("config", &self.config)
            .field("initial_page", &self.initial_page)
            .finish_non_exhaustive()
    }
}

impl Initializer {
    pub async fn load_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let f = fs::File::open(path).await?;
        let config = serde_yaml::from_reader::<_, Config>(f.into_std().await)?;

        Ok(Initializer::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            transport: None,
            storage: None,
            initial_page: HOME_PATH.to_owned(),
        }
    }

    /// Use `transport` instead of an http transport built from the config.
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transport = Some(transport);
    }

    /// Use `storage` instead of the file storage in the configured directory.
    pub fn set_storage(&mut self, storage: Arc<dyn TokenStorage>) {
        self.storage = Some(storage);
    }

    pub fn set_initial_page(&mut self, path: impl Into<String>) {
        self.initial_page = path.into();
    }

    pub async fn init_dir(&self) -> Result<()> {
        if self.storage.is_none() {
            let dir = self.config.session.storage_dir();
            debug!("Create storage dir {}", dir.display());
            fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Wire transport, storage, session and gateway together and restore the
    /// persisted session.
    pub async fn build(self) -> crate::Result<Context> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::with_timeout(
                self.config.client.base_url(),
                self.config.client.timeout(),
            )?),
        };
        let storage: Arc<dyn TokenStorage> = match self.storage {
            Some(storage) => storage,
            None => Arc::new(FileStorage::new(self.config.session.storage_dir())),
        };

        let session = Arc::new(SessionStore::start(transport.clone(), storage).await);
        let login_path = self.config.session.login_path().to_owned();
        let location = Arc::new(Location::new(self.initial_page));
        let gateway = Gateway::new(
            session.clone(),
            transport,
            location.clone(),
            ForcingPolicy::new(login_path.as_str()),
        );

        Ok(Context {
            session,
            gateway,
            location,
            login_path,
        })
    }
}

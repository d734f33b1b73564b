use std::sync::Arc;

use tracing::info;

use self::api::ApiClient;
use self::config::ClientConfig;
use self::error::Result;
use self::session::SessionStore;
use self::storage::{DurableStorage, FileStorage};

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod list;
pub mod resource;
pub mod router;
pub mod session;
pub mod storage;
pub mod timeline;
pub mod validate;

/// Everything a screen needs: the configuration, the single session and an
/// API client bound to it.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ClientConfig>,
    pub session: SessionStore,
    pub api: ApiClient,
}

impl AppContext {
    /// Builds the context over the session file and restores the session.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let path = config.session_file_path()?;
        info!(path = %path.display(), "Using session file");
        Self::with_storage(config, Arc::new(FileStorage::new(path)))
    }

    pub fn with_storage(config: ClientConfig, storage: Arc<dyn DurableStorage>) -> Result<Self> {
        let session = SessionStore::new(storage);
        session.restore();
        let api = ApiClient::new(config.clone(), session.clone())?;
        Ok(Self {
            config: Arc::new(config),
            session,
            api,
        })
    }
}

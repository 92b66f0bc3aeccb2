//! Application root: builds every component once and hands out the stores.

use std::sync::Arc;

use tracing::info;

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::services::{AuthService, CommentService, EventService};
use crate::storage::{FileStorage, MemoryStorage, SessionStorage};
use crate::stores::{AuthStore, CommentStore, EventStore};
use crate::transport::{ReqwestTransport, Transport};

/// Owns the wiring. Two `App`s never share state unless they are given the
/// same storage.
#[derive(Clone)]
pub struct App {
    pub client: ApiClient,
    pub catalogue: EventService,
    pub auth: AuthStore,
    pub events: EventStore,
    pub comments: CommentStore,
}

impl App {
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let client = ApiClient::new(&config.base_url, transport, Arc::clone(&storage));
        let catalogue = EventService::new(client.clone());
        let auth = AuthStore::new(AuthService::new(client.clone()), storage);
        let events = EventStore::new(catalogue.clone(), config.loading_timeout);
        let comments = CommentStore::new(CommentService::new(client.clone()), auth.clone());

        Self {
            client,
            catalogue,
            auth,
            events,
            comments,
        }
    }

    /// Real HTTP transport; file-backed session storage when
    /// `config.session_dir` is set, in-memory otherwise.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
        let storage: Arc<dyn SessionStorage> = match &config.session_dir {
            Some(dir) => Arc::new(FileStorage::new(dir)),
            None => Arc::new(MemoryStorage::new()),
        };
        Ok(Self::new(config, transport, storage))
    }

    /// Restore the session, then run the initial selection cascade.
    pub async fn start(&self) {
        info!(base_url = self.client.base_url(), "starting");
        self.auth.initialize_auth();
        self.events.initialize().await;
    }
}

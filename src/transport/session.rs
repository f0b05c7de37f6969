// Per-host session pool — lazy creation, process-wide reuse.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{FetchError, FetchResult};
use crate::transport::traits::{NdnSession, SessionFactory};

/// Where and how to reach the hub serving a given host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportLocator {
    pub host: String,
    pub port: u16,
    pub secure: bool,
}

impl TransportLocator {
    pub fn new(host: String, port: u16, secure: bool) -> Self {
        Self { host, port, secure }
    }

    /// Rendered locator: secure WebSocket endpoint or the bare host.
    pub fn url(&self) -> String {
        if self.secure {
            format!("wss://{}/ws/", self.host)
        } else {
            self.host.clone()
        }
    }
}

/// Caches one live session per destination host.
///
/// Sessions are created lazily on first use and never torn down here; their
/// lifecycle belongs to the transport collaborator. Multiple concurrent
/// fetches to the same host share the cached session.
pub struct SessionPool {
    factory: Arc<dyn SessionFactory>,
    sessions: RwLock<HashMap<String, Arc<dyn NdnSession>>>,
    connect_lock: Mutex<()>,
}

impl SessionPool {
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            sessions: RwLock::new(HashMap::new()),
            connect_lock: Mutex::new(()),
        }
    }

    /// Existing session for the locator's host, or a freshly connected one.
    pub async fn get(&self, locator: &TransportLocator) -> FetchResult<Arc<dyn NdnSession>> {
        if let Some(session) = self.sessions.read().get(&locator.host) {
            return Ok(Arc::clone(session));
        }

        // Serialize connects; re-check after acquiring so concurrent fetches
        // to one host never create two sessions.
        let _guard = self.connect_lock.lock().await;
        if let Some(session) = self.sessions.read().get(&locator.host) {
            return Ok(Arc::clone(session));
        }

        let session = self
            .factory
            .connect(locator)
            .await
            .map_err(FetchError::from)?;
        info!("session established host={} locator={}", locator.host, locator.url());
        self.sessions
            .write()
            .insert(locator.host.clone(), Arc::clone(&session));
        Ok(session)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

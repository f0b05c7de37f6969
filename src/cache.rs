// Cache gateway — best-effort wrapper over an optional external cache store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::CACHE_NAME;

#[derive(Debug, Error, Clone)]
#[error("cache store error: {0}")]
pub struct CacheError(pub String);

/// Match options passed to the store; gateway lookups set all three so that
/// entries are keyed by URI path alone.
#[derive(Debug, Clone, Copy)]
pub struct CacheLookupOptions {
    pub ignore_search: bool,
    pub ignore_method: bool,
    pub ignore_vary: bool,
}

impl CacheLookupOptions {
    pub fn ignore_all() -> Self {
        Self {
            ignore_search: true,
            ignore_method: true,
            ignore_vary: true,
        }
    }
}

/// One named cache within a store.
#[async_trait]
pub trait CacheHandle: Send + Sync {
    async fn match_uri(
        &self,
        uri: &str,
        options: &CacheLookupOptions,
    ) -> Result<Option<Bytes>, CacheError>;

    async fn put(&self, uri: &str, body: Bytes) -> Result<(), CacheError>;
}

/// External cache store collaborator. Optional capability.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheHandle>, CacheError>;
}

/// Best-effort cache facade used on the fetch path.
///
/// Store failures are swallowed: a lookup error behaves like a miss and an
/// insert error is dropped after a log line. Without a configured store,
/// lookups always miss and inserts are no-ops.
pub struct CacheGateway {
    store: Option<Arc<dyn CacheStore>>,
}

impl CacheGateway {
    pub fn new(store: Option<Arc<dyn CacheStore>>) -> Self {
        Self { store }
    }

    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub async fn lookup(&self, uri: &str) -> Option<Bytes> {
        let store = self.store.as_ref()?;
        let handle = match store.open(CACHE_NAME).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("cache open failed, treating as miss: {e}");
                return None;
            }
        };
        match handle.match_uri(uri, &CacheLookupOptions::ignore_all()).await {
            Ok(Some(body)) => {
                debug!("{uri} is served from cache");
                Some(body)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("cache match failed for {uri}, treating as miss: {e}");
                None
            }
        }
    }

    pub async fn insert(&self, uri: &str, body: Bytes) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let handle = match store.open(CACHE_NAME).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("cache open failed, dropping insert: {e}");
                return;
            }
        };
        if let Err(e) = handle.put(uri, body).await {
            warn!("cache put failed for {uri}: {e}");
        }
    }
}

/// In-memory cache store keyed by URI. Serves embedders without a persistent
/// store and the integration tests.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn strip_query(uri: &str) -> &str {
    uri.split_once('?').map_or(uri, |(path, _)| path)
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn open(&self, _name: &str) -> Result<Arc<dyn CacheHandle>, CacheError> {
        Ok(Arc::new(MemoryCacheHandle {
            entries: Arc::clone(&self.entries),
        }))
    }
}

struct MemoryCacheHandle {
    entries: Arc<RwLock<HashMap<String, Bytes>>>,
}

#[async_trait]
impl CacheHandle for MemoryCacheHandle {
    async fn match_uri(
        &self,
        uri: &str,
        options: &CacheLookupOptions,
    ) -> Result<Option<Bytes>, CacheError> {
        let entries = self.entries.read();
        if let Some(body) = entries.get(uri) {
            return Ok(Some(body.clone()));
        }
        if options.ignore_search {
            let probe = strip_query(uri);
            for (key, body) in entries.iter() {
                if strip_query(key) == probe {
                    return Ok(Some(body.clone()));
                }
            }
        }
        Ok(None)
    }

    async fn put(&self, uri: &str, body: Bytes) -> Result<(), CacheError> {
        self.entries.write().insert(uri.to_string(), body);
        Ok(())
    }
}

use std::time::Duration;

use serde::Deserialize;

use crate::error::{FetchError, FetchResult};

/// Lifetime of a single interest before it is considered timed out.
pub const INTEREST_LIFETIME_MS: u64 = 1000;

/// Per-segment retry budget for primary content fetches.
pub const CONTENT_MAX_RETRIES: u32 = 50;

/// Retry budget for the fire-and-forget telemetry interest (single-shot).
pub const TELEMETRY_MAX_RETRIES: u32 = 0;

/// Status code reported on every successful response.
pub const HTTP_SUCCESS_CODE: u16 = 200;

/// Synthetic header flagging a response served from the local cache.
pub const FROM_CACHE_HEADER: &str = "x-ndn-from-cache";

/// Name under which the cache store is opened.
pub const CACHE_NAME: &str = "ndn-video-cache";

/// Port on which the hub speaks secure WebSocket transport.
pub const SECURE_TRANSPORT_PORT: u16 = 443;

/// Top-level configuration for the fetch engine.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Name prefix under which content is published (e.g. `/ndn/video`).
    pub path_prefix: String,
    /// Parallel prefix used for telemetry names (e.g. `/ndn/video-stats`).
    pub telemetry_prefix: String,
    /// Destination port; 443 selects the secure WebSocket locator.
    pub port: u16,
    /// Public IP address of this client, reported verbatim in telemetry.
    pub public_ip: String,
}

impl FetchConfig {
    /// Reject configurations no request should ever be issued with.
    pub fn validate(&self) -> FetchResult<()> {
        if self.path_prefix.trim_matches('/').is_empty() {
            return Err(FetchError::Configuration(
                "path_prefix must be a non-empty name prefix".into(),
            ));
        }
        Ok(())
    }

    pub fn interest_lifetime(&self) -> Duration {
        Duration::from_millis(INTEREST_LIFETIME_MS)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            path_prefix: String::new(),
            telemetry_prefix: String::new(),
            port: SECURE_TRANSPORT_PORT,
            public_ip: String::new(),
        }
    }
}

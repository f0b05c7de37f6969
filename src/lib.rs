// Cache-first media segment retrieval over a name-based (NDN) network.
//
// The engine sits behind a player's scheme registration: given an HTTP-style
// URI it serves the bytes from the local cache when possible, otherwise
// translates the URI to a content name and retrieves it over a shared
// per-host session with a pipelined, congestion-controlled fetch, then
// reports fetch telemetry upstream.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod name;
pub mod plugin;
pub mod transport;
pub mod types;

pub use cache::{CacheGateway, CacheStore, MemoryCacheStore};
pub use config::FetchConfig;
pub use engine::fetch::{FetchEngine, FetchOperation};
pub use engine::telemetry::{PlaybackSnapshot, PlaybackState, PlaybackStatsSource, StateEntry};
pub use error::{FetchError, FetchResult, NetworkErrorKind};
pub use name::ContentName;
pub use types::{FetchOutcome, FetchRequest, FetchResponse, RequestClass};

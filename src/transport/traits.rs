use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::name::ContentName;
use crate::transport::session::TransportLocator;

/// Failure of a single interest/data exchange, as reported by the session.
#[derive(Debug, Error, Clone)]
pub enum InterestError {
    #[error("interest timed out after {0:?}")]
    Timeout(Duration),
    #[error("interest rejected: {0}")]
    Nack(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Payload of one satisfied interest.
///
/// `final_segment` carries the last segment number of the object when the
/// producer published it segmented; `None` means the data is self-contained.
#[derive(Debug, Clone)]
pub struct SegmentData {
    pub payload: Bytes,
    pub final_segment: Option<u64>,
}

impl SegmentData {
    pub fn single(payload: Bytes) -> Self {
        Self {
            payload,
            final_segment: None,
        }
    }
}

/// One live session to a hub. Owned by the external transport collaborator;
/// safe for concurrent use by multiple pipelines. Wire framing is the
/// collaborator's concern.
#[async_trait]
pub trait NdnSession: Send + Sync {
    /// Issue one interest for `name` segment `segment` with a bounded
    /// lifetime and await the matching data.
    async fn fetch_segment(
        &self,
        name: &ContentName,
        segment: u64,
        lifetime: Duration,
    ) -> Result<SegmentData, InterestError>;
}

/// Creates sessions; the engine calls it at most once per distinct host.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn connect(
        &self,
        locator: &TransportLocator,
    ) -> Result<std::sync::Arc<dyn NdnSession>, InterestError>;
}

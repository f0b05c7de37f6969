// Scripted mock hub shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};

use ndn_fetch_engine::name::ContentName;
use ndn_fetch_engine::transport::session::TransportLocator;
use ndn_fetch_engine::transport::traits::{
    InterestError, NdnSession, SegmentData, SessionFactory,
};
use ndn_fetch_engine::FetchConfig;

/// Per-name scripted behavior of the mock hub.
pub enum Script {
    /// Self-contained data (no segmentation marker).
    Single(Bytes),
    /// Segmented object; every data carries the final segment number.
    Object(Vec<Bytes>),
    /// Every interest times out.
    AlwaysTimeout,
    /// Time out `remaining` interests, then serve.
    TimeoutsThenServe { remaining: AtomicU32, data: Bytes },
    /// Serve after a delay (lets tests cancel mid-flight).
    Delayed { delay: Duration, data: Bytes },
}

pub struct MockSession {
    scripts: RwLock<HashMap<String, Arc<Script>>>,
    log: Mutex<Vec<(String, u64)>>,
}

impl MockSession {
    fn new() -> Self {
        Self {
            scripts: RwLock::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn script(&self, name: &str, script: Script) {
        self.scripts
            .write()
            .insert(name.to_string(), Arc::new(script));
    }

    /// Every (name, segment) interest seen, in arrival order.
    pub fn interests(&self) -> Vec<(String, u64)> {
        self.log.lock().clone()
    }

    pub fn interest_count(&self) -> usize {
        self.log.lock().len()
    }

    /// Distinct full names seen under `prefix`, in arrival order.
    pub fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.log
            .lock()
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl NdnSession for MockSession {
    async fn fetch_segment(
        &self,
        name: &ContentName,
        segment: u64,
        lifetime: Duration,
    ) -> Result<SegmentData, InterestError> {
        let key = name.to_string();
        self.log.lock().push((key.clone(), segment));

        let script = self.scripts.read().get(&key).cloned();
        match script.as_deref() {
            // Unknown names (telemetry included) get dummy data back.
            None => Ok(SegmentData::single(Bytes::from_static(b"dummy"))),
            Some(Script::Single(data)) => Ok(SegmentData::single(data.clone())),
            Some(Script::Object(segments)) => segments
                .get(segment as usize)
                .map(|payload| SegmentData {
                    payload: payload.clone(),
                    final_segment: Some(segments.len() as u64 - 1),
                })
                .ok_or_else(|| InterestError::Nack(format!("no segment {segment} of {key}"))),
            Some(Script::AlwaysTimeout) => Err(InterestError::Timeout(lifetime)),
            Some(Script::TimeoutsThenServe { remaining, data }) => {
                if remaining
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    Err(InterestError::Timeout(lifetime))
                } else {
                    Ok(SegmentData::single(data.clone()))
                }
            }
            Some(Script::Delayed { delay, data }) => {
                tokio::time::sleep(*delay).await;
                Ok(SegmentData::single(data.clone()))
            }
        }
    }
}

/// Factory handing out one shared session, counting creation events.
pub struct MockHub {
    session: Arc<MockSession>,
    connects: AtomicUsize,
}

impl MockHub {
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for MockHub {
    async fn connect(
        &self,
        _locator: &TransportLocator,
    ) -> Result<Arc<dyn NdnSession>, InterestError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.session) as Arc<dyn NdnSession>)
    }
}

pub fn new_hub() -> (Arc<MockHub>, Arc<MockSession>) {
    let session = Arc::new(MockSession::new());
    let hub = Arc::new(MockHub {
        session: Arc::clone(&session),
        connects: AtomicUsize::new(0),
    });
    (hub, session)
}

pub fn test_config() -> FetchConfig {
    FetchConfig {
        path_prefix: "/ndn/video".into(),
        telemetry_prefix: "/ndn/video-stats".into(),
        port: 443,
        public_ip: "203.0.113.7".into(),
    }
}

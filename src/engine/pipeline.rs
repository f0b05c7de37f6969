// Pipelined segment fetch with cubic congestion control and per-segment retry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{CONTENT_MAX_RETRIES, INTEREST_LIFETIME_MS, TELEMETRY_MAX_RETRIES};
use crate::engine::cubic::{CubicConfig, CubicWindow};
use crate::engine::stats::FetchSessionStats;
use crate::error::{FetchError, FetchResult, NetworkErrorKind};
use crate::name::ContentName;
use crate::transport::traits::{InterestError, NdnSession, SegmentData};

/// Retry and concurrency policy for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelinePolicy {
    pub interest_lifetime: Duration,
    pub max_retries: u32,
    pub cubic: CubicConfig,
}

impl PipelinePolicy {
    /// Policy for primary content fetches.
    pub fn content() -> Self {
        Self {
            interest_lifetime: Duration::from_millis(INTEREST_LIFETIME_MS),
            max_retries: CONTENT_MAX_RETRIES,
            cubic: CubicConfig::default(),
        }
    }

    /// Single-shot policy for the telemetry interest.
    pub fn telemetry() -> Self {
        Self {
            max_retries: TELEMETRY_MAX_RETRIES,
            ..Self::content()
        }
    }
}

/// Fetches one named object as an ordered sequence of segments over a shared
/// session, bounding in-flight interests with a cubic window.
pub struct SegmentFetchPipeline {
    session: Arc<dyn NdnSession>,
    policy: PipelinePolicy,
    stats: Arc<FetchSessionStats>,
    cancel: CancellationToken,
}

impl SegmentFetchPipeline {
    pub fn new(
        session: Arc<dyn NdnSession>,
        policy: PipelinePolicy,
        stats: Arc<FetchSessionStats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            policy,
            stats,
            cancel,
        }
    }

    /// Retrieve the full object published under `name`.
    ///
    /// Segment 0 is fetched first; its `final_segment` marker drives the
    /// pipelined retrieval of the rest. Stats accumulated so far stay
    /// readable through the shared accumulator even when this fails.
    pub async fn fetch(&self, name: &ContentName) -> FetchResult<Bytes> {
        let window = Arc::new(Mutex::new(CubicWindow::new(self.policy.cubic)));

        let (_, first) = fetch_segment_with_retry(
            Arc::clone(&self.session),
            name.clone(),
            0,
            self.policy,
            Arc::clone(&self.stats),
            Arc::clone(&window),
            self.cancel.clone(),
        )
        .await?;

        let final_segment = match first.final_segment {
            None | Some(0) => return Ok(first.payload),
            Some(n) => n,
        };

        let mut segments: Vec<Option<Bytes>> = vec![None; final_segment as usize + 1];
        segments[0] = Some(first.payload);

        let mut inflight: JoinSet<FetchResult<(u64, SegmentData)>> = JoinSet::new();
        let mut next = 1u64;

        loop {
            if self.cancel.is_cancelled() {
                inflight.abort_all();
                return Err(FetchError::Aborted);
            }

            while next <= final_segment && inflight.len() < window.lock().window() {
                inflight.spawn(fetch_segment_with_retry(
                    Arc::clone(&self.session),
                    name.clone(),
                    next,
                    self.policy,
                    Arc::clone(&self.stats),
                    Arc::clone(&window),
                    self.cancel.clone(),
                ));
                next += 1;
            }

            let joined = tokio::select! {
                joined = inflight.join_next() => joined,
                _ = self.cancel.cancelled() => {
                    inflight.abort_all();
                    return Err(FetchError::Aborted);
                }
            };

            match joined {
                None => break,
                Some(Ok(Ok((segment, data)))) => {
                    segments[segment as usize] = Some(data.payload);
                }
                Some(Ok(Err(e))) => {
                    inflight.abort_all();
                    return Err(e);
                }
                Some(Err(join_err)) => {
                    inflight.abort_all();
                    return Err(FetchError::network(
                        NetworkErrorKind::Transport,
                        format!("pipeline worker failed: {join_err}"),
                    ));
                }
            }
        }

        let mut assembled = BytesMut::new();
        for (i, segment) in segments.into_iter().enumerate() {
            let payload = segment.ok_or_else(|| {
                FetchError::network(
                    NetworkErrorKind::Transport,
                    format!("segment {i} of {name} missing after pipeline completion"),
                )
            })?;
            assembled.extend_from_slice(&payload);
        }
        Ok(assembled.freeze())
    }
}

/// One segment, retried up to the policy budget. Counts a retransmission per
/// re-expressed interest and a timeout/nack per failure signal; every loss
/// signal shrinks the shared window, every satisfied interest grows it.
async fn fetch_segment_with_retry(
    session: Arc<dyn NdnSession>,
    name: ContentName,
    segment: u64,
    policy: PipelinePolicy,
    stats: Arc<FetchSessionStats>,
    window: Arc<Mutex<CubicWindow>>,
    cancel: CancellationToken,
) -> FetchResult<(u64, SegmentData)> {
    let mut last_err = None;

    for attempt in 0..=policy.max_retries {
        if cancel.is_cancelled() {
            return Err(FetchError::Aborted);
        }
        if attempt > 0 {
            stats.record_retransmit();
        }

        let issued = Instant::now();
        match session
            .fetch_segment(&name, segment, policy.interest_lifetime)
            .await
        {
            Ok(data) => {
                stats.record_segment(issued.elapsed());
                window.lock().on_ack();
                return Ok((segment, data));
            }
            Err(e) => {
                match &e {
                    InterestError::Timeout(_) => stats.record_timeout(),
                    InterestError::Nack(_) => stats.record_nack(),
                    // Session-level failures are not retried.
                    InterestError::Transport(_) => return Err(e.into()),
                }
                window.lock().on_loss();
                debug!("segment {segment} of {name} attempt {attempt} failed: {e}");
                last_err = Some(e);
            }
        }
    }

    let err = last_err.unwrap_or_else(|| InterestError::Transport("no attempt made".into()));
    let kind = match &err {
        InterestError::Timeout(_) => NetworkErrorKind::Timeout,
        InterestError::Nack(_) => NetworkErrorKind::Nack,
        InterestError::Transport(_) => NetworkErrorKind::Transport,
    };
    Err(FetchError::network(
        kind,
        format!(
            "segment {segment} of {name} failed after {} attempts: {err}",
            policy.max_retries + 1
        ),
    ))
}

// Telemetry reporting — structured stats names, fired single-shot upstream.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::engine::pipeline::{PipelinePolicy, SegmentFetchPipeline};
use crate::engine::stats::{FetchSessionStats, StatsSnapshot};
use crate::name::ContentName;
use crate::transport::session::TransportLocator;
use crate::transport::traits::NdnSession;

/// Terminal status of the fetch being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Done,
    Error,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStatus::Done => write!(f, "DONE"),
            FetchStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Playback states the host reports in its state history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Buffering,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
pub struct StateEntry {
    pub state: PlaybackState,
    pub duration_secs: f64,
}

/// Playback statistics as exposed by the host player.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSnapshot {
    pub estimated_bandwidth: f64,
    pub load_latency_secs: f64,
    pub state_history: Vec<StateEntry>,
}

/// Host collaborator supplying playback statistics for telemetry names.
pub trait PlaybackStatsSource: Send + Sync {
    fn snapshot(&self) -> PlaybackSnapshot;
}

/// Failures local to telemetry; always contained, never surfaced.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("telemetry_prefix is not configured")]
    MissingPrefix,
    #[error("content name {0} is not under the configured prefix")]
    NameOutsidePrefix(ContentName),
}

/// Durations of rebuffering events, excluding exactly the first buffering
/// entry (the startup buffering period), regardless of how many follow.
pub fn rebuffering_events(history: &[StateEntry]) -> Vec<f64> {
    history
        .iter()
        .filter(|entry| entry.state == PlaybackState::Buffering)
        .skip(1)
        .map(|entry| entry.duration_secs)
        .collect()
}

/// Build the telemetry name: the parallel telemetry prefix, the content
/// name's suffix under the content prefix, then `key=value` components in
/// fixed order.
#[allow(clippy::too_many_arguments)]
pub fn build_telemetry_name(
    status: FetchStatus,
    name: &ContentName,
    config: &FetchConfig,
    locator: &TransportLocator,
    stats: &StatsSnapshot,
    playback: Option<&PlaybackSnapshot>,
    elapsed_ms: u64,
    session_id: u64,
) -> Result<ContentName, TelemetryError> {
    if config.telemetry_prefix.trim_matches('/').is_empty() {
        return Err(TelemetryError::MissingPrefix);
    }
    let content_prefix = ContentName::from_path(&config.path_prefix);
    let suffix = name
        .strip_prefix(&content_prefix)
        .ok_or_else(|| TelemetryError::NameOutsidePrefix(name.clone()))?;

    // Missing playback source degrades to zeros rather than failing the fetch.
    let default_playback = PlaybackSnapshot::default();
    let playback = playback.unwrap_or(&default_playback);
    let rebufferings = rebuffering_events(&playback.state_history);

    let mut out = ContentName::from_path(&config.telemetry_prefix);
    for component in suffix {
        out.push(component.clone());
    }
    out.push(format!("status={status}"));
    out.push(format!("hub={}", locator.url()));
    out.push(format!("ip={}", config.public_ip));
    out.push(format!("estBw={}", playback.estimated_bandwidth.round() as i64));
    out.push(format!("nRetransmissions={}", stats.n_retransmitted));
    out.push(format!("nTimeouts={}", stats.n_timeouts));
    out.push(format!("nNack={}", stats.n_nacks));
    out.push(format!("nSegments={}", stats.n_segments));
    out.push(format!("delay={elapsed_ms}"));
    out.push(format!("avgRtt={:.3}", stats.avg_rtt_ms));
    out.push(format!("avgJitter={:.3}", stats.avg_jitter_ms));
    out.push(format!("session={session_id}"));
    out.push(format!("startupDelay={}", playback.load_latency_secs));
    out.push(format!("rebufferings={}", rebufferings.len()));
    for duration in rebufferings {
        out.push(format!("bufferingDuration={duration}"));
    }
    Ok(out)
}

/// Fire-and-forget telemetry dispatch.
///
/// Its interest is issued with zero retries purely so the matching (dummy)
/// data clears pending-entry bookkeeping upstream; the result is discarded.
pub struct TelemetryReporter {
    config: FetchConfig,
    session: Arc<dyn NdnSession>,
    playback: Option<Arc<dyn PlaybackStatsSource>>,
    session_id: u64,
}

impl TelemetryReporter {
    pub fn new(
        config: FetchConfig,
        session: Arc<dyn NdnSession>,
        playback: Option<Arc<dyn PlaybackStatsSource>>,
        session_id: u64,
    ) -> Self {
        Self {
            config,
            session,
            playback,
            session_id,
        }
    }

    pub async fn report(
        &self,
        status: FetchStatus,
        name: &ContentName,
        started: Instant,
        locator: &TransportLocator,
        stats: &StatsSnapshot,
    ) {
        let playback = self.playback.as_ref().map(|source| source.snapshot());
        let telemetry_name = match build_telemetry_name(
            status,
            name,
            &self.config,
            locator,
            stats,
            playback.as_ref(),
            started.elapsed().as_millis() as u64,
            self.session_id,
        ) {
            Ok(telemetry_name) => telemetry_name,
            Err(e) => {
                warn!("telemetry name build failed, dropping report: {e}");
                return;
            }
        };

        let pipeline = SegmentFetchPipeline::new(
            Arc::clone(&self.session),
            PipelinePolicy::telemetry(),
            Arc::new(FetchSessionStats::new()),
            CancellationToken::new(),
        );
        match pipeline.fetch(&telemetry_name).await {
            Ok(_) => debug!("telemetry dispatched: {telemetry_name}"),
            Err(e) => debug!("telemetry dispatch failed (ignored): {e}"),
        }
    }
}

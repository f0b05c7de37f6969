// Fetch orchestration — cache-first lookup, pipeline fetch, telemetry, abort.

use std::sync::Arc;
use std::time::Instant;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::{CacheGateway, CacheStore};
use crate::config::FetchConfig;
use crate::engine::pipeline::{PipelinePolicy, SegmentFetchPipeline};
use crate::engine::stats::FetchSessionStats;
use crate::engine::telemetry::{FetchStatus, PlaybackStatsSource, TelemetryReporter};
use crate::error::{FetchError, FetchResult, NetworkErrorKind};
use crate::name::translate;
use crate::transport::session::SessionPool;
use crate::transport::traits::SessionFactory;
use crate::types::{FetchOutcome, FetchRequest, FetchResponse};

/// Everything a fetch needs, constructed once and shared by all operations.
/// Replaces ambient process-wide globals (session cache, session id).
pub struct FetchContext {
    pub config: FetchConfig,
    pub pool: SessionPool,
    pub cache: CacheGateway,
    pub playback: Option<Arc<dyn PlaybackStatsSource>>,
    /// Per-process identifier reported in every telemetry name.
    pub session_id: u64,
}

/// Public entry point of the crate.
pub struct FetchEngine {
    ctx: Arc<FetchContext>,
}

impl std::fmt::Debug for FetchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchEngine")
            .field("session_id", &self.ctx.session_id)
            .finish_non_exhaustive()
    }
}

impl FetchEngine {
    /// Validates the configuration once; an engine with an invalid config is
    /// never constructed and never issues a request.
    pub fn new(
        config: FetchConfig,
        factory: Arc<dyn SessionFactory>,
        cache_store: Option<Arc<dyn CacheStore>>,
        playback: Option<Arc<dyn PlaybackStatsSource>>,
    ) -> FetchResult<Self> {
        config.validate()?;
        let session_id = rand::thread_rng().gen_range(0..1_000_000_000_000u64);
        debug!("fetch engine session id {session_id}");
        Ok(Self {
            ctx: Arc::new(FetchContext {
                config,
                pool: SessionPool::new(factory),
                cache: CacheGateway::new(cache_store),
                playback,
                session_id,
            }),
        })
    }

    pub fn context(&self) -> &FetchContext {
        &self.ctx
    }

    /// Start one cancellable fetch. The returned operation resolves with the
    /// outcome or rejects with the first mandatory-path error.
    pub fn fetch(&self, request: FetchRequest) -> FetchOperation {
        let cancel = CancellationToken::new();
        let ctx = Arc::clone(&self.ctx);
        let token = cancel.clone();
        let handle = tokio::spawn(run_fetch(ctx, request, token));
        FetchOperation { handle, cancel }
    }
}

/// Handle to one in-flight fetch.
pub struct FetchOperation {
    handle: JoinHandle<FetchResult<FetchOutcome>>,
    cancel: CancellationToken,
}

impl FetchOperation {
    /// Signal cancellation and return immediately. Advisory: an outstanding
    /// interest is not preempted, but no completion handler will resolve the
    /// operation or take further action once the flag is observed.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub async fn wait(self) -> FetchResult<FetchOutcome> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(FetchError::network(
                NetworkErrorKind::Transport,
                format!("fetch task failed: {e}"),
            )),
        }
    }
}

async fn run_fetch(
    ctx: Arc<FetchContext>,
    request: FetchRequest,
    cancel: CancellationToken,
) -> FetchResult<FetchOutcome> {
    // Cache strictly precedes any network attempt.
    if let Some(body) = ctx.cache.lookup(&request.uri).await {
        if cancel.is_cancelled() {
            return Err(FetchError::Aborted);
        }
        return Ok(FetchOutcome::Fetched(FetchResponse::from_cache(
            body,
            &request.uri,
            request.class,
        )));
    }

    if !request.class.is_retrievable() {
        warn!(
            "unsupported request class {:?} for {}, no response produced",
            request.class, request.uri
        );
        return Ok(FetchOutcome::Unsupported);
    }

    let (locator, name) = translate(&request.uri, &ctx.config)?;
    let session = ctx.pool.get(&locator).await?;

    let stats = Arc::new(FetchSessionStats::new());
    let started = Instant::now();
    let pipeline = SegmentFetchPipeline::new(
        Arc::clone(&session),
        PipelinePolicy::content(),
        Arc::clone(&stats),
        cancel.clone(),
    );
    let result = pipeline.fetch(&name).await;

    // A canceled operation takes no further action: no cache insert, no
    // telemetry, no resolution.
    if cancel.is_cancelled() {
        return Err(FetchError::Aborted);
    }

    let reporter = TelemetryReporter::new(
        ctx.config.clone(),
        session,
        ctx.playback.clone(),
        ctx.session_id,
    );

    match result {
        Ok(body) => {
            ctx.cache.insert(&request.uri, body.clone()).await;
            reporter
                .report(FetchStatus::Done, &name, started, &locator, &stats.snapshot())
                .await;
            Ok(FetchOutcome::Fetched(FetchResponse::from_network(
                body,
                &request.uri,
                request.class,
            )))
        }
        Err(FetchError::Aborted) => Err(FetchError::Aborted),
        Err(e) => {
            reporter
                .report(FetchStatus::Error, &name, started, &locator, &stats.snapshot())
                .await;
            Err(e)
        }
    }
}

use catalog_sync_feed::{DateLeniencyEvent, FeedClient, FeedParser, FieldError};
use catalog_sync_models::{Clock, MovieRecord, ReleaseDatePolicy, SystemClock};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use crate::error::{SyncError, SyncFailure};
use crate::reconcile::{Reconciler, UpsertFailure};
use crate::store::CatalogStore;

/// Where a sync cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    Idle,
    Fetching,
    Parsing,
    Merging,
    Publishing,
    Failed,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::Fetching => "fetching",
            SyncState::Parsing => "parsing",
            SyncState::Merging => "merging",
            SyncState::Publishing => "publishing",
            SyncState::Failed => "failed",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a cycle that reached `Publishing`
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// Whole catalog after the merge, ordered by identity
    pub merged: Vec<MovieRecord>,
    pub inserted: usize,
    pub replaced: usize,
    pub store_failures: Vec<UpsertFailure>,
    pub field_errors: Vec<FieldError>,
    pub lenient_dates: Vec<DateLeniencyEvent>,
    pub duration: Duration,
}

/// Delivered to the consumer exactly once per accepted cycle
#[derive(Debug)]
pub struct SyncOutcome {
    pub cycle: u64,
    pub result: Result<SyncReport, SyncFailure>,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn summary(&self) -> CycleSummary {
        CycleSummary {
            cycle: self.cycle,
            succeeded: self.is_success(),
            merged: self.result.as_ref().map(|r| r.merged.len()).unwrap_or(0),
            duration_ms: self
                .result
                .as_ref()
                .map(|r| r.duration.as_millis() as u64)
                .unwrap_or(0),
        }
    }
}

/// Compact, serializable view of an outcome for logs and the daemon
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub cycle: u64,
    pub succeeded: bool,
    pub merged: usize,
    pub duration_ms: u64,
}

/// Sending half of the consumer's ordering context.
///
/// Outcomes arrive in the order cycles finish, which with single-flight cycles is
/// also trigger order.
#[derive(Debug, Clone)]
pub struct SyncPublisher {
    tx: mpsc::UnboundedSender<SyncOutcome>,
}

impl SyncPublisher {
    /// Publisher plus the receiver the consumer drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SyncOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Run `callback` on a dedicated task, once per outcome
    pub fn spawn_callback<F>(mut callback: F) -> (Self, JoinHandle<()>)
    where
        F: FnMut(SyncOutcome) + Send + 'static,
    {
        let (publisher, mut rx) = Self::channel();
        let handle = tokio::spawn(async move {
            while let Some(outcome) = rx.recv().await {
                callback(outcome);
            }
            debug!("Sync consumer channel closed");
        });
        (publisher, handle)
    }

    /// Returns false when the consumer has gone away
    pub fn publish(&self, outcome: SyncOutcome) -> bool {
        let cycle = outcome.cycle;
        if self.tx.send(outcome).is_err() {
            warn!(operation = "publish", cycle, "Sync consumer is gone, dropping outcome");
            return false;
        }
        true
    }
}

/// An accepted cycle running in the background
pub struct CycleHandle {
    pub cycle: u64,
    handle: JoinHandle<()>,
}

impl CycleHandle {
    /// Wait until the cycle has published and returned to `Idle`
    pub async fn wait(self) -> Result<(), JoinError> {
        self.handle.await
    }
}

#[derive(Debug)]
struct CycleTracker {
    state: SyncState,
    started: u64,
    completed: u64,
}

fn lock_tracker(tracker: &Mutex<CycleTracker>) -> MutexGuard<'_, CycleTracker> {
    // The tracker is plain data, a panic mid-update cannot leave it inconsistent
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owns the state of one in-flight cycle.
///
/// `finish` publishes and returns to `Idle` under the tracker lock, so a new
/// trigger can never observe `Idle` before the previous outcome was sent. Dropping
/// an unfinished guard (task panic) still publishes `Aborted` and resets to `Idle`.
struct CycleGuard {
    tracker: Arc<Mutex<CycleTracker>>,
    publisher: SyncPublisher,
    cycle: u64,
    finished: bool,
}

impl CycleGuard {
    fn enter(&self, state: SyncState) {
        let mut tracker = lock_tracker(&self.tracker);
        debug!(operation = "sync_state", cycle = self.cycle, from = %tracker.state, to = %state, "Sync state change");
        tracker.state = state;
    }

    fn finish(mut self, result: Result<SyncReport, SyncFailure>) {
        self.finished = true;
        self.complete(result);
    }

    fn complete(&self, result: Result<SyncReport, SyncFailure>) {
        let mut tracker = lock_tracker(&self.tracker);
        self.publisher.publish(SyncOutcome {
            cycle: self.cycle,
            result,
        });
        tracker.completed += 1;
        tracker.state = SyncState::Idle;
        debug!(operation = "sync_state", cycle = self.cycle, to = %SyncState::Idle, "Sync cycle closed");
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if !self.finished {
            error!(operation = "sync", cycle = self.cycle, status = "aborted", "Sync task ended unexpectedly");
            self.complete(Err(SyncFailure::Aborted));
        }
    }
}

/// Everything a cycle needs, cloned into the spawned task
#[derive(Clone)]
struct CyclePipeline {
    client: Arc<dyn FeedClient>,
    reconciler: Reconciler,
    feed_url: Url,
    clock: Arc<dyn Clock>,
    policy: ReleaseDatePolicy,
}

impl CyclePipeline {
    #[instrument(name = "sync_cycle", skip_all, fields(cycle = guard.cycle))]
    async fn run(self, guard: CycleGuard) {
        let start = Instant::now();
        info!(
            operation = "sync_start",
            url = %self.feed_url,
            "Starting sync (Fetch → Parse → Merge → Publish)"
        );

        match self.execute(&guard, start).await {
            Ok(report) => {
                guard.enter(SyncState::Publishing);
                info!(
                    operation = "sync",
                    status = "success",
                    merged = report.merged.len(),
                    inserted = report.inserted,
                    replaced = report.replaced,
                    rejected = report.field_errors.len(),
                    lenient_dates = report.lenient_dates.len(),
                    store_failures = report.store_failures.len(),
                    duration_ms = report.duration.as_millis() as u64,
                    "Sync cycle completed"
                );
                guard.finish(Ok(report));
            }
            Err(failure) => {
                guard.enter(SyncState::Failed);
                error!(
                    operation = "sync",
                    status = "error",
                    error = %failure,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Sync cycle failed"
                );
                guard.finish(Err(failure));
            }
        }
    }

    async fn execute(&self, guard: &CycleGuard, start: Instant) -> Result<SyncReport, SyncFailure> {
        let raw = self.client.fetch(&self.feed_url).await?;
        debug!("Fetched {} bytes from {}", raw.len(), self.feed_url);

        guard.enter(SyncState::Parsing);
        let parsed = FeedParser::new(self.clock.as_ref(), self.policy).parse(&raw)?;
        drop(raw);

        guard.enter(SyncState::Merging);
        let reconciled = self.reconciler.reconcile(parsed.records).await?;

        Ok(SyncReport {
            merged: reconciled.merged,
            inserted: reconciled.inserted,
            replaced: reconciled.replaced,
            store_failures: reconciled.failures,
            field_errors: parsed.field_errors,
            lenient_dates: parsed.lenient_dates,
            duration: start.elapsed(),
        })
    }
}

/// Drives fetch, parse and merge cycles against one feed and one catalog.
///
/// At most one cycle runs at a time; triggers while a cycle is in flight are
/// rejected, not queued.
pub struct SyncOrchestrator {
    pipeline: CyclePipeline,
    publisher: SyncPublisher,
    tracker: Arc<Mutex<CycleTracker>>,
}

impl SyncOrchestrator {
    pub fn new(
        client: Arc<dyn FeedClient>,
        store: Arc<dyn CatalogStore>,
        feed_url: Url,
        publisher: SyncPublisher,
    ) -> Self {
        Self {
            pipeline: CyclePipeline {
                client,
                reconciler: Reconciler::new(store),
                feed_url,
                clock: Arc::new(SystemClock),
                policy: ReleaseDatePolicy::default(),
            },
            publisher,
            tracker: Arc::new(Mutex::new(CycleTracker {
                state: SyncState::Idle,
                started: 0,
                completed: 0,
            })),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.pipeline.clock = clock;
        self
    }

    pub fn with_release_date_policy(mut self, policy: ReleaseDatePolicy) -> Self {
        self.pipeline.policy = policy;
        self
    }

    pub fn feed_url(&self) -> &Url {
        &self.pipeline.feed_url
    }

    pub fn state(&self) -> SyncState {
        lock_tracker(&self.tracker).state
    }

    pub fn completed_cycles(&self) -> u64 {
        lock_tracker(&self.tracker).completed
    }

    /// Start a cycle on a new tokio task and return immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_sync_cycle(&self) -> Result<CycleHandle, SyncError> {
        let cycle = {
            let mut tracker = lock_tracker(&self.tracker);
            if tracker.state != SyncState::Idle {
                info!(operation = "sync_trigger", state = %tracker.state, "Sync already running, trigger ignored");
                return Err(SyncError::AlreadyRunning { state: tracker.state });
            }
            tracker.state = SyncState::Fetching;
            tracker.started += 1;
            tracker.started
        };

        let guard = CycleGuard {
            tracker: Arc::clone(&self.tracker),
            publisher: self.publisher.clone(),
            cycle,
            finished: false,
        };
        let pipeline = self.pipeline.clone();
        let handle = tokio::spawn(pipeline.run(guard));

        Ok(CycleHandle { cycle, handle })
    }
}

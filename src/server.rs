// Sampling server: one background task that builds snapshots back to back and
// publishes them to a single consumer. Build failures go to a failure channel
// and delay the next attempt with exponential backoff.

use crate::builder::{SnapshotBuilder, now_unix_nanos};
use crate::error::{ServerError, SnapshotError};
use crate::models::Snapshot;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Loop timing and failure reporting.
#[derive(Debug, Clone)]
pub struct SamplingConfig {
    /// Observation window for utilization; also the lower bound on the sampling period.
    pub interval: Duration,
    pub retry_initial: Duration,
    pub retry_max: Duration,
    /// Failure events kept for a slow reader; newer events are dropped when full.
    pub failure_capacity: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            retry_initial: Duration::from_millis(100),
            retry_max: Duration::from_secs(30),
            failure_capacity: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Running,
    /// Stop requested; the loop has not returned yet.
    Stopping,
    Stopped,
}

/// A snapshot build that failed inside the loop.
#[derive(Debug)]
pub struct SamplingFailure {
    pub error: SnapshotError,
    pub consecutive_failures: u32,
    pub retry_in: Duration,
}

/// Receiving side of the snapshot channel.
///
/// Yields `None` once the server is stopped, even if a snapshot was buffered
/// but not yet received.
pub struct SnapshotStream {
    rx: mpsc::Receiver<Snapshot>,
    cancel: CancellationToken,
}

impl SnapshotStream {
    pub async fn recv(&mut self) -> Option<Snapshot> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            snapshot = self.rx.recv() => snapshot,
        }
    }
}

/// Consumer handles returned alongside a new server.
pub struct Subscription {
    pub snapshots: SnapshotStream,
    pub failures: mpsc::Receiver<SamplingFailure>,
}

struct Senders {
    snapshots: mpsc::Sender<Snapshot>,
    failures: mpsc::Sender<SamplingFailure>,
}

/// Exponential retry delay, reset after a successful build.
struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    failures: u32,
}

impl Backoff {
    fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        Self {
            initial,
            max: max.max(initial),
            current: initial,
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait before the next attempt.
    fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    fn reset(&mut self) {
        self.current = self.initial;
        self.failures = 0;
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SamplingServer {
    builder: SnapshotBuilder,
    config: SamplingConfig,
    state: Arc<Mutex<ServerState>>,
    cancel: CancellationToken,
    senders: Mutex<Option<Senders>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SamplingServer {
    pub fn new(builder: SnapshotBuilder, config: SamplingConfig) -> (Self, Subscription) {
        // Tokio has no zero-capacity channel; one slot is the closest to a rendezvous.
        let (snapshots_tx, snapshots_rx) = mpsc::channel(1);
        let (failures_tx, failures_rx) = mpsc::channel(config.failure_capacity.max(1));
        let cancel = CancellationToken::new();
        let server = Self {
            builder,
            config,
            state: Arc::new(Mutex::new(ServerState::Created)),
            cancel: cancel.clone(),
            senders: Mutex::new(Some(Senders {
                snapshots: snapshots_tx,
                failures: failures_tx,
            })),
            handle: Mutex::new(None),
        };
        let subscription = Subscription {
            snapshots: SnapshotStream {
                rx: snapshots_rx,
                cancel,
            },
            failures: failures_rx,
        };
        (server, subscription)
    }

    pub fn state(&self) -> ServerState {
        *lock(&self.state)
    }

    /// Spawns the sampling loop on the current Tokio runtime. Only valid once.
    pub fn start(&self) -> Result<(), ServerError> {
        let mut state = lock(&self.state);
        match *state {
            ServerState::Created => {}
            ServerState::Running => return Err(ServerError::AlreadyRunning),
            ServerState::Stopping | ServerState::Stopped => return Err(ServerError::Stopped),
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ServerError::NoRuntime)?;
        let Some(senders) = lock(&self.senders).take() else {
            return Err(ServerError::Stopped);
        };

        *state = ServerState::Running;
        let handle = runtime.spawn(run(
            self.builder.clone(),
            self.config.clone(),
            senders,
            self.cancel.clone(),
            self.state.clone(),
        ));
        *lock(&self.handle) = Some(handle);
        tracing::debug!(
            interval_ms = self.config.interval.as_millis() as u64,
            "sampling server started"
        );
        Ok(())
    }

    /// Signals the loop to stop without waiting for it. An in-flight build or
    /// publish is abandoned; the consumer sees no snapshot after this returns.
    pub fn stop(&self) {
        let mut state = lock(&self.state);
        match *state {
            ServerState::Created => {
                *state = ServerState::Stopped;
                lock(&self.senders).take();
            }
            ServerState::Running => *state = ServerState::Stopping,
            ServerState::Stopping | ServerState::Stopped => {}
        }
        self.cancel.cancel();
    }

    /// Stops the loop and waits for its task to finish.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            tracing::warn!(error = %e, "sampling loop task failed");
        }
    }
}

impl Drop for SamplingServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[instrument(skip_all, fields(interval_ms = config.interval.as_millis() as u64))]
async fn run(
    builder: SnapshotBuilder,
    config: SamplingConfig,
    senders: Senders,
    cancel: CancellationToken,
    state: Arc<Mutex<ServerState>>,
) {
    let mut backoff = Backoff::new(config.retry_initial, config.retry_max);
    let mut last_captured_at = i64::MIN;

    loop {
        if cancel.is_cancelled() {
            break;
        }

        // Clamp so a wall-clock step backwards never reorders timestamps.
        let captured_at = now_unix_nanos().max(last_captured_at);
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = builder.build_at(config.interval, captured_at) => result,
        };

        match result {
            Ok(snapshot) => {
                backoff.reset();
                last_captured_at = snapshot.captured_at();
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("stop requested during publish; snapshot discarded");
                        break;
                    }
                    sent = senders.snapshots.send(snapshot) => {
                        if sent.is_err() {
                            tracing::debug!("snapshot receiver dropped");
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                let retry_in = backoff.next_delay();
                tracing::warn!(
                    error = %e,
                    operation = "build_snapshot",
                    consecutive_failures = backoff.failures,
                    retry_in_ms = retry_in.as_millis() as u64,
                    "snapshot build failed"
                );
                let failure = SamplingFailure {
                    error: e,
                    consecutive_failures: backoff.failures,
                    retry_in,
                };
                if let Err(TrySendError::Full(_)) = senders.failures.try_send(failure) {
                    tracing::debug!("failure channel full; event dropped");
                }
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(retry_in) => {}
                }
            }
        }
    }

    *lock(&state) = ServerState::Stopped;
    cancel.cancel();
    tracing::debug!("sampling loop stopped");
}

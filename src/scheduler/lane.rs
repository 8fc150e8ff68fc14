//! Per-wallet/per-chain submission lanes.
//!
//! External signing tools serialize on account nonce; two overlapping
//! submissions from one wallet on one chain is the single largest source of
//! failed transactions. Every execution for a `wallet:chain` key therefore
//! flows through that key's lane: a single worker draining a FIFO channel,
//! so attempts run in submission order and never overlap. Different keys
//! share nothing and run fully concurrently.

use crate::error::LaneError;
use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};

type LaneJob = Pin<Box<dyn Future<Output = ()> + Send>>;

pub fn lane_key(wallet: &str, chain: &str) -> String {
    format!("{wallet}:{chain}")
}

struct LaneState {
    jobs: mpsc::UnboundedSender<LaneJob>,
    pending: AtomicUsize,
}

/// Counts an execution as pending from enqueue until it settles, surviving
/// panics inside the wrapped future.
struct PendingGuard {
    lane: Arc<LaneState>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.lane.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Injectable registry of submission lanes. Owned by the composition root
/// and passed to every component that needs exclusion; never a process-wide
/// singleton.
pub struct LaneRegistry {
    lanes: DashMap<String, Arc<LaneState>>,
}

impl LaneRegistry {
    pub fn new() -> Self {
        Self {
            lanes: DashMap::new(),
        }
    }

    fn lane(&self, key: &str) -> Arc<LaneState> {
        if let Some(existing) = self.lanes.get(key) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .lanes
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(spawn_lane_worker(key.to_string())));
        Arc::clone(entry.value())
    }

    /// Run `task` exclusively within the `wallet:chain` lane.
    ///
    /// Total order per key: the Nth enqueued task does not begin until the
    /// (N-1)th has settled. If the task does not settle within `timeout_ms`
    /// the caller gets `LaneError::Timeout` and is detached — the task keeps
    /// running and the lane keeps waiting for it, so overlap is impossible
    /// even for abandoned waits. Safety is never traded for liveness here.
    pub async fn run_exclusive<T, F, Fut>(
        &self,
        wallet: &str,
        chain: &str,
        timeout_ms: u64,
        task: F,
    ) -> Result<T, LaneError>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let key = lane_key(wallet, chain);
        let lane = self.lane(&key);

        lane.pending.fetch_add(1, Ordering::SeqCst);
        let pending = PendingGuard {
            lane: Arc::clone(&lane),
        };

        let (done_tx, done_rx) = oneshot::channel::<T>();
        let job: LaneJob = Box::pin(async move {
            let _pending = pending;
            let result = task().await;
            // The caller may have detached; a dropped receiver is fine.
            let _ = done_tx.send(result);
        });

        if lane.jobs.send(job).is_err() {
            return Err(LaneError::WorkerLost { key });
        }

        match timeout(Duration::from_millis(timeout_ms), done_rx).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(_)) => Err(LaneError::WorkerLost { key }),
            Err(_) => Err(LaneError::Timeout {
                key,
                waited_ms: timeout_ms,
            }),
        }
    }

    /// Executions currently queued-or-running for a key.
    pub fn pending_count(&self, wallet: &str, chain: &str) -> usize {
        self.lanes
            .get(&lane_key(wallet, chain))
            .map(|lane| lane.pending.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// All keys with pending work, for the dashboard's lock view.
    pub fn pending_lanes(&self) -> Vec<(String, usize)> {
        let mut out: Vec<(String, usize)> = self
            .lanes
            .iter()
            .filter_map(|entry| {
                let pending = entry.value().pending.load(Ordering::SeqCst);
                (pending > 0).then(|| (entry.key().clone(), pending))
            })
            .collect();
        out.sort();
        out
    }
}

impl Default for LaneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_lane_worker(key: String) -> LaneState {
    let (tx, mut rx) = mpsc::unbounded_channel::<LaneJob>();
    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            // Each job runs as its own task so a panicking attempt cannot
            // take the lane worker down with it; awaiting the handle keeps
            // the one-in-flight guarantee.
            if let Err(err) = tokio::spawn(job).await {
                if err.is_panic() {
                    tracing::error!("[LANE] {key}: attempt panicked: {err:?}");
                }
            }
        }
    });
    LaneState {
        jobs: tx,
        pending: AtomicUsize::new(0),
    }
}

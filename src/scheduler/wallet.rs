//! Per-(wallet, chain, action) recurring scheduler.
//!
//! Lifecycle: `Idle -> Scheduled -> Running -> (Scheduled | Stopped)`.
//! Stops are cooperative only: a pending timer is cancelled immediately, an
//! in-flight attempt always settles (it may already have an irreversible
//! submission outstanding) and only re-arming is suppressed.

use crate::actions::ActionType;
use crate::error::LaneError;
use crate::executor::classify::OutcomeClass;
use crate::executor::{ActionAttempt, ActionOutcome};
use crate::scheduler::lane::LaneRegistry;
use crate::scheduler::{now_ms, retry};
use crate::utils::config::ChainSettings;
use crate::utils::telemetry;
use crate::wallets::WalletIdentity;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePhase {
    Idle,
    Scheduled,
    Running,
    Stopped,
}

impl SchedulePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Scheduled,
            2 => Self::Running,
            3 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

struct EntryShared {
    phase: AtomicU8,
    next_run_at_ms: AtomicU64,
    stop: AtomicBool,
    stop_notify: Notify,
}

impl EntryShared {
    fn set_phase(&self, phase: SchedulePhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }
}

/// One live schedule entry. Owns its timer task exclusively; dropping the
/// handle detaches (never aborts) the task, so an in-flight attempt is
/// never torn down mid-submission.
pub struct WalletScheduler {
    shared: Arc<EntryShared>,
    handle: Option<JoinHandle<()>>,
}

impl WalletScheduler {
    /// Arm the entry with a jittered initial delay and hand back its handle.
    pub fn spawn(
        wallet: WalletIdentity,
        chain: Arc<ChainSettings>,
        action: ActionType,
        lanes: Arc<LaneRegistry>,
        executor: Arc<dyn ActionAttempt>,
        lane_timeout_ms: u64,
        initial_delay_ms: u64,
    ) -> Self {
        let shared = Arc::new(EntryShared {
            phase: AtomicU8::new(SchedulePhase::Idle as u8),
            next_run_at_ms: AtomicU64::new(0),
            stop: AtomicBool::new(false),
            stop_notify: Notify::new(),
        });

        let task_shared = Arc::clone(&shared);
        let handle = tokio::spawn(async move {
            run_entry(
                task_shared,
                wallet,
                chain,
                action,
                lanes,
                executor,
                lane_timeout_ms,
                initial_delay_ms,
            )
            .await;
        });

        Self {
            shared,
            handle: Some(handle),
        }
    }

    pub fn phase(&self) -> SchedulePhase {
        SchedulePhase::from_u8(self.shared.phase.load(Ordering::SeqCst))
    }

    /// Whether this entry still owns a live timer (anything but Stopped).
    pub fn is_active(&self) -> bool {
        self.phase() != SchedulePhase::Stopped
    }

    pub fn next_run_at_ms(&self) -> Option<u64> {
        match self.phase() {
            SchedulePhase::Scheduled => Some(self.shared.next_run_at_ms.load(Ordering::SeqCst)),
            _ => None,
        }
    }

    /// Request a cooperative stop. Cancels a pending timer immediately; an
    /// in-flight attempt settles first and re-arming is suppressed.
    pub fn request_stop(&self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        self.stop_notify().notify_one();
    }

    fn stop_notify(&self) -> &Notify {
        &self.shared.stop_notify
    }

    /// Await the entry's task after `request_stop`, for orderly shutdown.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_entry(
    shared: Arc<EntryShared>,
    wallet: WalletIdentity,
    chain: Arc<ChainSettings>,
    action: ActionType,
    lanes: Arc<LaneRegistry>,
    executor: Arc<dyn ActionAttempt>,
    lane_timeout_ms: u64,
    initial_delay_ms: u64,
) {
    let mut delay_ms = initial_delay_ms;
    loop {
        shared.set_phase(SchedulePhase::Scheduled);
        shared
            .next_run_at_ms
            .store(now_ms().saturating_add(delay_ms), Ordering::SeqCst);

        tokio::select! {
            _ = sleep(Duration::from_millis(delay_ms)) => {}
            _ = shared.stop_notify.notified() => {}
        }
        if shared.stop.load(Ordering::SeqCst) {
            break;
        }

        shared.set_phase(SchedulePhase::Running);
        let attempt = {
            let executor = Arc::clone(&executor);
            let wallet = wallet.clone();
            let chain = Arc::clone(&chain);
            move || async move { executor.attempt(&wallet, &chain, action).await }
        };
        let outcome = match lanes
            .run_exclusive(&wallet.name, &chain.key, lane_timeout_ms, attempt)
            .await
        {
            Ok(outcome) => outcome,
            // A stuck submission and a slow one look identical from here;
            // retry on the transient cadence either way.
            Err(err @ LaneError::Timeout { .. }) => {
                ActionOutcome::failure(OutcomeClass::TransientNetwork, err.to_string())
            }
            Err(err) => ActionOutcome::failure(OutcomeClass::UnknownError, err.to_string()),
        };

        record_outcome(&wallet, &chain, action, &outcome);
        delay_ms = retry::next_delay_ms(action, &outcome);

        if shared.stop.load(Ordering::SeqCst) {
            break;
        }
    }
    shared.set_phase(SchedulePhase::Stopped);
}

fn record_outcome(
    wallet: &WalletIdentity,
    chain: &ChainSettings,
    action: ActionType,
    outcome: &ActionOutcome,
) {
    if outcome.succeeded {
        tracing::info!(
            "[FLEET] {}/{}/{}: success",
            wallet.name,
            chain.key,
            action
        );
    } else {
        tracing::info!(
            "[FLEET] {}/{}/{}: {} ({})",
            wallet.name,
            chain.key,
            action,
            outcome.class.as_str(),
            outcome.detail.as_deref().unwrap_or("no detail")
        );
    }
    telemetry::emit_attempt(&wallet.name, &chain.key, action, outcome);
}

//! Fleet-level lifecycle: idempotent starts, shared lanes across action
//! types, cooperative stop semantics.

use async_trait::async_trait;
use crime_fleet::actions::ActionType;
use crime_fleet::executor::{ActionAttempt, ActionOutcome};
use crime_fleet::scheduler::{FleetScheduler, LaneRegistry};
use crime_fleet::utils::config::{ChainSettings, FleetTuning};
use crime_fleet::wallets::WalletIdentity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};

struct TrackingAttempt {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    overlap_peak: AtomicUsize,
    hold_ms: u64,
}

impl TrackingAttempt {
    fn new(hold_ms: u64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            overlap_peak: AtomicUsize::new(0),
            hold_ms,
        }
    }
}

#[async_trait]
impl ActionAttempt for TrackingAttempt {
    async fn attempt(
        &self,
        _wallet: &WalletIdentity,
        _chain: &ChainSettings,
        _action: ActionType,
    ) -> ActionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.overlap_peak.fetch_max(now, Ordering::SeqCst);
        sleep(Duration::from_millis(self.hold_ms)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        ActionOutcome::success()
    }
}

fn chain() -> ChainSettings {
    ChainSettings {
        key: "pls".to_string(),
        chain_id: 369,
        name: "PulseChain".to_string(),
        rpc_url: "http://localhost:8545".to_string(),
        max_gas_price_wei: 0,
        gas_bid_wei: 1,
        block_time_ms: 10_000,
    }
}

fn tuning() -> FleetTuning {
    FleetTuning {
        lane_timeout_ms: 600_000,
        autostart_stagger_ms: 1,
        first_run_jitter_cap_ms: 10,
    }
}

fn wallet(name: &str) -> WalletIdentity {
    WalletIdentity {
        name: name.to_string(),
        credential_ref: format!("/keys/{name}.json"),
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn same_wallet_action_types_share_one_lane_and_never_overlap() {
    let attempt = Arc::new(TrackingAttempt::new(500));
    let fleet = FleetScheduler::new(
        vec![chain()],
        Arc::clone(&attempt) as Arc<dyn ActionAttempt>,
        Arc::new(LaneRegistry::new()),
        tuning(),
    );

    // Crime and nickcar for the same wallet must serialize on the shared
    // wallet:chain lane even though they are independent schedules.
    assert!(fleet.start(ActionType::Crime, "pls", wallet("alice")).started);
    assert!(fleet.start(ActionType::NickCar, "pls", wallet("alice")).started);

    while attempt.calls.load(Ordering::SeqCst) < 4 {
        sleep(Duration::from_millis(60_000)).await;
    }
    assert_eq!(
        attempt.overlap_peak.load(Ordering::SeqCst),
        1,
        "attempts for one wallet:chain must never overlap"
    );
    fleet.shutdown().await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn different_wallets_do_overlap() {
    let attempt = Arc::new(TrackingAttempt::new(2_000));
    let fleet = FleetScheduler::new(
        vec![chain()],
        Arc::clone(&attempt) as Arc<dyn ActionAttempt>,
        Arc::new(LaneRegistry::new()),
        FleetTuning {
            // Zero jitter so the first ticks land close enough to overlap.
            first_run_jitter_cap_ms: 0,
            ..tuning()
        },
    );

    assert!(fleet.start(ActionType::Crime, "pls", wallet("alice")).started);
    assert!(fleet.start(ActionType::Crime, "pls", wallet("bob")).started);

    while attempt.calls.load(Ordering::SeqCst) < 2 {
        sleep(Duration::from_millis(10)).await;
    }
    // Both first attempts hold for 2s; sample while they are in flight.
    assert_eq!(attempt.in_flight.load(Ordering::SeqCst), 2);
    fleet.shutdown().await;
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn restart_after_stop_is_allowed_and_idempotent_while_live() {
    let attempt = Arc::new(TrackingAttempt::new(1));
    let fleet = FleetScheduler::new(
        vec![chain()],
        Arc::clone(&attempt) as Arc<dyn ActionAttempt>,
        Arc::new(LaneRegistry::new()),
        tuning(),
    );

    assert!(fleet.start(ActionType::Crime, "pls", wallet("alice")).started);
    let dup = fleet.start(ActionType::Crime, "pls", wallet("alice"));
    assert!(!dup.started);
    assert_eq!(dup.note.as_deref(), Some("already running"));

    assert!(fleet.stop(ActionType::Crime, "pls", "alice"));
    assert!(fleet.start(ActionType::Crime, "pls", wallet("alice")).started);
    fleet.shutdown().await;
}

struct GatedAttempt {
    calls: AtomicUsize,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ActionAttempt for GatedAttempt {
    async fn attempt(
        &self,
        _wallet: &WalletIdentity,
        _chain: &ChainSettings,
        _action: ActionType,
    ) -> ActionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        ActionOutcome::success()
    }
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn stop_while_running_lets_the_attempt_settle() {
    let attempt = Arc::new(GatedAttempt {
        calls: AtomicUsize::new(0),
        started: Notify::new(),
        release: Notify::new(),
    });
    let fleet = FleetScheduler::new(
        vec![chain()],
        Arc::clone(&attempt) as Arc<dyn ActionAttempt>,
        Arc::new(LaneRegistry::new()),
        tuning(),
    );

    fleet.start(ActionType::Crime, "pls", wallet("alice"));
    attempt.started.notified().await;
    assert_eq!(fleet.status(ActionType::Crime, "pls", "alice").phase, "running");

    // Stop mid-attempt: the tuple is gone from the fleet map immediately,
    // but the in-flight attempt is never abandoned.
    assert!(fleet.stop(ActionType::Crime, "pls", "alice"));
    assert!(!fleet.status(ActionType::Crime, "pls", "alice").running);
    attempt.release.notify_one();

    // Fast-forward far past the nominal cooldown: no re-arm may happen.
    sleep(Duration::from_millis(4 * 3_600_000)).await;
    assert_eq!(attempt.calls.load(Ordering::SeqCst), 1);
}

//! Fleet-wide start/stop/status over every (wallet, chain, action) tuple.

use crate::actions::ActionType;
use crate::executor::ActionAttempt;
use crate::scheduler::lane::LaneRegistry;
use crate::scheduler::retry;
use crate::scheduler::wallet::{SchedulePhase, WalletScheduler};
use crate::utils::config::{ChainSettings, FleetTuning};
use crate::wallets::WalletIdentity;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReport {
    pub started: bool,
    pub note: Option<String>,
}

impl StartReport {
    fn ok() -> Self {
        Self {
            started: true,
            note: None,
        }
    }

    fn rejected(note: impl Into<String>) -> Self {
        Self {
            started: false,
            note: Some(note.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleStatus {
    pub running: bool,
    pub phase: &'static str,
    pub next_run_at_ms: Option<u64>,
}

pub struct FleetScheduler {
    chains: HashMap<String, Arc<ChainSettings>>,
    lanes: Arc<LaneRegistry>,
    executor: Arc<dyn ActionAttempt>,
    tuning: FleetTuning,
    entries: DashMap<String, WalletScheduler>,
}

fn tuple_key(action: ActionType, chain_key: &str, wallet_name: &str) -> String {
    format!("{action}:{chain_key}:{wallet_name}")
}

impl FleetScheduler {
    pub fn new(
        chains: Vec<ChainSettings>,
        executor: Arc<dyn ActionAttempt>,
        lanes: Arc<LaneRegistry>,
        tuning: FleetTuning,
    ) -> Self {
        let chains = chains
            .into_iter()
            .map(|chain| (chain.key.clone(), Arc::new(chain)))
            .collect();
        Self {
            chains,
            lanes,
            executor,
            tuning,
            entries: DashMap::new(),
        }
    }

    /// Start one tuple. Starting an already-running tuple is a no-op
    /// reporting as much — a duplicate timer would defeat the lane's
    /// one-in-flight guarantee from the scheduling side.
    pub fn start(
        &self,
        action: ActionType,
        chain_key: &str,
        wallet: WalletIdentity,
    ) -> StartReport {
        let Some(chain) = self.chains.get(chain_key) else {
            return StartReport::rejected(format!("unknown chain `{chain_key}`"));
        };
        let key = tuple_key(action, chain_key, &wallet.name);

        let initial_delay_ms = retry::first_run_jitter_ms(self.tuning.first_run_jitter_cap_ms);
        match self.entries.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_active() {
                    return StartReport::rejected("already running");
                }
                // Stopped husk: replace it.
                occupied.insert(self.spawn_entry(wallet, Arc::clone(chain), action, initial_delay_ms));
            }
            Entry::Vacant(vacant) => {
                vacant.insert(self.spawn_entry(wallet, Arc::clone(chain), action, initial_delay_ms));
            }
        }
        tracing::info!("[FLEET] started {key} (initial delay {initial_delay_ms}ms)");
        StartReport::ok()
    }

    fn spawn_entry(
        &self,
        wallet: WalletIdentity,
        chain: Arc<ChainSettings>,
        action: ActionType,
        initial_delay_ms: u64,
    ) -> WalletScheduler {
        WalletScheduler::spawn(
            wallet,
            chain,
            action,
            Arc::clone(&self.lanes),
            Arc::clone(&self.executor),
            self.tuning.lane_timeout_ms,
            initial_delay_ms,
        )
    }

    /// Stop one tuple and drop its entry. Pending timers are cancelled at
    /// once; an in-flight attempt settles in the background.
    pub fn stop(&self, action: ActionType, chain_key: &str, wallet_name: &str) -> bool {
        let key = tuple_key(action, chain_key, wallet_name);
        match self.entries.remove(&key) {
            Some((_, entry)) => {
                entry.request_stop();
                tracing::info!("[FLEET] stopped {key}");
                true
            }
            None => false,
        }
    }

    pub fn status(&self, action: ActionType, chain_key: &str, wallet_name: &str) -> TupleStatus {
        let key = tuple_key(action, chain_key, wallet_name);
        match self.entries.get(&key) {
            Some(entry) => {
                let phase = entry.phase();
                TupleStatus {
                    running: phase != SchedulePhase::Stopped,
                    phase: phase.as_str(),
                    next_run_at_ms: entry.next_run_at_ms(),
                }
            }
            None => TupleStatus {
                running: false,
                phase: SchedulePhase::Idle.as_str(),
                next_run_at_ms: None,
            },
        }
    }

    /// Boot-time fan-out: start every (wallet, chain, action) combination,
    /// spacing the starts so the burst itself cannot defeat the first-run
    /// jitter assumption.
    pub async fn autostart(&self, wallets: &[WalletIdentity], actions: &[ActionType]) {
        let mut started = 0usize;
        let mut skipped = 0usize;
        for wallet in wallets {
            for chain_key in self.chain_keys() {
                for action in actions {
                    let report = self.start(*action, &chain_key, wallet.clone());
                    if report.started {
                        started += 1;
                    } else {
                        skipped += 1;
                    }
                    if self.tuning.autostart_stagger_ms > 0 {
                        sleep(Duration::from_millis(self.tuning.autostart_stagger_ms)).await;
                    }
                }
            }
        }
        tracing::info!("[FLEET] autostart complete: {started} tuples started, {skipped} skipped");
    }

    /// Cooperative full stop: cancel every timer, let in-flight attempts
    /// settle, and wait for every entry task to park.
    pub async fn shutdown(&self) {
        let keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        let mut joins = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some((_, entry)) = self.entries.remove(&key) {
                entry.request_stop();
                joins.push(entry);
            }
        }
        for entry in joins {
            entry.join().await;
        }
        tracing::info!("[FLEET] shutdown complete");
    }

    pub fn chain_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.chains.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Read-only lock observability for the dashboard layer.
    pub fn lane_pending(&self) -> Vec<(String, usize)> {
        self.lanes.pending_lanes()
    }

    pub fn active_tuple_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().is_active())
            .count()
    }
}

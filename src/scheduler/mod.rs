pub mod fleet;
pub mod lane;
pub mod retry;
pub mod wallet;

pub use fleet::{FleetScheduler, StartReport, TupleStatus};
pub use lane::{lane_key, LaneRegistry};
pub use wallet::{SchedulePhase, WalletScheduler};

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_NOW_MS: AtomicU64 = AtomicU64::new(1);

/// Monotonic-clamped wall-clock milliseconds for `next_run_at` bookkeeping.
/// Never returns 0 and never regresses across calls.
pub(crate) fn now_ms() -> u64 {
    let sample = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64);
    let mut prev = LAST_NOW_MS.load(Ordering::Relaxed);
    loop {
        let normalized = sample.unwrap_or(prev).max(prev).max(1);
        match LAST_NOW_MS.compare_exchange_weak(
            prev,
            normalized,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return normalized,
            Err(actual) => prev = actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::now_ms;

    #[test]
    fn test_now_ms_is_monotonic_and_nonzero() {
        let a = now_ms();
        let b = now_ms();
        assert!(a >= 1);
        assert!(b >= a);
    }
}

//! Outcome-to-delay policy. Pure table; the scheduler never stops itself
//! over a classified outcome, it only waits differently.

use crate::actions::ActionType;
use crate::executor::classify::OutcomeClass;
use crate::executor::{ActionHint, ActionOutcome};
use rand::Rng;

/// Added on top of every game-enforced cooldown so we never land exactly on
/// the boundary before upstream state has cleared.
pub const COOLDOWN_SAFETY_BUFFER_MS: u64 = 60_000;

/// Jail duration is bounded and opaque to us; probe on a short cadence.
pub const JAILED_RETRY_MS: u64 = 5 * 60_000;

/// Wrong district does not self-resolve; repeated attempts are wasted fees.
pub const WRONG_LOCATION_RETRY_MS: u64 = 6 * 60 * 60_000;

/// Gas dips are worth catching, oracle spam is not.
pub const GAS_RECHECK_MS: u64 = 2 * 60_000;

/// Contract-level rejection that may clear with game state.
pub const REVERTED_RETRY_MS: u64 = 30 * 60_000;

/// Infrastructure fault, not game state.
pub const TRANSIENT_RETRY_MS: u64 = 90_000;

pub const MIN_FIRST_RUN_JITTER_MS: u64 = 250;

pub fn next_delay_ms(action: ActionType, outcome: &ActionOutcome) -> u64 {
    let nominal = action
        .nominal_cooldown_ms()
        .saturating_add(COOLDOWN_SAFETY_BUFFER_MS);
    match outcome.class {
        OutcomeClass::Success => nominal,
        OutcomeClass::Jailed => JAILED_RETRY_MS,
        // Premature attempt; resume the normal cadence.
        OutcomeClass::Cooldown => nominal,
        OutcomeClass::WrongLocation => match outcome.next_action_hint {
            Some(ActionHint::TravelRequired { wait_ms }) => {
                wait_ms.saturating_add(COOLDOWN_SAFETY_BUFFER_MS)
            }
            None => WRONG_LOCATION_RETRY_MS,
        },
        OutcomeClass::GasTooHigh => GAS_RECHECK_MS,
        OutcomeClass::Reverted => REVERTED_RETRY_MS,
        OutcomeClass::TransientNetwork => TRANSIENT_RETRY_MS,
        // Halting an unattended tuple silently is worse than one wasted
        // retry cycle; unknowns ride the nominal cadence.
        OutcomeClass::UnknownError => nominal,
    }
}

/// Jitter for the very first run after (re)start. N wallets booted together
/// must not hit the signer at the same instant.
pub fn first_run_jitter_ms(cap_ms: u64) -> u64 {
    if cap_ms == 0 {
        return 0;
    }
    let cap = cap_ms.max(MIN_FIRST_RUN_JITTER_MS);
    rand::thread_rng().gen_range(MIN_FIRST_RUN_JITTER_MS..=cap)
}

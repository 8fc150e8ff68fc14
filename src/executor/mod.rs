//! One signed-action attempt, end to end: gas gate, signer invocation,
//! outcome classification.

pub mod classify;
pub mod gas_oracle;
pub mod signer;

use crate::actions::ActionType;
use crate::utils::config::ChainSettings;
use crate::utils::error::compact_error_message;
use crate::wallets::WalletIdentity;
use async_trait::async_trait;
use self::classify::{parse_travel_wait_ms, ClassifierRules, OutcomeClass};
use self::signer::{SignRequest, SigningProvider};
use std::sync::Arc;

const DETAIL_MAX_LEN: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionHint {
    /// The wallet must relocate first; retry after the reported travel wait.
    TravelRequired { wait_ms: u64 },
}

/// Result of one execution attempt. `succeeded` and `class` never disagree:
/// construct through `success()`/`failure()`.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub succeeded: bool,
    pub class: OutcomeClass,
    pub detail: Option<String>,
    pub next_action_hint: Option<ActionHint>,
}

impl ActionOutcome {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            class: OutcomeClass::Success,
            detail: None,
            next_action_hint: None,
        }
    }

    pub fn failure(class: OutcomeClass, detail: impl Into<String>) -> Self {
        debug_assert!(class != OutcomeClass::Success, "failure cannot be Success");
        let detail = detail.into();
        Self {
            succeeded: false,
            class,
            detail: (!detail.is_empty()).then_some(detail),
            next_action_hint: None,
        }
    }

    pub fn with_hint(mut self, hint: ActionHint) -> Self {
        self.next_action_hint = Some(hint);
        self
    }
}

/// Seam between the scheduler and the real executor; schedulers only see
/// this trait, so lifecycle tests run against stubs.
#[async_trait]
pub trait ActionAttempt: Send + Sync {
    async fn attempt(
        &self,
        wallet: &WalletIdentity,
        chain: &ChainSettings,
        action: ActionType,
    ) -> ActionOutcome;
}

pub struct ActionExecutor {
    signer: Arc<dyn SigningProvider>,
    oracle: Arc<dyn gas_oracle::GasPriceReader>,
    rules: ClassifierRules,
}

impl ActionExecutor {
    pub fn new(
        signer: Arc<dyn SigningProvider>,
        oracle: Arc<dyn gas_oracle::GasPriceReader>,
        rules: ClassifierRules,
    ) -> Self {
        Self {
            signer,
            oracle,
            rules,
        }
    }

    fn classified_failure(
        &self,
        class: OutcomeClass,
        text: &str,
        action: ActionType,
    ) -> ActionOutcome {
        let mut outcome =
            ActionOutcome::failure(class, compact_error_message(text, DETAIL_MAX_LEN));
        if class == OutcomeClass::WrongLocation && action.supports_auto_travel() {
            if let Some(wait_ms) = parse_travel_wait_ms(text) {
                outcome = outcome.with_hint(ActionHint::TravelRequired { wait_ms });
            }
        }
        outcome
    }
}

#[async_trait]
impl ActionAttempt for ActionExecutor {
    async fn attempt(
        &self,
        wallet: &WalletIdentity,
        chain: &ChainSettings,
        action: ActionType,
    ) -> ActionOutcome {
        // Cost-avoidance gate: a submission above the ceiling burns real fees
        // for an action that will run again anyway. Skip before signing.
        if chain.max_gas_price_wei > 0 {
            match self.oracle.current_gas_price(chain).await {
                Ok(price) if price > chain.max_gas_price_wei => {
                    tracing::info!(
                        "[EXEC] {}/{}/{}: gas {} above ceiling {}, skipping attempt",
                        wallet.name,
                        chain.key,
                        action,
                        price,
                        chain.max_gas_price_wei
                    );
                    return ActionOutcome::failure(
                        OutcomeClass::GasTooHigh,
                        format!(
                            "gas price {price} wei above ceiling {} wei",
                            chain.max_gas_price_wei
                        ),
                    );
                }
                Ok(price) => {
                    tracing::debug!(
                        "[EXEC] {}/{}/{}: gas {} within ceiling",
                        wallet.name,
                        chain.key,
                        action,
                        price
                    );
                }
                // Missing data is not evidence of danger; proceed, but say so.
                Err(err) => {
                    tracing::warn!(
                        "[EXEC] {}/{}/{}: gas read failed ({}), proceeding with degraded confidence",
                        wallet.name,
                        chain.key,
                        action,
                        err
                    );
                }
            }
        }

        let request = SignRequest {
            wallet_name: wallet.name.clone(),
            credential_ref: wallet.credential_ref.clone(),
            chain_key: chain.key.clone(),
            rpc_url: chain.rpc_url.clone(),
            action,
            gas_bid_wei: chain.gas_bid_wei,
        };

        let output = match self.signer.submit(&request).await {
            Ok(output) => output,
            Err(err) => {
                let text = err.to_string();
                let class = self.rules.classify_failure_text(&text);
                return self.classified_failure(class, &text, action);
            }
        };

        let text = output.combined_text();
        if output.exit_ok {
            // Exit 0 still needs a semantic scan: the contract call can land
            // without reverting while the game reports a blocker in output.
            return match self.rules.scan_success_output(&text) {
                None => ActionOutcome::success(),
                Some(class) => self.classified_failure(class, &text, action),
            };
        }

        let class = self.rules.classify_failure_text(&text);
        self.classified_failure(class, &text, action)
    }
}

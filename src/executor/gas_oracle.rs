//! Current-gas-price reads. Pure lookup, no caching of prices; a stale read
//! is worse than a missed ceiling check on these block times.

use crate::error::RpcError;
use crate::utils::config::ChainSettings;
use crate::utils::error::compact_error_message;
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::transports::http::Http;
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

pub type HttpProvider = RootProvider<Http<Client>>;

const DEFAULT_GAS_READ_TIMEOUT_MS: u64 = 2_500;
const GAS_ERR_MAX_LEN: usize = 200;

fn gas_read_timeout_ms() -> u64 {
    std::env::var("GAS_READ_TIMEOUT_MS")
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|v| (250..=20_000).contains(v))
        .unwrap_or(DEFAULT_GAS_READ_TIMEOUT_MS)
}

#[async_trait]
pub trait GasPriceReader: Send + Sync {
    async fn current_gas_price(&self, chain: &ChainSettings) -> Result<u128, RpcError>;
}

/// `eth_gasPrice` over the chain's configured HTTP endpoint. Providers are
/// built once per chain key and reused across ticks.
pub struct RpcGasOracle {
    providers: DashMap<String, Arc<HttpProvider>>,
    timeout_ms: u64,
}

impl RpcGasOracle {
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
            timeout_ms: gas_read_timeout_ms(),
        }
    }

    fn provider_for(&self, chain: &ChainSettings) -> Result<Arc<HttpProvider>, RpcError> {
        if let Some(existing) = self.providers.get(&chain.key) {
            return Ok(Arc::clone(existing.value()));
        }
        let parsed = chain
            .rpc_url
            .parse::<reqwest::Url>()
            .map_err(|e| RpcError::InvalidUrl {
                url: chain.rpc_url.clone(),
                reason: e.to_string(),
            })?;
        let provider = Arc::new(ProviderBuilder::new().on_http(parsed));
        self.providers
            .insert(chain.key.clone(), Arc::clone(&provider));
        Ok(provider)
    }
}

impl Default for RpcGasOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GasPriceReader for RpcGasOracle {
    async fn current_gas_price(&self, chain: &ChainSettings) -> Result<u128, RpcError> {
        let provider = self.provider_for(chain)?;
        let waited = timeout(
            Duration::from_millis(self.timeout_ms),
            provider.get_gas_price(),
        )
        .await;
        match waited {
            Ok(Ok(price)) => Ok(price),
            Ok(Err(err)) => Err(RpcError::Transport(compact_error_message(
                &err.to_string(),
                GAS_ERR_MAX_LEN,
            ))),
            Err(_) => Err(RpcError::GasReadTimeout {
                chain: chain.key.clone(),
                waited_ms: self.timeout_ms,
            }),
        }
    }
}

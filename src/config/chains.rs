//! Static per-chain defaults. Env overrides resolve in `utils::config`.

const GWEI: u128 = 1_000_000_000;

#[derive(Debug, Clone)]
pub struct ChainDefaults {
    pub key: &'static str,
    pub chain_id: u64,
    pub name: &'static str,
    pub rpc_url: &'static str,
    /// Ceiling above which attempts are skipped. 0 disables the ceiling.
    pub max_gas_price_wei: u128,
    /// Price bid on submitted transactions.
    pub gas_bid_wei: u128,
    pub block_time_ms: u64,
}

impl ChainDefaults {
    pub fn get(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "pls" => Some(Self::pulsechain()),
            "bsc" => Some(Self::bsc()),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::pulsechain(), Self::bsc()]
    }

    pub fn pulsechain() -> Self {
        Self {
            key: "pls",
            chain_id: 369,
            name: "PulseChain",
            rpc_url: "https://rpc.pulsechain.com",
            // PulseChain base fees sit in the hundreds of thousands of gwei
            // (beats); the ceiling guards against post-bridge fee spikes.
            max_gas_price_wei: 1_500_000 * GWEI,
            gas_bid_wei: 900_000 * GWEI,
            block_time_ms: 10_000,
        }
    }

    pub fn bsc() -> Self {
        Self {
            key: "bsc",
            chain_id: 56,
            name: "BNB Smart Chain",
            rpc_url: "https://bsc-dataseed.binance.org",
            max_gas_price_wei: 5 * GWEI,
            gas_bid_wei: 3 * GWEI,
            block_time_ms: 3_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChainDefaults;

    #[test]
    fn test_chain_lookup_is_case_insensitive() {
        assert_eq!(ChainDefaults::get("PLS").map(|c| c.chain_id), Some(369));
        assert_eq!(ChainDefaults::get(" bsc ").map(|c| c.chain_id), Some(56));
        assert!(ChainDefaults::get("sol").is_none());
    }

    #[test]
    fn test_gas_bids_stay_under_ceilings() {
        for chain in ChainDefaults::all() {
            assert!(
                chain.max_gas_price_wei == 0 || chain.gas_bid_wei < chain.max_gas_price_wei,
                "{} bids above its own ceiling",
                chain.key
            );
        }
    }
}

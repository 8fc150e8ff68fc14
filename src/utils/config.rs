use crate::config::chains::ChainDefaults;
use crate::error::{ConfigError, Result};
use std::env;

pub const DEFAULT_LANE_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_SIGNER_TIMEOUT_MS: u64 = 45_000;
const DEFAULT_AUTOSTART_STAGGER_MS: u64 = 500;
const DEFAULT_FIRST_RUN_JITTER_CAP_MS: u64 = 15_000;

/// Per-chain parameters after env overrides. Read-only once the fleet starts.
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub key: String,
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    pub max_gas_price_wei: u128,
    pub gas_bid_wei: u128,
    pub block_time_ms: u64,
}

/// Scheduling knobs. Defaults match production cadence; tests build their own.
#[derive(Debug, Clone)]
pub struct FleetTuning {
    pub lane_timeout_ms: u64,
    pub autostart_stagger_ms: u64,
    pub first_run_jitter_cap_ms: u64,
}

impl Default for FleetTuning {
    fn default() -> Self {
        Self {
            lane_timeout_ms: DEFAULT_LANE_TIMEOUT_MS,
            autostart_stagger_ms: DEFAULT_AUTOSTART_STAGGER_MS,
            first_run_jitter_cap_ms: DEFAULT_FIRST_RUN_JITTER_CAP_MS,
        }
    }
}

impl FleetTuning {
    pub fn from_env() -> Self {
        Self {
            lane_timeout_ms: load_clamped_u64(
                "LANE_TIMEOUT_MS",
                1_000..=600_000,
                DEFAULT_LANE_TIMEOUT_MS,
            ),
            autostart_stagger_ms: load_clamped_u64(
                "FLEET_AUTOSTART_STAGGER_MS",
                0..=60_000,
                DEFAULT_AUTOSTART_STAGGER_MS,
            ),
            first_run_jitter_cap_ms: load_clamped_u64(
                "FLEET_FIRST_RUN_JITTER_CAP_MS",
                0..=300_000,
                DEFAULT_FIRST_RUN_JITTER_CAP_MS,
            ),
        }
    }
}

pub struct Config {
    pub chains: Vec<ChainSettings>,
    pub signer_program: String,
    pub signer_timeout_ms: u64,
    pub keystore_dir: String,
    pub autostart: bool,
    pub tuning: FleetTuning,
}

fn load_clamped_u64(key: &str, range: std::ops::RangeInclusive<u64>, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|v| range.contains(v))
        .unwrap_or(default)
}

fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn validate_http_url(name: &str, raw: &str) -> Result<()> {
    let parsed = raw.parse::<reqwest::Url>().map_err(|e| {
        ConfigError::InvalidConfig(format!("{name} must be a valid URL, got `{raw}`: {e}"))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidConfig(format!(
            "{name} must use http(s) scheme, got `{other}`"
        ))
        .into()),
    }
}

impl ChainSettings {
    /// Resolve env overrides over a chain's static defaults.
    ///
    /// Override keys are uppercased chain keys: `PLS_RPC_URL`,
    /// `PLS_MAX_GAS_PRICE_WEI`, `PLS_GAS_BID_WEI`.
    pub fn resolve(defaults: &ChainDefaults) -> Result<Self> {
        let upper = defaults.key.to_ascii_uppercase();

        let rpc_key = format!("{upper}_RPC_URL");
        let rpc_url = env::var(&rpc_key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| defaults.rpc_url.to_string());
        validate_http_url(&rpc_key, &rpc_url)?;

        let max_gas_price_wei = load_wei(&format!("{upper}_MAX_GAS_PRICE_WEI"))
            .unwrap_or(defaults.max_gas_price_wei);
        let gas_bid_wei =
            load_wei(&format!("{upper}_GAS_BID_WEI")).unwrap_or(defaults.gas_bid_wei);

        if max_gas_price_wei > 0 && gas_bid_wei > max_gas_price_wei {
            return Err(ConfigError::InvalidConfig(format!(
                "{upper}_GAS_BID_WEI ({gas_bid_wei}) exceeds {upper}_MAX_GAS_PRICE_WEI ({max_gas_price_wei})"
            ))
            .into());
        }

        Ok(Self {
            key: defaults.key.to_string(),
            chain_id: defaults.chain_id,
            name: defaults.name.to_string(),
            rpc_url,
            max_gas_price_wei,
            gas_bid_wei,
            block_time_ms: defaults.block_time_ms,
        })
    }
}

fn load_wei(key: &str) -> Option<u128> {
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<u128>().ok())
}

fn selected_chain_keys() -> Vec<String> {
    let raw = env::var("FLEET_CHAINS").unwrap_or_default();
    let keys: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if keys.is_empty() {
        ChainDefaults::all()
            .into_iter()
            .map(|c| c.key.to_string())
            .collect()
    } else {
        keys
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut chains = Vec::new();
        for key in selected_chain_keys() {
            let defaults =
                ChainDefaults::get(&key).ok_or_else(|| ConfigError::UnknownChain(key.clone()))?;
            chains.push(ChainSettings::resolve(&defaults)?);
        }

        let signer_program = env::var("SIGNER_CMD").map_err(|_| {
            ConfigError::MissingConfig(
                "SIGNER_CMD must be set (path to the wallet signing tool)".to_string(),
            )
        })?;
        if signer_program.trim().is_empty() {
            return Err(
                ConfigError::InvalidConfig("SIGNER_CMD must not be empty".to_string()).into(),
            );
        }

        let keystore_dir = env::var("WALLET_KEYSTORE_DIR").map_err(|_| {
            ConfigError::MissingConfig("WALLET_KEYSTORE_DIR must be set".to_string())
        })?;
        if !std::path::Path::new(&keystore_dir).is_dir() {
            return Err(ConfigError::InvalidConfig(format!(
                "WALLET_KEYSTORE_DIR `{keystore_dir}` is not a directory"
            ))
            .into());
        }

        Ok(Self {
            chains,
            signer_program,
            signer_timeout_ms: load_clamped_u64(
                "SIGNER_TIMEOUT_MS",
                1_000..=300_000,
                DEFAULT_SIGNER_TIMEOUT_MS,
            ),
            keystore_dir,
            autostart: env::var("FLEET_AUTOSTART")
                .ok()
                .and_then(|raw| parse_bool_flag(&raw))
                .unwrap_or(true),
            tuning: FleetTuning::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{load_clamped_u64, parse_bool_flag, ChainSettings};
    use crate::config::chains::ChainDefaults;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_chain_env() {
        for key in [
            "PLS_RPC_URL",
            "PLS_MAX_GAS_PRICE_WEI",
            "PLS_GAS_BID_WEI",
            "LANE_TIMEOUT_MS",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_chain_settings_use_defaults_without_env() {
        let _guard = env_lock().lock().expect("env lock");
        clear_chain_env();
        let resolved =
            ChainSettings::resolve(&ChainDefaults::pulsechain()).expect("resolve should succeed");
        assert_eq!(resolved.key, "pls");
        assert_eq!(resolved.chain_id, 369);
        assert_eq!(resolved.rpc_url, "https://rpc.pulsechain.com");
        clear_chain_env();
    }

    #[test]
    fn test_chain_settings_env_overrides_and_bid_ceiling_guard() {
        let _guard = env_lock().lock().expect("env lock");
        clear_chain_env();
        std::env::set_var("PLS_RPC_URL", "https://pls.example.org/rpc");
        std::env::set_var("PLS_MAX_GAS_PRICE_WEI", "1000");
        std::env::set_var("PLS_GAS_BID_WEI", "2000");

        let err = ChainSettings::resolve(&ChainDefaults::pulsechain())
            .expect_err("bid above ceiling must be rejected");
        assert!(err.to_string().contains("exceeds"));

        std::env::set_var("PLS_GAS_BID_WEI", "900");
        let resolved =
            ChainSettings::resolve(&ChainDefaults::pulsechain()).expect("resolve should succeed");
        assert_eq!(resolved.rpc_url, "https://pls.example.org/rpc");
        assert_eq!(resolved.max_gas_price_wei, 1000);
        assert_eq!(resolved.gas_bid_wei, 900);
        clear_chain_env();
    }

    #[test]
    fn test_chain_settings_reject_non_http_rpc() {
        let _guard = env_lock().lock().expect("env lock");
        clear_chain_env();
        std::env::set_var("PLS_RPC_URL", "wss://rpc.pulsechain.com");
        let err = ChainSettings::resolve(&ChainDefaults::pulsechain())
            .expect_err("ws scheme must be rejected");
        assert!(err.to_string().contains("http(s) scheme"));
        clear_chain_env();
    }

    #[test]
    fn test_load_clamped_u64_rejects_out_of_range() {
        let _guard = env_lock().lock().expect("env lock");
        clear_chain_env();
        std::env::set_var("LANE_TIMEOUT_MS", "50");
        assert_eq!(load_clamped_u64("LANE_TIMEOUT_MS", 1_000..=600_000, 60_000), 60_000);
        std::env::set_var("LANE_TIMEOUT_MS", "5000");
        assert_eq!(load_clamped_u64("LANE_TIMEOUT_MS", 1_000..=600_000, 60_000), 5_000);
        clear_chain_env();
    }

    #[test]
    fn test_parse_bool_flag_variants() {
        assert_eq!(parse_bool_flag("On"), Some(true));
        assert_eq!(parse_bool_flag("0"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }
}

use crate::runtime::RuntimeArgs;
use crate::scheduler::FleetScheduler;
use crate::utils::config::Config;

pub fn emit_fleet_config_status(config: &Config, runtime_args: &RuntimeArgs) {
    let actions = runtime_args
        .autostart_actions
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let wallet_scope = runtime_args
        .pinned_wallet
        .as_deref()
        .unwrap_or("<all keystores>");
    tracing::info!(
        "[OPS] Fleet config resolved: chains={} actions={} wallet_scope={} keystore_dir={} lane_timeout_ms={} autostart={}",
        config.chains.len(),
        actions,
        wallet_scope,
        config.keystore_dir,
        config.tuning.lane_timeout_ms,
        config.autostart
    );

    for chain in &config.chains {
        let ceiling = if chain.max_gas_price_wei == 0 {
            "off".to_string()
        } else {
            chain.max_gas_price_wei.to_string()
        };
        tracing::info!(
            "[OPS] Chain {}({}): rpc={} gas_ceiling_wei={} gas_bid_wei={} block_time_ms={}",
            chain.key,
            chain.chain_id,
            chain.rpc_url,
            ceiling,
            chain.gas_bid_wei,
            chain.block_time_ms
        );
    }
}

pub fn emit_lane_status(fleet: &FleetScheduler) {
    let pending = fleet.lane_pending();
    if pending.is_empty() {
        tracing::info!(
            "[OPS] Lanes idle: {} active tuples, no pending submissions",
            fleet.active_tuple_count()
        );
        return;
    }
    let entries = pending
        .iter()
        .map(|(key, count)| format!("{key}={count}"))
        .collect::<Vec<_>>();
    tracing::info!(
        "[OPS] Lanes busy ({} keys): {}",
        entries.len(),
        entries.join(", ")
    );
}

//! Fleet orchestration binary: boot, probe, autostart, run until ctrl-c.

use crime_fleet::executor::classify::ClassifierRules;
use crime_fleet::executor::gas_oracle::{GasPriceReader, RpcGasOracle};
use crime_fleet::executor::signer::ProcessSigner;
use crime_fleet::executor::ActionExecutor;
use crime_fleet::runtime::{emit_fleet_config_status, emit_lane_status, parse_runtime_args};
use crime_fleet::scheduler::{FleetScheduler, LaneRegistry};
use crime_fleet::utils::config::Config;
use crime_fleet::utils::telemetry;
use crime_fleet::wallets::{FsWalletDirectory, WalletDirectory};
use std::sync::Arc;
use std::time::Duration;

const LANE_STATUS_POLL_MS: u64 = 60_000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Runtime is env-driven; argv is rejected inside parse_runtime_args.
    let runtime_args = parse_runtime_args()?;

    match std::env::var("RUST_LOG") {
        Ok(val) => println!("[STARTUP] RUST_LOG is set to: '{}'", val),
        Err(_) => println!("[STARTUP] RUST_LOG is unset."),
    }

    // Default to `info` when `RUST_LOG` is unset or invalid to avoid silent startup.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        println!("[STARTUP] RUST_LOG invalid or unset; defaulting to 'info'");
        tracing_subscriber::EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    println!("[STARTUP] Tracing initialized.");

    telemetry::init_analytics();
    telemetry::emit(
        telemetry::AnalyticsLevel::Info,
        "startup",
        "crime_fleet_boot",
    );

    let config = Config::load()?;
    emit_fleet_config_status(&config, &runtime_args);
    if runtime_args.explain_config {
        tracing::info!("[OPS] FLEET_EXPLAIN_CONFIG=true requested; resolved config emitted.");
        return Ok(());
    }

    // Probe every chain early so configuration failures are visible at boot,
    // not on the first scheduled tick an hour later.
    let oracle = Arc::new(RpcGasOracle::new());
    for chain in &config.chains {
        match oracle.current_gas_price(chain).await {
            Ok(price) => println!(
                "[STARTUP] CONNECTIVITY OK on {}: gas price {} wei",
                chain.key, price
            ),
            Err(e) => println!("[STARTUP] CONNECTIVITY FAILURE on {}: {}", chain.key, e),
        }
    }

    let mut wallets = FsWalletDirectory::new(&config.keystore_dir).list_wallets()?;
    if let Some(pinned) = runtime_args.pinned_wallet.as_deref() {
        wallets.retain(|w| w.name == pinned);
        if wallets.is_empty() {
            anyhow::bail!("FLEET_WALLET `{pinned}` not found in {}", config.keystore_dir);
        }
    }
    tracing::info!("[STARTUP] {} wallet(s) enumerated.", wallets.len());

    let signer = Arc::new(ProcessSigner::new(
        config.signer_program.clone(),
        config.signer_timeout_ms,
    ));
    let executor = Arc::new(ActionExecutor::new(
        signer,
        oracle,
        ClassifierRules::from_env(),
    ));
    let lanes = Arc::new(LaneRegistry::new());
    let fleet = Arc::new(FleetScheduler::new(
        config.chains.clone(),
        executor,
        Arc::clone(&lanes),
        config.tuning.clone(),
    ));

    if config.autostart {
        fleet
            .autostart(&wallets, &runtime_args.autostart_actions)
            .await;
    } else {
        tracing::info!("[STARTUP] FLEET_AUTOSTART=false; waiting for manual start calls.");
    }

    // Periodic lane observability for unattended operation.
    let status_fleet = Arc::clone(&fleet);
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(LANE_STATUS_POLL_MS)).await;
            emit_lane_status(&status_fleet);
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("[STARTUP] Ctrl-C received; stopping fleet cooperatively.");
    telemetry::emit_critical("shutdown", "crime_fleet_shutdown_requested");
    fleet.shutdown().await;
    Ok(())
}

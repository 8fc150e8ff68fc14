//! External signing-tool invocation.
//!
//! The core never touches key material: signing and submission are delegated
//! to an operator-provided tool that takes a keystore path and prints the
//! game contract's response. We only need its raw stdout/stderr/exit status.

use crate::actions::ActionType;
use async_trait::async_trait;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Clone)]
pub struct SignRequest {
    pub wallet_name: String,
    pub credential_ref: String,
    pub chain_key: String,
    pub rpc_url: String,
    pub action: ActionType,
    pub gas_bid_wei: u128,
}

#[derive(Debug, Clone)]
pub struct SignerOutput {
    pub exit_ok: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl SignerOutput {
    pub fn combined_text(&self) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        text
    }
}

#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// Run one signed-action attempt. `Err` means the attempt could not be
    /// made at all (spawn failure, execution timeout); classified game-state
    /// failures come back as `SignerOutput` with `exit_ok = false`.
    async fn submit(&self, req: &SignRequest) -> anyhow::Result<SignerOutput>;
}

pub struct ProcessSigner {
    program: String,
    timeout_ms: u64,
}

impl ProcessSigner {
    pub fn new(program: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            program: program.into(),
            timeout_ms,
        }
    }
}

#[async_trait]
impl SigningProvider for ProcessSigner {
    async fn submit(&self, req: &SignRequest) -> anyhow::Result<SignerOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--keystore")
            .arg(&req.credential_ref)
            .arg("--chain")
            .arg(&req.chain_key)
            .arg("--rpc-url")
            .arg(&req.rpc_url)
            .arg("--action")
            .arg(req.action.as_str())
            .arg("--gas-price-wei")
            .arg(req.gas_bid_wei.to_string())
            // The tool reads the wallet password from its environment, never
            // from argv (argv is world-readable on shared hosts).
            .env_remove("FLEET_WALLET_PASSWORD")
            .kill_on_drop(true)
            .stdin(std::process::Stdio::null());
        if let Ok(password) = std::env::var("FLEET_WALLET_PASSWORD") {
            cmd.env("SIGNER_PASSWORD", password);
        }

        let waited = timeout(Duration::from_millis(self.timeout_ms), cmd.output()).await;
        let output = match waited {
            Ok(result) => result.map_err(|e| {
                anyhow::anyhow!("failed to spawn signer `{}`: {e}", self.program)
            })?,
            // kill_on_drop reaps the child; a stuck tool must not pin the lane
            // past the scheduler's own patience.
            Err(_) => {
                anyhow::bail!(
                    "signer `{}` timed out after {}ms for wallet {} ({})",
                    self.program,
                    self.timeout_ms,
                    req.wallet_name,
                    req.action
                )
            }
        };

        Ok(SignerOutput {
            exit_ok: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

//! Wallet identity and boot-time enumeration.

use std::path::{Path, PathBuf};

/// Opaque wallet reference. Immutable once scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WalletIdentity {
    pub name: String,
    /// Keystore path handed verbatim to the signing tool.
    pub credential_ref: String,
}

pub trait WalletDirectory: Send + Sync {
    fn list_wallets(&self) -> anyhow::Result<Vec<WalletIdentity>>;
}

/// Keystore-directory enumerator: one `<name>.json` file per wallet.
pub struct FsWalletDirectory {
    root: PathBuf,
}

impl FsWalletDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl WalletDirectory for FsWalletDirectory {
    fn list_wallets(&self) -> anyhow::Result<Vec<WalletIdentity>> {
        let mut wallets = Vec::new();
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            anyhow::anyhow!("keystore dir `{}` unreadable: {e}", self.root.display())
        })?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !is_keystore_file(&path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            wallets.push(WalletIdentity {
                name: stem.to_string(),
                credential_ref: path.display().to_string(),
            });
        }
        // Deterministic start order keeps the autostart stagger reproducible.
        wallets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(wallets)
    }
}

fn is_keystore_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

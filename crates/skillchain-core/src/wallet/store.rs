//! Persisted wallet projection
//!
//! Only `{address, is_connected}` survive a restart: an explicit
//! serialization boundary, distinct from the in-memory session state.
//! The projection is rewritten on every session change and read once at
//! startup, typically to offer a reconnect to the last-used account.
//! Nothing secret is ever written: no signer, no signing client, no keys.

use crate::error::{ClientError, ClientResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

const STORE_DIR: &str = ".skillchain";
const STORE_FILE: &str = "wallet.json";

/// The non-sensitive identity fields that persist across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWallet {
    pub address: Option<String>,
    pub is_connected: bool,
    /// When the projection was last written
    pub updated_at: Option<DateTime<Utc>>,
}

/// File-backed store for the wallet projection.
#[derive(Debug, Clone)]
pub struct WalletStore {
    path: PathBuf,
}

impl WalletStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.skillchain/wallet.json`
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STORE_DIR)
            .join(STORE_FILE)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Read the projection; a missing or unparseable file yields the
    /// default (no address, not connected).
    pub async fn load(&self) -> StoredWallet {
        match fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(wallet) => {
                    debug!(path = %self.path.display(), "loaded wallet projection");
                    wallet
                }
                Err(err) => {
                    warn!(path = %self.path.display(), %err, "unparseable wallet projection; starting fresh");
                    StoredWallet::default()
                }
            },
            Err(_) => StoredWallet::default(),
        }
    }

    /// Overwrite the projection, stamping `updated_at`.
    pub async fn save(&self, wallet: &StoredWallet) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::store(format!("failed to create store directory: {e}")))?;
        }

        let mut wallet = wallet.clone();
        wallet.updated_at = Some(Utc::now());

        let content = serde_json::to_string_pretty(&wallet)?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| ClientError::store(format!("failed to write wallet projection: {e}")))?;

        debug!(path = %self.path.display(), "saved wallet projection");
        Ok(())
    }
}

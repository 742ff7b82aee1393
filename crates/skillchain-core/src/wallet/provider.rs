//! Wallet capability seams

use crate::config::{ChainConfig, GasPriceConfig};
use crate::error::ClientResult;
use crate::tx::{MarketplaceMsg, TxOutcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// An account exposed by the wallet provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
}

/// The wallet extension capability of the host environment.
///
/// Absence of this capability is a recoverable condition, never fatal:
/// the session reports `ProviderUnavailable` and can retry once the user
/// installs a provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Register/declare the target chain with the provider.
    async fn declare_chain(&self, chain: &ChainConfig) -> ClientResult<()>;

    /// Request account access for the chain.
    async fn request_access(&self, chain_id: &str) -> ClientResult<()>;

    /// Obtain the signer bound to the chain's accounts.
    async fn signer(&self, chain_id: &str) -> ClientResult<Arc<dyn WalletSigner>>;
}

/// A signer handle able to enumerate its accounts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn accounts(&self) -> ClientResult<Vec<AccountInfo>>;
}

/// Builds a signing-capable client from an RPC endpoint, a signer and the
/// chain's fee configuration.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SigningConnector: Send + Sync {
    async fn connect(
        &self,
        rpc_endpoint: &str,
        signer: Arc<dyn WalletSigner>,
        gas_price: &GasPriceConfig,
    ) -> ClientResult<Arc<dyn SigningClient>>;
}

/// A connected client able to sign and broadcast marketplace messages.
/// Message encoding is the implementation's concern; the core hands over
/// typed values.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SigningClient: Send + Sync {
    async fn sign_and_broadcast(
        &self,
        signer_address: &str,
        msgs: Vec<MarketplaceMsg>,
        memo: &str,
    ) -> ClientResult<TxOutcome>;
}

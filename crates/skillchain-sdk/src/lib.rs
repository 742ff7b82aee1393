//! SkillChain client SDK
//!
//! One context object, [`SkillchainClient`], ties the core components
//! together: the wallet session, the REST gateway, the query cache and
//! the transaction layer. Construct it with
//! [`SkillchainClientBuilder`], hand it the host's wallet capability
//! seams, and every read goes through the cache with the right staleness
//! budget while every confirmed mutation invalidates the groups it
//! affects.
//!
//! # Example
//!
//! ```no_run
//! use skillchain_sdk::SkillchainClient;
//!
//! # async fn example() -> skillchain_sdk::ClientResult<()> {
//! let client = SkillchainClient::builder().build()?;
//!
//! // read-only browsing works without a wallet
//! for gig in client.open_gigs().await? {
//!     println!("{}: {}", gig.id, gig.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{SkillchainClient, SkillchainClientBuilder};

// Re-export the core surface so consumers need a single dependency.
pub use skillchain_core::cache::{QueryCache, QueryKey, Staleness};
pub use skillchain_core::coins;
pub use skillchain_core::config::{
    CacheBudgets, ChainConfig, CurrencyConfig, GasPriceConfig, TimeoutConfig,
};
pub use skillchain_core::error::{ClientError, ClientResult};
pub use skillchain_core::gateway::RestGateway;
pub use skillchain_core::tx::{MarketplaceMsg, MarketplaceTx, TxOutcome};
pub use skillchain_core::types::{
    Application, ApplicationStatus, Coin, Contract, ContractStatus, Dispute, DisputeStatus, Gig,
    GigStatus, Params, Profile,
};
pub use skillchain_core::wallet::{
    AccountInfo, SessionChange, SessionSnapshot, SessionStatus, SigningClient, SigningConnector,
    StoredWallet, WalletProvider, WalletSession, WalletSigner, WalletStore,
};

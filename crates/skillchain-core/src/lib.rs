//! Core library for the SkillChain client
//!
//! Everything the view layer needs to browse and act on the marketplace
//! flows through three components:
//!
//! - [`wallet::WalletSession`]: the state machine owning the wallet
//!   connection, the active address and the signing-capable handle,
//! - [`gateway::RestGateway`]: typed reads over the chain's REST API,
//!   normalizing "not found" to absent values and missing collections to
//!   empty sequences,
//! - [`cache::QueryCache`]: the read-through cache in front of the
//!   gateway, with per-resource staleness budgets and grouped
//!   invalidation driven by session changes and confirmed mutations
//!   ([`tx::MarketplaceTx`]).
//!
//! The `skillchain-sdk` crate ties these together into a single client
//! facade; this crate has no hidden globals, every component is owned by
//! whoever constructs it.

pub mod cache;
pub mod coins;
pub mod config;
pub mod error;
pub mod gateway;
pub mod tx;
pub mod types;
pub mod wallet;

pub use error::{ClientError, ClientResult};

//! Chain and client configuration
//!
//! A [`ChainConfig`] is the static descriptor shared by the gateway's
//! transport and the wallet declaration call: chain identity, endpoints,
//! bech32 prefix, currency, gas pricing, timeouts and cache staleness
//! budgets. Configuration is layered: built-in local defaults, then an
//! optional TOML file, then `SKILLCHAIN_*` environment variables.

mod chain;
mod loader;

pub use chain::{
    CacheBudgets, ChainConfig, CurrencyConfig, GasPriceConfig, TimeoutConfig,
};

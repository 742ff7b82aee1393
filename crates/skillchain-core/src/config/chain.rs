//! Chain descriptor and client tuning knobs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static description of the target chain plus client tuning knobs.
///
/// Supplied to both the REST gateway (endpoints, timeouts) and the wallet
/// declaration call (chain identity, currency, gas pricing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain identifier, e.g. `skillchain-local-1`
    pub chain_id: String,
    /// Human-readable chain name shown by wallet providers
    pub chain_name: String,
    /// Tendermint RPC endpoint (signing/broadcast)
    pub rpc_endpoint: String,
    /// REST (LCD) endpoint (queries)
    pub rest_endpoint: String,
    /// Bech32 account address prefix
    pub bech32_prefix: String,
    /// Currency denomination settings
    pub currency: CurrencyConfig,
    /// Gas price used by the signing client
    pub gas_price: GasPriceConfig,
    /// Remote call deadlines
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Per-resource cache staleness budgets
    #[serde(default)]
    pub budgets: CacheBudgets,
}

/// Currency denomination settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Display denomination, e.g. `SKILL`
    pub display_denom: String,
    /// Minimal on-chain denomination, e.g. `uskill`
    pub base_denom: String,
    /// Decimal places between base and display units
    pub decimals: u32,
}

/// Gas price, kept as a decimal string to avoid float drift
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasPriceConfig {
    pub amount: String,
    pub denom: String,
}

impl GasPriceConfig {
    /// Render as the `0.025uskill` form signing clients expect
    pub fn as_price_string(&self) -> String {
        format!("{}{}", self.amount, self.denom)
    }
}

/// Deadlines for remote calls. Every suspension point in the client is
/// bounded by one of these; a timeout is a normal fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// TCP connect deadline for the REST client
    pub connect_secs: u64,
    /// Whole-request deadline for REST queries
    pub request_secs: u64,
    /// Deadline for each wallet provider / signing call
    pub provider_secs: u64,
}

impl TimeoutConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 10,
            provider_secs: 10,
        }
    }
}

/// Time-windowed staleness budgets for the resource classes that refresh
/// proactively. Resources absent here are cached until explicitly
/// invalidated (lists) or refetched on every reference (single records).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheBudgets {
    /// Module params change rarely
    #[serde(with = "humantime_serde")]
    pub params: Duration,
    /// Gig lists back the main browse views
    #[serde(with = "humantime_serde")]
    pub gig_lists: Duration,
    /// Spendable balances
    #[serde(with = "humantime_serde")]
    pub balances: Duration,
    /// Module escrow balance
    #[serde(with = "humantime_serde")]
    pub escrow: Duration,
}

impl Default for CacheBudgets {
    fn default() -> Self {
        Self {
            params: Duration::from_secs(60),
            gig_lists: Duration::from_secs(10),
            balances: Duration::from_secs(5),
            escrow: Duration::from_secs(10),
        }
    }
}

impl ChainConfig {
    /// Descriptor for a local development chain.
    pub fn local_defaults() -> Self {
        Self {
            chain_id: "skillchain-local-1".to_string(),
            chain_name: "SkillChain Local".to_string(),
            rpc_endpoint: "http://localhost:26657".to_string(),
            rest_endpoint: "http://localhost:1317".to_string(),
            bech32_prefix: "skill".to_string(),
            currency: CurrencyConfig {
                display_denom: "SKILL".to_string(),
                base_denom: "uskill".to_string(),
                decimals: 6,
            },
            gas_price: GasPriceConfig {
                amount: "0.025".to_string(),
                denom: "uskill".to_string(),
            },
            timeouts: TimeoutConfig::default(),
            budgets: CacheBudgets::default(),
        }
    }

    /// Validate endpoint and identity fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.chain_id.is_empty() {
            return Err("chain_id must not be empty".to_string());
        }
        if self.bech32_prefix.is_empty() {
            return Err("bech32_prefix must not be empty".to_string());
        }
        for (name, endpoint) in [
            ("rpc_endpoint", &self.rpc_endpoint),
            ("rest_endpoint", &self.rest_endpoint),
        ] {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("{name} must be an http(s) URL, got {endpoint:?}"));
            }
        }
        if self.currency.decimals == 0 {
            return Err("currency.decimals must be positive".to_string());
        }
        Ok(())
    }
}

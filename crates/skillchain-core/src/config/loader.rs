//! Layered configuration loading

use super::chain::ChainConfig;
use crate::error::{ClientError, ClientResult};
use std::path::Path;
use tracing::debug;

impl ChainConfig {
    /// Load configuration by layering sources: built-in local defaults,
    /// then an optional TOML file, then `SKILLCHAIN_*` environment
    /// variables (nested fields use `__`, e.g. `SKILLCHAIN_CURRENCY__DECIMALS`).
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if the file is named but unreadable, a
    /// layer fails to parse, or the merged result fails [`Self::validate`].
    pub fn load(file: Option<&Path>) -> ClientResult<Self> {
        let defaults = config::Config::try_from(&Self::local_defaults())
            .map_err(|e| ClientError::config(format!("failed to seed defaults: {e}")))?;

        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = file {
            debug!(path = %path.display(), "loading chain config file");
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder = builder
            .add_source(config::Environment::with_prefix("SKILLCHAIN").separator("__"));

        let merged: Self = builder
            .build()
            .map_err(|e| ClientError::config(format!("failed to merge configuration: {e}")))?
            .try_deserialize()
            .map_err(|e| ClientError::config(format!("invalid configuration: {e}")))?;

        merged.validate().map_err(ClientError::config)?;
        Ok(merged)
    }
}

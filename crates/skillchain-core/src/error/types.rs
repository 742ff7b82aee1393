//! Core error type and constructors

use thiserror::Error;

/// Result type alias for SkillChain client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Main error type for the SkillChain client.
///
/// The type is `Clone`: a single fetch outcome may be shared by every
/// caller waiting on the same in-flight cache fetch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A by-id query reported HTTP 404. The gateway maps this to an absent
    /// value before it reaches any consumer; it never crosses the gateway
    /// boundary as an error.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The wallet capability is missing from the host environment, or a
    /// signed operation was attempted without a connected wallet.
    #[error("wallet provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// The wallet provider granted access but exposed zero accounts.
    #[error("no accounts available for chain {chain_id}")]
    NoAccounts { chain_id: String },

    /// The user declined a provider or signing request.
    #[error("rejected by user: {message}")]
    UserRejected { message: String },

    /// Any other provider or signing failure.
    #[error("wallet provider error: {message}")]
    Provider {
        message: String,
        context: Option<String>,
    },

    /// Transport-level failure talking to the REST or RPC endpoint.
    #[error("network error: {message}")]
    Network {
        message: String,
        context: Option<String>,
    },

    /// A remote call exceeded its configured deadline. Timeouts are normal
    /// fetch failures, not fatal conditions.
    #[error("timed out while waiting for {operation}")]
    Timeout { operation: String },

    /// The remote payload could not be decoded into the expected shape.
    #[error("failed to decode response: {message}")]
    Decode {
        message: String,
        context: Option<String>,
    },

    /// Invalid or unloadable configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The persisted wallet projection could not be read or written.
    #[error("wallet store error: {message}")]
    Store { message: String },

    /// Anything that does not fit the categories above.
    #[error("{message}")]
    Unknown { message: String },
}

impl ClientError {
    /// Create a not-found error for a named resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a provider-unavailable error
    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    /// Create a no-accounts error for a chain
    pub fn no_accounts(chain_id: impl Into<String>) -> Self {
        Self::NoAccounts {
            chain_id: chain_id.into(),
        }
    }

    /// Create a user-rejected error
    pub fn user_rejected(message: impl Into<String>) -> Self {
        Self::UserRejected {
            message: message.into(),
        }
    }

    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            context: None,
        }
    }

    /// Create a provider error with context
    pub fn provider_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::Provider {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            context: None,
        }
    }

    /// Create a network error with context
    pub fn network_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a timeout error for a named operation
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a wallet store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create an unknown error
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                operation: err
                    .url()
                    .map(|url| url.to_string())
                    .unwrap_or_else(|| "http request".to_string()),
            }
        } else if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

//! Error classification helpers

use super::types::ClientError;

impl ClientError {
    /// True for the by-id miss the gateway converts to an absent value.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for transport failures that a later identical call may survive.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// True when the failure came from the wallet capability rather than
    /// the data plane.
    pub fn is_wallet_error(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. }
                | Self::NoAccounts { .. }
                | Self::UserRejected { .. }
                | Self::Provider { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_not_retryable() {
        let err = ClientError::not_found("gig 42");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn transport_errors_are_retryable() {
        assert!(ClientError::network("connection refused").is_retryable());
        assert!(ClientError::timeout("list accounts").is_retryable());
        assert!(!ClientError::user_rejected("denied").is_retryable());
    }

    #[test]
    fn wallet_errors_are_classified() {
        assert!(ClientError::provider_unavailable("not installed").is_wallet_error());
        assert!(ClientError::no_accounts("skillchain-local-1").is_wallet_error());
        assert!(!ClientError::network("dns").is_wallet_error());
    }
}

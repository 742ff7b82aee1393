//! Cache keys and invalidation prefixes

use std::fmt;

/// Structured cache key: an ordered path of segments, e.g.
/// `["marketplace", "gigs"]` or `["bank", "balance", address, denom]`.
///
/// A key doubles as an invalidation prefix: `invalidate` drops every entry
/// whose key starts with the given segments, so `["marketplace"]` names
/// the whole marketplace namespace and `["bank", "balance", address]`
/// every denomination held by one address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I>(segments: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when `prefix` names this key or a group containing it.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    // Group prefixes

    /// Every marketplace resource
    pub fn marketplace() -> Self {
        Self::new(["marketplace"])
    }

    /// Every bank resource
    pub fn bank() -> Self {
        Self::new(["bank"])
    }

    // Resource keys

    pub fn params() -> Self {
        Self::new(["marketplace", "params"])
    }

    /// The full profile list
    pub fn profiles() -> Self {
        Self::new(["marketplace", "profiles"])
    }

    pub fn profile(address: &str) -> Self {
        Self::new(["marketplace", "profile", address])
    }

    /// The gig list; the open-gig view lives under it
    pub fn gigs() -> Self {
        Self::new(["marketplace", "gigs"])
    }

    pub fn open_gigs() -> Self {
        Self::new(["marketplace", "gigs", "open"])
    }

    pub fn gig(id: &str) -> Self {
        Self::new(["marketplace", "gig", id])
    }

    /// Prefix covering every application view
    pub fn applications() -> Self {
        Self::new(["marketplace", "applications"])
    }

    pub fn application(id: &str) -> Self {
        Self::new(["marketplace", "application", id])
    }

    pub fn applications_by_gig(gig_id: &str) -> Self {
        Self::new(["marketplace", "applications", "gig", gig_id])
    }

    pub fn applications_by_freelancer(address: &str) -> Self {
        Self::new(["marketplace", "applications", "freelancer", address])
    }

    /// Prefix covering every contract list view
    pub fn contracts() -> Self {
        Self::new(["marketplace", "contracts"])
    }

    pub fn contract(id: &str) -> Self {
        Self::new(["marketplace", "contract", id])
    }

    pub fn contracts_by_user(address: &str) -> Self {
        Self::new(["marketplace", "contracts", "user", address])
    }

    pub fn disputes() -> Self {
        Self::new(["marketplace", "disputes"])
    }

    pub fn dispute(id: &str) -> Self {
        Self::new(["marketplace", "dispute", id])
    }

    pub fn escrow() -> Self {
        Self::new(["marketplace", "escrow"])
    }

    /// All balances held by one address; prefix of every by-denom key
    pub fn balances(address: &str) -> Self {
        Self::new(["bank", "balance", address])
    }

    pub fn balance(address: &str, denom: &str) -> Self {
        Self::new(["bank", "balance", address, denom])
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

//! Wallet session management
//!
//! The [`WalletSession`] state machine owns the wallet connection, the
//! active account address and the signing-capable client handle. Signed
//! operations are possible exactly while the session is `Connected`.
//!
//! The browser-extension surface is abstracted behind the
//! [`WalletProvider`], [`WalletSigner`] and [`SigningConnector`] seams so the
//! machine can be driven by a real provider bridge or by test doubles.
//! Only the non-sensitive identity projection ([`StoredWallet`]) survives
//! a restart.

mod provider;
mod session;
mod store;

pub use provider::{
    AccountInfo, SigningClient, SigningConnector, WalletProvider, WalletSigner,
};
#[cfg(test)]
pub use provider::{
    MockSigningClient, MockSigningConnector, MockWalletProvider, MockWalletSigner,
};
pub use session::{SessionChange, SessionSnapshot, SessionStatus, WalletSession};
pub use store::{StoredWallet, WalletStore};

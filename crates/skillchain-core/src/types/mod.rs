//! Domain records returned by the remote query API
//!
//! These are read-only projections of ledger state as seen by the client;
//! the client never owns canonical state. Every numeric amount and counter
//! is carried as a decimal string exactly as the REST API serializes it,
//! never as a float or a lossily-sized integer.

mod bank;
mod marketplace;

pub use bank::Coin;
pub use marketplace::{
    Application, ApplicationStatus, Contract, ContractStatus, Dispute, DisputeStatus, Gig,
    GigStatus, Params, Profile,
};

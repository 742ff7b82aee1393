//! Marketplace transaction messages
//!
//! Typed values handed to the signing client; wire encoding (protobuf,
//! amino) is the signing client's concern, not the core's.

use serde::{Deserialize, Serialize};

/// One marketplace state change, signed by `creator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MarketplaceMsg {
    CreateProfile {
        creator: String,
        name: String,
        bio: String,
        skills: Vec<String>,
        hourly_rate: String,
    },
    UpdateProfile {
        creator: String,
        name: String,
        bio: String,
        skills: Vec<String>,
        hourly_rate: String,
    },
    CreateGig {
        creator: String,
        title: String,
        description: String,
        price: String,
        category: String,
        delivery_days: String,
    },
    UpdateGigStatus {
        creator: String,
        gig_id: String,
        status: String,
    },
    ApplyToGig {
        creator: String,
        gig_id: String,
        cover_letter: String,
        proposed_price: String,
        proposed_days: String,
    },
    WithdrawApplication {
        creator: String,
        application_id: String,
    },
    AcceptApplication {
        creator: String,
        application_id: String,
    },
    RejectApplication {
        creator: String,
        application_id: String,
    },
    DeliverContract {
        creator: String,
        contract_id: String,
        delivery_note: String,
    },
    CompleteContract {
        creator: String,
        contract_id: String,
    },
    OpenDispute {
        creator: String,
        contract_id: String,
        reason: String,
        evidence: String,
    },
    SubmitEvidence {
        creator: String,
        dispute_id: String,
        evidence: String,
    },
    VoteDispute {
        creator: String,
        dispute_id: String,
        /// `"client"` or `"freelancer"`
        vote: String,
    },
}

impl MarketplaceMsg {
    /// The signing account the message must be authorized by.
    pub fn creator(&self) -> &str {
        match self {
            Self::CreateProfile { creator, .. }
            | Self::UpdateProfile { creator, .. }
            | Self::CreateGig { creator, .. }
            | Self::UpdateGigStatus { creator, .. }
            | Self::ApplyToGig { creator, .. }
            | Self::WithdrawApplication { creator, .. }
            | Self::AcceptApplication { creator, .. }
            | Self::RejectApplication { creator, .. }
            | Self::DeliverContract { creator, .. }
            | Self::CompleteContract { creator, .. }
            | Self::OpenDispute { creator, .. }
            | Self::SubmitEvidence { creator, .. }
            | Self::VoteDispute { creator, .. } => creator,
        }
    }
}

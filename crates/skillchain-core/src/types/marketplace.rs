//! Marketplace record snapshots

use serde::{Deserialize, Serialize};

/// A freelancer or client profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub owner: String,
    pub name: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub hourly_rate: String,
    pub total_jobs: String,
    pub total_earned: String,
    pub rating_sum: String,
    pub rating_count: String,
}

/// Lifecycle of a posted gig
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GigStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Cancelled,
    Disputed,
}

/// A posted job listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Gig {
    pub id: String,
    pub title: String,
    pub description: String,
    pub owner: String,
    pub price: String,
    pub category: String,
    pub delivery_days: String,
    pub status: GigStatus,
    pub created_at: String,
}

/// Lifecycle of an application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

/// A freelancer's proposal against a gig
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub id: String,
    pub gig_id: String,
    pub freelancer: String,
    pub cover_letter: String,
    pub proposed_price: String,
    pub proposed_days: String,
    pub status: ApplicationStatus,
    pub created_at: String,
}

/// Lifecycle of a contract
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Active,
    Delivered,
    Completed,
    Disputed,
    Cancelled,
}

/// The binding agreement formed once an application is accepted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contract {
    pub id: String,
    pub gig_id: String,
    pub application_id: String,
    pub client: String,
    pub freelancer: String,
    pub price: String,
    pub delivery_deadline: String,
    pub status: ContractStatus,
    pub created_at: String,
    pub completed_at: String,
}

/// Lifecycle of a dispute
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    #[default]
    Open,
    Voting,
    ResolvedClient,
    ResolvedFreelancer,
    Expired,
}

/// An adjudication record opened against a contract, resolved by voting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dispute {
    pub id: String,
    pub contract_id: String,
    pub initiator: String,
    pub reason: String,
    pub client_evidence: String,
    pub freelancer_evidence: String,
    pub status: DisputeStatus,
    pub votes_client: String,
    pub votes_freelancer: String,
    pub resolution: String,
    pub created_at: String,
    pub deadline: String,
}

/// Marketplace module parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Params {
    pub platform_fee_percent: String,
    pub min_contract_duration: String,
    pub min_gig_price: String,
    pub dispute_duration: String,
    pub min_arbiters_required: String,
    pub arbiter_stake_required: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gig_decodes_from_rest_payload() {
        let payload = serde_json::json!({
            "id": "42",
            "title": "Logo design",
            "description": "Vector logo for a cafe",
            "owner": "skill1owner",
            "price": "1500000",
            "category": "design",
            "deliveryDays": "7",
            "status": "in_progress",
            "createdAt": "1700000000"
        });
        let gig: Gig = serde_json::from_value(payload).unwrap();
        assert_eq!(gig.delivery_days, "7");
        assert_eq!(gig.status, GigStatus::InProgress);
        // amounts stay textual
        assert_eq!(gig.price, "1500000");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let app: Application = serde_json::from_value(serde_json::json!({
            "id": "7",
            "gigId": "42",
            "freelancer": "skill1dev"
        }))
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.proposed_price, "");
    }

    #[test]
    fn dispute_status_uses_snake_case() {
        let status: DisputeStatus = serde_json::from_str("\"resolved_client\"").unwrap();
        assert_eq!(status, DisputeStatus::ResolvedClient);
    }
}

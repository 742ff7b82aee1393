//! Marketplace transaction operations
//!
//! Every state-changing ledger operation goes through [`MarketplaceTx`]:
//! it requires a connected session, signs and broadcasts through the
//! session's signing client, and upon confirmed success invalidates
//! the cache groups the operation affects before returning control to the
//! caller. A broadcast that lands with a non-zero code is a failure and
//! invalidates nothing.

mod msgs;

pub use msgs::MarketplaceMsg;

use crate::cache::{QueryCache, QueryKey};
use crate::error::{ClientError, ClientResult};
use crate::wallet::{SigningClient, WalletSession};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a confirmed broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutcome {
    pub tx_hash: String,
    /// Zero on success; anything else is a chain-side rejection
    pub code: u32,
    pub raw_log: String,
    pub height: u64,
}

impl TxOutcome {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Signed marketplace operations with mutation-coordinated invalidation.
pub struct MarketplaceTx {
    session: Arc<WalletSession>,
    cache: QueryCache,
}

impl MarketplaceTx {
    pub fn new(session: Arc<WalletSession>, cache: QueryCache) -> Self {
        Self { session, cache }
    }

    pub async fn create_profile(
        &self,
        name: &str,
        bio: &str,
        skills: Vec<String>,
        hourly_rate: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::CreateProfile {
            creator: creator.clone(),
            name: name.to_string(),
            bio: bio.to_string(),
            skills,
            hourly_rate: hourly_rate.to_string(),
        };
        let invalidates = vec![QueryKey::profile(&creator), QueryKey::profiles()];
        self.submit(client, creator, msg, invalidates).await
    }

    pub async fn update_profile(
        &self,
        name: &str,
        bio: &str,
        skills: Vec<String>,
        hourly_rate: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::UpdateProfile {
            creator: creator.clone(),
            name: name.to_string(),
            bio: bio.to_string(),
            skills,
            hourly_rate: hourly_rate.to_string(),
        };
        let invalidates = vec![QueryKey::profile(&creator), QueryKey::profiles()];
        self.submit(client, creator, msg, invalidates).await
    }

    pub async fn create_gig(
        &self,
        title: &str,
        description: &str,
        price: &str,
        category: &str,
        delivery_days: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::CreateGig {
            creator: creator.clone(),
            title: title.to_string(),
            description: description.to_string(),
            price: price.to_string(),
            category: category.to_string(),
            delivery_days: delivery_days.to_string(),
        };
        self.submit(client, creator, msg, vec![QueryKey::gigs()]).await
    }

    pub async fn update_gig_status(&self, gig_id: &str, status: &str) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::UpdateGigStatus {
            creator: creator.clone(),
            gig_id: gig_id.to_string(),
            status: status.to_string(),
        };
        let invalidates = vec![QueryKey::gigs(), QueryKey::gig(gig_id)];
        self.submit(client, creator, msg, invalidates).await
    }

    pub async fn apply_to_gig(
        &self,
        gig_id: &str,
        cover_letter: &str,
        proposed_price: &str,
        proposed_days: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::ApplyToGig {
            creator: creator.clone(),
            gig_id: gig_id.to_string(),
            cover_letter: cover_letter.to_string(),
            proposed_price: proposed_price.to_string(),
            proposed_days: proposed_days.to_string(),
        };
        self.submit(client, creator, msg, vec![QueryKey::applications()])
            .await
    }

    pub async fn withdraw_application(&self, application_id: &str) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::WithdrawApplication {
            creator: creator.clone(),
            application_id: application_id.to_string(),
        };
        let invalidates = vec![
            QueryKey::applications(),
            QueryKey::application(application_id),
        ];
        self.submit(client, creator, msg, invalidates).await
    }

    /// Accept an application. On chain this also rejects every other
    /// pending application for the gig, moves the gig to `in_progress` and
    /// creates the contract, so the applications-by-gig group, the
    /// contracts-by-user groups of both parties and the gig views are all
    /// invalidated before this returns.
    pub async fn accept_application(
        &self,
        application_id: &str,
        gig_id: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::AcceptApplication {
            creator: creator.clone(),
            application_id: application_id.to_string(),
        };
        let invalidates = vec![
            QueryKey::applications(),
            QueryKey::application(application_id),
            QueryKey::contracts(),
            QueryKey::gigs(),
            QueryKey::gig(gig_id),
        ];
        self.submit(client, creator, msg, invalidates).await
    }

    pub async fn reject_application(
        &self,
        application_id: &str,
        gig_id: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::RejectApplication {
            creator: creator.clone(),
            application_id: application_id.to_string(),
        };
        let invalidates = vec![
            QueryKey::applications_by_gig(gig_id),
            QueryKey::application(application_id),
        ];
        self.submit(client, creator, msg, invalidates).await
    }

    pub async fn deliver_contract(
        &self,
        contract_id: &str,
        delivery_note: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::DeliverContract {
            creator: creator.clone(),
            contract_id: contract_id.to_string(),
            delivery_note: delivery_note.to_string(),
        };
        let invalidates = vec![QueryKey::contracts(), QueryKey::contract(contract_id)];
        self.submit(client, creator, msg, invalidates).await
    }

    /// Complete a contract, releasing escrowed funds to the freelancer;
    /// balances and the escrow view are invalidated along with the
    /// contract views.
    pub async fn complete_contract(&self, contract_id: &str) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::CompleteContract {
            creator: creator.clone(),
            contract_id: contract_id.to_string(),
        };
        let invalidates = vec![
            QueryKey::contracts(),
            QueryKey::contract(contract_id),
            QueryKey::gigs(),
            QueryKey::escrow(),
            QueryKey::bank(),
        ];
        self.submit(client, creator, msg, invalidates).await
    }

    pub async fn open_dispute(
        &self,
        contract_id: &str,
        reason: &str,
        evidence: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::OpenDispute {
            creator: creator.clone(),
            contract_id: contract_id.to_string(),
            reason: reason.to_string(),
            evidence: evidence.to_string(),
        };
        let invalidates = vec![
            QueryKey::disputes(),
            QueryKey::contracts(),
            QueryKey::contract(contract_id),
        ];
        self.submit(client, creator, msg, invalidates).await
    }

    pub async fn submit_evidence(
        &self,
        dispute_id: &str,
        evidence: &str,
    ) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::SubmitEvidence {
            creator: creator.clone(),
            dispute_id: dispute_id.to_string(),
            evidence: evidence.to_string(),
        };
        let invalidates = vec![QueryKey::disputes(), QueryKey::dispute(dispute_id)];
        self.submit(client, creator, msg, invalidates).await
    }

    /// Cast an arbiter vote, `"client"` or `"freelancer"`.
    pub async fn vote_dispute(&self, dispute_id: &str, vote: &str) -> ClientResult<TxOutcome> {
        let (creator, client) = self.session.signing_context()?;
        let msg = MarketplaceMsg::VoteDispute {
            creator: creator.clone(),
            dispute_id: dispute_id.to_string(),
            vote: vote.to_string(),
        };
        let invalidates = vec![QueryKey::disputes(), QueryKey::dispute(dispute_id)];
        self.submit(client, creator, msg, invalidates).await
    }

    async fn submit(
        &self,
        client: Arc<dyn SigningClient>,
        signer: String,
        msg: MarketplaceMsg,
        invalidates: Vec<QueryKey>,
    ) -> ClientResult<TxOutcome> {
        debug!(signer = %signer, msg = ?msg, "broadcasting marketplace tx");
        let outcome = client.sign_and_broadcast(&signer, vec![msg], "").await?;
        if !outcome.is_success() {
            return Err(ClientError::provider_with_context(
                format!("broadcast failed with code {}", outcome.code),
                outcome.raw_log,
            ));
        }
        info!(tx_hash = %outcome.tx_hash, height = outcome.height, "tx confirmed");
        for key in &invalidates {
            self.cache.invalidate(key);
        }
        Ok(outcome)
    }
}

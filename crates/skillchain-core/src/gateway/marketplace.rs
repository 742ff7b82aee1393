//! Marketplace query accessors

use super::envelope::{amount_or_zero, unwrap_entity, unwrap_list};
use super::RestGateway;
use crate::error::ClientResult;
use crate::types::{Application, Contract, Dispute, Gig, GigStatus, Params, Profile};

const MARKETPLACE: &str = "/skillchain/marketplace";

impl RestGateway {
    /// Marketplace module parameters.
    pub async fn params(&self) -> ClientResult<Params> {
        let envelope = self.get(&format!("{MARKETPLACE}/params")).await?;
        unwrap_entity(envelope, "params")
    }

    /// Profile by owner address, `None` when the remote reports 404.
    pub async fn profile(&self, address: &str) -> ClientResult<Option<Profile>> {
        match self
            .get_by_id(&format!("{MARKETPLACE}/profile/{address}"))
            .await?
        {
            Some(envelope) => Ok(Some(unwrap_entity(envelope, "profile")?)),
            None => Ok(None),
        }
    }

    pub async fn all_profiles(&self) -> ClientResult<Vec<Profile>> {
        let envelope = self.get(&format!("{MARKETPLACE}/profile")).await?;
        unwrap_list(envelope, "profile")
    }

    /// Gig by id, `None` when the remote reports 404.
    pub async fn gig(&self, id: &str) -> ClientResult<Option<Gig>> {
        match self.get_by_id(&format!("{MARKETPLACE}/gig/{id}")).await? {
            Some(envelope) => Ok(Some(unwrap_entity(envelope, "gig")?)),
            None => Ok(None),
        }
    }

    pub async fn all_gigs(&self) -> ClientResult<Vec<Gig>> {
        let envelope = self.get(&format!("{MARKETPLACE}/gig")).await?;
        unwrap_list(envelope, "gig")
    }

    /// Gigs still accepting applications.
    ///
    /// Derived client-side by filtering the full gig list; the REST API
    /// has no indexed query for this, so the cost is O(total gigs).
    pub async fn open_gigs(&self) -> ClientResult<Vec<Gig>> {
        let gigs = self.all_gigs().await?;
        Ok(gigs
            .into_iter()
            .filter(|gig| gig.status == GigStatus::Open)
            .collect())
    }

    /// Application by id, `None` when the remote reports 404.
    pub async fn application(&self, id: &str) -> ClientResult<Option<Application>> {
        match self
            .get_by_id(&format!("{MARKETPLACE}/application/{id}"))
            .await?
        {
            Some(envelope) => Ok(Some(unwrap_entity(envelope, "application")?)),
            None => Ok(None),
        }
    }

    pub async fn all_applications(&self) -> ClientResult<Vec<Application>> {
        let envelope = self.get(&format!("{MARKETPLACE}/application")).await?;
        unwrap_list(envelope, "application")
    }

    /// Applications submitted against a gig; served by a dedicated
    /// endpoint whose collection arrives under `applications`.
    pub async fn applications_by_gig(&self, gig_id: &str) -> ClientResult<Vec<Application>> {
        let envelope = self
            .get(&format!("{MARKETPLACE}/applications_by_gig/{gig_id}"))
            .await?;
        unwrap_list(envelope, "applications")
    }

    /// Applications submitted by a freelancer.
    ///
    /// Derived client-side by filtering the full application list; the
    /// REST API has no indexed query for this, so the cost is
    /// O(total applications).
    pub async fn applications_by_freelancer(
        &self,
        address: &str,
    ) -> ClientResult<Vec<Application>> {
        let applications = self.all_applications().await?;
        Ok(applications
            .into_iter()
            .filter(|application| application.freelancer == address)
            .collect())
    }

    /// Contract by id, `None` when the remote reports 404.
    pub async fn contract(&self, id: &str) -> ClientResult<Option<Contract>> {
        match self
            .get_by_id(&format!("{MARKETPLACE}/contract/{id}"))
            .await?
        {
            Some(envelope) => Ok(Some(unwrap_entity(envelope, "contract")?)),
            None => Ok(None),
        }
    }

    pub async fn all_contracts(&self) -> ClientResult<Vec<Contract>> {
        let envelope = self.get(&format!("{MARKETPLACE}/contract")).await?;
        unwrap_list(envelope, "contract")
    }

    /// Contracts where the address is client or freelancer; collection
    /// arrives under `contracts`.
    pub async fn contracts_by_user(&self, address: &str) -> ClientResult<Vec<Contract>> {
        let envelope = self
            .get(&format!("{MARKETPLACE}/contracts_by_user/{address}"))
            .await?;
        unwrap_list(envelope, "contracts")
    }

    /// Dispute by id, `None` when the remote reports 404.
    pub async fn dispute(&self, id: &str) -> ClientResult<Option<Dispute>> {
        match self.get_by_id(&format!("{MARKETPLACE}/dispute/{id}")).await? {
            Some(envelope) => Ok(Some(unwrap_entity(envelope, "dispute")?)),
            None => Ok(None),
        }
    }

    pub async fn all_disputes(&self) -> ClientResult<Vec<Dispute>> {
        let envelope = self.get(&format!("{MARKETPLACE}/dispute")).await?;
        unwrap_list(envelope, "dispute")
    }

    /// Funds held by the marketplace module pending contract resolution,
    /// `"0"` when the module holds nothing.
    pub async fn escrow_balance(&self) -> ClientResult<String> {
        let envelope = self.get(&format!("{MARKETPLACE}/escrow_balance")).await?;
        Ok(amount_or_zero(&envelope, "balance"))
    }
}

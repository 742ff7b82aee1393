//! The SkillChain client context object

use skillchain_core::cache::{QueryCache, QueryKey, Staleness};
use skillchain_core::config::ChainConfig;
use skillchain_core::error::{ClientError, ClientResult};
use skillchain_core::gateway::RestGateway;
use skillchain_core::tx::MarketplaceTx;
use skillchain_core::types::{
    Application, Coin, Contract, Dispute, Gig, Params, Profile,
};
use skillchain_core::wallet::{
    SessionSnapshot, SigningConnector, StoredWallet, WalletProvider, WalletSession, WalletStore,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Builder for [`SkillchainClient`].
///
/// Without a wallet provider and signing connector the client still
/// supports the full read surface; `connect` then fails with
/// `ProviderUnavailable`, exactly like a browser without the extension.
#[derive(Default)]
pub struct SkillchainClientBuilder {
    config: Option<ChainConfig>,
    provider: Option<Arc<dyn WalletProvider>>,
    connector: Option<Arc<dyn SigningConnector>>,
    store: Option<WalletStore>,
}

impl SkillchainClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the chain config by layering defaults, the given TOML file and
    /// `SKILLCHAIN_*` environment variables.
    pub fn with_config_file(mut self, path: &Path) -> ClientResult<Self> {
        self.config = Some(ChainConfig::load(Some(path))?);
        Ok(self)
    }

    pub fn with_wallet_provider(mut self, provider: Arc<dyn WalletProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_signing_connector(mut self, connector: Arc<dyn SigningConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Persist the `{address, is_connected}` projection across restarts.
    pub fn with_wallet_store(mut self, store: WalletStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> ClientResult<SkillchainClient> {
        let config = self.config.unwrap_or_else(ChainConfig::local_defaults);
        config.validate().map_err(ClientError::config)?;

        let gateway = Arc::new(RestGateway::new(&config)?);
        let cache = QueryCache::new();
        let store = self.store;
        let session = Arc::new(WalletSession::new(
            config.clone(),
            self.provider,
            self.connector,
            store.clone(),
        ));

        // Identity changed: drop the address-scoped groups of both the
        // previous and the new address on every session transition.
        session.on_change({
            let cache = cache.clone();
            move |change| {
                let previous = change.previous_address.as_deref();
                let current = change.snapshot.address.as_deref();
                if let Some(address) = previous {
                    cache.invalidate_for_address(address);
                }
                if let Some(address) = current {
                    if Some(address) != previous {
                        cache.invalidate_for_address(address);
                    }
                }
            }
        });

        let tx = MarketplaceTx::new(Arc::clone(&session), cache.clone());

        debug!(chain_id = %config.chain_id, rest = %config.rest_endpoint, "client built");
        Ok(SkillchainClient {
            config,
            gateway,
            cache,
            session,
            tx,
            store,
        })
    }
}

/// The client context object: owns the chain config, the REST gateway,
/// the query cache, the wallet session and the transaction layer. One
/// instance per process by construction; nothing in here is `static`.
pub struct SkillchainClient {
    config: ChainConfig,
    gateway: Arc<RestGateway>,
    cache: QueryCache,
    session: Arc<WalletSession>,
    tx: MarketplaceTx,
    store: Option<WalletStore>,
}

impl SkillchainClient {
    pub fn builder() -> SkillchainClientBuilder {
        SkillchainClientBuilder::new()
    }

    // Session

    /// Connect the wallet; see [`WalletSession::connect`].
    pub async fn connect(&self) -> ClientResult<SessionSnapshot> {
        self.session.connect().await
    }

    pub fn disconnect(&self) {
        self.session.disconnect();
    }

    pub fn clear_error(&self) {
        self.session.clear_error();
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    /// The persisted projection from a previous run, if a store is
    /// configured. Useful for offering a reconnect to the last account;
    /// the in-memory session always starts `Disconnected`.
    pub async fn stored_wallet(&self) -> Option<StoredWallet> {
        match &self.store {
            Some(store) => Some(store.load().await),
            None => None,
        }
    }

    // Cached reads

    /// Marketplace parameters, cached for the params budget (default 60s).
    pub async fn params(&self) -> ClientResult<Params> {
        let gateway = Arc::clone(&self.gateway);
        self.cache
            .get_with(
                QueryKey::params(),
                Staleness::Window(self.config.budgets.params),
                move || async move { gateway.params().await },
            )
            .await
    }

    /// All gigs, cached for the gig-list budget (default 10s).
    pub async fn gigs(&self) -> ClientResult<Vec<Gig>> {
        let gateway = Arc::clone(&self.gateway);
        self.cache
            .get_with(
                QueryKey::gigs(),
                Staleness::Window(self.config.budgets.gig_lists),
                move || async move { gateway.all_gigs().await },
            )
            .await
    }

    /// Open gigs (client-side filter over the full list), cached for the
    /// gig-list budget.
    pub async fn open_gigs(&self) -> ClientResult<Vec<Gig>> {
        let gateway = Arc::clone(&self.gateway);
        self.cache
            .get_with(
                QueryKey::open_gigs(),
                Staleness::Window(self.config.budgets.gig_lists),
                move || async move { gateway.open_gigs().await },
            )
            .await
    }

    /// A single gig, fetched when referenced.
    pub async fn gig(&self, id: &str) -> ClientResult<Option<Gig>> {
        let gateway = Arc::clone(&self.gateway);
        let id_owned = id.to_string();
        self.cache
            .get_with(QueryKey::gig(id), Staleness::OnDemand, move || async move {
                gateway.gig(&id_owned).await
            })
            .await
    }

    /// A profile by address, cached until invalidated.
    pub async fn profile(&self, address: &str) -> ClientResult<Option<Profile>> {
        let gateway = Arc::clone(&self.gateway);
        let address_owned = address.to_string();
        self.cache
            .get_with(
                QueryKey::profile(address),
                Staleness::UntilInvalidated,
                move || async move { gateway.profile(&address_owned).await },
            )
            .await
    }

    /// The connected account's profile; `None` while disconnected.
    pub async fn my_profile(&self) -> ClientResult<Option<Profile>> {
        match self.session.address() {
            Some(address) => self.profile(&address).await,
            None => Ok(None),
        }
    }

    /// All profiles, cached until invalidated.
    pub async fn profiles(&self) -> ClientResult<Vec<Profile>> {
        let gateway = Arc::clone(&self.gateway);
        self.cache
            .get_with(
                QueryKey::profiles(),
                Staleness::UntilInvalidated,
                move || async move { gateway.all_profiles().await },
            )
            .await
    }

    /// A single application, fetched when referenced.
    pub async fn application(&self, id: &str) -> ClientResult<Option<Application>> {
        let gateway = Arc::clone(&self.gateway);
        let id_owned = id.to_string();
        self.cache
            .get_with(
                QueryKey::application(id),
                Staleness::OnDemand,
                move || async move { gateway.application(&id_owned).await },
            )
            .await
    }

    /// Applications against a gig, cached until invalidated.
    pub async fn applications_by_gig(&self, gig_id: &str) -> ClientResult<Vec<Application>> {
        let gateway = Arc::clone(&self.gateway);
        let gig_id_owned = gig_id.to_string();
        self.cache
            .get_with(
                QueryKey::applications_by_gig(gig_id),
                Staleness::UntilInvalidated,
                move || async move { gateway.applications_by_gig(&gig_id_owned).await },
            )
            .await
    }

    /// The connected account's applications (client-side filter over the
    /// full list), cached until invalidated. Empty while disconnected.
    pub async fn my_applications(&self) -> ClientResult<Vec<Application>> {
        let Some(address) = self.session.address() else {
            return Ok(Vec::new());
        };
        let gateway = Arc::clone(&self.gateway);
        let address_owned = address.clone();
        self.cache
            .get_with(
                QueryKey::applications_by_freelancer(&address),
                Staleness::UntilInvalidated,
                move || async move { gateway.applications_by_freelancer(&address_owned).await },
            )
            .await
    }

    /// A single contract, fetched when referenced.
    pub async fn contract(&self, id: &str) -> ClientResult<Option<Contract>> {
        let gateway = Arc::clone(&self.gateway);
        let id_owned = id.to_string();
        self.cache
            .get_with(
                QueryKey::contract(id),
                Staleness::OnDemand,
                move || async move { gateway.contract(&id_owned).await },
            )
            .await
    }

    /// Contracts involving an address, cached until invalidated.
    pub async fn contracts_by_user(&self, address: &str) -> ClientResult<Vec<Contract>> {
        let gateway = Arc::clone(&self.gateway);
        let address_owned = address.to_string();
        self.cache
            .get_with(
                QueryKey::contracts_by_user(address),
                Staleness::UntilInvalidated,
                move || async move { gateway.contracts_by_user(&address_owned).await },
            )
            .await
    }

    /// The connected account's contracts; empty while disconnected.
    pub async fn my_contracts(&self) -> ClientResult<Vec<Contract>> {
        match self.session.address() {
            Some(address) => self.contracts_by_user(&address).await,
            None => Ok(Vec::new()),
        }
    }

    /// All disputes, cached until invalidated.
    pub async fn disputes(&self) -> ClientResult<Vec<Dispute>> {
        let gateway = Arc::clone(&self.gateway);
        self.cache
            .get_with(
                QueryKey::disputes(),
                Staleness::UntilInvalidated,
                move || async move { gateway.all_disputes().await },
            )
            .await
    }

    /// A single dispute, fetched when referenced.
    pub async fn dispute(&self, id: &str) -> ClientResult<Option<Dispute>> {
        let gateway = Arc::clone(&self.gateway);
        let id_owned = id.to_string();
        self.cache
            .get_with(
                QueryKey::dispute(id),
                Staleness::OnDemand,
                move || async move { gateway.dispute(&id_owned).await },
            )
            .await
    }

    /// Escrowed module funds, cached for the escrow budget (default 10s).
    pub async fn escrow_balance(&self) -> ClientResult<String> {
        let gateway = Arc::clone(&self.gateway);
        self.cache
            .get_with(
                QueryKey::escrow(),
                Staleness::Window(self.config.budgets.escrow),
                move || async move { gateway.escrow_balance().await },
            )
            .await
    }

    /// All balances of an address, cached for the balance budget
    /// (default 5s).
    pub async fn balances(&self, address: &str) -> ClientResult<Vec<Coin>> {
        let gateway = Arc::clone(&self.gateway);
        let address_owned = address.to_string();
        self.cache
            .get_with(
                QueryKey::balances(address),
                Staleness::Window(self.config.budgets.balances),
                move || async move { gateway.balances(&address_owned).await },
            )
            .await
    }

    /// One denomination's balance, `"0"` when the address holds none.
    pub async fn balance(&self, address: &str, denom: &str) -> ClientResult<String> {
        let gateway = Arc::clone(&self.gateway);
        let address_owned = address.to_string();
        let denom_owned = denom.to_string();
        self.cache
            .get_with(
                QueryKey::balance(address, denom),
                Staleness::Window(self.config.budgets.balances),
                move || async move {
                    gateway.balance_by_denom(&address_owned, &denom_owned).await
                },
            )
            .await
    }

    /// The connected account's base-denom balance; `"0"` while
    /// disconnected.
    pub async fn my_balance(&self) -> ClientResult<String> {
        match self.session.address() {
            Some(address) => {
                self.balance(&address, &self.config.currency.base_denom).await
            }
            None => Ok("0".to_string()),
        }
    }

    // Mutations

    /// Signed marketplace operations; every confirmed success invalidates
    /// the groups it affects before returning.
    pub fn tx(&self) -> &MarketplaceTx {
        &self.tx
    }

    // Plumbing

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn gateway(&self) -> &Arc<RestGateway> {
        &self.gateway
    }
}

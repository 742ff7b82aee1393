//! Wallet connection state machine

use super::provider::{SigningClient, SigningConnector, WalletProvider, WalletSigner};
use super::store::{StoredWallet, WalletStore};
use crate::config::ChainConfig;
use crate::error::{ClientError, ClientResult};
use parking_lot::RwLock;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Connection status. The machine is cyclic: there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Observable session state. The signing handle itself is not part of the
/// snapshot; use [`WalletSession::signing_client`] while `Connected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub address: Option<String>,
    pub last_error: Option<String>,
}

/// Passed to observers on every applied transition.
#[derive(Debug, Clone)]
pub struct SessionChange {
    pub previous_status: SessionStatus,
    pub previous_address: Option<String>,
    pub snapshot: SessionSnapshot,
}

type SessionObserver = Box<dyn Fn(&SessionChange) + Send + Sync>;

/// Invariant: `address` and `signing_client` are both present iff
/// `status == Connected`; both absent otherwise. Every transition below
/// maintains this.
struct SessionState {
    status: SessionStatus,
    address: Option<String>,
    signing_client: Option<Arc<dyn SigningClient>>,
    last_error: Option<String>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            address: self.address.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// The process-wide wallet session. One instance per client, owned by the
/// surrounding context object; the session is mutated only through
/// [`connect`](Self::connect), [`disconnect`](Self::disconnect) and
/// [`clear_error`](Self::clear_error).
pub struct WalletSession {
    config: ChainConfig,
    provider: Option<Arc<dyn WalletProvider>>,
    connector: Option<Arc<dyn SigningConnector>>,
    store: Option<WalletStore>,
    state: RwLock<SessionState>,
    /// Bumped by every new connect attempt and by every disconnect; a
    /// finishing attempt applies its result only if the epoch still
    /// matches, so a stale result can never overwrite newer intent.
    epoch: AtomicU64,
    observers: RwLock<Vec<SessionObserver>>,
}

impl WalletSession {
    pub fn new(
        config: ChainConfig,
        provider: Option<Arc<dyn WalletProvider>>,
        connector: Option<Arc<dyn SigningConnector>>,
        store: Option<WalletStore>,
    ) -> Self {
        Self {
            config,
            provider,
            connector,
            store,
            state: RwLock::new(SessionState {
                status: SessionStatus::Disconnected,
                address: None,
                signing_client: None,
                last_error: None,
            }),
            epoch: AtomicU64::new(0),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Connect the wallet.
    ///
    /// Allowed from `Disconnected` and `Failed`. The four provider steps
    /// run strictly in order, each bounded by the configured provider
    /// timeout: declare the chain, request access, obtain the signer and
    /// its accounts (zero accounts is a failure), then build the signing
    /// client. Only after all four succeed does the session become
    /// `Connected`.
    ///
    /// Every failure is converted into the `Failed` state carrying a
    /// human-readable message; the same error is also returned. A
    /// concurrent call while already `Connecting` is rejected without
    /// disturbing the running attempt, and a `disconnect` issued while a
    /// step is in flight causes the attempt's eventual result to be
    /// discarded.
    #[instrument(skip(self), fields(chain_id = %self.config.chain_id))]
    pub async fn connect(&self) -> ClientResult<SessionSnapshot> {
        let (epoch, change) = {
            let mut state = self.state.write();
            match state.status {
                SessionStatus::Connecting => {
                    return Err(ClientError::provider(
                        "a connection attempt is already in progress",
                    ));
                }
                SessionStatus::Connected => {
                    debug!("connect requested while already connected");
                    return Ok(state.snapshot());
                }
                SessionStatus::Disconnected | SessionStatus::Failed => {}
            }
            let previous_status = state.status;
            let previous_address = state.address.clone();
            state.status = SessionStatus::Connecting;
            state.last_error = None;
            let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
            (
                epoch,
                SessionChange {
                    previous_status,
                    previous_address,
                    snapshot: state.snapshot(),
                },
            )
        };
        self.notify(&change);
        self.persist().await;

        match self.run_connect_steps().await {
            Ok((address, signing_client)) => {
                let change = {
                    let mut state = self.state.write();
                    if self.epoch.load(Ordering::SeqCst) != epoch {
                        debug!(%address, "discarding connect result from a superseded attempt");
                        return Ok(state.snapshot());
                    }
                    let previous_status = state.status;
                    let previous_address = state.address.clone();
                    state.status = SessionStatus::Connected;
                    state.address = Some(address);
                    state.signing_client = Some(signing_client);
                    state.last_error = None;
                    SessionChange {
                        previous_status,
                        previous_address,
                        snapshot: state.snapshot(),
                    }
                };
                self.notify(&change);
                self.persist().await;
                Ok(change.snapshot)
            }
            Err(err) => {
                let change = {
                    let mut state = self.state.write();
                    if self.epoch.load(Ordering::SeqCst) != epoch {
                        debug!("discarding connect failure from a superseded attempt");
                        return Err(err);
                    }
                    let previous_status = state.status;
                    let previous_address = state.address.clone();
                    state.status = SessionStatus::Failed;
                    state.address = None;
                    state.signing_client = None;
                    state.last_error = Some(err.to_string());
                    SessionChange {
                        previous_status,
                        previous_address,
                        snapshot: state.snapshot(),
                    }
                };
                warn!(error = %err, "wallet connection failed");
                self.notify(&change);
                self.persist().await;
                Err(err)
            }
        }
    }

    async fn run_connect_steps(&self) -> ClientResult<(String, Arc<dyn SigningClient>)> {
        let provider = self
            .provider
            .clone()
            .ok_or_else(|| ClientError::provider_unavailable("no wallet provider is installed"))?;
        let connector = self.connector.clone().ok_or_else(|| {
            ClientError::provider_unavailable("no signing connector is configured")
        })?;
        let limit = self.config.timeouts.provider_timeout();

        bounded(limit, "declare chain", provider.declare_chain(&self.config)).await?;
        bounded(
            limit,
            "request access",
            provider.request_access(&self.config.chain_id),
        )
        .await?;
        let signer = bounded(limit, "obtain signer", provider.signer(&self.config.chain_id)).await?;
        let accounts = bounded(limit, "list accounts", signer.accounts()).await?;
        let first = accounts
            .first()
            .ok_or_else(|| ClientError::no_accounts(&self.config.chain_id))?;
        let address = first.address.clone();
        let signing_client = bounded(
            limit,
            "connect signing client",
            connector.connect(&self.config.rpc_endpoint, signer, &self.config.gas_price),
        )
        .await?;

        Ok((address, signing_client))
    }

    /// Disconnect the wallet. Allowed from any state, idempotent, and
    /// accepted immediately even while a connect attempt is in flight
    /// (the attempt's result will be discarded).
    pub fn disconnect(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let change = {
            let mut state = self.state.write();
            if state.status == SessionStatus::Disconnected && state.address.is_none() {
                return;
            }
            let previous_status = state.status;
            let previous_address = state.address.take();
            state.signing_client = None;
            state.status = SessionStatus::Disconnected;
            SessionChange {
                previous_status,
                previous_address,
                snapshot: state.snapshot(),
            }
        };
        debug!("wallet disconnected");
        self.notify(&change);
        self.persist_in_background();
    }

    /// Clear the stored error message without changing status. Callable in
    /// any state to reset a stale message.
    pub fn clear_error(&self) {
        let mut state = self.state.write();
        if state.last_error.take().is_some() {
            debug!("cleared session error");
        }
    }

    /// Register an observer invoked on every applied transition.
    pub fn on_change(&self, observer: impl Fn(&SessionChange) + Send + Sync + 'static) {
        self.observers.write().push(Box::new(observer));
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.read().snapshot()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.read().status
    }

    pub fn address(&self) -> Option<String> {
        self.state.read().address.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().status == SessionStatus::Connected
    }

    /// The signing handle, present exactly while `Connected`.
    pub fn signing_client(&self) -> Option<Arc<dyn SigningClient>> {
        self.state.read().signing_client.clone()
    }

    /// The active address together with its signing client, or a
    /// `ProviderUnavailable` error when no wallet is connected.
    pub fn signing_context(&self) -> ClientResult<(String, Arc<dyn SigningClient>)> {
        let state = self.state.read();
        match (&state.address, &state.signing_client) {
            (Some(address), Some(client)) if state.status == SessionStatus::Connected => {
                Ok((address.clone(), Arc::clone(client)))
            }
            _ => Err(ClientError::provider_unavailable("wallet is not connected")),
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    fn notify(&self, change: &SessionChange) {
        for observer in self.observers.read().iter() {
            observer(change);
        }
    }

    fn stored_projection(&self) -> StoredWallet {
        let state = self.state.read();
        StoredWallet {
            address: state.address.clone(),
            is_connected: state.status == SessionStatus::Connected,
            updated_at: None,
        }
    }

    async fn persist(&self) {
        let Some(store) = &self.store else { return };
        if let Err(err) = store.save(&self.stored_projection()).await {
            warn!(%err, "failed to persist wallet projection");
        }
    }

    fn persist_in_background(&self) {
        let Some(store) = &self.store else { return };
        let store = store.clone();
        let stored = self.stored_projection();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = store.save(&stored).await {
                        warn!(%err, "failed to persist wallet projection");
                    }
                });
            }
            Err(_) => debug!("no runtime; wallet projection not persisted"),
        }
    }
}

async fn bounded<T>(
    limit: Duration,
    operation: &str,
    fut: impl Future<Output = ClientResult<T>>,
) -> ClientResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::timeout(operation)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::{MarketplaceMsg, TxOutcome};
    use crate::wallet::provider::{
        AccountInfo, MockSigningConnector, MockWalletProvider, MockWalletSigner, WalletSigner,
    };
    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    fn assert_invariant(session: &WalletSession) {
        let connected = session.status() == SessionStatus::Connected;
        assert_eq!(session.address().is_some(), connected);
        assert_eq!(session.signing_client().is_some(), connected);
    }

    struct NoopSigningClient;

    #[async_trait]
    impl SigningClient for NoopSigningClient {
        async fn sign_and_broadcast(
            &self,
            _signer_address: &str,
            _msgs: Vec<MarketplaceMsg>,
            _memo: &str,
        ) -> ClientResult<TxOutcome> {
            Ok(TxOutcome {
                tx_hash: "CAFE".to_string(),
                code: 0,
                raw_log: String::new(),
                height: 1,
            })
        }
    }

    fn working_provider(address: &str) -> Arc<dyn WalletProvider> {
        let mut provider = MockWalletProvider::new();
        provider.expect_declare_chain().times(1).returning(|_| Ok(()));
        provider.expect_request_access().times(1).returning(|_| Ok(()));
        let mut signer = MockWalletSigner::new();
        let accounts = vec![AccountInfo {
            address: address.to_string(),
        }];
        signer
            .expect_accounts()
            .returning(move || Ok(accounts.clone()));
        let signer: Arc<dyn WalletSigner> = Arc::new(signer);
        provider
            .expect_signer()
            .times(1)
            .returning(move |_| Ok(Arc::clone(&signer)));
        Arc::new(provider)
    }

    fn working_connector() -> Arc<dyn SigningConnector> {
        let mut connector = MockSigningConnector::new();
        connector
            .expect_connect()
            .returning(|_, _, _| Ok(Arc::new(NoopSigningClient) as Arc<dyn SigningClient>));
        Arc::new(connector)
    }

    #[tokio::test]
    async fn connect_without_provider_fails() {
        let session = WalletSession::new(ChainConfig::local_defaults(), None, None, None);

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::ProviderUnavailable { .. }));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Failed);
        assert_eq!(snapshot.address, None);
        assert!(snapshot.last_error.unwrap().contains("provider"));
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn connect_success_populates_address_and_handle() {
        let session = WalletSession::new(
            ChainConfig::local_defaults(),
            Some(working_provider("skill1abc")),
            Some(working_connector()),
            None,
        );

        let snapshot = session.connect().await.unwrap();
        assert_eq!(snapshot.status, SessionStatus::Connected);
        assert_eq!(snapshot.address.as_deref(), Some("skill1abc"));
        assert_eq!(snapshot.last_error, None);
        assert!(session.signing_client().is_some());
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn zero_accounts_is_a_failure() {
        let mut provider = MockWalletProvider::new();
        provider.expect_declare_chain().returning(|_| Ok(()));
        provider.expect_request_access().returning(|_| Ok(()));
        let mut signer = MockWalletSigner::new();
        signer.expect_accounts().returning(|| Ok(Vec::new()));
        let signer: Arc<dyn WalletSigner> = Arc::new(signer);
        provider
            .expect_signer()
            .returning(move |_| Ok(Arc::clone(&signer)));

        let session = WalletSession::new(
            ChainConfig::local_defaults(),
            Some(Arc::new(provider)),
            Some(working_connector()),
            None,
        );

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::NoAccounts { .. }));
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn step_failure_never_leaves_connecting() {
        let mut provider = MockWalletProvider::new();
        provider.expect_declare_chain().returning(|_| Ok(()));
        provider
            .expect_request_access()
            .returning(|_| Err(ClientError::user_rejected("request dismissed")));

        let session = WalletSession::new(
            ChainConfig::local_defaults(),
            Some(Arc::new(provider)),
            Some(working_connector()),
            None,
        );

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::UserRejected { .. }));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, SessionStatus::Failed);
        assert!(snapshot.last_error.unwrap().contains("request dismissed"));
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn provider_step_is_bounded_by_timeout() {
        struct StuckProvider;

        #[async_trait]
        impl WalletProvider for StuckProvider {
            async fn declare_chain(&self, _chain: &ChainConfig) -> ClientResult<()> {
                std::future::pending().await
            }
            async fn request_access(&self, _chain_id: &str) -> ClientResult<()> {
                Ok(())
            }
            async fn signer(&self, _chain_id: &str) -> ClientResult<Arc<dyn WalletSigner>> {
                unreachable!("declare_chain never completes")
            }
        }

        let mut config = ChainConfig::local_defaults();
        config.timeouts.provider_secs = 0;

        let session = WalletSession::new(
            config,
            Some(Arc::new(StuckProvider)),
            Some(working_connector()),
            None,
        );

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout { .. }));
        assert_eq!(session.status(), SessionStatus::Failed);
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let session = WalletSession::new(
            ChainConfig::local_defaults(),
            Some(working_provider("skill1abc")),
            Some(working_connector()),
            None,
        );
        session.connect().await.unwrap();

        session.disconnect();
        let once = session.snapshot();
        session.disconnect();
        let twice = session.snapshot();

        assert_eq!(once, twice);
        assert_eq!(once.status, SessionStatus::Disconnected);
        assert_eq!(once.address, None);
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn concurrent_connect_is_rejected() {
        struct GatedProvider {
            gate: Arc<Semaphore>,
            accounts: Vec<AccountInfo>,
        }

        struct FixedSigner(Vec<AccountInfo>);

        #[async_trait]
        impl WalletSigner for FixedSigner {
            async fn accounts(&self) -> ClientResult<Vec<AccountInfo>> {
                Ok(self.0.clone())
            }
        }

        #[async_trait]
        impl WalletProvider for GatedProvider {
            async fn declare_chain(&self, _chain: &ChainConfig) -> ClientResult<()> {
                let _permit = self.gate.acquire().await.unwrap();
                Ok(())
            }
            async fn request_access(&self, _chain_id: &str) -> ClientResult<()> {
                Ok(())
            }
            async fn signer(&self, _chain_id: &str) -> ClientResult<Arc<dyn WalletSigner>> {
                Ok(Arc::new(FixedSigner(self.accounts.clone())))
            }
        }

        let gate = Arc::new(Semaphore::new(0));
        let session = Arc::new(WalletSession::new(
            ChainConfig::local_defaults(),
            Some(Arc::new(GatedProvider {
                gate: Arc::clone(&gate),
                accounts: vec![AccountInfo {
                    address: "skill1abc".to_string(),
                }],
            })),
            Some(working_connector()),
            None,
        ));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.connect().await }
        });

        // wait until the first attempt holds the Connecting state
        while session.status() != SessionStatus::Connecting {
            tokio::task::yield_now().await;
        }

        let err = session.connect().await.unwrap_err();
        assert!(matches!(err, ClientError::Provider { .. }));

        gate.add_permits(1);
        let snapshot = first.await.unwrap().unwrap();
        assert_eq!(snapshot.status, SessionStatus::Connected);
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn disconnect_discards_inflight_connect_result() {
        struct GatedProvider {
            gate: Arc<Semaphore>,
        }

        struct FixedSigner;

        #[async_trait]
        impl WalletSigner for FixedSigner {
            async fn accounts(&self) -> ClientResult<Vec<AccountInfo>> {
                Ok(vec![AccountInfo {
                    address: "skill1late".to_string(),
                }])
            }
        }

        #[async_trait]
        impl WalletProvider for GatedProvider {
            async fn declare_chain(&self, _chain: &ChainConfig) -> ClientResult<()> {
                let _permit = self.gate.acquire().await.unwrap();
                Ok(())
            }
            async fn request_access(&self, _chain_id: &str) -> ClientResult<()> {
                Ok(())
            }
            async fn signer(&self, _chain_id: &str) -> ClientResult<Arc<dyn WalletSigner>> {
                Ok(Arc::new(FixedSigner))
            }
        }

        let gate = Arc::new(Semaphore::new(0));
        let session = Arc::new(WalletSession::new(
            ChainConfig::local_defaults(),
            Some(Arc::new(GatedProvider {
                gate: Arc::clone(&gate),
            })),
            Some(working_connector()),
            None,
        ));

        let attempt = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.connect().await }
        });

        while session.status() != SessionStatus::Connecting {
            tokio::task::yield_now().await;
        }

        session.disconnect();
        assert_eq!(session.status(), SessionStatus::Disconnected);

        // let the stale attempt finish; its result must be discarded
        gate.add_permits(1);
        let snapshot = attempt.await.unwrap().unwrap();
        assert_eq!(snapshot.status, SessionStatus::Disconnected);
        assert_eq!(session.address(), None);
        assert!(session.signing_client().is_none());
        assert_invariant(&session);
    }

    #[tokio::test]
    async fn clear_error_keeps_status() {
        let session = WalletSession::new(ChainConfig::local_defaults(), None, None, None);
        let _ = session.connect().await;
        assert!(session.last_error().is_some());

        session.clear_error();
        assert_eq!(session.last_error(), None);
        assert_eq!(session.status(), SessionStatus::Failed);
    }

    #[tokio::test]
    async fn observers_see_connecting_then_failed() {
        let session = WalletSession::new(ChainConfig::local_defaults(), None, None, None);
        let seen: Arc<parking_lot::Mutex<Vec<SessionStatus>>> =
            Arc::new(parking_lot::Mutex::new(Vec::new()));
        session.on_change({
            let seen = Arc::clone(&seen);
            move |change| seen.lock().push(change.snapshot.status)
        });

        let _ = session.connect().await;

        assert_eq!(
            *seen.lock(),
            vec![SessionStatus::Connecting, SessionStatus::Failed]
        );
    }

    #[tokio::test]
    async fn transitions_rewrite_the_stored_projection() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::new(dir.path().join("wallet.json"));

        let session = WalletSession::new(
            ChainConfig::local_defaults(),
            Some(working_provider("skill1abc")),
            Some(working_connector()),
            Some(store.clone()),
        );

        session.connect().await.unwrap();
        let stored = store.load().await;
        assert_eq!(stored.address.as_deref(), Some("skill1abc"));
        assert!(stored.is_connected);

        session.disconnect();
        // the disconnect write happens in the background
        for _ in 0..100 {
            if !store.load().await.is_connected {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let stored = store.load().await;
        assert_eq!(stored.address, None);
        assert!(!stored.is_connected);
    }
}

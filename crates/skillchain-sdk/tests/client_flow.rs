//! End-to-end client flows against a stub REST server and a fake wallet
//! capability.

use async_trait::async_trait;
use skillchain_sdk::{
    AccountInfo, ChainConfig, ClientError, ClientResult, GasPriceConfig, GigStatus,
    MarketplaceMsg, QueryKey, SessionStatus, SigningClient, SigningConnector, SkillchainClient,
    Staleness, TxOutcome, WalletProvider, WalletSigner, WalletStore,
};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Serve one canned response per connection on an ephemeral port.
async fn stub_server(status_line: &'static str, body: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len(),
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });
    format!("http://{addr}")
}

struct FakeProvider {
    address: &'static str,
}

struct FakeSigner {
    address: &'static str,
}

struct FakeConnector;

struct FakeSigningClient;

#[async_trait]
impl WalletProvider for FakeProvider {
    async fn declare_chain(&self, _chain: &ChainConfig) -> ClientResult<()> {
        Ok(())
    }
    async fn request_access(&self, _chain_id: &str) -> ClientResult<()> {
        Ok(())
    }
    async fn signer(&self, _chain_id: &str) -> ClientResult<Arc<dyn WalletSigner>> {
        Ok(Arc::new(FakeSigner {
            address: self.address,
        }))
    }
}

#[async_trait]
impl WalletSigner for FakeSigner {
    async fn accounts(&self) -> ClientResult<Vec<AccountInfo>> {
        Ok(vec![AccountInfo {
            address: self.address.to_string(),
        }])
    }
}

#[async_trait]
impl SigningConnector for FakeConnector {
    async fn connect(
        &self,
        _rpc_endpoint: &str,
        _signer: Arc<dyn WalletSigner>,
        _gas_price: &GasPriceConfig,
    ) -> ClientResult<Arc<dyn SigningClient>> {
        Ok(Arc::new(FakeSigningClient))
    }
}

#[async_trait]
impl SigningClient for FakeSigningClient {
    async fn sign_and_broadcast(
        &self,
        _signer_address: &str,
        _msgs: Vec<MarketplaceMsg>,
        _memo: &str,
    ) -> ClientResult<TxOutcome> {
        Ok(TxOutcome {
            tx_hash: "ABCD".to_string(),
            code: 0,
            raw_log: String::new(),
            height: 7,
        })
    }
}

fn config_with_rest(rest: String) -> ChainConfig {
    let mut config = ChainConfig::local_defaults();
    config.rest_endpoint = rest;
    config
}

#[tokio::test]
async fn connect_without_provider_reports_failed_state() {
    let client = SkillchainClient::builder().build().unwrap();

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, ClientError::ProviderUnavailable { .. }));

    let snapshot = client.session().snapshot();
    assert_eq!(snapshot.status, SessionStatus::Failed);
    assert_eq!(snapshot.address, None);
    assert!(snapshot.last_error.is_some());

    // retry stays possible: clear the message and the status is unchanged
    client.clear_error();
    assert_eq!(client.session().status(), SessionStatus::Failed);
    assert_eq!(client.session().last_error(), None);
}

#[tokio::test]
async fn connecting_invalidates_the_new_identitys_groups() {
    let client = SkillchainClient::builder()
        .with_wallet_provider(Arc::new(FakeProvider {
            address: "skill1abc",
        }))
        .with_signing_connector(Arc::new(FakeConnector))
        .build()
        .unwrap();

    // a balance cached for the address before it was connected
    let key = QueryKey::balance("skill1abc", "uskill");
    let _: String = client
        .cache()
        .get_with(key.clone(), Staleness::UntilInvalidated, || async {
            Ok("999".to_string())
        })
        .await
        .unwrap();

    let snapshot = client.connect().await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Connected);
    assert_eq!(snapshot.address.as_deref(), Some("skill1abc"));

    // identity changed, so the stale balance must be gone
    assert_eq!(client.cache().peek::<String>(&key), None);
}

#[tokio::test]
async fn disconnect_invalidates_the_previous_identitys_groups() {
    let client = SkillchainClient::builder()
        .with_wallet_provider(Arc::new(FakeProvider {
            address: "skill1abc",
        }))
        .with_signing_connector(Arc::new(FakeConnector))
        .build()
        .unwrap();

    client.connect().await.unwrap();

    let key = QueryKey::contracts_by_user("skill1abc");
    let _: String = client
        .cache()
        .get_with(key.clone(), Staleness::UntilInvalidated, || async {
            Ok("contracts".to_string())
        })
        .await
        .unwrap();

    client.disconnect();

    assert_eq!(client.session().status(), SessionStatus::Disconnected);
    assert_eq!(client.cache().peek::<String>(&key), None);
}

#[tokio::test]
async fn gig_list_is_served_from_cache_within_budget() {
    let rest = stub_server(
        "HTTP/1.1 200 OK",
        r#"{"gig":[{"id":"1","title":"Logo","status":"open"}]}"#,
    )
    .await;
    let client = SkillchainClient::builder()
        .with_config(config_with_rest(rest))
        .build()
        .unwrap();

    let first = client.gigs().await.unwrap();
    let second = client.gigs().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].status, GigStatus::Open);
    assert_eq!(client.cache().fetch_count(), 1, "second read hit the cache");
}

#[tokio::test]
async fn missing_gig_resolves_to_none() {
    let rest = stub_server("HTTP/1.1 404 Not Found", "{}").await;
    let client = SkillchainClient::builder()
        .with_config(config_with_rest(rest))
        .build()
        .unwrap();

    let gig = client.gig("42").await.unwrap();
    assert!(gig.is_none());
}

#[tokio::test]
async fn accepting_an_application_invalidates_both_groups_through_the_facade() {
    let client = SkillchainClient::builder()
        .with_wallet_provider(Arc::new(FakeProvider {
            address: "skill1client",
        }))
        .with_signing_connector(Arc::new(FakeConnector))
        .build()
        .unwrap();
    client.connect().await.unwrap();

    let by_gig = QueryKey::applications_by_gig("7");
    let client_contracts = QueryKey::contracts_by_user("skill1client");
    let freelancer_contracts = QueryKey::contracts_by_user("skill1dev");
    for key in [&by_gig, &client_contracts, &freelancer_contracts] {
        let _: String = client
            .cache()
            .get_with(key.clone(), Staleness::UntilInvalidated, || async {
                Ok("cached".to_string())
            })
            .await
            .unwrap();
    }

    client.tx().accept_application("3", "7").await.unwrap();

    assert_eq!(client.cache().peek::<String>(&by_gig), None);
    assert_eq!(client.cache().peek::<String>(&client_contracts), None);
    assert_eq!(client.cache().peek::<String>(&freelancer_contracts), None);
}

#[tokio::test]
async fn wallet_projection_survives_through_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = WalletStore::new(dir.path().join("wallet.json"));

    let client = SkillchainClient::builder()
        .with_wallet_provider(Arc::new(FakeProvider {
            address: "skill1abc",
        }))
        .with_signing_connector(Arc::new(FakeConnector))
        .with_wallet_store(store)
        .build()
        .unwrap();

    // nothing persisted yet
    let stored = client.stored_wallet().await.unwrap();
    assert_eq!(stored.address, None);
    assert!(!stored.is_connected);

    client.connect().await.unwrap();

    let stored = client.stored_wallet().await.unwrap();
    assert_eq!(stored.address.as_deref(), Some("skill1abc"));
    assert!(stored.is_connected);

    // only the identity projection is on disk, nothing secret
    let raw = std::fs::read_to_string(dir.path().join("wallet.json")).unwrap();
    assert!(!raw.contains("signing"), "{raw}");
}

#[tokio::test]
async fn my_balance_defaults_to_zero_while_disconnected() {
    let client = SkillchainClient::builder().build().unwrap();
    assert_eq!(client.my_balance().await.unwrap(), "0");
    assert!(client.my_applications().await.unwrap().is_empty());
    assert!(client.my_contracts().await.unwrap().is_empty());
    assert_eq!(client.my_profile().await.unwrap(), None);
}

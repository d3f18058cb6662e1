//! HTTP behaviour of the bot identity routes.

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum_test::TestServer;
use clawlink::{BotId, OwnerId};
use clawlink_attestation::{Issuer, OwnershipAttestation, SigningKey, decode_signature};
use clawlink_identity::{
    AttestationCache, ChallengeResponse, FileAttestationCache, FileKeyStorage, IdentityError,
    IdentityState, Keypair, MemoryAttestationCache, MemoryKeyStorage, create_router,
};
use serde_json::{Value, json};

fn attestation_for(keypair: &Keypair, owner: &str) -> OwnershipAttestation {
    Issuer::generate("http://localhost:3000")
        .issue(&OwnerId::parse(owner).unwrap(), &BotId::new(), keypair.public_key())
        .unwrap()
}

fn server_with(keypair: Keypair, cache: Arc<dyn AttestationCache>) -> TestServer {
    TestServer::new(create_router(IdentityState::new(keypair, cache))).unwrap()
}

fn memory_server() -> (TestServer, Keypair, Arc<MemoryAttestationCache>) {
    let keypair = Keypair::load_or_create(&MemoryKeyStorage::new()).unwrap();
    let cache = Arc::new(MemoryAttestationCache::new());
    (server_with(keypair.clone(), cache.clone()), keypair, cache)
}

#[tokio::test]
async fn identity_before_claim_is_not_found() {
    let (server, _, _) = memory_server();

    let response = server.get("/identity").await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "Not yet claimed");
}

#[tokio::test]
async fn pushed_attestation_is_served() {
    let (server, keypair, cache) = memory_server();
    let attestation = attestation_for(&keypair, "alien-1");

    let ack = server.post("/attestation").json(&attestation).await;
    ack.assert_status_ok();
    assert_eq!(ack.json::<Value>(), json!({ "ok": true }));

    let response = server.get("/identity").await;
    response.assert_status_ok();
    assert_eq!(response.json::<OwnershipAttestation>(), attestation);
    assert_eq!(cache.load().unwrap(), Some(attestation));
}

#[tokio::test]
async fn wrapped_push_is_accepted_and_overwrites() {
    let (server, keypair, _) = memory_server();
    let first = attestation_for(&keypair, "alien-1");
    let second = attestation_for(&keypair, "alien-2");

    server.post("/attestation").json(&first).await.assert_status_ok();
    server
        .post("/attestation")
        .json(&json!({ "attestation": second }))
        .await
        .assert_status_ok();

    let served: OwnershipAttestation = server.get("/identity").await.json();
    assert_eq!(served.alien_id, "alien-2");
}

#[tokio::test]
async fn challenge_signs_nonce_deterministically() {
    let (server, keypair, _) = memory_server();

    let first: ChallengeResponse = server
        .post("/challenge")
        .json(&json!({ "nonce": "n-8f3a" }))
        .await
        .json();
    let second: ChallengeResponse = server
        .post("/challenge")
        .json(&json!({ "nonce": "n-8f3a" }))
        .await
        .json();

    assert_eq!(first.nonce, "n-8f3a");
    assert_eq!(first.public_key, keypair.public_key().as_str());
    assert_eq!(first.signature, second.signature);

    let signature = decode_signature(&first.signature).unwrap();
    assert!(keypair.verifying_key().verify(b"n-8f3a", &signature));
    let stranger = SigningKey::generate().verifying_key();
    assert!(!stranger.verify(b"n-8f3a", &signature));
}

#[tokio::test]
async fn challenge_without_nonce_is_rejected() {
    let (server, _, _) = memory_server();

    let empty = server.post("/challenge").json(&json!({ "nonce": "" })).await;
    empty.assert_status_bad_request();
    assert_eq!(empty.json::<Value>()["error"], "nonce is required");

    server
        .post("/challenge")
        .json(&json!({}))
        .await
        .assert_status_bad_request();
}

#[tokio::test]
async fn file_backed_identity_survives_restart() {
    let home = tempfile::tempdir().unwrap();

    let keypair = Keypair::load_or_create(&FileKeyStorage::new(home.path())).unwrap();
    let attestation = attestation_for(&keypair, "alien-1");
    let server = server_with(
        keypair.clone(),
        Arc::new(FileAttestationCache::new(home.path())),
    );
    server.post("/attestation").json(&attestation).await.assert_status_ok();
    drop(server);

    let reloaded = Keypair::load_or_create(&FileKeyStorage::new(home.path())).unwrap();
    assert_eq!(reloaded.public_key(), keypair.public_key());

    let server = server_with(reloaded, Arc::new(FileAttestationCache::new(home.path())));
    let served: OwnershipAttestation = server.get("/identity").await.json();
    assert_eq!(served, attestation);
}

#[tokio::test]
async fn corrupt_cache_is_a_server_error() {
    let home = tempfile::tempdir().unwrap();
    let cache = FileAttestationCache::new(home.path());
    std::fs::write(cache.path(), "not json").unwrap();
    let keypair = Keypair::load_or_create(&MemoryKeyStorage::new()).unwrap();
    let server = server_with(keypair, Arc::new(cache));

    server
        .get("/identity")
        .await
        .assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

/// Holds every `load` until the test opens the gate.
struct GatedCache {
    inner: MemoryAttestationCache,
    gate: Mutex<Receiver<()>>,
}

impl AttestationCache for GatedCache {
    fn load(&self) -> Result<Option<OwnershipAttestation>, IdentityError> {
        self.gate
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .map_err(|e| IdentityError::storage(format!("gate never opened: {e}")))?;
        self.inner.load()
    }

    fn store(&self, attestation: &OwnershipAttestation) -> Result<(), IdentityError> {
        self.inner.store(attestation)
    }
}

#[tokio::test(flavor = "current_thread")]
async fn slow_cache_does_not_stall_other_routes() {
    let keypair = Keypair::load_or_create(&MemoryKeyStorage::new()).unwrap();
    let (open_gate, gate) = mpsc::channel();
    let cache = Arc::new(GatedCache {
        inner: MemoryAttestationCache::new(),
        gate: Mutex::new(gate),
    });
    cache.inner.store(&attestation_for(&keypair, "alien-1")).unwrap();
    let server = server_with(keypair, cache);

    let (identity, challenge) = tokio::join!(server.get("/identity"), async {
        let response = server
            .post("/challenge")
            .json(&json!({ "nonce": "n-while-loading" }))
            .await;
        open_gate.send(()).unwrap();
        response
    });

    challenge.assert_status_ok();
    identity.assert_status_ok();
    assert_eq!(identity.json::<OwnershipAttestation>().alien_id, "alien-1");
}

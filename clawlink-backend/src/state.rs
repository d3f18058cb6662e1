//! Shared state for the backend routes.

use std::sync::Arc;

use clawlink_attestation::{KeyPublisher, SigningKeyConfig};
use clawlink_registry::{
    AttestationDelivery, BotDirectory, BotStore, ClaimProcessor, Clock, DeliveryError,
    InMemoryBotStore, Registrar, RegistryConfig, SystemClock,
};

use crate::auth::OwnerAuthenticator;
use crate::config::BackendConfig;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    registrar: Registrar,
    claims: ClaimProcessor,
    directory: BotDirectory,
    keys: KeyPublisher,
    auth: Arc<dyn OwnerAuthenticator>,
}

impl AppState {
    /// Wires the backend components over one store and clock.
    ///
    /// Delivery to bot endpoints is off until [`AppState::with_delivery`].
    #[must_use]
    pub fn new(
        store: Arc<dyn BotStore>,
        clock: Arc<dyn Clock>,
        signing_key: &SigningKeyConfig,
        config: RegistryConfig,
        auth: Arc<dyn OwnerAuthenticator>,
    ) -> Self {
        let claims = ClaimProcessor::new(store.clone(), clock.clone(), signing_key, &config);
        Self {
            registrar: Registrar::new(store.clone(), clock, config),
            claims,
            directory: BotDirectory::new(store),
            keys: KeyPublisher::new(signing_key),
            auth,
        }
    }

    /// Enables the attestation push to bot endpoints after each claim.
    #[must_use]
    pub fn with_delivery(mut self, delivery: AttestationDelivery) -> Self {
        self.claims = self.claims.with_delivery(delivery);
        self
    }

    /// Builds the production state: in-memory store, system clock and
    /// attestation delivery.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::Client` if the delivery client cannot be built.
    pub fn from_config(config: BackendConfig) -> Result<Self, DeliveryError> {
        let delivery = AttestationDelivery::new(config.registry.delivery_timeout)?;
        Ok(Self::new(
            Arc::new(InMemoryBotStore::new()),
            Arc::new(SystemClock),
            &config.signing_key,
            config.registry,
            Arc::new(config.authenticator),
        )
        .with_delivery(delivery))
    }

    /// Registration and code refresh.
    #[must_use]
    pub const fn registrar(&self) -> &Registrar {
        &self.registrar
    }

    /// The claim transaction.
    #[must_use]
    pub const fn claims(&self) -> &ClaimProcessor {
        &self.claims
    }

    /// Owner and attestation lookups.
    #[must_use]
    pub const fn directory(&self) -> &BotDirectory {
        &self.directory
    }

    /// The published verification key.
    #[must_use]
    pub const fn keys(&self) -> &KeyPublisher {
        &self.keys
    }

    /// The owner token verifier.
    #[must_use]
    pub fn authenticator(&self) -> &dyn OwnerAuthenticator {
        self.auth.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("registrar", &self.registrar)
            .field("claims", &self.claims)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

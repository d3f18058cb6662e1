//! The claim transaction: binds an owner to a pending bot exactly once.

use std::sync::Arc;

use clawlink::{ClaimCode, OwnerId};
use clawlink_attestation::{AttestationError, Issuer, OwnershipAttestation, SigningKeyConfig, format_timestamp};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::{AttestationDelivery, BotRecord, BotStore, Clock, RegistryConfig, RegistryError};

/// Result of a successful claim.
#[derive(Debug)]
pub struct ClaimOutcome {
    /// The record as committed, now owned
    pub record: BotRecord,
    /// The attestation stored on the record
    pub attestation: OwnershipAttestation,
    /// Background push to the bot's endpoint, if one was started
    pub delivery: Option<JoinHandle<()>>,
}

/// Processes claim codes presented by authenticated owners.
///
/// # Algorithm
///
/// 1. Parse the code (six ASCII digits); nothing is read on failure.
/// 2. Find the unclaimed record holding the code.
/// 3. Reject if the code's window has passed; the record is left alone.
/// 4. Issue an attestation for the record's current id and public key.
/// 5. Commit through [`BotStore::commit_claim`], guarded on the code found
///    in step 2. A lost race reads as an unknown code.
/// 6. Push the attestation to the bot's endpoint in the background.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use clawlink::OwnerId;
/// use clawlink_attestation::{SigningKey, SigningKeyConfig};
/// use clawlink_registry::{ClaimProcessor, InMemoryBotStore, Registrar, RegistryConfig, SystemClock};
///
/// let store = Arc::new(InMemoryBotStore::new());
/// let config = RegistryConfig::default();
/// let registrar = Registrar::new(store.clone(), Arc::new(SystemClock), config.clone());
/// let processor = ClaimProcessor::new(
///     store,
///     Arc::new(SystemClock),
///     &SigningKeyConfig::Signing(SigningKey::generate()),
///     &config,
/// );
///
/// let key = SigningKey::generate().verifying_key().to_encoded();
/// let registration = registrar.register(key.as_str(), "r1", None).unwrap();
///
/// let owner = OwnerId::parse("alien-1").unwrap();
/// let outcome = processor
///     .claim(&owner, registration.claim_code.as_str())
///     .unwrap();
///
/// assert_eq!(outcome.attestation.alien_id, "alien-1");
/// assert!(processor.claim(&owner, registration.claim_code.as_str()).is_err());
/// ```
#[derive(Clone)]
pub struct ClaimProcessor {
    store: Arc<dyn BotStore>,
    clock: Arc<dyn Clock>,
    issuer: Option<Issuer>,
    delivery: Option<AttestationDelivery>,
}

impl ClaimProcessor {
    /// Creates a processor signing with `signing_key` as `config.issuer`.
    ///
    /// A configuration without a private key still builds; claims then fail
    /// with `SigningKeyNotConfigured`.
    #[must_use]
    pub fn new(
        store: Arc<dyn BotStore>,
        clock: Arc<dyn Clock>,
        signing_key: &SigningKeyConfig,
        config: &RegistryConfig,
    ) -> Self {
        Self {
            store,
            clock,
            issuer: signing_key.issuer(config.issuer.clone()).ok(),
            delivery: None,
        }
    }

    /// Enables the best-effort push to bot endpoints.
    #[must_use]
    pub fn with_delivery(mut self, delivery: AttestationDelivery) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// Returns true if attestations can be signed.
    #[must_use]
    pub const fn can_issue(&self) -> bool {
        self.issuer.is_some()
    }

    /// Claims the bot holding `claim_code` for `owner`.
    ///
    /// # Errors
    ///
    /// - `Validation` - the code is not six digits
    /// - `InvalidOrExpiredCode` - no pending bot holds the code, or another
    ///   claimant committed first
    /// - `CodeExpired` - the code matched but its window has passed
    /// - `Attestation(SigningKeyNotConfigured)` - no signing key
    /// - `Storage` - the store failed
    pub fn claim(&self, owner: &OwnerId, claim_code: &str) -> Result<ClaimOutcome, RegistryError> {
        let code = ClaimCode::parse(claim_code)?;

        let Some(record) = self.store.find_pending_by_code(&code)? else {
            debug!(owner = %owner, "claim with unknown code");
            return Err(RegistryError::InvalidOrExpiredCode);
        };

        let now = self.clock.now();
        if let Some(pending) = record.pending_claim().filter(|p| p.is_expired_at(now)) {
            debug!(bot_id = %record.bot_id(), "claim with expired code");
            return Err(RegistryError::CodeExpired {
                expired_at: format_timestamp(pending.expires_at()),
            });
        }

        let Some(issuer) = &self.issuer else {
            error!(
                bot_id = %record.bot_id(),
                "cannot issue attestation: signing key not configured"
            );
            return Err(AttestationError::SigningKeyNotConfigured.into());
        };
        let attestation =
            issuer.issue_at(owner, record.bot_id(), record.public_key(), now)?;

        let Some(claimed) =
            self.store
                .commit_claim(record.bot_id(), &code, owner, &attestation, now)?
        else {
            debug!(bot_id = %record.bot_id(), "claim lost to a concurrent claimant");
            return Err(RegistryError::InvalidOrExpiredCode);
        };

        info!(bot_id = %claimed.bot_id(), owner = %owner, "clawbot claimed");

        let delivery = match (&self.delivery, claimed.endpoint()) {
            (Some(delivery), Some(endpoint)) => delivery.dispatch(
                claimed.bot_id().clone(),
                endpoint.clone(),
                attestation.clone(),
            ),
            _ => None,
        };

        Ok(ClaimOutcome {
            record: claimed,
            attestation,
            delivery,
        })
    }
}

impl std::fmt::Debug for ClaimProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimProcessor")
            .field("issuer", &self.issuer.as_ref().map(Issuer::issued_by))
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

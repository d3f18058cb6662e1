//! Bot registration and claim-code issuance.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use clawlink::{BotEndpoint, BotId, BotName, ClaimCode, EncodedPublicKey, OwnerId};
use clawlink_attestation::format_timestamp;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::{BotRecord, BotStore, Clock, PendingClaim, RegistryConfig, RegistryError};

/// A claim code handed out to a bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedClaimCode {
    /// The six-digit code
    pub claim_code: ClaimCode,
    /// When the code stops being accepted
    #[serde(serialize_with = "serialize_timestamp")]
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// The newly assigned bot id
    pub bot_id: BotId,
    /// The six-digit code
    pub claim_code: ClaimCode,
    /// When the code stops being accepted
    #[serde(serialize_with = "serialize_timestamp")]
    pub expires_at: DateTime<Utc>,
}

fn serialize_timestamp<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(*at))
}

/// Issues bot ids and claim codes.
///
/// Registration is unauthenticated: whoever later presents the claim code
/// becomes the owner.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use clawlink_registry::{InMemoryBotStore, Registrar, RegistryConfig, SystemClock};
///
/// let registrar = Registrar::new(
///     Arc::new(InMemoryBotStore::new()),
///     Arc::new(SystemClock),
///     RegistryConfig::default(),
/// );
///
/// let registration = registrar
///     .register("ed25519:AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA=", "r1", None)
///     .unwrap();
///
/// assert!(registration.bot_id.as_str().starts_with("cbot_"));
/// assert_eq!(registration.claim_code.as_str().len(), 6);
/// ```
#[derive(Clone)]
pub struct Registrar {
    store: Arc<dyn BotStore>,
    clock: Arc<dyn Clock>,
    config: RegistryConfig,
}

impl Registrar {
    /// Creates a registrar over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn BotStore>, clock: Arc<dyn Clock>, config: RegistryConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Registers a bot and issues its first claim code.
    ///
    /// Inputs are validated before the store is touched.
    ///
    /// # Errors
    ///
    /// - `Validation` - bad public key, name or endpoint
    /// - `CodeCollision` - no free code within the retry budget
    /// - `Storage` - the store failed
    pub fn register(
        &self,
        public_key: &str,
        name: &str,
        endpoint: Option<&str>,
    ) -> Result<Registration, RegistryError> {
        let public_key = EncodedPublicKey::parse(public_key)?;
        let name = BotName::parse(name)?;
        let endpoint = endpoint
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(BotEndpoint::parse)
            .transpose()?;

        let bot_id = BotId::new();
        let issued = self.with_fresh_code(|pending, now| {
            let record = BotRecord::new(
                bot_id.clone(),
                name.clone(),
                public_key.clone(),
                endpoint.clone(),
                pending,
                now,
            );
            self.store.insert(record)
        })?;

        info!(
            bot_id = %bot_id,
            name = %name,
            expires_at = %format_timestamp(issued.expires_at),
            "registered clawbot"
        );

        Ok(Registration {
            bot_id,
            claim_code: issued.claim_code,
            expires_at: issued.expires_at,
        })
    }

    /// Replaces the bot's claim code with a fresh one.
    ///
    /// The previous code is invalid as soon as this returns. Claimed bots
    /// never get a new code: their owner receives `AlreadyClaimed`, anyone
    /// else `NotFound`, so ownership is not disclosed.
    ///
    /// # Errors
    ///
    /// - `NotFound` - no such bot, or claimed by someone other than `caller`
    /// - `AlreadyClaimed` - `caller` already owns the bot
    /// - `CodeCollision` - no free code within the retry budget
    /// - `Storage` - the store failed
    pub fn refresh_claim_code(
        &self,
        bot_id: &BotId,
        caller: Option<&OwnerId>,
    ) -> Result<IssuedClaimCode, RegistryError> {
        let record = self
            .store
            .get(bot_id)?
            .ok_or_else(|| RegistryError::not_found(bot_id))?;

        if let Some(owner) = record.owner_id() {
            debug!(bot_id = %bot_id, "refresh requested for claimed clawbot");
            return if caller == Some(owner) {
                Err(RegistryError::already_claimed(bot_id))
            } else {
                Err(RegistryError::not_found(bot_id))
            };
        }

        let issued = self.with_fresh_code(|pending, now| {
            self.store
                .replace_pending_claim(bot_id, pending, now)
                .map(|_| ())
        })?;

        info!(
            bot_id = %bot_id,
            expires_at = %format_timestamp(issued.expires_at),
            "refreshed claim code"
        );
        Ok(issued)
    }

    /// Generates codes until `write` accepts one or the budget runs out.
    fn with_fresh_code<F>(&self, mut write: F) -> Result<IssuedClaimCode, RegistryError>
    where
        F: FnMut(PendingClaim, DateTime<Utc>) -> Result<(), RegistryError>,
    {
        let ttl = TimeDelta::from_std(self.config.claim_code_ttl).map_err(|e| {
            RegistryError::InvalidConfiguration {
                reason: format!("claim code ttl out of range: {e}"),
            }
        })?;
        let attempts = self.config.max_code_attempts.max(1);

        for attempt in 1..=attempts {
            let now = self.clock.now();
            let expires_at =
                now.checked_add_signed(ttl)
                    .ok_or_else(|| RegistryError::InvalidConfiguration {
                        reason: "claim code expiry overflows the calendar".to_string(),
                    })?;
            let code = ClaimCode::generate();

            match write(PendingClaim::new(code.clone(), expires_at), now) {
                Ok(()) => {
                    return Ok(IssuedClaimCode {
                        claim_code: code,
                        expires_at,
                    });
                }
                Err(RegistryError::CodeCollision) => {
                    debug!(attempt, "claim code collided with a pending bot; retrying");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(attempts, "exhausted claim code attempts");
        Err(RegistryError::CodeCollision)
    }
}

impl std::fmt::Debug for Registrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registrar")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::TimeZone;
    use clawlink::ValidationError;

    use super::*;
    use crate::{InMemoryBotStore, ManualClock};

    const KEY: &str = "ed25519:AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA=";

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()
    }

    fn setup() -> (Registrar, Arc<InMemoryBotStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryBotStore::new());
        let clock = Arc::new(ManualClock::new(t0()));
        let registrar = Registrar::new(store.clone(), clock.clone(), RegistryConfig::default());
        (registrar, store, clock)
    }

    /// Delegates to an in-memory store but reports a collision for the
    /// first `collisions` inserts.
    struct CollidingStore {
        inner: InMemoryBotStore,
        collisions: AtomicU32,
    }

    impl BotStore for CollidingStore {
        fn insert(&self, record: BotRecord) -> Result<(), RegistryError> {
            let remaining = self.collisions.load(Ordering::SeqCst);
            if remaining > 0 {
                self.collisions.store(remaining - 1, Ordering::SeqCst);
                return Err(RegistryError::CodeCollision);
            }
            self.inner.insert(record)
        }
        fn get(&self, bot_id: &BotId) -> Result<Option<BotRecord>, RegistryError> {
            self.inner.get(bot_id)
        }
        fn find_pending_by_code(
            &self,
            code: &ClaimCode,
        ) -> Result<Option<BotRecord>, RegistryError> {
            self.inner.find_pending_by_code(code)
        }
        fn replace_pending_claim(
            &self,
            bot_id: &BotId,
            pending: PendingClaim,
            now: DateTime<Utc>,
        ) -> Result<BotRecord, RegistryError> {
            self.inner.replace_pending_claim(bot_id, pending, now)
        }
        fn commit_claim(
            &self,
            bot_id: &BotId,
            expected_code: &ClaimCode,
            owner: &OwnerId,
            attestation: &clawlink_attestation::OwnershipAttestation,
            now: DateTime<Utc>,
        ) -> Result<Option<BotRecord>, RegistryError> {
            self.inner
                .commit_claim(bot_id, expected_code, owner, attestation, now)
        }
        fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<BotRecord>, RegistryError> {
            self.inner.list_by_owner(owner)
        }
    }

    #[test]
    fn register_issues_fifteen_minute_code() {
        let (registrar, store, _) = setup();

        let registration = registrar
            .register(KEY, "r1", Some("http://localhost:3001/"))
            .unwrap();

        assert_eq!(registration.expires_at, t0() + TimeDelta::minutes(15));
        let record = store.get(&registration.bot_id).unwrap().unwrap();
        assert_eq!(record.name().as_str(), "r1");
        assert_eq!(record.endpoint().unwrap().as_str(), "http://localhost:3001");
        assert_eq!(
            record.pending_claim().unwrap().code(),
            &registration.claim_code
        );
        assert!(record.owner_id().is_none());
    }

    #[test]
    fn register_validates_before_storage() {
        let (registrar, store, _) = setup();

        assert_eq!(
            registrar.register("AQID", "r1", None),
            Err(RegistryError::Validation(ValidationError::MissingKeyAlgorithm))
        );
        assert_eq!(
            registrar.register(KEY, "   ", None),
            Err(RegistryError::Validation(ValidationError::EmptyName))
        );
        assert!(matches!(
            registrar.register(KEY, "r1", Some("localhost:3001")),
            Err(RegistryError::Validation(ValidationError::InvalidEndpoint { .. }))
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn blank_endpoint_means_none() {
        let (registrar, store, _) = setup();

        let registration = registrar.register(KEY, "r1", Some("  ")).unwrap();

        assert!(store
            .get(&registration.bot_id)
            .unwrap()
            .unwrap()
            .endpoint()
            .is_none());
    }

    #[test]
    fn register_retries_on_collision() {
        let store = Arc::new(CollidingStore {
            inner: InMemoryBotStore::new(),
            collisions: AtomicU32::new(3),
        });
        let registrar = Registrar::new(
            store.clone(),
            Arc::new(ManualClock::new(t0())),
            RegistryConfig::default(),
        );

        let registration = registrar.register(KEY, "r1", None).unwrap();

        assert!(store.inner.get(&registration.bot_id).unwrap().is_some());
    }

    #[test]
    fn register_gives_up_after_budget() {
        let store = Arc::new(CollidingStore {
            inner: InMemoryBotStore::new(),
            collisions: AtomicU32::new(10),
        });
        let registrar = Registrar::new(
            store,
            Arc::new(ManualClock::new(t0())),
            RegistryConfig::default().with_max_code_attempts(2),
        );

        assert_eq!(
            registrar.register(KEY, "r1", None),
            Err(RegistryError::CodeCollision)
        );
    }

    #[test]
    fn refresh_replaces_code_and_expiry() {
        let (registrar, store, clock) = setup();
        let registration = registrar.register(KEY, "r1", None).unwrap();
        clock.advance(TimeDelta::minutes(10));

        let refreshed = registrar
            .refresh_claim_code(&registration.bot_id, None)
            .unwrap();

        assert_eq!(refreshed.expires_at, t0() + TimeDelta::minutes(25));
        let record = store.get(&registration.bot_id).unwrap().unwrap();
        assert_eq!(record.pending_claim().unwrap().code(), &refreshed.claim_code);
        assert_eq!(record.name().as_str(), "r1");
        assert_eq!(record.created_at(), t0());
    }

    #[test]
    fn refresh_unknown_bot_is_not_found() {
        let (registrar, _, _) = setup();
        assert!(matches!(
            registrar.refresh_claim_code(&BotId::new(), None),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn registration_json_shape() {
        let (registrar, _, _) = setup();
        let registration = registrar.register(KEY, "r1", None).unwrap();

        let json = serde_json::to_value(&registration).unwrap();

        assert_eq!(json["botId"], registration.bot_id.as_str());
        assert_eq!(json["claimCode"], registration.claim_code.as_str());
        assert_eq!(json["expiresAt"], "2025-03-01T09:15:00.000Z");
    }
}

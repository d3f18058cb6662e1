//! Bot records held by the backend store.

use chrono::{DateTime, Utc};
use clawlink::{BotEndpoint, BotId, BotName, ClaimCode, EncodedPublicKey, OwnerId};
use clawlink_attestation::{OwnershipAttestation, format_timestamp};
use serde::{Serialize, Serializer};

use crate::error::RegistryError;

/// Lifecycle state of a bot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    /// Registered, no owner yet.
    Registered,
    /// Bound to an owner.
    Claimed,
    /// Marked unreachable by external health monitoring.
    Offline,
}

impl BotStatus {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::Claimed => "claimed",
            Self::Offline => "offline",
        }
    }
}

/// A claim code together with its expiry.
///
/// The two always travel together, so a record can never carry one without
/// the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClaim {
    code: ClaimCode,
    expires_at: DateTime<Utc>,
}

impl PendingClaim {
    /// Creates a pending claim.
    #[must_use]
    pub const fn new(code: ClaimCode, expires_at: DateTime<Utc>) -> Self {
        Self { code, expires_at }
    }

    /// Returns the claim code.
    #[must_use]
    pub const fn code(&self) -> &ClaimCode {
        &self.code
    }

    /// Returns when the code stops being accepted.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true once `now` is past the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// A registered bot as stored by the backend.
///
/// Invariants upheld by every constructor and transition:
///
/// - a pending claim code and an owner are never both present
/// - once an owner is set it never changes
///
/// Serializes to the camelCase record view; the claim code is never
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotRecord {
    bot_id: BotId,
    name: BotName,
    endpoint: Option<BotEndpoint>,
    public_key: EncodedPublicKey,
    pending: Option<PendingClaim>,
    owner_id: Option<OwnerId>,
    status: BotStatus,
    attestation: Option<OwnershipAttestation>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BotRecord {
    /// Creates a freshly registered, unclaimed record.
    #[must_use]
    pub fn new(
        bot_id: BotId,
        name: BotName,
        public_key: EncodedPublicKey,
        endpoint: Option<BotEndpoint>,
        pending: PendingClaim,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            bot_id,
            name,
            endpoint,
            public_key,
            pending: Some(pending),
            owner_id: None,
            status: BotStatus::Registered,
            attestation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the bot id.
    #[must_use]
    pub const fn bot_id(&self) -> &BotId {
        &self.bot_id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &BotName {
        &self.name
    }

    /// Returns the callback endpoint, if any.
    #[must_use]
    pub const fn endpoint(&self) -> Option<&BotEndpoint> {
        self.endpoint.as_ref()
    }

    /// Returns the bot's public key.
    #[must_use]
    pub const fn public_key(&self) -> &EncodedPublicKey {
        &self.public_key
    }

    /// Returns the pending claim, present only while unclaimed.
    #[must_use]
    pub const fn pending_claim(&self) -> Option<&PendingClaim> {
        self.pending.as_ref()
    }

    /// Returns the owner, once claimed.
    #[must_use]
    pub const fn owner_id(&self) -> Option<&OwnerId> {
        self.owner_id.as_ref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> BotStatus {
        self.status
    }

    /// Returns the attestation issued at claim time.
    #[must_use]
    pub const fn attestation(&self) -> Option<&OwnershipAttestation> {
        self.attestation.as_ref()
    }

    /// Returns the creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification time.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns true once an owner is bound.
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.owner_id.is_some()
    }

    /// Returns true if `owner` is the owner of record.
    #[must_use]
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner_id.as_ref() == Some(owner)
    }

    /// Returns true if this record is unclaimed and currently holds `code`.
    #[must_use]
    pub fn holds_pending_code(&self, code: &ClaimCode) -> bool {
        self.owner_id.is_none() && self.pending.as_ref().is_some_and(|p| p.code() == code)
    }

    /// Replaces the pending claim code, leaving every other field alone.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AlreadyClaimed` if the bot has an owner.
    pub fn with_pending_claim(
        mut self,
        pending: PendingClaim,
        now: DateTime<Utc>,
    ) -> Result<Self, RegistryError> {
        if self.is_claimed() {
            return Err(RegistryError::already_claimed(&self.bot_id));
        }
        self.pending = Some(pending);
        self.updated_at = now;
        Ok(self)
    }

    /// Binds the owner: sets owner, attestation and status, clears the code.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::AlreadyClaimed` if the bot has an owner.
    pub fn claim(
        mut self,
        owner: OwnerId,
        attestation: OwnershipAttestation,
        now: DateTime<Utc>,
    ) -> Result<Self, RegistryError> {
        if self.is_claimed() {
            return Err(RegistryError::already_claimed(&self.bot_id));
        }
        self.owner_id = Some(owner);
        self.attestation = Some(attestation);
        self.status = BotStatus::Claimed;
        self.pending = None;
        self.updated_at = now;
        Ok(self)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordView<'a> {
    bot_id: &'a BotId,
    name: &'a BotName,
    endpoint: Option<&'a BotEndpoint>,
    public_key: &'a EncodedPublicKey,
    owner_id: Option<&'a OwnerId>,
    status: BotStatus,
    attestation: Option<&'a OwnershipAttestation>,
    created_at: String,
    updated_at: String,
}

impl Serialize for BotRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RecordView {
            bot_id: &self.bot_id,
            name: &self.name,
            endpoint: self.endpoint.as_ref(),
            public_key: &self.public_key,
            owner_id: self.owner_id.as_ref(),
            status: self.status,
            attestation: self.attestation.as_ref(),
            created_at: format_timestamp(self.created_at),
            updated_at: format_timestamp(self.updated_at),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use clawlink_attestation::Issuer;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, 0).unwrap()
    }

    fn record() -> BotRecord {
        BotRecord::new(
            BotId::new(),
            BotName::parse("r1").unwrap(),
            EncodedPublicKey::from_ed25519_bytes(&[3u8; 32]),
            Some(BotEndpoint::parse("http://localhost:3001").unwrap()),
            PendingClaim::new(ClaimCode::parse("123456").unwrap(), at(15)),
            at(0),
        )
    }

    fn attestation_for(record: &BotRecord, owner: &OwnerId) -> OwnershipAttestation {
        Issuer::generate("https://linker.example")
            .issue(owner, record.bot_id(), record.public_key())
            .unwrap()
    }

    #[test]
    fn new_record_is_pending() {
        let record = record();
        assert_eq!(record.status(), BotStatus::Registered);
        assert!(!record.is_claimed());
        assert!(record.holds_pending_code(&ClaimCode::parse("123456").unwrap()));
        assert!(!record.holds_pending_code(&ClaimCode::parse("654321").unwrap()));
    }

    #[test]
    fn claim_clears_code_and_sets_owner() {
        let record = record();
        let owner = OwnerId::parse("alien-1").unwrap();
        let attestation = attestation_for(&record, &owner);

        let claimed = record.claim(owner.clone(), attestation, at(5)).unwrap();

        assert_eq!(claimed.status(), BotStatus::Claimed);
        assert!(claimed.pending_claim().is_none());
        assert!(claimed.is_owned_by(&owner));
        assert!(claimed.attestation().is_some());
        assert_eq!(claimed.updated_at(), at(5));
        assert_eq!(claimed.created_at(), at(0));
    }

    #[test]
    fn second_claim_rejected() {
        let owner = OwnerId::parse("alien-1").unwrap();
        let record = record();
        let attestation = attestation_for(&record, &owner);
        let claimed = record.claim(owner.clone(), attestation.clone(), at(5)).unwrap();

        let err = claimed
            .claim(OwnerId::parse("alien-2").unwrap(), attestation, at(6))
            .unwrap_err();

        assert!(matches!(err, RegistryError::AlreadyClaimed { .. }));
    }

    #[test]
    fn claimed_record_cannot_take_a_code() {
        let owner = OwnerId::parse("alien-1").unwrap();
        let record = record();
        let attestation = attestation_for(&record, &owner);
        let claimed = record.claim(owner, attestation, at(5)).unwrap();

        let pending = PendingClaim::new(ClaimCode::parse("000001").unwrap(), at(20));
        assert!(claimed.with_pending_claim(pending, at(6)).is_err());
    }

    #[test]
    fn pending_claim_expiry_is_strict() {
        let pending = PendingClaim::new(ClaimCode::parse("000000").unwrap(), at(15));
        assert!(!pending.is_expired_at(at(15)));
        assert!(pending.is_expired_at(at(15) + Duration::milliseconds(1)));
    }

    #[test]
    fn json_view_hides_claim_code() {
        let json = serde_json::to_value(record()).unwrap();

        assert_eq!(json["status"], "registered");
        assert_eq!(json["name"], "r1");
        assert_eq!(json["endpoint"], "http://localhost:3001");
        assert_eq!(json["createdAt"], "2025-01-01T12:00:00.000Z");
        assert!(json["ownerId"].is_null());
        assert!(json.get("claimCode").is_none());
        assert!(json.get("claimCodeExpiresAt").is_none());
    }
}

//! The ownership attestation value object and its canonical form.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use clawlink::{ATTESTATION_TYPE, ATTESTATION_VALIDITY_YEARS, BotId, EncodedPublicKey, OwnerId};
use serde::{Deserialize, Serialize};

use crate::error::AttestationError;
use crate::keys::{SigningKey, encode_signature};

/// A signed statement that an owner controls a bot.
///
/// Every field is kept exactly as issued so the canonical payload can be
/// rebuilt byte-for-byte by any verifier. Use the typed accessors to read
/// timestamps and identifiers.
///
/// JSON field names follow the wire format:
///
/// ```json
/// {
///   "type": "clawlink-ownership-v1",
///   "alienId": "...",
///   "clawbotId": "cbot_...",
///   "publicKey": "ed25519:...",
///   "issuedBy": "https://linker.example",
///   "issuedAt": "2025-01-01T00:00:00.000Z",
///   "expiresAt": "2026-01-01T00:00:00.000Z",
///   "signature": "<base64>"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipAttestation {
    /// Format/version tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Owner identifier
    pub alien_id: String,
    /// Bot identifier
    pub clawbot_id: String,
    /// Bot public key at issuance time
    pub public_key: String,
    /// Issuer identity (base URL)
    pub issued_by: String,
    /// Issuance timestamp (RFC 3339, millisecond precision)
    pub issued_at: String,
    /// Expiry timestamp (RFC 3339, millisecond precision)
    pub expires_at: String,
    /// Base64 Ed25519 signature over the canonical payload
    pub signature: String,
}

/// The seven signed fields, in canonical order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalPayload<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    alien_id: &'a str,
    clawbot_id: &'a str,
    public_key: &'a str,
    issued_by: &'a str,
    issued_at: &'a str,
    expires_at: &'a str,
}

impl OwnershipAttestation {
    /// Returns the bytes the signature covers.
    ///
    /// Compact JSON of every field except `signature`, keys in the fixed
    /// order `type, alienId, clawbotId, publicKey, issuedBy, issuedAt,
    /// expiresAt`.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::Serialization` if JSON encoding fails.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, AttestationError> {
        let payload = CanonicalPayload {
            kind: &self.kind,
            alien_id: &self.alien_id,
            clawbot_id: &self.clawbot_id,
            public_key: &self.public_key,
            issued_by: &self.issued_by,
            issued_at: &self.issued_at,
            expires_at: &self.expires_at,
        };
        serde_json::to_vec(&payload).map_err(|e| AttestationError::Serialization {
            reason: e.to_string(),
        })
    }

    /// Parses `issuedAt`.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::InvalidTimestamp` if it is not RFC 3339.
    pub fn issued_at(&self) -> Result<DateTime<Utc>, AttestationError> {
        parse_timestamp("issuedAt", &self.issued_at)
    }

    /// Parses `expiresAt`.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::InvalidTimestamp` if it is not RFC 3339.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, AttestationError> {
        parse_timestamp("expiresAt", &self.expires_at)
    }

    /// Returns true if `now` is at or past `expiresAt`.
    ///
    /// Unparseable expiry counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Ok(exp) => now >= exp,
            Err(_) => true,
        }
    }
}

/// An attestation that has been built but not yet signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedAttestation {
    kind: String,
    alien_id: String,
    clawbot_id: String,
    public_key: String,
    issued_by: String,
    issued_at: String,
    expires_at: String,
}

impl UnsignedAttestation {
    /// Builds the payload for `owner` and `bot`, issued at `issued_at` and
    /// valid until the same date and time one year later. An issuance on
    /// 29 February expires on 1 March.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::InvalidValidity` if the expiry overflows
    /// the calendar.
    pub fn new(
        owner: &OwnerId,
        bot: &BotId,
        public_key: &EncodedPublicKey,
        issued_by: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<Self, AttestationError> {
        let expires_at = add_years(issued_at, ATTESTATION_VALIDITY_YEARS)
            .ok_or(AttestationError::InvalidValidity)?;

        Ok(Self {
            kind: ATTESTATION_TYPE.to_string(),
            alien_id: owner.as_str().to_string(),
            clawbot_id: bot.as_str().to_string(),
            public_key: public_key.as_str().to_string(),
            issued_by: issued_by.to_string(),
            issued_at: format_timestamp(issued_at),
            expires_at: format_timestamp(expires_at),
        })
    }

    /// Signs the canonical payload.
    ///
    /// # Errors
    ///
    /// Returns `AttestationError::Serialization` if the payload cannot be
    /// encoded.
    pub fn sign(self, key: &SigningKey) -> Result<OwnershipAttestation, AttestationError> {
        let mut attestation = OwnershipAttestation {
            kind: self.kind,
            alien_id: self.alien_id,
            clawbot_id: self.clawbot_id,
            public_key: self.public_key,
            issued_by: self.issued_by,
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            signature: String::new(),
        };
        let message = attestation.canonical_bytes()?;
        attestation.signature = encode_signature(&key.sign(&message));
        Ok(attestation)
    }
}

/// Formats a timestamp the way attestations carry it: RFC 3339, UTC,
/// millisecond precision, `Z` suffix.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, AttestationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AttestationError::InvalidTimestamp {
            field,
            reason: e.to_string(),
        })
}

/// Moves `at` forward by whole years, rolling 29 February over to 1 March
/// when the target year has no leap day.
fn add_years(at: DateTime<Utc>, years: i32) -> Option<DateTime<Utc>> {
    let year = at.year().checked_add(years)?;
    at.with_year(year)
        .or_else(|| at.with_day(1)?.with_month(3)?.with_year(year))
}

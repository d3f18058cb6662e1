//! Pure checks applied to an attestation after its signature verifies.
//!
//! Each function compares one attested field against what the caller
//! expects. None of them touch the network, the clock, or any store.
//!
//! | Function | Check |
//! |----------|-------|
//! | [`validate_type`] | `type` is the supported format tag |
//! | [`validate_subject`] | `clawbotId` equals the expected bot |
//! | [`validate_owner`] | `alienId` equals the expected owner |
//! | [`validate_public_key`] | `publicKey` equals the key the bot presented |
//! | [`check_expiration`] | `now` is strictly before `expiresAt` |
//! | [`check_validity_window`] | `issuedAt <= now < expiresAt` |

use chrono::{DateTime, Utc};
use clawlink::{ATTESTATION_TYPE, BotId, EncodedPublicKey, OwnerId};

use crate::attestation::{OwnershipAttestation, format_timestamp};
use crate::error::AttestationError;

/// Checks that the attestation carries the supported format tag.
///
/// # Errors
///
/// Returns `AttestationError::UnsupportedType` for any other tag.
pub fn validate_type(attestation: &OwnershipAttestation) -> Result<(), AttestationError> {
    if attestation.kind == ATTESTATION_TYPE {
        Ok(())
    } else {
        Err(AttestationError::UnsupportedType {
            found: attestation.kind.clone(),
        })
    }
}

/// Checks that the attestation is about `expected`.
///
/// # Errors
///
/// Returns `AttestationError::SubjectMismatch` if the bot ids differ.
///
/// # Examples
///
/// ```
/// use clawlink::{BotId, OwnerId};
/// use clawlink_attestation::{Issuer, SigningKey, validate_subject};
///
/// let issuer = Issuer::generate("https://linker.example");
/// let bot = BotId::new();
/// let key = SigningKey::generate().verifying_key().to_encoded();
/// let attestation = issuer.issue(&OwnerId::parse("a").unwrap(), &bot, &key).unwrap();
///
/// assert!(validate_subject(&attestation, &bot).is_ok());
/// assert!(validate_subject(&attestation, &BotId::new()).is_err());
/// ```
pub fn validate_subject(
    attestation: &OwnershipAttestation,
    expected: &BotId,
) -> Result<(), AttestationError> {
    if attestation.clawbot_id == expected.as_str() {
        Ok(())
    } else {
        Err(AttestationError::SubjectMismatch {
            attested: attestation.clawbot_id.clone(),
            expected: expected.to_string(),
        })
    }
}

/// Checks that the attestation names `expected` as owner.
///
/// # Errors
///
/// Returns `AttestationError::OwnerMismatch` if the owner ids differ.
pub fn validate_owner(
    attestation: &OwnershipAttestation,
    expected: &OwnerId,
) -> Result<(), AttestationError> {
    if attestation.alien_id == expected.as_str() {
        Ok(())
    } else {
        Err(AttestationError::OwnerMismatch {
            attested: attestation.alien_id.clone(),
            expected: expected.to_string(),
        })
    }
}

/// Checks that the attested key is the one the bot just proved it holds.
///
/// # Errors
///
/// Returns `AttestationError::PublicKeyMismatch` if the keys differ.
pub fn validate_public_key(
    attestation: &OwnershipAttestation,
    presented: &EncodedPublicKey,
) -> Result<(), AttestationError> {
    if attestation.public_key == presented.as_str() {
        Ok(())
    } else {
        Err(AttestationError::PublicKeyMismatch {
            attested: attestation.public_key.clone(),
            presented: presented.to_string(),
        })
    }
}

/// Checks that an attestation has not expired at `now`.
///
/// # Errors
///
/// Returns `AttestationError::Expired` if `now >= expiresAt`, or
/// `InvalidTimestamp` if `expiresAt` does not parse.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use clawlink::{BotId, OwnerId};
/// use clawlink_attestation::{Issuer, SigningKey, check_expiration};
///
/// let issuer = Issuer::generate("https://linker.example");
/// let key = SigningKey::generate().verifying_key().to_encoded();
/// let attestation = issuer
///     .issue(&OwnerId::parse("a").unwrap(), &BotId::new(), &key)
///     .unwrap();
///
/// assert!(check_expiration(&attestation, Utc::now()).is_ok());
/// assert!(check_expiration(&attestation, Utc::now() + Duration::days(400)).is_err());
/// ```
pub fn check_expiration(
    attestation: &OwnershipAttestation,
    now: DateTime<Utc>,
) -> Result<(), AttestationError> {
    let expires_at = attestation.expires_at()?;
    if now < expires_at {
        Ok(())
    } else {
        Err(AttestationError::Expired {
            expired_at: format_timestamp(expires_at),
        })
    }
}

/// Checks `issuedAt <= now < expiresAt`.
///
/// # Errors
///
/// Returns `NotYetValid` before issuance, `Expired` at or after expiry, or
/// `InvalidTimestamp` if either timestamp does not parse.
pub fn check_validity_window(
    attestation: &OwnershipAttestation,
    now: DateTime<Utc>,
) -> Result<(), AttestationError> {
    let issued_at = attestation.issued_at()?;
    if now < issued_at {
        return Err(AttestationError::NotYetValid {
            valid_from: format_timestamp(issued_at),
        });
    }
    check_expiration(attestation, now)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::issuer::Issuer;
    use crate::keys::SigningKey;

    struct Fixture {
        bot: BotId,
        owner: OwnerId,
        key: EncodedPublicKey,
        attestation: OwnershipAttestation,
        issued_at: DateTime<Utc>,
    }

    fn fixture() -> Fixture {
        let issuer = Issuer::generate("https://linker.example");
        let bot = BotId::new();
        let owner = OwnerId::parse("alien-1").unwrap();
        let key = SigningKey::generate().verifying_key().to_encoded();
        let issued_at = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let attestation = issuer.issue_at(&owner, &bot, &key, issued_at).unwrap();
        Fixture {
            bot,
            owner,
            key,
            attestation,
            issued_at,
        }
    }

    mod field_checks {
        use super::*;

        #[test]
        fn matching_fields_pass() {
            let f = fixture();
            assert!(validate_type(&f.attestation).is_ok());
            assert!(validate_subject(&f.attestation, &f.bot).is_ok());
            assert!(validate_owner(&f.attestation, &f.owner).is_ok());
            assert!(validate_public_key(&f.attestation, &f.key).is_ok());
        }

        #[test]
        fn unknown_type_fails() {
            let mut f = fixture();
            f.attestation.kind = "clawlink-ownership-v2".to_string();
            assert!(matches!(
                validate_type(&f.attestation),
                Err(AttestationError::UnsupportedType { found }) if found == "clawlink-ownership-v2"
            ));
        }

        #[test]
        fn other_bot_fails() {
            let f = fixture();
            assert!(matches!(
                validate_subject(&f.attestation, &BotId::new()),
                Err(AttestationError::SubjectMismatch { .. })
            ));
        }

        #[test]
        fn owner_comparison_is_exact() {
            let f = fixture();
            assert!(matches!(
                validate_owner(&f.attestation, &OwnerId::parse("ALIEN-1").unwrap()),
                Err(AttestationError::OwnerMismatch { .. })
            ));
        }

        #[test]
        fn rotated_key_fails() {
            let f = fixture();
            let rotated = SigningKey::generate().verifying_key().to_encoded();
            assert!(matches!(
                validate_public_key(&f.attestation, &rotated),
                Err(AttestationError::PublicKeyMismatch { .. })
            ));
        }
    }

    mod window_checks {
        use super::*;

        #[test]
        fn inside_window_is_valid() {
            let f = fixture();
            assert!(check_validity_window(&f.attestation, f.issued_at).is_ok());
            assert!(check_validity_window(&f.attestation, f.issued_at + Duration::days(364)).is_ok());
        }

        #[test]
        fn before_issuance_is_not_yet_valid() {
            let f = fixture();
            assert!(matches!(
                check_validity_window(&f.attestation, f.issued_at - Duration::seconds(1)),
                Err(AttestationError::NotYetValid { .. })
            ));
        }

        #[test]
        fn exact_expiry_is_expired() {
            let f = fixture();
            let expires_at = f.attestation.expires_at().unwrap();
            assert!(matches!(
                check_expiration(&f.attestation, expires_at),
                Err(AttestationError::Expired { expired_at }) if expired_at == "2026-05-01T00:00:00.000Z"
            ));
        }

        #[test]
        fn one_millisecond_before_expiry_is_valid() {
            let f = fixture();
            let expires_at = f.attestation.expires_at().unwrap();
            assert!(check_expiration(&f.attestation, expires_at - Duration::milliseconds(1)).is_ok());
        }

        #[test]
        fn garbled_expiry_is_an_error() {
            let mut f = fixture();
            f.attestation.expires_at = "next year".to_string();
            assert!(matches!(
                check_expiration(&f.attestation, f.issued_at),
                Err(AttestationError::InvalidTimestamp { field: "expiresAt", .. })
            ));
        }
    }
}

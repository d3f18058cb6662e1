//! Ed25519 ownership attestations for clawlink.
//!
//! An ownership attestation is a small signed JSON document stating that an
//! owner (`alienId`) controls a bot (`clawbotId`) holding a given public
//! key. The linker backend issues it when the owner claims the bot; anyone
//! holding the backend's published key can check it offline.
//!
//! # Example
//!
//! ```rust
//! use clawlink::{BotId, OwnerId};
//! use clawlink_attestation::{KeyPublisher, SigningKey, SigningKeyConfig, Verifier, check_expiration};
//! use chrono::Utc;
//!
//! // Backend side: load key material once, issue on claim.
//! let config = SigningKeyConfig::Signing(SigningKey::generate());
//! let issuer = config.issuer("https://linker.example").unwrap();
//!
//! let bot_key = SigningKey::generate().verifying_key().to_encoded();
//! let attestation = issuer
//!     .issue(&OwnerId::parse("alien-1").unwrap(), &BotId::new(), &bot_key)
//!     .unwrap();
//!
//! // Third party: fetch the published key set, verify offline.
//! let keys = KeyPublisher::new(&config).jwk_set().unwrap();
//! let verifier = Verifier::from_jwk("https://linker.example", &keys.keys[0]).unwrap();
//!
//! assert!(verifier.verify(&attestation).is_ok());
//! assert!(check_expiration(&attestation, Utc::now()).is_ok());
//! ```
//!
//! # Signed payload
//!
//! The signature covers compact JSON of the non-signature fields in a fixed
//! order:
//!
//! ```text
//! {"type":"clawlink-ownership-v1","alienId":…,"clawbotId":…,"publicKey":…,
//!  "issuedBy":…,"issuedAt":…,"expiresAt":…}
//! ```
//!
//! Timestamps are RFC 3339 UTC with millisecond precision; `expiresAt` is
//! the same date and time one year after `issuedAt` (29 February rolls over
//! to 1 March).
//!
//! # Security Properties
//!
//! | Property | How Achieved |
//! |----------|--------------|
//! | Tamper detection | Ed25519 over the canonical payload |
//! | Issuer binding | `issuedBy` must be a trusted issuer in [`Verifier`] |
//! | Bounded lifetime | `expiresAt` checked by [`check_expiration`] |
//! | Key rotation detection | [`validate_public_key`] against the live bot key |

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod attestation;
mod config;
mod error;
mod issuer;
mod jwk;
mod keys;
mod verification;
mod verifier;

pub use attestation::{OwnershipAttestation, UnsignedAttestation, format_timestamp};
pub use config::SigningKeyConfig;
pub use error::AttestationError;
pub use issuer::Issuer;
pub use jwk::{Jwk, JwkSet, KeyPublisher};
pub use keys::{SIGNATURE_LENGTH, SigningKey, VerifyingKey, decode_signature, encode_signature};
pub use verification::{
    check_expiration, check_validity_window, validate_owner, validate_public_key,
    validate_subject, validate_type,
};
pub use verifier::{Verifier, verify_signature};

/// A prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use clawlink_attestation::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AttestationError, Issuer, Jwk, JwkSet, KeyPublisher, OwnershipAttestation,
        SigningKey, SigningKeyConfig, Verifier, VerifyingKey, check_expiration,
        check_validity_window, validate_owner, validate_public_key, validate_subject,
        validate_type, verify_signature,
    };
}

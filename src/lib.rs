//! Validated identifiers and wire types for linking bots to human owners.
//!
//! A bot running anywhere registers its public key with a linker backend and
//! receives a short-lived claim code. A human owner types that code into the
//! backend, which binds the owner to the bot and issues a signed ownership
//! attestation. This crate holds the small value types every participant
//! agrees on; signing lives in `clawlink-attestation`, the backend state
//! machine in `clawlink-registry`, and the bot side in `clawlink-identity`.
//!
//! # Quick Start
//!
//! ```rust
//! use clawlink::{BotId, BotName, ClaimCode, EncodedPublicKey, OwnerId};
//!
//! let key = EncodedPublicKey::parse(
//!     "ed25519:AQIDBAUGBwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyA="
//! ).unwrap();
//! let name = BotName::parse("r1").unwrap();
//! let id = BotId::new();
//! let code = ClaimCode::generate();
//! let owner = OwnerId::parse("alien-42").unwrap();
//!
//! assert_eq!(key.key_bytes()[0], 1);
//! assert_eq!(name.as_str(), "r1");
//! assert!(id.as_str().starts_with("cbot_"));
//! assert_eq!(code.as_str().len(), 6);
//! assert_eq!(owner.as_str(), "alien-42");
//! ```
//!
//! # Wire Constraints
//!
//! | Value | Shape |
//! |-------|-------|
//! | Claim code | exactly 6 ASCII digits, `000000`-`999999` |
//! | Public key | `ed25519:` + standard base64 of 32 bytes |
//! | Bot id | `cbot_` + 26 char base32 `UUIDv7` |
//! | Bot name | 1-128 characters after trimming |
//! | Owner id | 1-256 bytes after trimming |
//! | Endpoint | `http(s)://host...`, trailing `/` dropped |

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod bot_id;
mod bot_name;
mod claim_code;
mod constants;
mod endpoint;
mod error;
mod owner_id;
pub mod prelude;
mod public_key;

pub use bot_id::BotId;
pub use bot_name::BotName;
pub use claim_code::ClaimCode;
pub use constants::{
    ATTESTATION_TYPE, ATTESTATION_VALIDITY_YEARS, BOT_ID_PREFIX, BOT_ID_SUFFIX_LENGTH,
    CLAIM_CODE_LENGTH, CLAIM_CODE_SPACE, CLAIM_CODE_TTL, DELIVERY_TIMEOUT, ED25519_ALGORITHM,
    ED25519_KEY_LENGTH, MAX_BOT_NAME_LENGTH, MAX_ENDPOINT_LENGTH, MAX_OWNER_ID_LENGTH,
};
pub use endpoint::BotEndpoint;
pub use error::ValidationError;
pub use owner_id::OwnerId;
pub use public_key::{EncodedPublicKey, KeyAlgorithm};

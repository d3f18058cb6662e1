//! Bot registration and claiming for clawlink.
//!
//! This crate holds the backend's bot records and the two operations that
//! change them:
//!
//! - **Registration**: [`Registrar`] assigns a bot id and a six-digit claim
//!   code valid for fifteen minutes
//! - **Claiming**: [`ClaimProcessor`] binds an owner to the bot holding a
//!   code, exactly once, and issues the ownership attestation
//! - **Storage**: the [`BotStore`] trait, with [`InMemoryBotStore`] for
//!   tests and single-process deployments
//! - **Delivery**: [`AttestationDelivery`] pushes the attestation to the
//!   bot's endpoint after the claim commits
//! - **Views**: [`BotDirectory`] for owner listings and attestation re-fetch
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use clawlink::OwnerId;
//! use clawlink_attestation::{SigningKey, SigningKeyConfig};
//! use clawlink_registry::{
//!     BotStatus, ClaimProcessor, InMemoryBotStore, Registrar, RegistryConfig, RegistryError,
//!     SystemClock,
//! };
//!
//! let store = Arc::new(InMemoryBotStore::new());
//! let config = RegistryConfig::default();
//! let registrar = Registrar::new(store.clone(), Arc::new(SystemClock), config.clone());
//! let processor = ClaimProcessor::new(
//!     store,
//!     Arc::new(SystemClock),
//!     &SigningKeyConfig::Signing(SigningKey::generate()),
//!     &config,
//! );
//!
//! // The bot registers itself and shows the code to its human.
//! let bot_key = SigningKey::generate().verifying_key().to_encoded();
//! let registration = registrar.register(bot_key.as_str(), "r1", None).unwrap();
//!
//! // The human types the code while signed in.
//! let owner = OwnerId::parse("alien-1").unwrap();
//! let outcome = processor.claim(&owner, registration.claim_code.as_str()).unwrap();
//! assert_eq!(outcome.record.status(), BotStatus::Claimed);
//!
//! // Codes are single use.
//! assert_eq!(
//!     processor.claim(&owner, registration.claim_code.as_str()).unwrap_err(),
//!     RegistryError::InvalidOrExpiredCode,
//! );
//! ```
//!
//! # Claim State
//!
//! ```text
//! registered --(claim)--> claimed
//! ```
//!
//! A record holds a pending claim code exactly while it has no owner. An
//! unused code simply expires; the record stays `registered` and the bot
//! can ask for a fresh code.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod claim;
mod clock;
mod config;
mod delivery;
mod directory;
mod error;
mod memory;
mod record;
mod registrar;
mod traits;

pub use claim::{ClaimOutcome, ClaimProcessor};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RegistryConfig;
pub use delivery::{ATTESTATION_ROUTE, AttestationDelivery};
pub use directory::BotDirectory;
pub use error::{DeliveryError, ErrorKind, RegistryError};
pub use memory::InMemoryBotStore;
pub use record::{BotRecord, BotStatus, PendingClaim};
pub use registrar::{IssuedClaimCode, Registrar, Registration};
pub use traits::BotStore;

//! Bot-side identity for clawlink.
//!
//! A bot owns one Ed25519 keypair for its whole life. It registers the
//! public half with a linker backend, shows its human a claim code, and
//! serves three routes so anyone can check who owns it:
//!
//! - `GET /identity` returns the ownership attestation once claimed
//! - `POST /challenge` signs a caller-supplied nonce, proving the bot still
//!   holds the attested key
//! - `POST /attestation` receives the attestation pushed by the backend
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use clawlink_identity::{IdentityState, Keypair, MemoryAttestationCache, MemoryKeyStorage, create_router};
//!
//! let keypair = Keypair::load_or_create(&MemoryKeyStorage::new()).unwrap();
//! let state = IdentityState::new(keypair, Arc::new(MemoryAttestationCache::new()));
//! let router = create_router(state);
//! # drop(router);
//! ```
//!
//! # Local Files
//!
//! | File | Contents |
//! |------|----------|
//! | `identity.key` | 32-byte private seed, mode `0600` |
//! | `identity.pub` | 32-byte public key |
//! | `attestation.json` | last attestation received, pretty JSON |
//!
//! Losing `identity.key` means losing the identity: a new keypair no
//! longer matches attestations issued for the old one, so partial or
//! corrupt key files are reported instead of silently replaced.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod banner;
mod cache;
mod client;
mod error;
mod keypair;
mod server;
mod storage;
mod sync;

pub use banner::claim_banner;
pub use cache::{
    ATTESTATION_FILE, AttestationCache, FileAttestationCache, MemoryAttestationCache, with_cache,
};
pub use client::{LinkerClient, RegisterRequest, RegisterResponse};
pub use error::IdentityError;
pub use keypair::Keypair;
pub use server::{
    Ack, ApiError, ChallengeRequest, ChallengeResponse, ErrorResponse, IdentityState,
    create_router, serve,
};
pub use storage::{
    FileKeyStorage, KeyStorage, MemoryKeyStorage, PRIVATE_KEY_FILE, PUBLIC_KEY_FILE,
    StoredKeypair,
};
pub use sync::sync_attestation;

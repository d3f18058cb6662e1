//! Convenient re-exports for glob imports.
//!
//! ```rust
//! use clawlink::prelude::*;
//!
//! let code = ClaimCode::parse("123456").unwrap();
//! assert_eq!(code.as_str(), "123456");
//! ```

pub use crate::{
    // Core types
    BotEndpoint, BotId, BotName, ClaimCode, EncodedPublicKey, KeyAlgorithm, OwnerId,
    // Errors
    ValidationError,
    // Constants
    ATTESTATION_TYPE, CLAIM_CODE_LENGTH, CLAIM_CODE_TTL, DELIVERY_TIMEOUT, ED25519_ALGORITHM,
};

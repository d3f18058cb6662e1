//! Protocol constants shared by the bot and the backend.

use std::time::Duration;

/// Number of decimal digits in a claim code.
pub const CLAIM_CODE_LENGTH: usize = 6;

/// Size of the claim code space (`000000`..=`999999`).
pub const CLAIM_CODE_SPACE: u32 = 1_000_000;

/// How long a freshly issued claim code stays valid.
pub const CLAIM_CODE_TTL: Duration = Duration::from_secs(15 * 60);

/// Attestation validity window in calendar years.
pub const ATTESTATION_VALIDITY_YEARS: i32 = 1;

/// Format/version tag carried in every ownership attestation.
pub const ATTESTATION_TYPE: &str = "clawlink-ownership-v1";

/// Algorithm prefix for Ed25519 public keys on the wire.
pub const ED25519_ALGORITHM: &str = "ed25519";

/// Raw Ed25519 public key length in bytes.
pub const ED25519_KEY_LENGTH: usize = 32;

/// Upper bound for the best-effort attestation push to a bot.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// `TypeID` prefix of bot identifiers.
pub const BOT_ID_PREFIX: &str = "cbot";

/// Fixed bot-id suffix length (`UUIDv7` in base32).
pub const BOT_ID_SUFFIX_LENGTH: usize = 26;

/// Maximum bot display name length in characters.
pub const MAX_BOT_NAME_LENGTH: usize = 128;

/// Maximum owner identifier length in bytes.
pub const MAX_OWNER_ID_LENGTH: usize = 256;

/// Maximum bot endpoint URL length in bytes.
pub const MAX_ENDPOINT_LENGTH: usize = 2048;

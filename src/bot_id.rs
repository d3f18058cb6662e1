//! Bot identifier type using `TypeID` format.
//!
//! Bot ids look like `cbot_01h455vb4pex5vsknk084sn02q`: the fixed `cbot`
//! prefix followed by a base32-encoded `UUIDv7`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use mti::prelude::*;

use crate::constants::{BOT_ID_PREFIX, BOT_ID_SUFFIX_LENGTH};
use crate::error::ValidationError;

/// Base32 alphabet for `TypeID` suffix (Crockford-derived).
/// Excludes: i, l, o, u (visually ambiguous).
const BASE32_ALPHABET: &[u8] = b"0123456789abcdefghjkmnpqrstvwxyz";

/// A stable, opaque bot identifier assigned at registration.
///
/// # Examples
///
/// ```
/// use clawlink::BotId;
///
/// let id = BotId::new();
/// assert!(id.as_str().starts_with("cbot_"));
/// assert_eq!(id.suffix().len(), 26);
///
/// let parsed = BotId::parse(id.as_str()).unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BotId {
    value: String,
    inner: MagicTypeId,
}

impl BotId {
    /// Creates a fresh bot id backed by a new `UUIDv7`.
    #[must_use]
    pub fn new() -> Self {
        let inner = BOT_ID_PREFIX.create_type_id::<V7>();
        Self {
            value: inner.to_string(),
            inner,
        }
    }

    /// Parses a bot id from a string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidBotId` if the prefix is not `cbot`,
    /// the separator is missing, or the suffix is not a valid base32 `UUIDv7`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason| ValidationError::InvalidBotId {
            value: input.to_string(),
            reason,
        };

        let (prefix, suffix) = input
            .split_once('_')
            .ok_or_else(|| invalid("missing '_' separator"))?;

        if prefix != BOT_ID_PREFIX {
            return Err(invalid("prefix must be 'cbot'"));
        }
        validate_suffix(suffix).map_err(invalid)?;

        let inner = MagicTypeId::from_str(input).map_err(|_| invalid("not a valid TypeID"))?;

        Ok(Self {
            value: input.to_string(),
            inner,
        })
    }

    /// Returns the full id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the base32 suffix.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.value[BOT_ID_PREFIX.len() + 1..]
    }

    /// Returns the UUID encoded in the suffix.
    ///
    /// # Errors
    ///
    /// Returns an error if UUID extraction fails.
    pub fn uuid(&self) -> Result<uuid::Uuid, ValidationError> {
        self.inner.uuid().map_err(|_| ValidationError::InvalidBotId {
            value: self.value.clone(),
            reason: "suffix does not decode to a UUID",
        })
    }
}

impl Default for BotId {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_suffix(suffix: &str) -> Result<(), &'static str> {
    if suffix.len() != BOT_ID_SUFFIX_LENGTH {
        return Err("suffix must be exactly 26 characters");
    }

    // First character must be 0-7 (prevent 130-bit overflow)
    if !matches!(suffix.as_bytes()[0], b'0'..=b'7') {
        return Err("first suffix character must be 0-7");
    }

    if !suffix.bytes().all(|c| BASE32_ALPHABET.contains(&c)) {
        return Err("suffix contains invalid base32 character");
    }

    Ok(())
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for BotId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for BotId {
    type Error = ValidationError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialOrd for BotId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BotId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BotId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for BotId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

//! Six-digit claim codes.

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::constants::{CLAIM_CODE_LENGTH, CLAIM_CODE_SPACE};
use crate::error::ValidationError;

/// A short-lived numeric code a human types to claim a bot.
///
/// Codes are drawn uniformly from `000000`..=`999999`; leading zeros are
/// significant.
///
/// # Examples
///
/// ```
/// use clawlink::ClaimCode;
///
/// let code = ClaimCode::parse("004217").unwrap();
/// assert_eq!(code.as_str(), "004217");
///
/// assert!(ClaimCode::parse("4217").is_err());
/// assert!(ClaimCode::parse("12345a").is_err());
///
/// let fresh = ClaimCode::generate();
/// assert_eq!(fresh.as_str().len(), 6);
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ClaimCode(String);

impl ClaimCode {
    /// Parses a claim code, requiring exactly six ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidClaimCode` for any other shape.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.len() == CLAIM_CODE_LENGTH && input.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(input.to_string()))
        } else {
            Err(ValidationError::InvalidClaimCode)
        }
    }

    /// Generates a fresh code from the thread-local CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut rand::thread_rng())
    }

    /// Generates a code from the given random source.
    #[must_use]
    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let value = rng.gen_range(0..CLAIM_CODE_SPACE);
        Self(format!("{value:06}"))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are bearer credentials while pending.
impl fmt::Debug for ClaimCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClaimCode(******)")
    }
}

impl fmt::Display for ClaimCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ClaimCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for ClaimCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ClaimCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ClaimCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

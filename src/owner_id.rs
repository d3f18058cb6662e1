//! Owner identifiers issued by the external identity provider.

use std::fmt;

use crate::constants::MAX_OWNER_ID_LENGTH;
use crate::error::ValidationError;

/// The identity of a human owner, as asserted by the authentication provider.
///
/// The value is opaque to this crate; it is only checked for being non-empty
/// and bounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    /// Validates and wraps an owner identifier.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyOwnerId` for blank input and
    /// `ValidationError::OwnerIdTooLong` past 256 bytes.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyOwnerId);
        }
        if trimmed.len() > MAX_OWNER_ID_LENGTH {
            return Err(ValidationError::OwnerIdTooLong {
                max: MAX_OWNER_ID_LENGTH,
                actual: trimmed.len(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for OwnerId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for OwnerId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_accepts() {
        assert_eq!(OwnerId::parse("  alien-42 ").unwrap().as_str(), "alien-42");
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(OwnerId::parse("   "), Err(ValidationError::EmptyOwnerId));
    }

    #[test]
    fn rejects_oversized() {
        let long = "x".repeat(MAX_OWNER_ID_LENGTH + 1);
        assert!(matches!(
            OwnerId::parse(&long),
            Err(ValidationError::OwnerIdTooLong { .. })
        ));
    }
}

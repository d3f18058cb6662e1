//! Callback endpoint a bot advertises at registration.

use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_ENDPOINT_LENGTH;
use crate::error::ValidationError;

/// Base URL of a bot's identity server.
///
/// Only `http` and `https` are accepted. A trailing `/` is dropped so route
/// paths can be appended directly.
///
/// # Examples
///
/// ```
/// use clawlink::BotEndpoint;
///
/// let endpoint = BotEndpoint::parse("https://bot.example.com:3001/").unwrap();
/// assert_eq!(endpoint.as_str(), "https://bot.example.com:3001");
/// assert_eq!(endpoint.route("attestation"), "https://bot.example.com:3001/attestation");
///
/// assert!(BotEndpoint::parse("ftp://bot.example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BotEndpoint(String);

impl BotEndpoint {
    /// Validates an endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidEndpoint` if the value is not an
    /// `http(s)://host[...]` URL without whitespace, or is too long.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim().trim_end_matches('/');
        if trimmed.len() > MAX_ENDPOINT_LENGTH {
            return Err(invalid("longer than 2048 bytes"));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .ok_or_else(|| invalid("must start with http:// or https://"))?;
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the endpoint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a route path onto the endpoint.
    #[must_use]
    pub fn route(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

fn invalid(reason: &'static str) -> ValidationError {
    ValidationError::InvalidEndpoint { reason }
}

impl fmt::Display for BotEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BotEndpoint {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BotEndpoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for BotEndpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

//! Backend configuration from flags and environment.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Args;
use clawlink::OwnerId;
use clawlink_attestation::{AttestationError, SigningKeyConfig};
use clawlink_registry::RegistryConfig;
use thiserror::Error;

use crate::auth::TokenAuthenticator;

/// Flags for `clawlink-backend serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "CLAWLINK_BIND_ADDR", default_value = "0.0.0.0:3000")]
    pub bind_addr: SocketAddr,

    /// Issuer identity written into attestations
    #[arg(long, env = "CLAWLINK_ISSUER", default_value = "http://localhost:3000")]
    pub issuer: String,

    /// Base64 32-byte Ed25519 seed used to sign attestations
    #[arg(long, env = "ATTESTATION_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Base64 32-byte Ed25519 public key; must match the private key
    #[arg(long, env = "ATTESTATION_PUBLIC_KEY")]
    pub public_key: Option<String>,

    /// Accepted owner tokens as `token=ownerId`, comma separated
    #[arg(long, env = "CLAWLINK_OWNER_TOKENS", hide_env_values = true)]
    pub owner_tokens: Option<String>,

    /// Accept unsigned `<header>.<payload>.dev` tokens
    #[arg(long, env = "CLAWLINK_DEV_AUTH")]
    pub dev_auth: bool,

    /// Timeout for pushing attestations to bots, in milliseconds
    #[arg(long, env = "CLAWLINK_DELIVERY_TIMEOUT_MS", default_value_t = 5000)]
    pub delivery_timeout_ms: u64,
}

/// Resolved backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Listen address
    pub bind_addr: SocketAddr,
    /// Attestation key material
    pub signing_key: SigningKeyConfig,
    /// Registrar and claim settings
    pub registry: RegistryConfig,
    /// Owner token table
    pub authenticator: TokenAuthenticator,
}

/// Why the backend configuration is unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The attestation key material is malformed or inconsistent.
    #[error("invalid attestation key configuration: {0}")]
    SigningKey(#[from] AttestationError),

    /// An owner token entry could not be read.
    #[error("invalid owner token entry '{entry}': expected token=ownerId")]
    OwnerToken {
        /// The offending entry
        entry: String,
    },

    /// The delivery timeout is zero.
    #[error("delivery timeout must be greater than zero")]
    ZeroDeliveryTimeout,
}

impl ServeArgs {
    /// Validates the flags into a [`BackendConfig`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for malformed key material, owner token
    /// entries, or a zero delivery timeout.
    pub fn into_config(self) -> Result<BackendConfig, ConfigError> {
        let signing_key =
            SigningKeyConfig::from_base64(self.private_key.as_deref(), self.public_key.as_deref())?;

        if self.delivery_timeout_ms == 0 {
            return Err(ConfigError::ZeroDeliveryTimeout);
        }
        let registry = RegistryConfig::new()
            .with_issuer(self.issuer)
            .with_delivery_timeout(Duration::from_millis(self.delivery_timeout_ms));

        let mut authenticator = TokenAuthenticator::new().with_dev_tokens(self.dev_auth);
        for (token, owner) in parse_owner_tokens(self.owner_tokens.as_deref().unwrap_or_default())? {
            authenticator = authenticator.with_token(token, owner);
        }

        Ok(BackendConfig {
            bind_addr: self.bind_addr,
            signing_key,
            registry,
            authenticator,
        })
    }
}

/// Parses `token=ownerId` pairs separated by commas. Blank entries are
/// skipped.
///
/// # Errors
///
/// Returns `ConfigError::OwnerToken` for an entry without `=`, with an
/// empty token, or with an invalid owner id.
pub fn parse_owner_tokens(input: &str) -> Result<Vec<(String, OwnerId)>, ConfigError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let invalid = || ConfigError::OwnerToken {
                entry: entry.to_string(),
            };
            let (token, owner) = entry.split_once('=').ok_or_else(invalid)?;
            let token = token.trim();
            if token.is_empty() {
                return Err(invalid());
            }
            let owner = OwnerId::parse(owner.trim()).map_err(|_| invalid())?;
            Ok((token.to_string(), owner))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clawlink_attestation::SigningKey;

    use super::*;
    use crate::auth::OwnerAuthenticator;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn args(extra: &[&str]) -> ServeArgs {
        let mut argv = vec!["test"];
        argv.extend_from_slice(extra);
        TestCli::parse_from(argv).serve
    }

    #[test]
    fn defaults() {
        let config = args(&[]).into_config().unwrap();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.registry.issuer, "http://localhost:3000");
        assert_eq!(config.registry.delivery_timeout, Duration::from_secs(5));
        assert!(!config.signing_key.is_configured());
        assert!(!config.authenticator.accepts_dev_tokens());
    }

    #[test]
    fn signing_key_from_flags() {
        let key = SigningKey::generate();
        let config = args(&["--private-key", &key.to_base64()]).into_config().unwrap();

        assert!(config.signing_key.can_sign());
    }

    #[test]
    fn malformed_signing_key_is_fatal() {
        assert!(matches!(
            args(&["--private-key", "nope"]).into_config(),
            Err(ConfigError::SigningKey(_))
        ));
    }

    #[test]
    fn owner_tokens_are_loaded() {
        let config = args(&["--owner-tokens", "t1=alien-1, t2=alien-2"])
            .into_config()
            .unwrap();

        assert_eq!(config.authenticator.authenticate("t2").unwrap().as_str(), "alien-2");
    }

    #[test]
    fn owner_token_entries_are_checked() {
        assert!(parse_owner_tokens("").unwrap().is_empty());
        assert_eq!(parse_owner_tokens("a=b,,").unwrap().len(), 1);
        assert!(matches!(
            parse_owner_tokens("justatoken"),
            Err(ConfigError::OwnerToken { entry }) if entry == "justatoken"
        ));
        assert!(parse_owner_tokens("=alien-1").is_err());
        assert!(parse_owner_tokens("t=").is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(matches!(
            args(&["--delivery-timeout-ms", "0"]).into_config(),
            Err(ConfigError::ZeroDeliveryTimeout)
        ));
    }
}

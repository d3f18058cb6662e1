//! Configuration for the registrar and claim processor.

use std::time::Duration;

use clawlink::{CLAIM_CODE_TTL, DELIVERY_TIMEOUT};

/// Registry tuning knobs.
///
/// Defaults match the protocol: 15-minute claim codes and a 5-second
/// delivery timeout. Changing the claim-code window changes what a human is
/// asked to type within, so leave it alone outside tests.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// How long a claim code is accepted after issuance.
    ///
    /// Default: 15 minutes
    pub claim_code_ttl: Duration,

    /// How many fresh codes to try when a generated code is already held by
    /// another pending bot.
    ///
    /// Default: 8
    pub max_code_attempts: u32,

    /// Upper bound for the best-effort attestation push.
    ///
    /// Default: 5 seconds
    pub delivery_timeout: Duration,

    /// Issuer identity written into attestations (usually the public base
    /// URL of the backend).
    ///
    /// Default: `http://localhost:3000`
    pub issuer: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            claim_code_ttl: CLAIM_CODE_TTL,
            max_code_attempts: 8,
            delivery_timeout: DELIVERY_TIMEOUT,
            issuer: "http://localhost:3000".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the claim-code lifetime.
    #[must_use]
    pub const fn with_claim_code_ttl(mut self, ttl: Duration) -> Self {
        self.claim_code_ttl = ttl;
        self
    }

    /// Sets the code-collision retry budget (at least one attempt is made).
    #[must_use]
    pub const fn with_max_code_attempts(mut self, attempts: u32) -> Self {
        self.max_code_attempts = attempts;
        self
    }

    /// Sets the delivery timeout.
    #[must_use]
    pub const fn with_delivery_timeout(mut self, timeout: Duration) -> Self {
        self.delivery_timeout = timeout;
        self
    }

    /// Sets the issuer identity.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_protocol() {
        let config = RegistryConfig::default();
        assert_eq!(config.claim_code_ttl, Duration::from_secs(900));
        assert_eq!(config.delivery_timeout, Duration::from_secs(5));
        assert_eq!(config.max_code_attempts, 8);
    }

    #[test]
    fn builder_overrides() {
        let config = RegistryConfig::new()
            .with_claim_code_ttl(Duration::from_secs(60))
            .with_max_code_attempts(2)
            .with_delivery_timeout(Duration::from_millis(250))
            .with_issuer("https://linker.example");

        assert_eq!(config.claim_code_ttl, Duration::from_secs(60));
        assert_eq!(config.max_code_attempts, 2);
        assert_eq!(config.delivery_timeout, Duration::from_millis(250));
        assert_eq!(config.issuer, "https://linker.example");
    }
}

//! Read-side views over stored bots.

use std::sync::Arc;

use clawlink::{BotId, OwnerId};
use clawlink_attestation::OwnershipAttestation;

use crate::{BotRecord, BotStore, RegistryError};

/// Owner and public lookups over the bot store.
///
/// Records belonging to someone else are reported as `NotFound`, the same
/// as missing ones.
#[derive(Clone)]
pub struct BotDirectory {
    store: Arc<dyn BotStore>,
}

impl BotDirectory {
    /// Creates a directory over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn BotStore>) -> Self {
        Self { store }
    }

    /// Lists the bots owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the store failed.
    pub fn list_owned(&self, owner: &OwnerId) -> Result<Vec<BotRecord>, RegistryError> {
        self.store.list_by_owner(owner)
    }

    /// Fetches one bot owned by `owner`.
    ///
    /// # Errors
    ///
    /// - `NotFound` - no such bot, or not owned by `owner`
    /// - `Storage` - the store failed
    pub fn get_owned(&self, bot_id: &BotId, owner: &OwnerId) -> Result<BotRecord, RegistryError> {
        self.store
            .get(bot_id)?
            .filter(|record| record.is_owned_by(owner))
            .ok_or_else(|| RegistryError::not_found(bot_id))
    }

    /// Returns the attestation stored for a claimed bot.
    ///
    /// Attestations are public proofs, so no caller identity is needed.
    /// This is how a bot recovers when the push at claim time was lost.
    ///
    /// # Errors
    ///
    /// - `NotFound` - no such bot, or not claimed yet
    /// - `Storage` - the store failed
    pub fn attestation(&self, bot_id: &BotId) -> Result<OwnershipAttestation, RegistryError> {
        self.store
            .get(bot_id)?
            .and_then(|record| record.attestation().cloned())
            .ok_or_else(|| RegistryError::not_found(bot_id))
    }
}

impl std::fmt::Debug for BotDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotDirectory").finish_non_exhaustive()
    }
}

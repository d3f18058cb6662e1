//! Record store interface.

use chrono::{DateTime, Utc};
use clawlink::{BotId, ClaimCode, OwnerId};
use clawlink_attestation::OwnershipAttestation;

use crate::{BotRecord, PendingClaim, RegistryError};

/// Persistent storage for bot records.
///
/// Implementations may be in-memory (tests, single process) or backed by a
/// shared database. Methods that change claim state are conditional writes:
/// the guard must be enforced by the store itself, since several processes
/// may share it.
///
/// # Async Considerations
///
/// This trait uses synchronous methods. Database-backed implementations
/// should wrap a blocking client or be driven from a blocking task.
pub trait BotStore: Send + Sync {
    /// Inserts a newly registered record.
    ///
    /// # Errors
    ///
    /// - `DuplicateBot` - a record with the same id exists
    /// - `CodeCollision` - another unclaimed record holds the same code
    /// - `Storage` - the store failed
    fn insert(&self, record: BotRecord) -> Result<(), RegistryError>;

    /// Fetches a record by id.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the store failed.
    fn get(&self, bot_id: &BotId) -> Result<Option<BotRecord>, RegistryError>;

    /// Finds the unclaimed record currently holding `code`.
    ///
    /// Claimed records never match since their code is cleared.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the store failed.
    fn find_pending_by_code(&self, code: &ClaimCode) -> Result<Option<BotRecord>, RegistryError>;

    /// Overwrites the pending claim of an unclaimed record.
    ///
    /// The old code stops matching as soon as this returns.
    ///
    /// # Errors
    ///
    /// - `NotFound` - no such record
    /// - `AlreadyClaimed` - the record has an owner
    /// - `CodeCollision` - another unclaimed record holds the new code
    /// - `Storage` - the store failed
    fn replace_pending_claim(
        &self,
        bot_id: &BotId,
        pending: PendingClaim,
        now: DateTime<Utc>,
    ) -> Result<BotRecord, RegistryError>;

    /// Atomically binds `owner` to the bot, if and only if the record is
    /// still unclaimed and still holds `expected_code`.
    ///
    /// Returns `Ok(None)` when the guard fails (another claimant won, or the
    /// code was refreshed); nothing is written in that case.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the store failed.
    fn commit_claim(
        &self,
        bot_id: &BotId,
        expected_code: &ClaimCode,
        owner: &OwnerId,
        attestation: &OwnershipAttestation,
        now: DateTime<Utc>,
    ) -> Result<Option<BotRecord>, RegistryError>;

    /// Lists the bots owned by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the store failed.
    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<BotRecord>, RegistryError>;
}

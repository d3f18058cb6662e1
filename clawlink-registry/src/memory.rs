//! In-memory record store.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use clawlink::{BotId, ClaimCode, OwnerId};
use clawlink_attestation::OwnershipAttestation;

use crate::{BotRecord, BotStore, PendingClaim, RegistryError};

#[derive(Debug, Default)]
struct Indexes {
    /// Primary index: bot id string -> record
    by_id: HashMap<String, BotRecord>,
    /// Secondary index: pending claim code -> bot id string
    by_code: HashMap<ClaimCode, String>,
}

/// Single-process store for tests and development.
///
/// # Thread Safety
///
/// Both indexes live behind one `RwLock`, so every conditional write
/// (insert, code replacement, claim commit) checks and updates under the
/// same exclusive guard.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use clawlink::{BotId, BotName, ClaimCode, EncodedPublicKey};
/// use clawlink_registry::{BotRecord, BotStore, InMemoryBotStore, PendingClaim};
///
/// let store = InMemoryBotStore::new();
/// let code = ClaimCode::parse("123456").unwrap();
/// let record = BotRecord::new(
///     BotId::new(),
///     BotName::parse("r1").unwrap(),
///     EncodedPublicKey::from_ed25519_bytes(&[1u8; 32]),
///     None,
///     PendingClaim::new(code.clone(), Utc::now()),
///     Utc::now(),
/// );
///
/// store.insert(record).unwrap();
/// assert!(store.find_pending_by_code(&code).unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBotStore {
    inner: RwLock<Indexes>,
}

impl InMemoryBotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, RegistryError> {
        Ok(self.read()?.by_id.len())
    }

    /// Returns true if no records are stored.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        Ok(self.read()?.by_id.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Indexes>, RegistryError> {
        self.inner
            .read()
            .map_err(|_| RegistryError::storage("bot store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Indexes>, RegistryError> {
        self.inner
            .write()
            .map_err(|_| RegistryError::storage("bot store lock poisoned"))
    }
}

impl BotStore for InMemoryBotStore {
    fn insert(&self, record: BotRecord) -> Result<(), RegistryError> {
        let mut guard = self.write()?;
        let indexes = &mut *guard;
        let id = record.bot_id().to_string();

        if indexes.by_id.contains_key(&id) {
            return Err(RegistryError::DuplicateBot { bot_id: id });
        }
        if let Some(pending) = record.pending_claim() {
            if indexes.by_code.contains_key(pending.code()) {
                return Err(RegistryError::CodeCollision);
            }
            indexes.by_code.insert(pending.code().clone(), id.clone());
        }
        indexes.by_id.insert(id, record);
        Ok(())
    }

    fn get(&self, bot_id: &BotId) -> Result<Option<BotRecord>, RegistryError> {
        Ok(self.read()?.by_id.get(bot_id.as_str()).cloned())
    }

    fn find_pending_by_code(&self, code: &ClaimCode) -> Result<Option<BotRecord>, RegistryError> {
        let guard = self.read()?;
        Ok(guard
            .by_code
            .get(code)
            .and_then(|id| guard.by_id.get(id))
            .filter(|record| record.holds_pending_code(code))
            .cloned())
    }

    fn replace_pending_claim(
        &self,
        bot_id: &BotId,
        pending: PendingClaim,
        now: DateTime<Utc>,
    ) -> Result<BotRecord, RegistryError> {
        let mut guard = self.write()?;
        let indexes = &mut *guard;
        let id = bot_id.as_str();

        let current = indexes
            .by_id
            .get(id)
            .ok_or_else(|| RegistryError::not_found(bot_id))?;
        if current.is_claimed() {
            return Err(RegistryError::already_claimed(bot_id));
        }
        if indexes
            .by_code
            .get(pending.code())
            .is_some_and(|holder| holder != id)
        {
            return Err(RegistryError::CodeCollision);
        }

        let old_code = current.pending_claim().map(|p| p.code().clone());
        let new_code = pending.code().clone();
        let updated = current.clone().with_pending_claim(pending, now)?;

        if let Some(old_code) = old_code {
            indexes.by_code.remove(&old_code);
        }
        indexes.by_code.insert(new_code, id.to_string());
        indexes.by_id.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    fn commit_claim(
        &self,
        bot_id: &BotId,
        expected_code: &ClaimCode,
        owner: &OwnerId,
        attestation: &OwnershipAttestation,
        now: DateTime<Utc>,
    ) -> Result<Option<BotRecord>, RegistryError> {
        let mut guard = self.write()?;
        let indexes = &mut *guard;
        let id = bot_id.as_str();

        let Some(current) = indexes
            .by_id
            .get(id)
            .filter(|record| record.holds_pending_code(expected_code))
        else {
            return Ok(None);
        };

        let claimed = current
            .clone()
            .claim(owner.clone(), attestation.clone(), now)?;
        indexes.by_code.remove(expected_code);
        indexes.by_id.insert(id.to_string(), claimed.clone());
        Ok(Some(claimed))
    }

    fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<BotRecord>, RegistryError> {
        let guard = self.read()?;
        let mut records: Vec<BotRecord> = guard
            .by_id
            .values()
            .filter(|record| record.is_owned_by(owner))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.bot_id().as_str().cmp(a.bot_id().as_str()))
        });
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, TimeZone};
    use clawlink::{BotName, EncodedPublicKey};
    use clawlink_attestation::Issuer;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn code(s: &str) -> ClaimCode {
        ClaimCode::parse(s).unwrap()
    }

    fn record_with(code_str: &str, created_at: DateTime<Utc>) -> BotRecord {
        BotRecord::new(
            BotId::new(),
            BotName::parse("bot").unwrap(),
            EncodedPublicKey::from_ed25519_bytes(&[5u8; 32]),
            None,
            PendingClaim::new(code(code_str), created_at + TimeDelta::minutes(15)),
            created_at,
        )
    }

    fn attestation(record: &BotRecord, owner: &OwnerId) -> OwnershipAttestation {
        Issuer::generate("https://linker.example")
            .issue(owner, record.bot_id(), record.public_key())
            .unwrap()
    }

    #[test]
    fn insert_and_find_by_code() {
        let store = InMemoryBotStore::new();
        let record = record_with("111111", t0());
        let id = record.bot_id().clone();

        store.insert(record).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(
            store.find_pending_by_code(&code("111111")).unwrap().unwrap().bot_id(),
            &id
        );
        assert!(store.find_pending_by_code(&code("222222")).unwrap().is_none());
    }

    #[test]
    fn insert_rejects_pending_code_collision() {
        let store = InMemoryBotStore::new();
        store.insert(record_with("111111", t0())).unwrap();

        assert_eq!(
            store.insert(record_with("111111", t0())),
            Err(RegistryError::CodeCollision)
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let store = InMemoryBotStore::new();
        let record = record_with("111111", t0());
        store.insert(record.clone()).unwrap();

        assert!(matches!(
            store.insert(record),
            Err(RegistryError::DuplicateBot { .. })
        ));
    }

    #[test]
    fn commit_claim_is_conditional() {
        let store = InMemoryBotStore::new();
        let record = record_with("111111", t0());
        let id = record.bot_id().clone();
        let owner = OwnerId::parse("alien-1").unwrap();
        let att = attestation(&record, &owner);
        store.insert(record).unwrap();

        let first = store
            .commit_claim(&id, &code("111111"), &owner, &att, t0())
            .unwrap();
        let second = store
            .commit_claim(&id, &code("111111"), &OwnerId::parse("alien-2").unwrap(), &att, t0())
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        let stored = store.get(&id).unwrap().unwrap();
        assert!(stored.is_owned_by(&owner));
        assert!(store.find_pending_by_code(&code("111111")).unwrap().is_none());
    }

    #[test]
    fn commit_claim_with_stale_code_writes_nothing() {
        let store = InMemoryBotStore::new();
        let record = record_with("111111", t0());
        let id = record.bot_id().clone();
        let owner = OwnerId::parse("alien-1").unwrap();
        let att = attestation(&record, &owner);
        store.insert(record).unwrap();

        store
            .replace_pending_claim(&id, PendingClaim::new(code("333333"), t0()), t0())
            .unwrap();
        let result = store
            .commit_claim(&id, &code("111111"), &owner, &att, t0())
            .unwrap();

        assert!(result.is_none());
        assert!(!store.get(&id).unwrap().unwrap().is_claimed());
    }

    #[test]
    fn replace_pending_claim_moves_code_index() {
        let store = InMemoryBotStore::new();
        let record = record_with("111111", t0());
        let id = record.bot_id().clone();
        store.insert(record).unwrap();

        let updated = store
            .replace_pending_claim(&id, PendingClaim::new(code("444444"), t0()), t0())
            .unwrap();

        assert_eq!(updated.pending_claim().unwrap().code(), &code("444444"));
        assert!(store.find_pending_by_code(&code("111111")).unwrap().is_none());
        assert!(store.find_pending_by_code(&code("444444")).unwrap().is_some());
    }

    #[test]
    fn replace_pending_claim_rejects_code_held_elsewhere() {
        let store = InMemoryBotStore::new();
        let first = record_with("111111", t0());
        let second = record_with("222222", t0());
        let second_id = second.bot_id().clone();
        store.insert(first).unwrap();
        store.insert(second).unwrap();

        assert_eq!(
            store.replace_pending_claim(&second_id, PendingClaim::new(code("111111"), t0()), t0()),
            Err(RegistryError::CodeCollision)
        );
    }

    #[test]
    fn replace_pending_claim_on_missing_bot() {
        let store = InMemoryBotStore::new();
        assert!(matches!(
            store.replace_pending_claim(&BotId::new(), PendingClaim::new(code("111111"), t0()), t0()),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn list_by_owner_newest_first() {
        let store = InMemoryBotStore::new();
        let owner = OwnerId::parse("alien-1").unwrap();
        let mut ids = Vec::new();
        for (i, code_str) in ["100000", "200000", "300000"].iter().enumerate() {
            let created = t0() + TimeDelta::minutes(i64::try_from(i).unwrap());
            let record = record_with(code_str, created);
            let id = record.bot_id().clone();
            let att = attestation(&record, &owner);
            store.insert(record).unwrap();
            store
                .commit_claim(&id, &code(code_str), &owner, &att, created)
                .unwrap();
            ids.push(id);
        }
        store.insert(record_with("400000", t0())).unwrap();

        let listed: Vec<BotId> = store
            .list_by_owner(&owner)
            .unwrap()
            .iter()
            .map(|r| r.bot_id().clone())
            .collect();

        ids.reverse();
        assert_eq!(listed, ids);
        assert!(store.list_by_owner(&OwnerId::parse("nobody").unwrap()).unwrap().is_empty());
    }
}

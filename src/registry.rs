//! Process-wide table of live battles.

use crate::battle::state::BattleSession;
use crate::errors::{BattleError, BattleResult};
use crate::ids::BattleId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// A live battle. Reads share the lock; each mutating operation holds the
/// write lock for its whole duration, so operations on one battle never
/// interleave.
pub type SharedSession = Arc<RwLock<BattleSession>>;

#[derive(Debug, Default)]
pub struct BattleRegistry {
    sessions: RwLock<HashMap<BattleId, SharedSession>>,
}

/// Lock guards are recovered on poisoning: a panic mid-operation leaves the
/// table itself intact.
fn read_guard<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_guard<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl BattleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: BattleSession) -> SharedSession {
        let id = session.id().clone();
        let shared = Arc::new(RwLock::new(session));
        write_guard(&self.sessions).insert(id.clone(), Arc::clone(&shared));
        debug!(battle_id = %id, "battle registered");
        shared
    }

    pub fn get(&self, id: &BattleId) -> BattleResult<SharedSession> {
        read_guard(&self.sessions)
            .get(id)
            .cloned()
            .ok_or_else(|| BattleError::BattleNotFound(id.clone()))
    }

    pub fn contains(&self, id: &BattleId) -> bool {
        read_guard(&self.sessions).contains_key(id)
    }

    pub fn remove(&self, id: &BattleId) -> Option<SharedSession> {
        let removed = write_guard(&self.sessions).remove(id);
        if removed.is_some() {
            debug!(battle_id = %id, "battle evicted");
        }
        removed
    }

    /// Put a previously removed battle back under its id.
    pub fn restore(&self, id: BattleId, shared: SharedSession) {
        write_guard(&self.sessions).insert(id.clone(), shared);
        debug!(battle_id = %id, "battle restored");
    }

    /// Run `f` against a shared view of the battle.
    pub fn read<T>(&self, id: &BattleId, f: impl FnOnce(&BattleSession) -> T) -> BattleResult<T> {
        let shared = self.get(id)?;
        let session = read_guard(&shared);
        Ok(f(&session))
    }

    /// Run `f` with exclusive access to the battle.
    pub fn write<T>(
        &self,
        id: &BattleId,
        f: impl FnOnce(&mut BattleSession) -> BattleResult<T>,
    ) -> BattleResult<T> {
        let shared = self.get(id)?;
        let mut session = write_guard(&shared);
        f(&mut session)
    }

    /// Every registered battle, oldest first.
    pub fn sessions(&self) -> Vec<SharedSession> {
        let table = read_guard(&self.sessions);
        let mut ids: Vec<&BattleId> = table.keys().collect();
        ids.sort();
        ids.into_iter().filter_map(|id| table.get(id).cloned()).collect()
    }

    /// Snapshot a projection of every battle, oldest first.
    pub fn map_all<T>(&self, f: impl Fn(&BattleSession) -> T) -> Vec<T> {
        self.sessions()
            .iter()
            .map(|shared| f(&read_guard(shared)))
            .collect()
    }

    /// Ids of battles that finished but are still registered.
    pub fn finished_ids(&self) -> Vec<BattleId> {
        self.map_all(|session| session.is_finished().then(|| session.id().clone()))
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn len(&self) -> usize {
        read_guard(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        read_guard(&self.sessions).is_empty()
    }
}

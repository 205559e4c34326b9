//! Identifier value types used across the engine.

use chrono::Utc;
use schema::Side;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;

/// Numeric id of a character in its side's roster. Hero and villain rosters
/// are numbered independently, so the same number can appear on both sides.
pub type RosterId = u32;

/// Side-tagged combatant id, written `H<n>` or `V<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CombatantId {
    side: Side,
    roster_id: RosterId,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed combatant id '{0}', expected H<number> or V<number>")]
pub struct ParseCombatantIdError(pub String);

impl CombatantId {
    pub fn new(side: Side, roster_id: RosterId) -> Self {
        Self { side, roster_id }
    }

    pub fn hero(roster_id: RosterId) -> Self {
        Self::new(Side::Hero, roster_id)
    }

    pub fn villain(roster_id: RosterId) -> Self {
        Self::new(Side::Villain, roster_id)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn roster_id(&self) -> RosterId {
        self.roster_id
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.side.prefix(), self.roster_id)
    }
}

impl FromStr for CombatantId {
    type Err = ParseCombatantIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let side = chars
            .next()
            .and_then(Side::from_prefix)
            .ok_or_else(|| ParseCombatantIdError(s.to_string()))?;
        let roster_id = chars
            .as_str()
            .parse::<RosterId>()
            .map_err(|_| ParseCombatantIdError(s.to_string()))?;
        Ok(Self { side, roster_id })
    }
}

impl TryFrom<String> for CombatantId {
    type Error = ParseCombatantIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CombatantId> for String {
    fn from(id: CombatantId) -> Self {
        id.to_string()
    }
}

/// Id of a battle session, derived from the creation time in epoch millis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleId(String);

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

impl BattleId {
    /// Issues a fresh id. Ids are strictly increasing within a process, so two
    /// battles created in the same millisecond still get distinct ids.
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut last = LAST_ISSUED_MILLIS.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match LAST_ISSUED_MILLIS.compare_exchange_weak(
                last,
                candidate,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return BattleId(candidate.to_string()),
                Err(observed) => last = observed,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BattleId {
    fn from(value: &str) -> Self {
        BattleId(value.to_string())
    }
}

impl From<String> for BattleId {
    fn from(value: String) -> Self {
        BattleId(value)
    }
}

/// The authenticated user that owns a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId::new(value)
    }
}

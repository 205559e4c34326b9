//! Storage for finished battles and the statistics derived from them.

use crate::battle::view::BattleSummary;
use crate::errors::{ArchiveError, ArchiveResult};
use crate::ids::UserId;
use chrono::Datelike;
use schema::{BattlePhase, Winner};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Statistics cover at most this many of the most recent months.
pub const MONTHS_REPORTED: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerTally {
    pub winner: Winner,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTally {
    pub year: i32,
    pub month: u32,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStatistics {
    /// Every stored battle, finished or not.
    pub total_battles: usize,
    pub by_winner: Vec<WinnerTally>,
    /// Finished battles per creation month, newest month first.
    pub by_month: Vec<MonthTally>,
}

/// Where finished battles go once they leave the registry.
pub trait BattleArchive: Send + Sync {
    fn save(&self, record: &BattleSummary) -> ArchiveResult<()>;

    fn list_all(&self) -> ArchiveResult<Vec<BattleSummary>>;

    /// Stored battles newest first, optionally only those of one owner.
    fn history(&self, owner: Option<&UserId>) -> ArchiveResult<Vec<BattleSummary>> {
        let mut records: Vec<BattleSummary> = self
            .list_all()?
            .into_iter()
            .filter(|record| owner.map_or(true, |owner| &record.owner == owner))
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    fn aggregate_statistics(&self) -> ArchiveResult<BattleStatistics> {
        Ok(tally_statistics(&self.list_all()?))
    }
}

pub fn tally_statistics(records: &[BattleSummary]) -> BattleStatistics {
    let finished: Vec<&BattleSummary> = records
        .iter()
        .filter(|record| record.phase == BattlePhase::Finished)
        .collect();

    let by_winner = [Winner::Hero, Winner::Villain, Winner::Draw]
        .into_iter()
        .map(|winner| WinnerTally {
            winner,
            total: finished.iter().filter(|r| r.winner == Some(winner)).count(),
        })
        .filter(|tally| tally.total > 0)
        .collect();

    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for record in &finished {
        *months
            .entry((record.created_at.year(), record.created_at.month()))
            .or_default() += 1;
    }
    let by_month = months
        .into_iter()
        .rev()
        .take(MONTHS_REPORTED)
        .map(|((year, month), total)| MonthTally { year, month, total })
        .collect();

    BattleStatistics {
        total_battles: records.len(),
        by_winner,
        by_month,
    }
}

/// Keeps records as postcard-encoded blobs, the way a document store would
/// hold them at rest.
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    blobs: RwLock<Vec<Vec<u8>>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BattleArchive for InMemoryArchive {
    fn save(&self, record: &BattleSummary) -> ArchiveResult<()> {
        let blob = postcard::to_allocvec(record).map_err(|e| ArchiveError::Encode(e.to_string()))?;
        let mut blobs = self.blobs.write().unwrap_or_else(PoisonError::into_inner);
        blobs.push(blob);
        Ok(())
    }

    fn list_all(&self) -> ArchiveResult<Vec<BattleSummary>> {
        let blobs = self.blobs.read().unwrap_or_else(PoisonError::into_inner);
        blobs
            .iter()
            .map(|blob| postcard::from_bytes(blob).map_err(|e| ArchiveError::Decode(e.to_string())))
            .collect()
    }
}

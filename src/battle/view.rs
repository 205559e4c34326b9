//! Read-only projections of a session for callers and for persistence.

use crate::ability::ActiveStatus;
use crate::battle::state::{BattleSession, LoggedEvent};
use crate::combatant::Combatant;
use crate::ids::{BattleId, CombatantId, RosterId, UserId};
use crate::squad::Squad;
use chrono::{DateTime, Utc};
use schema::{BattlePhase, Side, Winner};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantView {
    pub id: RosterId,
    pub unique_id: CombatantId,
    pub name: String,
    pub alias: String,
    pub team: String,
    pub side: Side,
    pub health: u32,
    pub max_health: u32,
    pub alive: bool,
    pub active: bool,
    pub power_bar: u32,
    pub defense_bar: u32,
    pub can_super_attack: bool,
    pub can_super_defense: bool,
    pub pending_super_attack: bool,
    pub pending_super_defense: bool,
    pub ability: Option<String>,
    pub ability_cooldown: u8,
    pub statuses: Vec<ActiveStatus>,
}

impl From<&Combatant> for CombatantView {
    fn from(c: &Combatant) -> Self {
        Self {
            id: c.id,
            unique_id: c.unique_id,
            name: c.name.clone(),
            alias: c.alias.clone(),
            team: c.team.clone(),
            side: c.side,
            health: c.health(),
            max_health: c.max_health(),
            alive: c.is_alive(),
            active: c.is_active(),
            power_bar: c.power_bar(),
            defense_bar: c.defense_bar(),
            can_super_attack: c.can_super_attack(),
            can_super_defense: c.can_super_defense(),
            pending_super_attack: c.pending_super_attack(),
            pending_super_defense: c.pending_super_defense(),
            ability: c.ability().map(|a| a.name.clone()),
            ability_cooldown: c.ability_cooldown(),
            statuses: c.statuses().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquadView {
    pub name: String,
    pub side: Side,
    pub current_index: usize,
    pub total_health: u32,
    pub members: Vec<CombatantView>,
}

impl From<&Squad> for SquadView {
    fn from(squad: &Squad) -> Self {
        Self {
            name: squad.name.clone(),
            side: squad.side,
            current_index: squad.current_index(),
            total_health: squad.total_health(),
            members: squad.members().iter().map(CombatantView::from).collect(),
        }
    }
}

/// Everything about a battle, including its full log. This is also the shape
/// persisted once a battle finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    pub id: BattleId,
    pub owner: UserId,
    pub phase: BattlePhase,
    pub initiator: Side,
    pub round: u32,
    pub max_rounds: u32,
    pub turn: Side,
    pub winner: Option<Winner>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub current: Option<CombatantView>,
    pub heroes: SquadView,
    pub villains: SquadView,
    pub log: Vec<LoggedEvent>,
}

/// Lightweight listing entry for active battles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOverview {
    pub id: BattleId,
    pub owner: UserId,
    pub phase: BattlePhase,
    pub round: u32,
    pub turn: Side,
    pub winner: Option<Winner>,
    pub created_at: DateTime<Utc>,
    pub heroes: SquadView,
    pub villains: SquadView,
}

/// Decision-support view for whoever is about to act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleDetails {
    pub id: BattleId,
    pub phase: BattlePhase,
    pub round: u32,
    pub max_rounds: u32,
    pub turn: Side,
    pub winner: Option<Winner>,
    pub current: Option<CombatantView>,
    /// Active members of the side to move.
    pub attackers: Vec<CombatantView>,
    /// Living members of the other side.
    pub targets: Vec<CombatantView>,
    pub heroes: SquadView,
    pub villains: SquadView,
}

impl BattleSession {
    pub fn summary(&self) -> BattleSummary {
        BattleSummary {
            id: self.id.clone(),
            owner: self.owner.clone(),
            phase: self.phase,
            initiator: self.initiator,
            round: self.round,
            max_rounds: self.max_rounds,
            turn: self.turn,
            winner: self.winner,
            created_at: self.created_at,
            finished_at: self.finished_at,
            current: self.current_combatant().map(CombatantView::from),
            heroes: SquadView::from(&self.heroes),
            villains: SquadView::from(&self.villains),
            log: self.log.entries().to_vec(),
        }
    }

    pub fn overview(&self) -> BattleOverview {
        BattleOverview {
            id: self.id.clone(),
            owner: self.owner.clone(),
            phase: self.phase,
            round: self.round,
            turn: self.turn,
            winner: self.winner,
            created_at: self.created_at,
            heroes: SquadView::from(&self.heroes),
            villains: SquadView::from(&self.villains),
        }
    }

    pub fn details(&self) -> BattleDetails {
        BattleDetails {
            id: self.id.clone(),
            phase: self.phase,
            round: self.round,
            max_rounds: self.max_rounds,
            turn: self.turn,
            winner: self.winner,
            current: self.current_combatant().map(CombatantView::from),
            attackers: self
                .squad(self.turn)
                .active_members()
                .map(CombatantView::from)
                .collect(),
            targets: self
                .squad(self.turn.opponent())
                .living_members()
                .map(CombatantView::from)
                .collect(),
            heroes: SquadView::from(&self.heroes),
            villains: SquadView::from(&self.villains),
        }
    }
}

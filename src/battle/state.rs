use crate::config::{DamageTable, EngineConfig};
use crate::combatant::Combatant;
use crate::ids::{BattleId, CombatantId, RosterId, UserId};
use crate::squad::Squad;
use chrono::{DateTime, Utc};
use schema::{AttackKind, BattlePhase, Side, StatusKind, SuperKind, Winner};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Battle Lifecycle
    BattleStarted {
        initiator: Side,
    },
    BattleFinished {
        winner: Winner,
        hero_health: u32,
        villain_health: u32,
    },

    // Turn Management
    TurnChanged {
        side: Side,
        combatant: CombatantId,
    },
    RoundAdvanced {
        round: u32,
        eliminated: CombatantId,
    },

    // Combat
    Attack {
        attacker: CombatantId,
        target: CombatantId,
        kind: AttackKind,
        damage: u32,
        super_attack: bool,
        health_before: u32,
        health_after: u32,
        target_eliminated: bool,
        attacker_power_bar: u32,
        target_defense_bar: u32,
    },
    Eliminated {
        combatant: CombatantId,
    },
    SuperActivated {
        combatant: CombatantId,
        kind: SuperKind,
    },

    // Abilities and Statuses
    AbilityUsed {
        user: CombatantId,
        ability: Option<String>,
        target: Option<CombatantId>,
        description: String,
        cooldown: u8,
    },
    StatusTicked {
        combatant: CombatantId,
        status: StatusKind,
        amount: u32,
        health_after: u32,
    },
    StatusExpired {
        combatant: CombatantId,
        status: StatusKind,
    },
}

impl BattleEvent {
    /// Formats the event into a human-readable line using battle context.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn format(&self, session: &BattleSession) -> Option<String> {
        let name = |id: &CombatantId| session.display_name(id);
        match self {
            // === Lifecycle Events ===
            BattleEvent::BattleStarted { initiator } => {
                Some(format!("The battle begins! The {} strike first.", initiator))
            }
            BattleEvent::BattleFinished { winner, hero_health, villain_health } => match winner {
                Winner::Draw => Some(format!(
                    "The battle ended in a draw! ({} - {})",
                    hero_health, villain_health
                )),
                side => Some(format!(
                    "The {} win the battle! ({} - {})",
                    side, hero_health, villain_health
                )),
            },

            // === Turn Events ===
            BattleEvent::TurnChanged { side, combatant } => {
                Some(format!("{}' turn: {}", side, name(combatant)))
            }
            BattleEvent::RoundAdvanced { round, .. } => Some(format!("=== Round {} ===", round)),

            // === Combat Events ===
            BattleEvent::Attack {
                attacker,
                target,
                kind,
                damage,
                super_attack,
                health_after,
                ..
            } => {
                let super_tag = if *super_attack { " (SUPER ATTACK)" } else { "" };
                Some(format!(
                    "{} hits {} with a {} attack{} for {} damage! ({} HP left)",
                    name(attacker),
                    name(target),
                    kind,
                    super_tag,
                    damage,
                    health_after
                ))
            }
            BattleEvent::Eliminated { combatant } => {
                Some(format!("{} has been eliminated!", name(combatant)))
            }
            BattleEvent::SuperActivated { combatant, kind } => {
                Some(format!("{} readies a {}!", name(combatant), kind))
            }

            // === Ability Events ===
            BattleEvent::AbilityUsed { description, .. } => Some(description.clone()),
            BattleEvent::StatusTicked { combatant, status, amount, .. } => {
                if *amount == 0 {
                    return None; // Silent - nothing changed
                }
                match status {
                    StatusKind::Poison => Some(format!(
                        "{} is hurt by poison! ({} damage)",
                        name(combatant),
                        amount
                    )),
                    StatusKind::Regeneration => Some(format!(
                        "{} regenerates {} HP.",
                        name(combatant),
                        amount
                    )),
                }
            }
            BattleEvent::StatusExpired { combatant, status } => {
                Some(format!("{}'s {} wore off.", name(combatant), status))
            }
        }
    }
}

/// One entry of the battle history, stamped with where the battle stood.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    pub turn: Side,
    pub round: u32,
    pub timestamp: DateTime<Utc>,
    pub event: BattleEvent,
}

/// Append-only battle history.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, entry: LoggedEvent) {
        self.events.push(entry);
    }

    pub fn entries(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn events(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter().map(|entry| &entry.event)
    }

    /// Entries appended since `mark`, for reporting what one action caused.
    pub fn since(&self, mark: usize) -> &[LoggedEvent] {
        self.events.get(mark..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventLog {
    /// Format the log for printing. Shows debug format of all events.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.events {
            writeln!(f, "  [round {}] {:?}", entry.round, entry.event)?;
        }
        Ok(())
    }
}

/// The full state of one hero-vs-villain battle.
#[derive(Debug, Clone)]
pub struct BattleSession {
    pub(crate) id: BattleId,
    pub(crate) owner: UserId,
    pub(crate) heroes: Squad,
    pub(crate) villains: Squad,
    pub(crate) initiator: Side,
    pub(crate) round: u32,
    pub(crate) max_rounds: u32,
    pub(crate) turn: Side,
    pub(crate) phase: BattlePhase,
    pub(crate) winner: Option<Winner>,
    pub(crate) log: EventLog,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) finished_at: Option<DateTime<Utc>>,
    pub(crate) damage: DamageTable,
    pub(crate) super_attack_multiplier: u32,
}

impl BattleSession {
    pub fn new(
        id: BattleId,
        owner: UserId,
        heroes: Squad,
        villains: Squad,
        initiator: Side,
        config: &EngineConfig,
    ) -> Self {
        Self {
            id,
            owner,
            heroes,
            villains,
            initiator,
            round: 1,
            max_rounds: config.max_rounds,
            turn: initiator,
            phase: BattlePhase::Starting,
            winner: None,
            log: EventLog::new(),
            created_at: Utc::now(),
            finished_at: None,
            damage: config.damage,
            super_attack_multiplier: config.super_attack_multiplier,
        }
    }

    /// Point each squad at its chosen opener. Unknown ids leave the pointer on
    /// the first member.
    pub fn with_starting_combatants(mut self, hero: Option<RosterId>, villain: Option<RosterId>) -> Self {
        if let Some(id) = hero {
            self.heroes.set_initial_combatant(id);
        }
        if let Some(id) = villain {
            self.villains.set_initial_combatant(id);
        }
        self
    }

    pub fn id(&self) -> &BattleId {
        &self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn initiator(&self) -> Side {
        self.initiator
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    pub fn squad(&self, side: Side) -> &Squad {
        match side {
            Side::Hero => &self.heroes,
            Side::Villain => &self.villains,
        }
    }

    pub(crate) fn squad_mut(&mut self, side: Side) -> &mut Squad {
        match side {
            Side::Hero => &mut self.heroes,
            Side::Villain => &mut self.villains,
        }
    }

    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        self.squad(id.side()).find(id)
    }

    pub(crate) fn combatant_mut(&mut self, id: &CombatantId) -> Option<&mut Combatant> {
        self.squad_mut(id.side()).find_mut(id)
    }

    /// The combatant whose squad holds the turn, at that squad's pointer.
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.squad(self.turn).current_combatant()
    }

    pub(crate) fn display_name(&self, id: &CombatantId) -> String {
        self.combatant(id)
            .map(|c| c.alias.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub(crate) fn record(&mut self, event: BattleEvent) {
        self.log.push(LoggedEvent {
            turn: self.turn,
            round: self.round,
            timestamp: Utc::now(),
            event,
        });
    }

    /// Human-readable lines for a slice of the log.
    pub fn format_entries(&self, entries: &[LoggedEvent]) -> Vec<String> {
        entries
            .iter()
            .filter_map(|entry| entry.event.format(self))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn combatant_mut_for_test(&mut self, id: &CombatantId) -> &mut Combatant {
        self.combatant_mut(id).expect("test combatant must exist")
    }
}

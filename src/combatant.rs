use crate::ability::{AbilityData, ActiveStatus, StatusTick};
use crate::character::Character;
use crate::ids::{CombatantId, RosterId};
use schema::{Side, StatusKind, SuperKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Both super bars fill up to this level.
pub const BAR_CAPACITY: u32 = 100;

/// One character's live battle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: RosterId,
    pub unique_id: CombatantId,
    pub name: String,
    pub alias: String,
    pub team: String,
    pub side: Side,
    health: u32,
    max_health: u32,
    power_bar: u32,
    defense_bar: u32,
    pending_super_attack: bool,
    pending_super_defense: bool,
    // Cleared on elimination and never set again.
    active: bool,
    ability: Option<AbilityData>,
    ability_cooldown: u8,
    statuses: Vec<ActiveStatus>,
}

impl Combatant {
    pub fn new(character: Character, side: Side, max_health: u32) -> Self {
        Self {
            id: character.id,
            unique_id: CombatantId::new(side, character.id),
            name: character.name,
            alias: character.alias,
            team: character.team,
            side,
            health: max_health,
            max_health,
            power_bar: 0,
            defense_bar: 0,
            pending_super_attack: false,
            pending_super_defense: false,
            active: true,
            ability: character.ability,
            ability_cooldown: 0,
            statuses: Vec::new(),
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn power_bar(&self) -> u32 {
        self.power_bar
    }

    pub fn defense_bar(&self) -> u32 {
        self.defense_bar
    }

    pub fn bar(&self, kind: SuperKind) -> u32 {
        match kind {
            SuperKind::Attack => self.power_bar,
            SuperKind::Defense => self.defense_bar,
        }
    }

    pub fn pending_super_attack(&self) -> bool {
        self.pending_super_attack
    }

    pub fn pending_super_defense(&self) -> bool {
        self.pending_super_defense
    }

    pub fn ability(&self) -> Option<&AbilityData> {
        self.ability.as_ref()
    }

    pub fn ability_cooldown(&self) -> u8 {
        self.ability_cooldown
    }

    pub fn statuses(&self) -> &[ActiveStatus] {
        &self.statuses
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Eligible to act: the active flag and health both have to agree.
    pub fn is_active(&self) -> bool {
        self.active && self.is_alive()
    }

    /// Apply an incoming hit and return the resulting health.
    ///
    /// Bars grow by the raw `amount` even when a pending super defense halves
    /// the damage actually taken. The super defense is spent on this hit.
    pub fn receive_damage(&mut self, amount: u32) -> u32 {
        let mut final_damage = amount;
        if self.is_alive() {
            self.power_bar = self.power_bar.saturating_add(amount).min(BAR_CAPACITY);
            self.defense_bar = self.defense_bar.saturating_add(amount).min(BAR_CAPACITY);

            if self.pending_super_defense {
                final_damage = amount.div_ceil(2);
                self.pending_super_defense = false;
            }
        }

        self.health = self.health.saturating_sub(final_damage);
        if self.health == 0 {
            self.eliminate();
        }
        self.health
    }

    /// Restore health up to the maximum. The eliminated stay eliminated.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    pub fn can_super_attack(&self) -> bool {
        self.power_bar == BAR_CAPACITY
    }

    pub fn can_super_defense(&self) -> bool {
        self.defense_bar == BAR_CAPACITY
    }

    pub fn activate_super_attack(&mut self) -> bool {
        if !self.can_super_attack() {
            return false;
        }
        self.pending_super_attack = true;
        self.power_bar = 0;
        true
    }

    pub fn activate_super_defense(&mut self) -> bool {
        if !self.can_super_defense() {
            return false;
        }
        self.pending_super_defense = true;
        self.defense_bar = 0;
        true
    }

    pub fn activate_super(&mut self, kind: SuperKind) -> bool {
        match kind {
            SuperKind::Attack => self.activate_super_attack(),
            SuperKind::Defense => self.activate_super_defense(),
        }
    }

    /// Consume a pending super attack, if any.
    pub fn take_super_attack(&mut self) -> bool {
        std::mem::take(&mut self.pending_super_attack)
    }

    pub fn start_ability_cooldown(&mut self) {
        if let Some(ability) = &self.ability {
            self.ability_cooldown = ability.cooldown;
        }
    }

    pub fn tick_cooldown(&mut self) {
        self.ability_cooldown = self.ability_cooldown.saturating_sub(1);
    }

    /// Attach a status, refreshing it if one of the same kind is already running.
    pub fn add_status(&mut self, kind: StatusKind, magnitude: u32, turns: u8) {
        if !self.is_alive() || turns == 0 {
            return;
        }
        self.statuses.retain(|s| s.kind != kind);
        self.statuses.push(ActiveStatus {
            kind,
            magnitude,
            turns_remaining: turns,
        });
    }

    /// Run every attached status once. Poison bypasses bars and super defense.
    pub fn apply_turn_effects(&mut self) -> Vec<StatusTick> {
        let mut ticks = Vec::new();
        if !self.is_alive() {
            return ticks;
        }

        let statuses = std::mem::take(&mut self.statuses);
        let mut remaining = Vec::with_capacity(statuses.len());
        for mut status in statuses {
            let amount = match status.kind {
                StatusKind::Poison => {
                    let before = self.health;
                    self.health = self.health.saturating_sub(status.magnitude);
                    before - self.health
                }
                StatusKind::Regeneration => self.heal(status.magnitude),
            };
            status.turns_remaining = status.turns_remaining.saturating_sub(1);
            let expired = status.turns_remaining == 0;
            ticks.push(StatusTick {
                kind: status.kind,
                amount,
                health_after: self.health,
                expired,
            });
            if !expired {
                remaining.push(status);
            }
            if self.health == 0 {
                break;
            }
        }
        self.statuses = remaining;

        if self.health == 0 {
            self.eliminate();
        }
        ticks
    }

    fn eliminate(&mut self) {
        self.active = false;
        self.power_bar = 0;
        self.defense_bar = 0;
        self.pending_super_attack = false;
        self.pending_super_defense = false;
        self.statuses.clear();
    }

    #[cfg(test)]
    pub(crate) fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_health);
        if self.health == 0 {
            self.eliminate();
        }
    }

    #[cfg(test)]
    pub(crate) fn set_bars(&mut self, power: u32, defense: u32) {
        self.power_bar = power.min(BAR_CAPACITY);
        self.defense_bar = defense.min(BAR_CAPACITY);
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] HP: {}/{} | Power: {}/{} | Defense: {}/{}",
            self.alias,
            self.unique_id,
            self.health,
            self.max_health,
            self.power_bar,
            BAR_CAPACITY,
            self.defense_bar,
            BAR_CAPACITY
        )?;
        if !self.is_alive() {
            write!(f, " (Eliminated)")?;
        }
        Ok(())
    }
}

//! Per-character special abilities and the lingering statuses they leave.

use schema::StatusKind;
use serde::{Deserialize, Serialize};

/// What an ability does when used. The set is closed on purpose: anything the
/// roster data cannot express here is modelled as `CooldownOnly`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Damage an opposing combatant. Goes through the normal damage path.
    Damage { amount: u32 },
    /// Restore health to an ally (or the user), up to max health.
    Heal { amount: u32 },
    /// Attach a status that ticks after every action.
    ApplyStatus {
        status: StatusKind,
        magnitude: u32,
        turns: u8,
    },
    /// Spends the turn and starts the cooldown, nothing else.
    CooldownOnly,
}

impl AbilityEffect {
    /// Whether the effect is aimed at the user's own side.
    pub fn is_supportive(&self) -> bool {
        match self {
            AbilityEffect::Heal { .. } => true,
            AbilityEffect::ApplyStatus { status, .. } => {
                matches!(status, StatusKind::Regeneration)
            }
            AbilityEffect::Damage { .. } | AbilityEffect::CooldownOnly => false,
        }
    }

    pub fn needs_target(&self) -> bool {
        !matches!(self, AbilityEffect::CooldownOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityData {
    pub name: String,
    pub effect: AbilityEffect,
    /// Turns before the ability can be used again.
    pub cooldown: u8,
}

/// A status currently attached to a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStatus {
    pub kind: StatusKind,
    pub magnitude: u32,
    pub turns_remaining: u8,
}

/// Result of one status tick during the post-action hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTick {
    pub kind: StatusKind,
    pub amount: u32,
    pub health_after: u32,
    pub expired: bool,
}

/// What an ability use produced, as reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityResultKind {
    Damage { dealt: u32, eliminated: bool },
    Heal { restored: u32 },
    Status { status: StatusKind, turns: u8 },
    CooldownOnly,
    NoAbility,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityOutcome {
    pub ability: Option<String>,
    pub kind: AbilityResultKind,
    pub description: String,
    pub cooldown: u8,
}

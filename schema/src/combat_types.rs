use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// The three attack strengths a combatant can choose from.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum AttackKind {
    #[strum(to_string = "basic", serialize = "basico", serialize = "básico")]
    Basic,
    #[strum(to_string = "special", serialize = "especial")]
    Special,
    #[strum(to_string = "critical", serialize = "critico", serialize = "crítico")]
    Critical,
}

impl AttackKind {
    /// Parses a caller-supplied label. Unrecognised labels fall back to a basic hit.
    pub fn from_label(label: &str) -> AttackKind {
        AttackKind::from_str(label.trim()).unwrap_or(AttackKind::Basic)
    }
}

/// Which resource bar an activation spends.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum SuperKind {
    #[strum(to_string = "super attack")]
    Attack,
    #[strum(to_string = "super defense")]
    Defense,
}

/// Lingering effects an ability can leave on a combatant.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum StatusKind {
    #[strum(to_string = "poison")]
    Poison,
    #[strum(to_string = "regeneration")]
    Regeneration,
}

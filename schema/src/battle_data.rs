use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

/// One of the two sides of a battle.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Side {
    #[strum(serialize = "hero", serialize = "heroes", serialize = "heroe")]
    Hero,
    #[strum(serialize = "villain", serialize = "villains", serialize = "villano", serialize = "villanos")]
    Villain,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Hero => Side::Villain,
            Side::Villain => Side::Hero,
        }
    }

    /// Single-letter prefix used by combatant ids (`H1`, `V3`).
    pub fn prefix(self) -> char {
        match self {
            Side::Hero => 'H',
            Side::Villain => 'V',
        }
    }

    pub fn from_prefix(prefix: char) -> Option<Side> {
        match prefix.to_ascii_uppercase() {
            'H' => Some(Side::Hero),
            'V' => Some(Side::Villain),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_name = match self {
            Side::Hero => "Heroes",
            Side::Villain => "Villains",
        };
        write!(f, "{}", display_name)
    }
}

/// Lifecycle of a battle. Transitions only move forward.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BattlePhase {
    Starting,
    InProgress,
    Finished,
}

impl BattlePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, BattlePhase::Finished)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Winner {
    Hero,
    Villain,
    Draw,
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::Hero => Winner::Hero,
            Side::Villain => Winner::Villain,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Hero => write!(f, "{}", Side::Hero),
            Winner::Villain => write!(f, "{}", Side::Villain),
            Winner::Draw => write!(f, "Draw"),
        }
    }
}

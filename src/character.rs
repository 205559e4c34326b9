//! Character roster data and the lookup collaborator the engine builds squads from.

use crate::ability::AbilityData;
use crate::ids::RosterId;
use schema::Side;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

const BUILTIN_ROSTER: &str = include_str!("../data/roster.ron");

/// A character as stored in the roster, before it enters a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: RosterId,
    pub name: String,
    pub alias: String,
    #[serde(default)]
    pub city: String,
    pub team: String,
    #[serde(default)]
    pub ability: Option<AbilityData>,
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("failed to read roster file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse roster: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Looks characters up by roster id. Hero and villain rosters are independent.
pub trait CharacterLookup: Send + Sync {
    fn get_by_id(&self, side: Side, id: RosterId) -> Option<Character>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RosterFile {
    #[serde(default)]
    heroes: Vec<Character>,
    #[serde(default)]
    villains: Vec<Character>,
}

/// In-memory roster backed by a RON file.
#[derive(Debug, Clone, Default)]
pub struct RosterCatalog {
    heroes: BTreeMap<RosterId, Character>,
    villains: BTreeMap<RosterId, Character>,
}

impl RosterCatalog {
    /// The roster shipped with the crate.
    pub fn builtin() -> Result<Self, ron::error::SpannedError> {
        Self::from_ron_str(BUILTIN_ROSTER)
    }

    pub fn from_ron_str(content: &str) -> Result<Self, ron::error::SpannedError> {
        let file: RosterFile = ron::from_str(content)?;
        Ok(Self::from_characters(file.heroes, file.villains))
    }

    /// Load a roster from disk.
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_ron_str(&content)?)
    }

    /// Reads the file named by `HERO_ARENA_ROSTER`, or the embedded roster when unset.
    pub fn from_env() -> Result<Self, RosterError> {
        match std::env::var_os("HERO_ARENA_ROSTER") {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::builtin()?),
        }
    }

    pub fn from_characters(heroes: Vec<Character>, villains: Vec<Character>) -> Self {
        Self {
            heroes: heroes.into_iter().map(|c| (c.id, c)).collect(),
            villains: villains.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// All characters on one side, ordered by id.
    pub fn characters(&self, side: Side) -> impl Iterator<Item = &Character> {
        self.side_map(side).values()
    }

    pub fn len(&self, side: Side) -> usize {
        self.side_map(side).len()
    }

    fn side_map(&self, side: Side) -> &BTreeMap<RosterId, Character> {
        match side {
            Side::Hero => &self.heroes,
            Side::Villain => &self.villains,
        }
    }
}

impl CharacterLookup for RosterCatalog {
    fn get_by_id(&self, side: Side, id: RosterId) -> Option<Character> {
        self.side_map(side).get(&id).cloned()
    }
}

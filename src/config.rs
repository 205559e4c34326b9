//! Engine tuning loaded from RON, with the canonical rules as defaults.

use schema::AttackKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Base damage per attack kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTable {
    pub basic: u32,
    pub special: u32,
    pub critical: u32,
}

impl Default for DamageTable {
    fn default() -> Self {
        Self {
            basic: 5,
            special: 30,
            critical: 45,
        }
    }
}

impl DamageTable {
    pub fn base_damage(&self, kind: AttackKind) -> u32 {
        match kind {
            AttackKind::Basic => self.basic,
            AttackKind::Special => self.special,
            AttackKind::Critical => self.critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_health: u32,
    pub max_rounds: u32,
    pub roster_size: usize,
    pub damage: DamageTable,
    pub super_attack_multiplier: u32,
    pub simulation_turn_cap: u32,
    pub hero_team_name: String,
    pub villain_team_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_health: 200,
            max_rounds: 3,
            roster_size: 3,
            damage: DamageTable::default(),
            super_attack_multiplier: 2,
            simulation_turn_cap: 50,
            hero_team_name: "Hero Team".to_string(),
            villain_team_name: "Villain Team".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Reads the file named by `HERO_ARENA_CONFIG`, or the defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os("HERO_ARENA_CONFIG") {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_health == 0 {
            return Err(ConfigError::Invalid("initial_health must be positive".into()));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::Invalid("max_rounds must be positive".into()));
        }
        if self.roster_size == 0 {
            return Err(ConfigError::Invalid("roster_size must be positive".into()));
        }
        if self.super_attack_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "super_attack_multiplier must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(AttackKind::Basic, 5)]
    #[case(AttackKind::Special, 30)]
    #[case(AttackKind::Critical, 45)]
    fn test_default_damage_table(#[case] kind: AttackKind, #[case] expected: u32) {
        assert_eq!(DamageTable::default().base_damage(kind), expected);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_ron_str("(max_rounds: 5, damage: (critical: 60))")
            .expect("partial config should parse");
        assert_eq!(config.max_rounds, 5);
        assert_eq!(config.damage.critical, 60);
        assert_eq!(config.damage.basic, 5);
        assert_eq!(config.initial_health, 200);
        assert_eq!(config.simulation_turn_cap, 50);
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let err = EngineConfig::from_ron_str("(max_rounds: 0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = EngineConfig::from_ron_str("(max_rounds: \"three\")").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}

use crate::ability::{AbilityData, AbilityEffect};
use crate::battle::state::BattleSession;
use crate::character::Character;
use crate::config::EngineConfig;
use crate::errors::BattleResult;
use crate::ids::{BattleId, RosterId, UserId};
use crate::squad::Squad;
use rand::SeedableRng;
use rand::rngs::StdRng;
use schema::{Side, StatusKind};

/// A builder for test characters with sensible defaults.
///
/// # Example
/// ```
/// let medic = TestCharacterBuilder::new(3, "Medic")
///     .with_ability("Patch Up", AbilityEffect::Heal { amount: 30 }, 3)
///     .build();
/// ```
pub struct TestCharacterBuilder {
    id: RosterId,
    alias: String,
    team: String,
    ability: Option<AbilityData>,
}

impl TestCharacterBuilder {
    pub fn new(id: RosterId, alias: &str) -> Self {
        Self {
            id,
            alias: alias.to_string(),
            team: "Test Team".to_string(),
            ability: None,
        }
    }

    pub fn with_ability(mut self, name: &str, effect: AbilityEffect, cooldown: u8) -> Self {
        self.ability = Some(AbilityData {
            name: name.to_string(),
            effect,
            cooldown,
        });
        self
    }

    pub fn build(self) -> Character {
        Character {
            id: self.id,
            name: format!("{} (real name)", self.alias),
            alias: self.alias,
            city: "Test City".to_string(),
            team: self.team,
            ability: self.ability,
        }
    }
}

/// Three plain characters with ids 1..=3.
pub fn plain_roster(prefix: &str) -> Vec<Character> {
    (1..=3)
        .map(|id| TestCharacterBuilder::new(id, &format!("{} {}", prefix, id)).build())
        .collect()
}

pub fn test_owner() -> UserId {
    UserId::from("tester")
}

/// A 3v3 session in the `Starting` phase with default rules.
pub fn create_test_session(heroes: Vec<Character>, villains: Vec<Character>, initiator: Side) -> BattleSession {
    create_test_session_with_config(heroes, villains, initiator, &EngineConfig::default())
}

pub fn create_test_session_with_config(
    heroes: Vec<Character>,
    villains: Vec<Character>,
    initiator: Side,
    config: &EngineConfig,
) -> BattleSession {
    let hero_squad = Squad::new(Side::Hero, config.hero_team_name.clone(), heroes, config.initial_health);
    let villain_squad = Squad::new(
        Side::Villain,
        config.villain_team_name.clone(),
        villains,
        config.initial_health,
    );
    BattleSession::new(
        BattleId::from("test_battle"),
        test_owner(),
        hero_squad,
        villain_squad,
        initiator,
        config,
    )
}

/// A plain 3v3 session that has already been started.
pub fn started_session(initiator: Side) -> BattleSession {
    let mut session = create_test_session(plain_roster("Hero"), plain_roster("Villain"), initiator);
    assert_ok(session.start());
    session
}

/// Heroes whose first member carries the given ability.
pub fn heroes_with_ability(name: &str, effect: AbilityEffect, cooldown: u8) -> Vec<Character> {
    let mut roster = plain_roster("Hero");
    roster[0] = TestCharacterBuilder::new(1, "Hero 1")
        .with_ability(name, effect, cooldown)
        .build();
    roster
}

pub fn poison_effect(magnitude: u32, turns: u8) -> AbilityEffect {
    AbilityEffect::ApplyStatus {
        status: StatusKind::Poison,
        magnitude,
        turns,
    }
}

/// Seeded generator so simulated battles replay identically.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}

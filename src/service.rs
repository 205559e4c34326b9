//! The engine's own boundary: every exposed operation, with the ownership
//! gate, request parsing and the archive hand-off for finished battles.

use crate::ability::AbilityOutcome;
use crate::battle::engine::{ActivationOutcome, AttackOutcome};
use crate::battle::simulation::simulate_to_completion;
use crate::battle::state::BattleSession;
use crate::battle::view::{BattleDetails, BattleOverview, BattleSummary};
use crate::character::{Character, CharacterLookup};
use crate::config::EngineConfig;
use crate::errors::{BattleError, BattleResult, ValidationError};
use crate::ids::{BattleId, CombatantId, RosterId, UserId};
use crate::persistence::{BattleArchive, BattleStatistics};
use crate::registry::BattleRegistry;
use crate::squad::Squad;
use rand::Rng;
use schema::{AttackKind, Side, SuperKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything needed to set up a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSetup {
    pub hero_ids: Vec<RosterId>,
    pub villain_ids: Vec<RosterId>,
    pub initiator: Side,
    #[serde(default)]
    pub starting_hero: Option<RosterId>,
    #[serde(default)]
    pub starting_villain: Option<RosterId>,
}

impl BattleSetup {
    pub fn new(hero_ids: Vec<RosterId>, villain_ids: Vec<RosterId>, initiator: Side) -> Self {
        Self {
            hero_ids,
            villain_ids,
            initiator,
            starting_hero: None,
            starting_villain: None,
        }
    }

    pub fn with_starting(mut self, hero: Option<RosterId>, villain: Option<RosterId>) -> Self {
        self.starting_hero = hero;
        self.starting_villain = villain;
        self
    }
}

/// What an action did, the log lines it produced, and the battle afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport<T> {
    pub outcome: T,
    pub narration: Vec<String>,
    pub state: BattleSummary,
}

pub struct BattleService {
    registry: Arc<BattleRegistry>,
    characters: Arc<dyn CharacterLookup>,
    archive: Arc<dyn BattleArchive>,
    config: EngineConfig,
}

impl BattleService {
    pub fn new(
        characters: Arc<dyn CharacterLookup>,
        archive: Arc<dyn BattleArchive>,
        config: EngineConfig,
    ) -> Self {
        Self::with_registry(Arc::new(BattleRegistry::new()), characters, archive, config)
    }

    pub fn with_registry(
        registry: Arc<BattleRegistry>,
        characters: Arc<dyn CharacterLookup>,
        archive: Arc<dyn BattleArchive>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            characters,
            archive,
            config,
        }
    }

    pub fn registry(&self) -> &BattleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the setup and register a new battle in the `Starting` phase.
    pub fn create_battle(&self, setup: &BattleSetup, owner: &UserId) -> BattleResult<BattleSummary> {
        let session = self.build_session(setup, owner)?;
        let summary = session.summary();
        self.registry.insert(session);
        info!(battle_id = %summary.id, owner = %owner, initiator = ?setup.initiator, "battle created");
        Ok(summary)
    }

    fn build_session(&self, setup: &BattleSetup, owner: &UserId) -> BattleResult<BattleSession> {
        if owner.is_blank() {
            return Err(ValidationError::MissingOwner.into());
        }
        let heroes = self.resolve_roster(Side::Hero, &setup.hero_ids, setup.starting_hero)?;
        let villains = self.resolve_roster(Side::Villain, &setup.villain_ids, setup.starting_villain)?;

        let config = &self.config;
        let hero_squad = Squad::new(Side::Hero, config.hero_team_name.clone(), heroes, config.initial_health);
        let villain_squad = Squad::new(
            Side::Villain,
            config.villain_team_name.clone(),
            villains,
            config.initial_health,
        );
        Ok(BattleSession::new(
            BattleId::generate(),
            owner.clone(),
            hero_squad,
            villain_squad,
            setup.initiator,
            config,
        )
        .with_starting_combatants(setup.starting_hero, setup.starting_villain))
    }

    fn resolve_roster(
        &self,
        side: Side,
        ids: &[RosterId],
        starting: Option<RosterId>,
    ) -> BattleResult<Vec<Character>> {
        if ids.len() != self.config.roster_size {
            return Err(ValidationError::RosterSize {
                side,
                expected: self.config.roster_size,
                actual: ids.len(),
            }
            .into());
        }
        if let Some(id) = first_duplicate(ids) {
            return Err(ValidationError::DuplicateCharacter { side, id }.into());
        }
        if let Some(id) = starting {
            if !ids.contains(&id) {
                return Err(ValidationError::StartingCharacterNotInRoster { side, id }.into());
            }
        }
        ids.iter()
            .map(|&id| {
                self.characters
                    .get_by_id(side, id)
                    .ok_or_else(|| ValidationError::UnknownCharacter { side, id }.into())
            })
            .collect()
    }

    /// Run `f` with exclusive access to a battle the user owns, then settle
    /// the battle if `f` finished it.
    fn mutate<T>(
        &self,
        id: &BattleId,
        owner: &UserId,
        f: impl FnOnce(&mut BattleSession) -> BattleResult<T>,
    ) -> BattleResult<(T, Vec<String>, BattleSummary)> {
        let (value, narration, summary) = self.registry.write(id, |session| {
            ensure_owner(session, owner)?;
            let mark = session.log().len();
            let value = f(session)?;
            let narration = session.format_entries(session.log().since(mark));
            Ok((value, narration, session.summary()))
        })?;
        if summary.phase.is_finished() {
            self.settle(&summary);
        }
        Ok((value, narration, summary))
    }

    fn inspect<T>(
        &self,
        id: &BattleId,
        owner: &UserId,
        f: impl FnOnce(&BattleSession) -> T,
    ) -> BattleResult<T> {
        self.registry.read(id, |session| {
            ensure_owner(session, owner)?;
            Ok(f(session))
        })?
    }

    /// Evict a finished battle and archive it. Only the caller that removed
    /// the battle saves it, so a record is archived once. A failed save puts
    /// the battle back for [`Self::flush_finished`].
    fn settle(&self, summary: &BattleSummary) -> bool {
        let Some(shared) = self.registry.remove(&summary.id) else {
            return false;
        };
        match self.archive.save(summary) {
            Ok(()) => {
                info!(battle_id = %summary.id, winner = ?summary.winner, "battle archived");
                true
            }
            Err(err) => {
                warn!(battle_id = %summary.id, error = %err, "archiving failed, battle kept in registry");
                self.registry.restore(summary.id.clone(), shared);
                false
            }
        }
    }

    pub fn start(&self, id: &BattleId, owner: &UserId) -> BattleResult<ActionReport<()>> {
        let (outcome, narration, state) = self.mutate(id, owner, BattleSession::start)?;
        Ok(ActionReport {
            outcome,
            narration,
            state,
        })
    }

    /// Attack, then run the end-of-action flow. Unknown attack labels fall
    /// back to a basic attack.
    pub fn attack(
        &self,
        id: &BattleId,
        owner: &UserId,
        attacker: &str,
        target: &str,
        kind: &str,
    ) -> BattleResult<ActionReport<AttackOutcome>> {
        let attacker: CombatantId = attacker.parse()?;
        let target: CombatantId = target.parse()?;
        let kind = AttackKind::from_label(kind);
        let (outcome, narration, state) =
            self.mutate(id, owner, |session| session.perform_attack(&attacker, &target, kind))?;
        Ok(ActionReport {
            outcome,
            narration,
            state,
        })
    }

    pub fn activate_super_attack(
        &self,
        id: &BattleId,
        owner: &UserId,
        combatant: &str,
    ) -> BattleResult<ActivationOutcome> {
        self.activate_super(id, owner, combatant, SuperKind::Attack)
    }

    pub fn activate_super_defense(
        &self,
        id: &BattleId,
        owner: &UserId,
        combatant: &str,
    ) -> BattleResult<ActivationOutcome> {
        self.activate_super(id, owner, combatant, SuperKind::Defense)
    }

    fn activate_super(
        &self,
        id: &BattleId,
        owner: &UserId,
        combatant: &str,
        kind: SuperKind,
    ) -> BattleResult<ActivationOutcome> {
        let combatant: CombatantId = combatant.parse()?;
        let (outcome, _, _) = self.mutate(id, owner, |session| session.activate_super(kind, &combatant))?;
        Ok(outcome)
    }

    pub fn use_ability(
        &self,
        id: &BattleId,
        owner: &UserId,
        combatant: &str,
        target: Option<&str>,
    ) -> BattleResult<ActionReport<AbilityOutcome>> {
        let combatant: CombatantId = combatant.parse()?;
        let target: Option<CombatantId> = target
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| raw.parse::<CombatantId>())
            .transpose()?;
        let (outcome, narration, state) =
            self.mutate(id, owner, |session| session.use_ability(&combatant, target.as_ref()))?;
        Ok(ActionReport {
            outcome,
            narration,
            state,
        })
    }

    pub fn get_state(&self, id: &BattleId, owner: &UserId) -> BattleResult<BattleSummary> {
        self.inspect(id, owner, BattleSession::summary)
    }

    pub fn get_detailed_info(&self, id: &BattleId, owner: &UserId) -> BattleResult<BattleDetails> {
        self.inspect(id, owner, BattleSession::details)
    }

    /// Battles still in the registry, oldest first.
    pub fn list_active(&self, owner: Option<&UserId>) -> Vec<BattleOverview> {
        self.registry
            .map_all(|session| {
                owner
                    .map_or(true, |owner| session.owner() == owner)
                    .then(|| session.overview())
            })
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn get_history(&self, owner: Option<&UserId>) -> BattleResult<Vec<BattleSummary>> {
        Ok(self.archive.history(owner)?)
    }

    pub fn get_statistics(&self) -> BattleResult<BattleStatistics> {
        Ok(self.archive.aggregate_statistics()?)
    }

    /// Create, start and auto-play a battle to the end.
    pub fn simulate_full(&self, setup: &BattleSetup, owner: &UserId) -> BattleResult<BattleSummary> {
        self.simulate_full_with_rng(setup, owner, &mut rand::rng())
    }

    pub fn simulate_full_with_rng<R: Rng>(
        &self,
        setup: &BattleSetup,
        owner: &UserId,
        rng: &mut R,
    ) -> BattleResult<BattleSummary> {
        let summary = self.create_battle(setup, owner)?;
        let cap = self.config.simulation_turn_cap;
        let (steps, _, state) = self.mutate(&summary.id, owner, |session| {
            simulate_to_completion(session, cap, rng)
        })?;
        info!(battle_id = %state.id, steps, winner = ?state.winner, "simulation complete");
        Ok(state)
    }

    /// Retry the archive hand-off for finished battles still registered.
    /// Returns how many were archived.
    pub fn flush_finished(&self) -> usize {
        self.registry
            .finished_ids()
            .into_iter()
            .filter_map(|id| self.registry.read(&id, BattleSession::summary).ok())
            .filter(|summary| self.settle(summary))
            .count()
    }
}

/// Combatant ids are derived from roster ids, so a roster may list each
/// character once.
fn first_duplicate(ids: &[RosterId]) -> Option<RosterId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().find(|id| !seen.insert(*id))
}

fn ensure_owner(session: &BattleSession, owner: &UserId) -> BattleResult<()> {
    if session.owner() != owner {
        return Err(BattleError::Forbidden {
            battle: session.id().clone(),
        });
    }
    Ok(())
}

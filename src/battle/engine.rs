//! The battle state machine: every transition a [`BattleSession`] can make.

use crate::ability::{AbilityData, AbilityEffect, AbilityOutcome, AbilityResultKind, StatusTick};
use crate::battle::state::{BattleEvent, BattleSession};
use crate::combatant::Combatant;
use crate::errors::{BattleError, BattleResult, RuleViolation, ValidationError};
use crate::ids::CombatantId;
use crate::squad::Squad;
use chrono::Utc;
use schema::{AttackKind, BattlePhase, Side, SuperKind, Winner};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, info};

/// What a single attack did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub damage_dealt: u32,
    pub remaining_health: u32,
    pub eliminated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationOutcome {
    pub combatant: CombatantId,
    pub kind: SuperKind,
    pub message: String,
}

/// Winner rules, in priority order: a wiped side loses (both wiped is a
/// draw), otherwise the side with more summed health across its whole roster
/// wins and equal totals draw.
pub fn determine_winner(heroes: &Squad, villains: &Squad) -> Winner {
    match (heroes.has_living_members(), villains.has_living_members()) {
        (false, false) => Winner::Draw,
        (false, true) => Winner::Villain,
        (true, false) => Winner::Hero,
        (true, true) => match heroes.total_health().cmp(&villains.total_health()) {
            Ordering::Greater => Winner::Hero,
            Ordering::Less => Winner::Villain,
            Ordering::Equal => Winner::Draw,
        },
    }
}

impl BattleSession {
    /// Starting -> InProgress.
    pub fn start(&mut self) -> BattleResult<()> {
        if self.phase != BattlePhase::Starting {
            return Err(BattleError::IllegalState {
                operation: "start the battle",
                phase: self.phase,
            });
        }
        self.phase = BattlePhase::InProgress;
        self.record(BattleEvent::BattleStarted {
            initiator: self.initiator,
        });
        info!(battle_id = %self.id, initiator = ?self.initiator, "battle started");
        Ok(())
    }

    fn ensure_in_progress(&self, operation: &'static str) -> BattleResult<()> {
        if self.phase != BattlePhase::InProgress {
            return Err(BattleError::IllegalState {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn find(&self, id: &CombatantId) -> BattleResult<&Combatant> {
        self.combatant(id).ok_or(BattleError::CombatantNotFound(*id))
    }

    /// Checks that `actor` may take an action right now.
    fn ensure_can_act(&self, actor: &CombatantId) -> BattleResult<()> {
        let combatant = self.find(actor)?;
        if !combatant.is_alive() {
            return Err(RuleViolation::ActorEliminated(*actor).into());
        }
        if !combatant.is_active() {
            return Err(RuleViolation::ActorInactive(*actor).into());
        }
        if combatant.side != self.turn {
            return Err(RuleViolation::WrongTurn {
                side: combatant.side,
                turn: self.turn,
            }
            .into());
        }
        Ok(())
    }

    /// Resolve one attack. Does not pass the turn; see [`Self::perform_attack`].
    ///
    /// Every check runs before anything is mutated, so a rejected attack
    /// leaves the session untouched.
    pub fn attack(
        &mut self,
        attacker_id: &CombatantId,
        target_id: &CombatantId,
        kind: AttackKind,
    ) -> BattleResult<AttackOutcome> {
        self.ensure_in_progress("attack")?;
        let attacker = self.find(attacker_id)?;
        let target = self.find(target_id)?;

        if attacker_id == target_id {
            return Err(RuleViolation::SelfTarget.into());
        }
        if attacker.side == target.side {
            return Err(RuleViolation::SameSide {
                attacker: *attacker_id,
                target: *target_id,
                side: attacker.side,
            }
            .into());
        }
        if !target.is_alive() {
            return Err(RuleViolation::TargetEliminated(*target_id).into());
        }
        self.ensure_can_act(attacker_id)?;

        let base_damage = self.damage.base_damage(kind);
        let multiplier = self.super_attack_multiplier;
        let attacker = self
            .combatant_mut(attacker_id)
            .ok_or(BattleError::CombatantNotFound(*attacker_id))?;
        let super_attack = attacker.take_super_attack();
        let damage = if super_attack {
            base_damage.saturating_mul(multiplier)
        } else {
            base_damage
        };
        let attacker_power_bar = attacker.power_bar();

        let target = self
            .combatant_mut(target_id)
            .ok_or(BattleError::CombatantNotFound(*target_id))?;
        let health_before = target.health();
        let health_after = target.receive_damage(damage);
        let eliminated = !target.is_alive();
        let target_defense_bar = target.defense_bar();

        debug!(
            battle_id = %self.id,
            attacker = %attacker_id,
            target = %target_id,
            ?kind,
            damage,
            health_before,
            health_after,
            "attack resolved"
        );
        self.record(BattleEvent::Attack {
            attacker: *attacker_id,
            target: *target_id,
            kind,
            damage,
            super_attack,
            health_before,
            health_after,
            target_eliminated: eliminated,
            attacker_power_bar,
            target_defense_bar,
        });

        if eliminated {
            self.register_elimination(*target_id);
            if !self.squad(target_id.side()).has_living_members() {
                debug!(battle_id = %self.id, side = ?target_id.side(), "side wiped out");
                self.end_battle();
            } else if self.round > self.max_rounds {
                debug!(battle_id = %self.id, round = self.round, "round limit reached");
                self.end_battle();
            }
        }

        Ok(AttackOutcome {
            damage_dealt: damage,
            remaining_health: health_after,
            eliminated,
        })
    }

    /// Attack, then run the end-of-action flow: status ticks, cooldown decay,
    /// win check and turn change.
    pub fn perform_attack(
        &mut self,
        attacker_id: &CombatantId,
        target_id: &CombatantId,
        kind: AttackKind,
    ) -> BattleResult<AttackOutcome> {
        let outcome = self.attack(attacker_id, target_id, kind)?;
        self.finish_action()?;
        Ok(outcome)
    }

    /// Each elimination advances the round by exactly one.
    fn register_elimination(&mut self, eliminated: CombatantId) {
        self.record(BattleEvent::Eliminated {
            combatant: eliminated,
        });
        self.round += 1;
        debug!(battle_id = %self.id, round = self.round, %eliminated, "round advanced by elimination");
        self.record(BattleEvent::RoundAdvanced {
            round: self.round,
            eliminated,
        });
    }

    /// Hand the turn to the other side and move its pointer to the next
    /// active member. Ends the battle when that side cannot act. Returns the
    /// combatant now up, if the battle goes on.
    pub fn change_turn(&mut self) -> BattleResult<Option<CombatantId>> {
        self.ensure_in_progress("change turn")?;
        self.turn = self.turn.opponent();

        if !self.squad(self.turn).has_living_members() {
            debug!(battle_id = %self.id, side = ?self.turn, "side to move has no living members");
            self.end_battle();
            return Ok(None);
        }

        let side = self.turn;
        let next = self
            .squad_mut(side)
            .advance_to_next()
            .map(|c| c.unique_id);
        match next {
            Some(combatant) => {
                self.record(BattleEvent::TurnChanged { side, combatant });
                debug!(battle_id = %self.id, ?side, %combatant, "turn changed");
                Ok(Some(combatant))
            }
            None => {
                self.end_battle();
                Ok(None)
            }
        }
    }

    /// Spend a full bar to arm a one-shot super attack or super defense.
    pub fn activate_super(
        &mut self,
        kind: SuperKind,
        combatant_id: &CombatantId,
    ) -> BattleResult<ActivationOutcome> {
        self.ensure_in_progress("activate a super bar")?;
        let combatant = self
            .combatant_mut(combatant_id)
            .ok_or(BattleError::CombatantNotFound(*combatant_id))?;
        let level = combatant.bar(kind);
        if !combatant.activate_super(kind) {
            return Err(BattleError::ResourceNotReady {
                combatant: *combatant_id,
                kind,
                level,
            });
        }
        let message = format!("{} activated for {}", kind, combatant.alias);
        self.record(BattleEvent::SuperActivated {
            combatant: *combatant_id,
            kind,
        });
        debug!(battle_id = %self.id, combatant = %combatant_id, ?kind, "super bar spent");
        Ok(ActivationOutcome {
            combatant: *combatant_id,
            kind,
            message,
        })
    }

    /// Use the acting combatant's special ability, then run the end-of-action
    /// flow. A combatant without ability data spends the turn doing nothing.
    pub fn use_ability(
        &mut self,
        user_id: &CombatantId,
        target_id: Option<&CombatantId>,
    ) -> BattleResult<AbilityOutcome> {
        self.ensure_in_progress("use an ability")?;
        self.ensure_can_act(user_id)?;
        if let Some(target_id) = target_id {
            self.find(target_id)?;
        }

        let user = self.find(user_id)?;
        let remaining = user.ability_cooldown();
        if remaining > 0 {
            return Err(RuleViolation::AbilityOnCooldown {
                combatant: *user_id,
                remaining,
            }
            .into());
        }
        let alias = user.alias.clone();
        let ability = user.ability().cloned();

        let (outcome, resolved_target) = match ability {
            None => (
                AbilityOutcome {
                    ability: None,
                    kind: AbilityResultKind::NoAbility,
                    description: format!("{} has no special ability to use", alias),
                    cooldown: 0,
                },
                None,
            ),
            Some(ability) => self.resolve_ability(user_id, &ability, target_id.copied())?,
        };

        self.record(BattleEvent::AbilityUsed {
            user: *user_id,
            ability: outcome.ability.clone(),
            target: resolved_target,
            description: outcome.description.clone(),
            cooldown: outcome.cooldown,
        });
        if let AbilityResultKind::Damage { eliminated: true, .. } = outcome.kind {
            if let Some(target) = resolved_target {
                self.register_elimination(target);
            }
        }

        self.finish_action()?;
        Ok(outcome)
    }

    /// Validate the target for an ability, then apply its effect.
    fn resolve_ability(
        &mut self,
        user_id: &CombatantId,
        ability: &AbilityData,
        target_id: Option<CombatantId>,
    ) -> BattleResult<(AbilityOutcome, Option<CombatantId>)> {
        let supportive = ability.effect.is_supportive();
        let target_id = match (target_id, supportive) {
            (Some(id), _) => Some(id),
            (None, true) => Some(*user_id),
            (None, false) if ability.effect.needs_target() => {
                return Err(ValidationError::MissingTarget {
                    ability: ability.name.clone(),
                }
                .into());
            }
            (None, false) => None,
        };

        if let Some(target_id) = target_id {
            let target = self.find(&target_id)?;
            if !target.is_alive() {
                return Err(RuleViolation::TargetEliminated(target_id).into());
            }
            let same_side = target_id.side() == user_id.side();
            if supportive && !same_side {
                return Err(RuleViolation::OpposingSupportTarget(target_id).into());
            }
            if !supportive && ability.effect.needs_target() && same_side {
                if target_id == *user_id {
                    return Err(RuleViolation::SelfTarget.into());
                }
                return Err(RuleViolation::SameSide {
                    attacker: *user_id,
                    target: target_id,
                    side: user_id.side(),
                }
                .into());
            }
        }

        let user_alias = self.display_name(user_id);
        let target_alias = target_id.map(|id| self.display_name(&id));
        let (kind, description) = match (&ability.effect, target_id) {
            (AbilityEffect::Damage { amount }, Some(target)) => {
                let combatant = self
                    .combatant_mut(&target)
                    .ok_or(BattleError::CombatantNotFound(target))?;
                let health_before = combatant.health();
                let remaining = combatant.receive_damage(*amount);
                let dealt = health_before - remaining;
                let eliminated = !combatant.is_alive();
                (
                    AbilityResultKind::Damage { dealt, eliminated },
                    format!(
                        "{} uses {} on {} for {} damage! ({} HP left)",
                        user_alias,
                        ability.name,
                        target_alias.unwrap_or_default(),
                        dealt,
                        remaining
                    ),
                )
            }
            (AbilityEffect::Heal { amount }, Some(target)) => {
                let combatant = self
                    .combatant_mut(&target)
                    .ok_or(BattleError::CombatantNotFound(target))?;
                let restored = combatant.heal(*amount);
                (
                    AbilityResultKind::Heal { restored },
                    format!(
                        "{} uses {} and restores {} HP to {}!",
                        user_alias,
                        ability.name,
                        restored,
                        target_alias.unwrap_or_default()
                    ),
                )
            }
            (AbilityEffect::ApplyStatus { status, magnitude, turns }, Some(target)) => {
                let combatant = self
                    .combatant_mut(&target)
                    .ok_or(BattleError::CombatantNotFound(target))?;
                combatant.add_status(*status, *magnitude, *turns);
                (
                    AbilityResultKind::Status {
                        status: *status,
                        turns: *turns,
                    },
                    format!(
                        "{} uses {}! {} is affected by {} for {} turns.",
                        user_alias,
                        ability.name,
                        target_alias.unwrap_or_default(),
                        status,
                        turns
                    ),
                )
            }
            _ => (
                AbilityResultKind::CooldownOnly,
                format!("{} uses {}!", user_alias, ability.name),
            ),
        };

        let user = self
            .combatant_mut(user_id)
            .ok_or(BattleError::CombatantNotFound(*user_id))?;
        user.start_ability_cooldown();
        debug!(battle_id = %self.id, user = %user_id, ability = %ability.name, "ability resolved");

        Ok((
            AbilityOutcome {
                ability: Some(ability.name.clone()),
                kind,
                description,
                cooldown: ability.cooldown,
            },
            target_id,
        ))
    }

    /// Post-action hook: status ticks then cooldown decay for every living
    /// combatant, heroes first.
    pub fn apply_post_action_effects(&mut self) {
        let mut ticks: Vec<(CombatantId, StatusTick)> = Vec::new();
        let mut knocked_out: Vec<CombatantId> = Vec::new();

        for side in [Side::Hero, Side::Villain] {
            for combatant in self.squad_mut(side).members_mut() {
                if !combatant.is_alive() {
                    continue;
                }
                let id = combatant.unique_id;
                ticks.extend(combatant.apply_turn_effects().into_iter().map(|t| (id, t)));
                if combatant.is_alive() {
                    combatant.tick_cooldown();
                } else {
                    knocked_out.push(id);
                }
            }
        }

        for (combatant, tick) in ticks {
            self.record(BattleEvent::StatusTicked {
                combatant,
                status: tick.kind,
                amount: tick.amount,
                health_after: tick.health_after,
            });
            if tick.expired {
                self.record(BattleEvent::StatusExpired {
                    combatant,
                    status: tick.kind,
                });
            }
        }
        for combatant in knocked_out {
            debug!(battle_id = %self.id, %combatant, "eliminated by poison");
            self.register_elimination(combatant);
        }
    }

    /// A battle in progress must end once a side is wiped out or the round
    /// counter has passed the limit.
    pub fn should_end(&self) -> bool {
        !self.heroes.has_living_members()
            || !self.villains.has_living_members()
            || self.round > self.max_rounds
    }

    /// Everything that follows a successful attack or ability.
    fn finish_action(&mut self) -> BattleResult<()> {
        if self.phase != BattlePhase::InProgress {
            return Ok(());
        }
        self.apply_post_action_effects();
        if self.should_end() {
            self.end_battle();
            return Ok(());
        }
        self.change_turn()?;
        Ok(())
    }

    /// InProgress -> Finished. Fires once; later calls return the settled
    /// winner. A battle that never started cannot be finished.
    pub fn end_battle(&mut self) -> Option<Winner> {
        match self.phase {
            BattlePhase::Finished => return self.winner,
            BattlePhase::Starting => return None,
            BattlePhase::InProgress => {}
        }

        let winner = determine_winner(&self.heroes, &self.villains);
        let hero_health = self.heroes.total_health();
        let villain_health = self.villains.total_health();
        self.phase = BattlePhase::Finished;
        self.winner = Some(winner);
        self.finished_at = Some(Utc::now());
        self.record(BattleEvent::BattleFinished {
            winner,
            hero_health,
            villain_health,
        });
        info!(
            battle_id = %self.id,
            ?winner,
            round = self.round,
            hero_health,
            villain_health,
            "battle finished"
        );
        Some(winner)
    }
}

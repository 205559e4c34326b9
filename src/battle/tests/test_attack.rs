#[cfg(test)]
mod tests {
    use crate::battle::state::BattleEvent;
    use crate::battle::tests::common::{
        assert_ok, create_test_session, create_test_session_with_config, plain_roster, started_session,
    };
    use crate::config::{DamageTable, EngineConfig};
    use crate::errors::{BattleError, RuleViolation};
    use crate::ids::CombatantId;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use schema::{AttackKind, BattlePhase, Side, SuperKind, Winner};

    #[test]
    fn test_critical_hit_on_fresh_villain() {
        // Arrange
        let mut session = started_session(Side::Hero);

        // Act
        let outcome = assert_ok(session.perform_attack(
            &CombatantId::hero(1),
            &CombatantId::villain(1),
            AttackKind::from_label("critico"),
        ));

        // Assert
        assert_eq!(outcome.damage_dealt, 45);
        assert_eq!(outcome.remaining_health, 155);
        assert!(!outcome.eliminated);
        let target = session.combatant(&CombatantId::villain(1)).unwrap();
        assert_eq!(target.health(), 155);
        assert_eq!(target.power_bar(), 45);
        assert_eq!(target.defense_bar(), 45);
        assert_eq!(session.turn(), Side::Villain);
        assert_eq!(session.round(), 1);
    }

    #[rstest]
    #[case(AttackKind::Basic, 195)]
    #[case(AttackKind::Special, 170)]
    #[case(AttackKind::Critical, 155)]
    fn test_base_damage_per_kind(#[case] kind: AttackKind, #[case] expected_health: u32) {
        let mut session = started_session(Side::Hero);
        let outcome = assert_ok(session.attack(&CombatantId::hero(1), &CombatantId::villain(2), kind));
        assert_eq!(outcome.remaining_health, expected_health);
    }

    #[test]
    fn test_attack_alone_does_not_pass_turn() {
        let mut session = started_session(Side::Hero);
        assert_ok(session.attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Basic));
        assert_eq!(session.turn(), Side::Hero);
    }

    #[test]
    fn test_wrong_turn_is_rejected_without_mutation() {
        // Arrange
        let mut session = started_session(Side::Hero);
        assert_ok(session.perform_attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Critical));
        let log_len = session.log().len();

        // Act: heroes try to go again on the villains' turn
        let result = session.perform_attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Basic);

        // Assert
        assert_eq!(
            result,
            Err(BattleError::RuleViolation(RuleViolation::WrongTurn {
                side: Side::Hero,
                turn: Side::Villain,
            }))
        );
        assert_eq!(session.combatant(&CombatantId::villain(1)).unwrap().health(), 155);
        assert_eq!(session.log().len(), log_len);
    }

    #[test]
    fn test_self_and_same_side_attacks_are_rejected() {
        let mut session = started_session(Side::Hero);
        assert_eq!(
            session.attack(&CombatantId::hero(1), &CombatantId::hero(1), AttackKind::Basic),
            Err(BattleError::RuleViolation(RuleViolation::SelfTarget))
        );
        assert!(matches!(
            session.attack(&CombatantId::hero(1), &CombatantId::hero(2), AttackKind::Basic),
            Err(BattleError::RuleViolation(RuleViolation::SameSide { .. }))
        ));
    }

    #[test]
    fn test_unknown_combatant_is_not_found() {
        let mut session = started_session(Side::Hero);
        assert_eq!(
            session.attack(&CombatantId::hero(1), &CombatantId::villain(9), AttackKind::Basic),
            Err(BattleError::CombatantNotFound(CombatantId::villain(9)))
        );
    }

    #[test]
    fn test_eliminated_target_and_attacker_are_rejected() {
        let mut session = started_session(Side::Hero);
        session.combatant_mut_for_test(&CombatantId::villain(1)).set_health(0);
        session.combatant_mut_for_test(&CombatantId::hero(2)).set_health(0);

        assert_eq!(
            session.attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Basic),
            Err(BattleError::RuleViolation(RuleViolation::TargetEliminated(CombatantId::villain(1))))
        );
        assert_eq!(
            session.attack(&CombatantId::hero(2), &CombatantId::villain(2), AttackKind::Basic),
            Err(BattleError::RuleViolation(RuleViolation::ActorEliminated(CombatantId::hero(2))))
        );
    }

    #[test]
    fn test_attack_before_start_is_illegal() {
        let mut session = create_test_session(plain_roster("Hero"), plain_roster("Villain"), Side::Hero);
        let result = session.attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Basic);
        assert_eq!(
            result,
            Err(BattleError::IllegalState {
                operation: "attack",
                phase: BattlePhase::Starting,
            })
        );
    }

    #[test]
    fn test_elimination_advances_round() {
        // Arrange
        let mut session = started_session(Side::Hero);
        session.combatant_mut_for_test(&CombatantId::villain(1)).set_health(5);

        // Act
        let outcome = assert_ok(session.perform_attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Basic));

        // Assert
        assert!(outcome.eliminated);
        assert_eq!(session.round(), 2);
        assert_eq!(session.phase(), BattlePhase::InProgress);
        let events: Vec<&BattleEvent> = session.log().events().collect();
        assert!(events.contains(&&BattleEvent::Eliminated {
            combatant: CombatantId::villain(1)
        }));
        assert!(events.contains(&&BattleEvent::RoundAdvanced {
            round: 2,
            eliminated: CombatantId::villain(1)
        }));
    }

    #[test]
    fn test_passing_round_limit_ends_battle() {
        // Arrange
        let config = EngineConfig {
            max_rounds: 1,
            ..EngineConfig::default()
        };
        let mut session =
            create_test_session_with_config(plain_roster("Hero"), plain_roster("Villain"), Side::Hero, &config);
        assert_ok(session.start());
        session.combatant_mut_for_test(&CombatantId::villain(1)).set_health(5);

        // Act
        assert_ok(session.attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Basic));

        // Assert
        assert_eq!(session.round(), 2);
        assert_eq!(session.phase(), BattlePhase::Finished);
        assert_eq!(session.winner(), Some(Winner::Hero));
    }

    #[test]
    fn test_huge_super_attack_saturates_instead_of_overflowing() {
        // Arrange
        let config = EngineConfig {
            damage: DamageTable {
                critical: u32::MAX,
                ..DamageTable::default()
            },
            ..EngineConfig::default()
        };
        let mut session =
            create_test_session_with_config(plain_roster("Hero"), plain_roster("Villain"), Side::Hero, &config);
        assert_ok(session.start());
        session.combatant_mut_for_test(&CombatantId::hero(1)).set_bars(100, 0);
        assert_ok(session.activate_super(SuperKind::Attack, &CombatantId::hero(1)));

        // Act
        let outcome = assert_ok(session.perform_attack(
            &CombatantId::hero(1),
            &CombatantId::villain(1),
            AttackKind::Critical,
        ));

        // Assert
        assert_eq!(outcome.damage_dealt, u32::MAX);
        assert_eq!(outcome.remaining_health, 0);
        assert!(outcome.eliminated);
        let target = session.combatant(&CombatantId::villain(1)).unwrap();
        assert_eq!(target.power_bar(), 0);
        assert_eq!(target.defense_bar(), 0);
    }

    #[test]
    fn test_wiping_a_side_ends_battle() {
        let mut session = started_session(Side::Hero);
        session.combatant_mut_for_test(&CombatantId::villain(1)).set_health(0);
        session.combatant_mut_for_test(&CombatantId::villain(2)).set_health(0);
        session.combatant_mut_for_test(&CombatantId::villain(3)).set_health(40);

        assert_ok(session.perform_attack(&CombatantId::hero(1), &CombatantId::villain(3), AttackKind::Critical));

        assert!(session.is_finished());
        assert_eq!(session.winner(), Some(Winner::Hero));
        assert_eq!(session.turn(), Side::Hero);
        assert_eq!(
            session.attack(&CombatantId::hero(1), &CombatantId::villain(3), AttackKind::Basic),
            Err(BattleError::IllegalState {
                operation: "attack",
                phase: BattlePhase::Finished,
            })
        );
    }

    #[test]
    fn test_attack_event_is_logged_with_bars() {
        let mut session = started_session(Side::Hero);
        assert_ok(session.perform_attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Special));
        let attack = session
            .log()
            .events()
            .find(|e| matches!(e, BattleEvent::Attack { .. }))
            .cloned();
        assert_eq!(
            attack,
            Some(BattleEvent::Attack {
                attacker: CombatantId::hero(1),
                target: CombatantId::villain(1),
                kind: AttackKind::Special,
                damage: 30,
                super_attack: false,
                health_before: 200,
                health_after: 170,
                target_eliminated: false,
                attacker_power_bar: 0,
                target_defense_bar: 30,
            })
        );
    }
}

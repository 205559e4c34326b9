#[cfg(test)]
mod tests {
    use crate::battle::state::BattleEvent;
    use crate::battle::tests::common::{assert_ok, started_session};
    use crate::errors::BattleError;
    use crate::ids::CombatantId;
    use pretty_assertions::assert_eq;
    use schema::{AttackKind, Side, SuperKind};

    #[test]
    fn test_super_attack_doubles_next_attack_once() {
        // Arrange
        let mut session = started_session(Side::Hero);
        session.combatant_mut_for_test(&CombatantId::hero(1)).set_bars(100, 0);

        // Act
        let activation = assert_ok(session.activate_super(SuperKind::Attack, &CombatantId::hero(1)));
        let outcome = assert_ok(session.perform_attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Basic));

        // Assert
        assert_eq!(activation.kind, SuperKind::Attack);
        assert_eq!(outcome.damage_dealt, 10);
        assert_eq!(outcome.remaining_health, 190);
        let hero = session.combatant(&CombatantId::hero(1)).unwrap();
        assert!(!hero.pending_super_attack());
        assert_eq!(hero.power_bar(), 0);
        assert!(session.log().events().any(|e| matches!(
            e,
            BattleEvent::Attack { super_attack: true, damage: 10, .. }
        )));
    }

    #[test]
    fn test_super_defense_can_be_armed_off_turn() {
        // Arrange
        let mut session = started_session(Side::Hero);
        session.combatant_mut_for_test(&CombatantId::villain(1)).set_bars(0, 100);

        // Act
        assert_ok(session.activate_super(SuperKind::Defense, &CombatantId::villain(1)));
        let outcome = assert_ok(session.perform_attack(&CombatantId::hero(1), &CombatantId::villain(1), AttackKind::Critical));

        // Assert
        assert_eq!(outcome.damage_dealt, 45);
        assert_eq!(outcome.remaining_health, 177);
        let villain = session.combatant(&CombatantId::villain(1)).unwrap();
        assert!(!villain.pending_super_defense());
        assert_eq!(villain.defense_bar(), 45);
    }

    #[test]
    fn test_activation_without_full_bar_reports_level() {
        let mut session = started_session(Side::Hero);
        session.combatant_mut_for_test(&CombatantId::hero(2)).set_bars(60, 0);
        assert_eq!(
            session.activate_super(SuperKind::Attack, &CombatantId::hero(2)),
            Err(BattleError::ResourceNotReady {
                combatant: CombatantId::hero(2),
                kind: SuperKind::Attack,
                level: 60,
            })
        );
        assert!(!session.combatant(&CombatantId::hero(2)).unwrap().pending_super_attack());
    }

    #[test]
    fn test_activation_for_unknown_combatant() {
        let mut session = started_session(Side::Hero);
        assert_eq!(
            session.activate_super(SuperKind::Defense, &CombatantId::villain(7)),
            Err(BattleError::CombatantNotFound(CombatantId::villain(7)))
        );
    }

    #[test]
    fn test_bars_build_up_to_a_super_attack() {
        // Arrange
        let mut session = started_session(Side::Villain);

        // Act: three critical hits fill the hero's bars
        for _ in 0..3 {
            session.turn = Side::Villain;
            assert_ok(session.perform_attack(&CombatantId::villain(1), &CombatantId::hero(1), AttackKind::Critical));
        }

        // Assert
        let hero = session.combatant(&CombatantId::hero(1)).unwrap();
        assert_eq!(hero.health(), 65);
        assert!(hero.can_super_attack());
        assert!(hero.can_super_defense());
        assert_ok(session.activate_super(SuperKind::Attack, &CombatantId::hero(1)));
    }
}

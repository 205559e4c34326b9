#[cfg(test)]
mod tests {
    use crate::battle::tests::common::TestCharacterBuilder;
    use crate::combatant::{BAR_CAPACITY, Combatant};
    use crate::ids::CombatantId;
    use crate::squad::Squad;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use schema::{Side, StatusKind};

    fn villain(id: u32) -> Combatant {
        Combatant::new(TestCharacterBuilder::new(id, "Target").build(), Side::Villain, 200)
    }

    #[test]
    fn test_new_combatant_starts_fresh() {
        let c = villain(1);
        assert_eq!(c.unique_id, CombatantId::villain(1));
        assert_eq!(c.health(), 200);
        assert_eq!(c.max_health(), 200);
        assert_eq!(c.power_bar(), 0);
        assert_eq!(c.defense_bar(), 0);
        assert!(c.is_active());
        assert!(!c.pending_super_attack());
        assert!(!c.pending_super_defense());
    }

    #[test]
    fn test_damage_fills_both_bars() {
        // Arrange
        let mut c = villain(1);

        // Act
        let remaining = c.receive_damage(45);

        // Assert
        assert_eq!(remaining, 155);
        assert_eq!(c.power_bar(), 45);
        assert_eq!(c.defense_bar(), 45);
    }

    #[test]
    fn test_bars_cap_at_capacity() {
        let mut c = villain(1);
        c.receive_damage(45);
        c.receive_damage(45);
        c.receive_damage(45);
        assert_eq!(c.power_bar(), BAR_CAPACITY);
        assert_eq!(c.defense_bar(), BAR_CAPACITY);
        assert!(c.can_super_attack());
        assert!(c.can_super_defense());
    }

    #[test]
    fn test_forty_basic_hits_eliminate() {
        let mut c = villain(1);
        for hit in 1..=39 {
            c.receive_damage(5);
            assert!(c.is_alive(), "still alive after hit {}", hit);
        }
        let remaining = c.receive_damage(5);
        assert_eq!(remaining, 0);
        assert!(!c.is_alive());
        assert!(!c.is_active());
        assert_eq!(c.power_bar(), 0);
        assert_eq!(c.defense_bar(), 0);
    }

    #[test]
    fn test_overkill_clamps_to_zero() {
        let mut c = villain(1);
        c.set_health(10);
        assert_eq!(c.receive_damage(45), 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn test_damage_to_eliminated_changes_nothing() {
        let mut c = villain(1);
        c.set_health(0);
        assert_eq!(c.receive_damage(30), 0);
        assert_eq!(c.power_bar(), 0);
        assert!(!c.is_active());
    }

    #[test]
    fn test_super_defense_halves_rounding_up_and_is_spent() {
        // Arrange
        let mut c = villain(1);
        c.set_bars(0, 100);
        assert!(c.activate_super_defense());
        assert_eq!(c.defense_bar(), 0);

        // Act
        let remaining = c.receive_damage(45);

        // Assert: 45 halves to 23, bars grow by the raw 45
        assert_eq!(remaining, 177);
        assert_eq!(c.defense_bar(), 45);
        assert_eq!(c.power_bar(), 45);
        assert!(!c.pending_super_defense());

        // The next hit lands in full
        assert_eq!(c.receive_damage(5), 172);
    }

    #[test]
    fn test_activation_requires_full_bar() {
        let mut c = villain(1);
        c.set_bars(99, 100);
        assert!(!c.activate_super_attack());
        assert!(!c.pending_super_attack());
        assert_eq!(c.power_bar(), 99);
        assert!(c.activate_super_defense());
    }

    #[test]
    fn test_take_super_attack_consumes_flag() {
        let mut c = villain(1);
        c.set_bars(100, 0);
        assert!(c.activate_super_attack());
        assert!(c.take_super_attack());
        assert!(!c.take_super_attack());
    }

    #[test]
    fn test_heal_caps_at_max_and_skips_eliminated() {
        let mut c = villain(1);
        c.set_health(190);
        assert_eq!(c.heal(30), 10);
        assert_eq!(c.health(), 200);
        c.set_health(0);
        assert_eq!(c.heal(30), 0);
        assert_eq!(c.health(), 0);
    }

    #[test]
    fn test_poison_ticks_bypass_bars_and_expire() {
        // Arrange
        let mut c = villain(1);
        c.add_status(StatusKind::Poison, 8, 2);

        // Act
        let first = c.apply_turn_effects();
        let second = c.apply_turn_effects();
        let third = c.apply_turn_effects();

        // Assert
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].amount, 8);
        assert!(!first[0].expired);
        assert!(second[0].expired);
        assert!(third.is_empty());
        assert_eq!(c.health(), 184);
        assert_eq!(c.power_bar(), 0);
        assert_eq!(c.defense_bar(), 0);
    }

    #[test]
    fn test_reapplying_status_refreshes_duration() {
        let mut c = villain(1);
        c.add_status(StatusKind::Poison, 8, 3);
        c.apply_turn_effects();
        c.add_status(StatusKind::Poison, 8, 3);
        assert_eq!(c.statuses().len(), 1);
        assert_eq!(c.statuses()[0].turns_remaining, 3);
    }

    #[test]
    fn test_lethal_poison_eliminates() {
        let mut c = villain(1);
        c.set_health(5);
        c.add_status(StatusKind::Poison, 8, 3);
        let ticks = c.apply_turn_effects();
        assert_eq!(ticks[0].amount, 5);
        assert!(!c.is_active());
        assert!(c.statuses().is_empty());
    }

    #[test]
    fn test_squad_pointer_skips_eliminated_and_wraps() {
        // Arrange
        let roster = (1..=3)
            .map(|id| TestCharacterBuilder::new(id, "Member").build())
            .collect();
        let mut squad = Squad::new(Side::Hero, "Team", roster, 200);
        squad.members_mut().nth(1).unwrap().set_health(0);

        // Act & Assert
        assert_eq!(squad.advance_to_next().unwrap().id, 3);
        assert_eq!(squad.advance_to_next().unwrap().id, 1);
        assert_eq!(squad.total_health(), 400);
        assert_eq!(squad.living_members().count(), 2);
    }

    #[test]
    fn test_squad_pointer_stays_put_when_nobody_can_act() {
        let roster = (1..=3)
            .map(|id| TestCharacterBuilder::new(id, "Member").build())
            .collect();
        let mut squad = Squad::new(Side::Villain, "Team", roster, 200);
        squad.set_initial_combatant(2);
        for member in squad.members_mut() {
            member.set_health(0);
        }
        assert!(squad.advance_to_next().is_none());
        assert_eq!(squad.current_index(), 1);
        assert!(!squad.has_living_members());
    }

    #[test]
    fn test_total_health_saturates_for_huge_rosters() {
        let roster = (1..=3)
            .map(|id| TestCharacterBuilder::new(id, "Giant").build())
            .collect();
        let squad = Squad::new(Side::Hero, "Team", roster, u32::MAX);
        assert_eq!(squad.total_health(), u32::MAX);
    }

    proptest! {
        #[test]
        fn prop_health_and_bars_stay_in_range(hits in prop::collection::vec(0u32..120, 0..60)) {
            let mut c = villain(1);
            let mut was_eliminated = false;
            for amount in hits {
                c.receive_damage(amount);
                prop_assert!(c.health() <= c.max_health());
                prop_assert!(c.power_bar() <= BAR_CAPACITY);
                prop_assert!(c.defense_bar() <= BAR_CAPACITY);
                if was_eliminated {
                    prop_assert!(!c.is_active());
                }
                was_eliminated = !c.is_alive();
                prop_assert_eq!(was_eliminated, !c.is_active());
            }
        }

        #[test]
        fn prop_extreme_amounts_saturate(
            first in 0u32..=u32::MAX,
            second in 0u32..=u32::MAX,
            healed in 0u32..=u32::MAX,
        ) {
            let mut c = villain(1);
            c.receive_damage(first);
            c.heal(healed);
            c.receive_damage(second);
            prop_assert!(c.health() <= c.max_health());
            prop_assert!(c.power_bar() <= BAR_CAPACITY);
            prop_assert!(c.defense_bar() <= BAR_CAPACITY);
        }
    }
}

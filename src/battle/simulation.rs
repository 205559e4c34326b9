//! Automatic play: drive a session to completion with random attacks.

use crate::battle::state::BattleSession;
use crate::errors::BattleResult;
use rand::Rng;
use schema::{AttackKind, BattlePhase};
use tracing::{debug, warn};

const ATTACK_KINDS: [AttackKind; 3] = [AttackKind::Basic, AttackKind::Special, AttackKind::Critical];

/// Play the battle out. Each step the side to move attacks with its current
/// combatant against the first living opponent using a random attack kind.
/// Stops when the battle finishes or after `turn_cap` steps, and force-ends it
/// in the latter case so the session always comes back finished.
///
/// Returns the number of steps taken.
pub fn simulate_to_completion<R: Rng>(
    session: &mut BattleSession,
    turn_cap: u32,
    rng: &mut R,
) -> BattleResult<u32> {
    if session.phase() == BattlePhase::Starting {
        session.start()?;
    }

    let mut steps = 0;
    while session.phase() == BattlePhase::InProgress && steps < turn_cap {
        let Some(attacker) = session.current_combatant().map(|c| c.unique_id) else {
            break;
        };
        let Some(target) = session
            .squad(session.turn().opponent())
            .living_members()
            .next()
            .map(|c| c.unique_id)
        else {
            break;
        };
        let kind = ATTACK_KINDS[rng.random_range(0..ATTACK_KINDS.len())];

        if let Err(err) = session.perform_attack(&attacker, &target, kind) {
            warn!(battle_id = %session.id(), %attacker, %target, error = %err, "simulated attack rejected");
            break;
        }
        steps += 1;
    }

    if session.phase() == BattlePhase::InProgress {
        debug!(battle_id = %session.id(), steps, "simulation stopped early, forcing the end");
        session.end_battle();
    }
    Ok(steps)
}

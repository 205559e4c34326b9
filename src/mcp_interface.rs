//! Text rendering and command helpers for the MCP server.
//!
//! Every helper returns a ready-to-send string: caller mistakes become an
//! `Error: ...` line rather than a failed tool call.

use crate::battle::state::{BattleEvent, LoggedEvent};
use crate::battle::view::{BattleDetails, BattleSummary, CombatantView, SquadView};
use crate::character::RosterCatalog;
use crate::errors::{BattleResult, Outcome};
use crate::ids::{BattleId, CombatantId, UserId};
use crate::persistence::BattleStatistics;
use crate::service::{BattleService, BattleSetup};
use schema::Side;
use serde::Serialize;

/// Serialize a result as the structured `{ success, data | error }` envelope.
pub fn render_outcome<T: Serialize>(result: BattleResult<T>, message: &str) -> String {
    let outcome = Outcome::from_result(result, message);
    serde_json::to_string_pretty(&outcome)
        .unwrap_or_else(|e| format!("{{\"success\":false,\"error\":\"{}\"}}", e))
}

/// Lists every character on both rosters with their ability.
pub fn display_roster(catalog: &RosterCatalog) -> String {
    let mut output = String::new();
    for side in [Side::Hero, Side::Villain] {
        output.push_str(&format!("--- {} ---\n", side));
        for character in catalog.characters(side) {
            let ability = character
                .ability
                .as_ref()
                .map(|a| format!("{} (cooldown {})", a.name, a.cooldown))
                .unwrap_or_else(|| "no ability".to_string());
            output.push_str(&format!(
                "  {}. {} ({}) - {} - {}\n",
                character.id, character.alias, character.name, character.team, ability
            ));
        }
    }
    output
}

fn display_combatant(c: &CombatantView, is_current: bool) -> String {
    let mut line = format!(
        "{} [{}] HP: {}/{} | Power: {}/100 | Defense: {}/100",
        c.alias, c.unique_id, c.health, c.max_health, c.power_bar, c.defense_bar
    );
    if c.pending_super_attack {
        line.push_str(" | SUPER ATTACK READY");
    }
    if c.pending_super_defense {
        line.push_str(" | SUPER DEFENSE UP");
    }
    if c.ability_cooldown > 0 {
        line.push_str(&format!(" | ability in {}", c.ability_cooldown));
    }
    for status in &c.statuses {
        line.push_str(&format!(" | {} ({})", status.kind, status.turns_remaining));
    }
    if !c.alive {
        line.push_str(" (Eliminated)");
    }
    if is_current {
        line.push_str(" <");
    }
    line
}

fn display_squad(squad: &SquadView) -> String {
    let mut output = format!("--- {} ({}) - total HP {} ---\n", squad.name, squad.side, squad.total_health);
    for (index, member) in squad.members.iter().enumerate() {
        output.push_str(&format!(
            "  {}\n",
            display_combatant(member, index == squad.current_index)
        ));
    }
    output
}

pub fn display_battle_status(summary: &BattleSummary) -> String {
    let mut output = format!(
        "Battle {} | {} | Round {}/{} | Turn: {}\n",
        summary.id, summary.phase, summary.round, summary.max_rounds, summary.turn
    );
    if let Some(winner) = summary.winner {
        output.push_str(&format!("Winner: {}\n", winner));
    }
    output.push_str(&display_squad(&summary.heroes));
    output.push_str(&display_squad(&summary.villains));
    output
}

/// Who may act and who may be targeted right now.
pub fn display_details(details: &BattleDetails) -> String {
    let names = |members: &[CombatantView]| {
        members
            .iter()
            .map(|c| format!("{} ({})", c.unique_id, c.alias))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut output = format!("Round {}/{} | {} to move\n", details.round, details.max_rounds, details.turn);
    if let Some(current) = &details.current {
        output.push_str(&format!("Current: {}\n", display_combatant(current, false)));
    }
    output.push_str(&format!("Can act: {}\n", names(&details.attackers)));
    output.push_str(&format!("Can be targeted: {}\n", names(&details.targets)));
    output
}

pub fn display_statistics(stats: &BattleStatistics) -> String {
    let mut output = format!("Total battles: {}\n", stats.total_battles);
    for tally in &stats.by_winner {
        output.push_str(&format!("  {}: {}\n", tally.winner, tally.total));
    }
    if !stats.by_month.is_empty() {
        output.push_str("By month:\n");
        for month in &stats.by_month {
            output.push_str(&format!("  {}-{:02}: {}\n", month.year, month.month, month.total));
        }
    }
    output
}

pub fn display_history(history: &[BattleSummary]) -> String {
    if history.is_empty() {
        return "No finished battles yet.".to_string();
    }
    history
        .iter()
        .map(|b| {
            let winner = b.winner.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string());
            format!(
                "{} | {} | winner: {} | rounds: {} | {} vs {}",
                b.id,
                b.created_at.format("%Y-%m-%d %H:%M"),
                winner,
                b.round,
                b.heroes.total_health,
                b.villains.total_health
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn narrate(narration: &[String], summary: &BattleSummary) -> String {
    let mut output = narration.join("\n");
    output.push_str("\n\n");
    output.push_str(&display_battle_status(summary));
    output
}

pub fn execute_create_battle(service: &BattleService, setup: &BattleSetup, owner: &UserId) -> String {
    match service.create_battle(setup, owner) {
        Ok(summary) => format!(
            "Battle {} created. Use start_battle to begin.\n\n{}",
            summary.id,
            display_battle_status(&summary)
        ),
        Err(e) => format!("Error: {}", e),
    }
}

pub fn execute_start(service: &BattleService, id: &BattleId, owner: &UserId) -> String {
    match service.start(id, owner) {
        Ok(report) => narrate(&report.narration, &report.state),
        Err(e) => format!("Error: {}", e),
    }
}

pub fn execute_attack(
    service: &BattleService,
    id: &BattleId,
    owner: &UserId,
    attacker: &str,
    target: &str,
    kind: &str,
) -> String {
    match service.attack(id, owner, attacker, target, kind) {
        Ok(report) => narrate(&report.narration, &report.state),
        Err(e) => format!("Error: {}", e),
    }
}

pub fn execute_ability(
    service: &BattleService,
    id: &BattleId,
    owner: &UserId,
    combatant: &str,
    target: Option<&str>,
) -> String {
    match service.use_ability(id, owner, combatant, target) {
        Ok(report) => narrate(&report.narration, &report.state),
        Err(e) => format!("Error: {}", e),
    }
}

pub fn execute_super(
    service: &BattleService,
    id: &BattleId,
    owner: &UserId,
    combatant: &str,
    defense: bool,
) -> String {
    let result = if defense {
        service.activate_super_defense(id, owner, combatant)
    } else {
        service.activate_super_attack(id, owner, combatant)
    };
    match result {
        Ok(outcome) => outcome.message,
        Err(e) => format!("Error: {}", e),
    }
}

pub fn execute_simulation(service: &BattleService, setup: &BattleSetup, owner: &UserId) -> String {
    match service.simulate_full(setup, owner) {
        Ok(summary) => {
            let lines: Vec<String> = summary
                .log
                .iter()
                .filter_map(|entry| format_archived_entry(entry, &summary))
                .collect();
            narrate(&lines, &summary)
        }
        Err(e) => format!("Error: {}", e),
    }
}

/// Log lines for a battle that only survives as a summary.
fn format_archived_entry(entry: &LoggedEvent, summary: &BattleSummary) -> Option<String> {
    let alias = |id: &CombatantId| {
        summary
            .heroes
            .members
            .iter()
            .chain(summary.villains.members.iter())
            .find(|c| c.unique_id == *id)
            .map(|c| c.alias.clone())
            .unwrap_or_else(|| id.to_string())
    };
    match &entry.event {
        BattleEvent::Attack {
            attacker,
            target,
            kind,
            damage,
            health_after,
            ..
        } => Some(format!(
            "[round {}] {} hits {} with a {} attack for {} damage ({} HP left)",
            entry.round,
            alias(attacker),
            alias(target),
            kind,
            damage,
            health_after
        )),
        BattleEvent::Eliminated { combatant } => {
            Some(format!("[round {}] {} has been eliminated!", entry.round, alias(combatant)))
        }
        BattleEvent::BattleFinished { winner, .. } => Some(format!("Battle over. Winner: {}", winner)),
        _ => None,
    }
}

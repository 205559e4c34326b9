use crate::character::Character;
use crate::combatant::Combatant;
use crate::ids::{CombatantId, RosterId};
use schema::Side;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One side's roster plus the pointer to whoever acts next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Squad {
    pub side: Side,
    pub name: String,
    members: Vec<Combatant>,
    current_index: usize,
}

impl Squad {
    pub fn new(side: Side, name: impl Into<String>, characters: Vec<Character>, max_health: u32) -> Self {
        Self {
            side,
            name: name.into(),
            members: characters
                .into_iter()
                .map(|character| Combatant::new(character, side, max_health))
                .collect(),
            current_index: 0,
        }
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The combatant the pointer is on, or `None` for an empty roster.
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.members.get(self.current_index)
    }

    /// Move the pointer to the member with this roster id.
    pub fn set_initial_combatant(&mut self, roster_id: RosterId) -> Option<&Combatant> {
        let index = self.members.iter().position(|c| c.id == roster_id)?;
        self.current_index = index;
        self.members.get(index)
    }

    /// Step the pointer forward to the next active member, wrapping around.
    ///
    /// Looks at most one full lap, so the current member is the last one
    /// considered. Returns `None` and leaves the pointer alone when nobody on
    /// the squad can act.
    pub fn advance_to_next(&mut self) -> Option<&Combatant> {
        let len = self.members.len();
        let next = (1..=len)
            .map(|step| (self.current_index + step) % len)
            .find(|&index| self.members[index].is_active());

        match next {
            Some(index) => {
                debug!(
                    side = ?self.side,
                    from = self.current_index,
                    to = index,
                    "squad pointer advanced"
                );
                self.current_index = index;
                self.members.get(index)
            }
            None => {
                debug!(side = ?self.side, "no active member left to advance to");
                None
            }
        }
    }

    pub fn has_living_members(&self) -> bool {
        self.members.iter().any(Combatant::is_alive)
    }

    pub fn living_members(&self) -> impl Iterator<Item = &Combatant> {
        self.members.iter().filter(|c| c.is_alive())
    }

    pub fn active_members(&self) -> impl Iterator<Item = &Combatant> {
        self.members.iter().filter(|c| c.is_active())
    }

    /// Summed health across the full roster, the eliminated counting as zero.
    pub fn total_health(&self) -> u32 {
        self.members
            .iter()
            .map(Combatant::health)
            .fold(0, u32::saturating_add)
    }

    pub fn find(&self, id: &CombatantId) -> Option<&Combatant> {
        self.members.iter().find(|c| c.unique_id == *id)
    }

    pub fn find_mut(&mut self, id: &CombatantId) -> Option<&mut Combatant> {
        self.members.iter_mut().find(|c| c.unique_id == *id)
    }

    pub(crate) fn members_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.members.iter_mut()
    }
}

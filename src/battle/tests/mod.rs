pub mod common;

#[cfg(test)]
mod test_combatant;

#[cfg(test)]
mod test_attack;

#[cfg(test)]
mod test_super_bars;

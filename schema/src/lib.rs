// Hero Arena Schema - Shared type definitions
// This crate holds the small closed enums shared by the battle engine, its
// snapshots and its outer adapters. No engine logic lives here.

pub use battle_data::*;
pub use combat_types::*;

pub mod battle_data;
pub mod combat_types;

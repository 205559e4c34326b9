//! Hero Arena Battle Engine
//!
//! A turn-based 3v3 heroes-versus-villains battle engine: squads trade
//! basic, special and critical attacks, fill super bars by taking damage,
//! spend per-character abilities, and battles end on a wiped side or when
//! the elimination round limit is passed.

// --- MODULE DECLARATIONS ---
pub mod ability;
pub mod battle;
pub mod character;
pub mod combatant;
pub mod config;
pub mod errors;
pub mod ids;
pub mod mcp_interface;
pub mod persistence;
pub mod registry;
pub mod service;
pub mod squad;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{AttackKind, BattlePhase, Side, StatusKind, SuperKind, Winner};

// --- From this crate's modules (`src/`) ---

// Core battle engine state and operations.
pub use battle::engine::{ActivationOutcome, AttackOutcome, determine_winner};
pub use battle::simulation::simulate_to_completion;
pub use battle::state::{BattleEvent, BattleSession, EventLog, LoggedEvent};
pub use battle::view::{BattleDetails, BattleOverview, BattleSummary, CombatantView, SquadView};

// Runtime types for a battle.
pub use ability::{AbilityData, AbilityEffect, AbilityOutcome, AbilityResultKind};
pub use character::{Character, CharacterLookup, RosterCatalog, RosterError};
pub use combatant::Combatant;
pub use ids::{BattleId, CombatantId, RosterId, UserId};
pub use squad::Squad;

// Collaborators and the service boundary.
pub use config::{ConfigError, DamageTable, EngineConfig};
pub use persistence::{BattleArchive, BattleStatistics, InMemoryArchive};
pub use registry::BattleRegistry;
pub use service::{ActionReport, BattleService, BattleSetup};

// Crate-specific error and result types.
pub use errors::{
    ArchiveError, BattleError, BattleResult, ErrorCategory, Outcome, RuleViolation, ValidationError,
};

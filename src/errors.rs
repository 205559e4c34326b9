use crate::ids::{BattleId, CombatantId, ParseCombatantIdError, RosterId};
use schema::{BattlePhase, Side, SuperKind};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the Hero Arena battle engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    /// Malformed request: roster sizes, unknown characters, bad ids
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// No active battle with this id (it may already be finished)
    #[error("Battle {0} not found or already finished")]
    BattleNotFound(BattleId),
    /// No combatant with this id in the battle
    #[error("Combatant {0} not found in this battle")]
    CombatantNotFound(CombatantId),
    /// The battle is in the wrong phase for the requested operation
    #[error("Cannot {operation} while the battle is {phase}")]
    IllegalState {
        operation: &'static str,
        phase: BattlePhase,
    },
    /// The request breaks a rule of the battle
    #[error("Rule violation: {0}")]
    RuleViolation(#[from] RuleViolation),
    /// A super bar was not full when activation was requested
    #[error("{combatant} cannot use {kind}: bar at {level}/100")]
    ResourceNotReady {
        combatant: CombatantId,
        kind: SuperKind,
        level: u32,
    },
    /// The acting user does not own the battle
    #[error("You do not have permission to access battle {battle}")]
    Forbidden { battle: BattleId },
    /// The persistence collaborator failed
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Errors raised while validating a request before any state changes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("exactly {expected} {side} are required, got {actual}")]
    RosterSize {
        side: Side,
        expected: usize,
        actual: usize,
    },
    #[error("{side} roster has no character with id {id}")]
    UnknownCharacter { side: Side, id: RosterId },
    #[error("{side} roster lists character {id} more than once")]
    DuplicateCharacter { side: Side, id: RosterId },
    #[error("starting character {id} is not in the selected {side} roster")]
    StartingCharacterNotInRoster { side: Side, id: RosterId },
    #[error("{0}")]
    MalformedCombatantId(#[from] ParseCombatantIdError),
    #[error("an authenticated user is required to create battles")]
    MissingOwner,
    #[error("ability {ability} requires a target")]
    MissingTarget { ability: String },
}

/// Battle rules a request can break
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("{0} has been eliminated and cannot act")]
    ActorEliminated(CombatantId),
    #[error("{0} has already been eliminated")]
    TargetEliminated(CombatantId),
    #[error("{attacker} and {target} are both on the {side} side")]
    SameSide {
        attacker: CombatantId,
        target: CombatantId,
        side: Side,
    },
    #[error("{0} cannot target an opponent with a supportive effect")]
    OpposingSupportTarget(CombatantId),
    #[error("a combatant cannot attack itself")]
    SelfTarget,
    #[error("it is not the turn of the {side}, it is the turn of the {turn}")]
    WrongTurn { side: Side, turn: Side },
    #[error("{0} is not active")]
    ActorInactive(CombatantId),
    #[error("{combatant}'s ability is cooling down for {remaining} more turns")]
    AbilityOnCooldown { combatant: CombatantId, remaining: u8 },
}

/// Errors reported by the persistence collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("failed to encode battle snapshot: {0}")]
    Encode(String),
    #[error("failed to decode battle snapshot: {0}")]
    Decode(String),
    #[error("archive unavailable: {0}")]
    Unavailable(String),
}

impl From<ParseCombatantIdError> for BattleError {
    fn from(err: ParseCombatantIdError) -> Self {
        BattleError::Validation(ValidationError::MalformedCombatantId(err))
    }
}

/// Coarse classification of a [`BattleError`], for adapters that map errors
/// onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    IllegalState,
    RuleViolation,
    ResourceNotReady,
    Forbidden,
    Internal,
}

impl BattleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BattleError::Validation(_) => ErrorCategory::Validation,
            BattleError::BattleNotFound(_) | BattleError::CombatantNotFound(_) => {
                ErrorCategory::NotFound
            }
            BattleError::IllegalState { .. } => ErrorCategory::IllegalState,
            BattleError::RuleViolation(_) => ErrorCategory::RuleViolation,
            BattleError::ResourceNotReady { .. } => ErrorCategory::ResourceNotReady,
            BattleError::Forbidden { .. } => ErrorCategory::Forbidden,
            BattleError::Archive(_) => ErrorCategory::Internal,
        }
    }
}

/// Type alias for Results using BattleError
pub type BattleResult<T> = Result<T, BattleError>;

/// Type alias for Results using ArchiveError
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Structured result handed across the engine boundary. Caller mistakes come
/// back as `success: false` with a message instead of failing the host.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Outcome<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            category: None,
            message: Some(message.into()),
        }
    }

    pub fn failed(err: &BattleError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            category: Some(err.category()),
            message: None,
        }
    }

    pub fn from_result(result: BattleResult<T>, message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::ok(data, message),
            Err(err) => Self::failed(&err),
        }
    }
}

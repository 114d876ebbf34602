use thiserror::Error;

use crate::models::{PlayerId, Position, Side};

/// Input was rejected before any simulation work started.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid period count: {0} (must be at least 1)")]
    InvalidPeriodCount(u8),

    #[error("Invalid period length: {0}s (must be positive)")]
    InvalidPeriodLength(u32),

    #[error("Invalid overtime length: {0}s (must be positive when ties are not allowed)")]
    InvalidOvertimeLength(u32),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Empty roster for {side:?} team")]
    EmptyRoster { side: Side },

    #[error("{side:?} roster is missing required position {position:?}")]
    MissingPosition { side: Side, position: Position },

    #[error("Player id {id} appears more than once across rosters")]
    DuplicatePlayer { id: PlayerId },

    #[error("Team side mismatch: slot {expected:?} holds a team marked {found:?}")]
    SideMismatch { expected: Side, found: Side },
}

/// The computation itself went wrong. Fatal to the current game.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InternalError {
    #[error("Probability out of range for {context}: {value}")]
    ProbabilityOutOfRange { context: &'static str, value: f64 },

    #[error("Player {id} has counters but is on neither roster")]
    UnknownPlayer { id: PlayerId },

    #[error("Score mismatch: event fold {folded:?}, simulator tally {tally:?}")]
    ScoreMismatch { folded: [u32; 2], tally: [u32; 2] },

    #[error("Period scores {period_total:?} do not add up to final score {final_score:?}")]
    PeriodScoreMismatch { period_total: [u32; 2], final_score: [u32; 2] },

    #[error("No eligible healthy player on {side:?} for {role}")]
    NoEligiblePlayer { side: Side, role: &'static str },

    #[error("Game did not finish after {overtimes} overtime periods")]
    NonTerminating { overtimes: u8 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameSimError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal consistency error: {0}")]
    Internal(#[from] InternalError),
}

impl GameSimError {
    /// Caller supplied bad input.
    pub fn is_config_error(&self) -> bool {
        matches!(self, GameSimError::Config(_))
    }

    /// The engine produced an inconsistent game.
    pub fn is_internal_error(&self) -> bool {
        matches!(self, GameSimError::Internal(_))
    }
}

/// Playback could not continue. Cancellation is reported as an outcome, not
/// through this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Invalid playback config: {0}")]
    InvalidConfig(String),

    #[error("Playback sink closed after {delivered} messages")]
    SinkClosed { delivered: usize },
}

pub type Result<T> = std::result::Result<T, GameSimError>;

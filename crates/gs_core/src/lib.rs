//! # gs_core - Deterministic Gridiron Game Simulation Engine
//!
//! Simulates one American-football game possession by possession, keeps an
//! append-only event log, aggregates a box score from it, and replays the
//! finished game to any number of viewers at game-clock pace.
//!
//! ## Features
//! - Deterministic simulation (same seed = same event log)
//! - Scoring summary rebuilt from the log on demand
//! - Box score cross-checked against the simulator's own tally
//! - Batched live playback with backpressure and cancellation
//! - JSON API for one-off exhibition games

// Large enum variants in wire-facing messages
#![allow(clippy::large_enum_variant)]
// Struct initialization pattern used intentionally in tests
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::too_many_arguments)]

pub mod api;
pub mod engine;
pub mod error;
pub mod models;
pub mod playback;

// Re-export main API functions
pub use api::{simulate_game, simulate_game_json, ApiError, GameRequest, GameResponse};
pub use error::{ConfigError, GameSimError, InternalError, PlaybackError, Result};

pub use engine::{
    scoring_plays, simulate_many, BoxScoreAggregator, EventLog, GameConfig, GameEngine,
    GameRecord, SimJob, SimOutput,
};
pub use models::{BoxScore, GameEvent, Player, Position, ScoringPlay, Side, Team};
pub use playback::{
    CancellationToken, PacingPolicy, PlaybackConfig, PlaybackMessage, PlaybackOutcome,
    PlaybackSession, PlaybackSink,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub use api::SCHEMA_VERSION;

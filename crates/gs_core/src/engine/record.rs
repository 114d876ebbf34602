use serde::{Deserialize, Serialize};
use tracing::info;

use super::box_score::BoxScoreAggregator;
use super::event_log::EventLog;
use super::game_sim::SimOutput;
use crate::error::InternalError;
use crate::models::BoxScore;

/// A finished, aggregated game. Read-only once built; playback viewers
/// share it behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    pub game_id: u64,
    pub seed: u64,
    pub log: EventLog,
    pub box_score: BoxScore,
}

impl GameRecord {
    /// Aggregates a simulated game.
    pub fn from_sim(game_id: u64, seed: u64, output: SimOutput) -> Result<Self, InternalError> {
        let (log, pending) = output.split_log(game_id);
        let box_score = BoxScoreAggregator::aggregate(pending.with_log(&log))?;
        info!(
            "Game {} aggregated: {} scoring plays, {} events",
            game_id,
            box_score.scoring_summary.len(),
            log.len()
        );
        Ok(Self { game_id, seed, log, box_score })
    }
}

//! JSON API for one-off exhibition games.
//!
//! Request in, box score out. The same request always produces the same
//! bytes: every map in the response is ordered and the RNG is seeded from
//! the request.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::engine::{GameConfig, GameEngine, GameRecord};
use crate::error::GameSimError;
use crate::models::{BoxScore, GameEvent, ScoringPlay, Team};

pub const SCHEMA_VERSION: u8 = 1;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    #[error("Unsupported schema version: {0}")]
    UnsupportedSchemaVersion(u8),

    #[error("Failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Simulation(#[from] GameSimError),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRequest {
    pub schema_version: u8,
    #[serde(default)]
    pub game_id: u64,
    pub seed: u64,
    pub home: Team,
    pub away: Team,
    #[serde(default)]
    pub config: GameConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameResponse {
    pub schema_version: u8,
    pub box_score: BoxScore,
    /// Omitted when play-by-play is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<GameEvent>>,
    pub scoring_summary: Vec<ScoringPlay>,
}

impl GameResponse {
    pub fn from_record(record: GameRecord, include_events: bool) -> Self {
        let GameRecord { log, box_score, .. } = record;
        let scoring_summary = box_score.scoring_summary.clone();
        let events = include_events.then(|| log.as_slice().to_vec());
        Self { schema_version: SCHEMA_VERSION, box_score, events, scoring_summary }
    }
}

/// Validates, simulates and aggregates one game.
pub fn simulate_game(request: GameRequest) -> Result<GameRecord, GameSimError> {
    let GameRequest { game_id, seed, home, away, config, .. } = request;
    let engine = GameEngine::new(home, away, config, seed)?;
    let output = engine.simulate()?;
    Ok(GameRecord::from_sim(game_id, seed, output)?)
}

pub fn simulate_game_json(request_json: &str) -> Result<String, ApiError> {
    let request: GameRequest = serde_json::from_str(request_json).map_err(ApiError::InvalidRequest)?;
    if request.schema_version != SCHEMA_VERSION {
        return Err(ApiError::UnsupportedSchemaVersion(request.schema_version));
    }

    let include_events = request.config.do_play_by_play;
    let game_id = request.game_id;
    let record = simulate_game(request)?;
    info!("Game {} finished {:?}", game_id, record.box_score.final_score);

    let response = GameResponse::from_record(record, include_events);
    serde_json::to_string(&response).map_err(ApiError::Serialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::game_sim::test_fixtures::create_test_team;
    use crate::models::Side;

    fn request(seed: u64) -> GameRequest {
        GameRequest {
            schema_version: SCHEMA_VERSION,
            game_id: 9,
            seed,
            home: create_test_team(Side::Home, "Home", 100),
            away: create_test_team(Side::Away, "Away", 200),
            config: GameConfig::default(),
        }
    }

    fn request_json(request: &GameRequest) -> String {
        serde_json::to_string(request).unwrap()
    }

    #[test]
    fn test_json_is_deterministic() {
        let json = request_json(&request(77));
        let first = simulate_game_json(&json).unwrap();
        let second = simulate_game_json(&json).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_response_matches_typed_entry_point() {
        let req = request(5);
        let record = simulate_game(req.clone()).unwrap();
        let response: GameResponse =
            serde_json::from_str(&simulate_game_json(&request_json(&req)).unwrap()).unwrap();

        assert_eq!(response.schema_version, SCHEMA_VERSION);
        assert_eq!(response.box_score.final_score, record.box_score.final_score);
        assert_eq!(response.box_score.period_scores, record.box_score.period_scores);
        assert_eq!(response.events.as_deref(), Some(record.log.as_slice()));
        assert_eq!(response.scoring_summary, record.box_score.scoring_summary);
        assert_eq!(response.box_score.game_id, 9);
    }

    #[test]
    fn test_events_omitted_without_play_by_play() {
        let mut req = request(5);
        req.config.do_play_by_play = false;
        let json = simulate_game_json(&request_json(&req)).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("events").is_none());
        assert!(value.get("box_score").is_some());
    }

    #[test]
    fn test_minimal_request_uses_defaults() {
        let mut value = serde_json::to_value(request(1)).unwrap();
        let object = value.as_object_mut().unwrap();
        object.remove("config");
        object.remove("game_id");

        let req: GameRequest = serde_json::from_value(value).unwrap();
        assert_eq!(req.config, GameConfig::default());
        assert_eq!(req.game_id, 0);
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(simulate_game_json("{not json"), Err(ApiError::InvalidRequest(_))));

        let mut req = request(1);
        req.schema_version = 2;
        assert!(matches!(
            simulate_game_json(&request_json(&req)),
            Err(ApiError::UnsupportedSchemaVersion(2))
        ));

        let mut req = request(1);
        req.config.num_periods = 0;
        let err = simulate_game_json(&request_json(&req)).unwrap_err();
        assert!(matches!(err, ApiError::Simulation(ref e) if e.is_config_error()));
    }
}

pub mod box_score;
pub mod config;
pub mod event_log;
pub mod game_sim;
pub mod probability;
pub mod record;
pub mod scoring_summary;

pub use box_score::{AggregateInput, BoxScoreAggregator, PendingAggregate};
pub use config::GameConfig;
pub use event_log::EventLog;
pub use game_sim::{simulate_many, GameEngine, SimJob, SimOutput};
pub use record::GameRecord;
pub use scoring_summary::{scoring_plays, ScoringPlays};

pub mod box_score;
pub mod events;
pub mod player;
pub mod stats;
pub mod team;

pub use box_score::{BoxScore, PlayerLine, ScoringPlay, TeamBox, TeamLine};
pub use events::{EventKind, GameEvent, GameTime, Period, ScoreCategory};
pub use player::{InjuryState, Player, PlayerId, PlayerRatings, Position, Role};
pub use stats::{DerivedStats, GamePlayerRecord, StatCounters, TeamCounters};
pub use team::{Side, Team, DEPTH_SLOTS};

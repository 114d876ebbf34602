use serde::{Deserialize, Serialize};

use super::{
    DerivedStats, InjuryState, Period, PlayerId, Position, ScoreCategory, Side, StatCounters,
    TeamCounters,
};

/// One entry of the scoring summary, possibly folding a touchdown and its try.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringPlay {
    /// Acting side of the first folded event.
    pub side: Side,
    pub period: Period,
    pub clock_secs: u32,
    /// Running score right after this play, indexed by `Side::index`.
    pub score: [u32; 2],
    pub category: ScoreCategory,
    pub text: String,
    /// Inclusive `seq` bounds of the folded events.
    pub seq_range: (u32, u32),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerLine {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub seconds_played: u32,
    pub stats: StatCounters,
    pub derived: DerivedStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injury: Option<InjuryState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TeamLine {
    pub points: u32,
    /// Sum of the player lines.
    pub stats: StatCounters,
    pub team: TeamCounters,
    pub total_yards: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamBox {
    pub side: Side,
    pub name: String,
    pub abbrev: String,
    pub colors: [String; 3],
    pub ovr: f32,
    pub players: Vec<PlayerLine>,
    pub totals: TeamLine,
    pub derived: DerivedStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoxScore {
    pub game_id: u64,
    pub final_score: [u32; 2],
    pub regulation_periods: u8,
    pub overtimes: u8,
    /// `None` for a tie.
    pub winner: Option<Side>,
    /// Points per period, regulation first, then each overtime.
    pub period_scores: Vec<[u32; 2]>,
    pub teams: [TeamBox; 2],
    pub scoring_summary: Vec<ScoringPlay>,
}

impl BoxScore {
    pub fn team(&self, side: Side) -> &TeamBox {
        &self.teams[side.index()]
    }

    pub fn is_tie(&self) -> bool {
        self.winner.is_none()
    }
}

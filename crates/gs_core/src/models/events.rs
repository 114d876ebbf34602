use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PlayerId, Side};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// 1-based quarter number.
    Regulation(u8),
    /// 1-based overtime ordinal.
    Overtime(u8),
}

impl Period {
    pub fn is_overtime(&self) -> bool {
        matches!(self, Period::Overtime(_))
    }

    /// Human label, e.g. "1st quarter", "Overtime", "2nd overtime".
    pub fn label(&self) -> String {
        match *self {
            Period::Regulation(n) => format!("{} quarter", ordinal(n)),
            Period::Overtime(1) => "Overtime".to_string(),
            Period::Overtime(n) => format!("{} overtime", ordinal(n)),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Regulation(n) => write!(f, "Q{}", n),
            Period::Overtime(n) => write!(f, "OT{}", n),
        }
    }
}

fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (1, 11) | (2, 12) | (3, 13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Kickoff,
    Rush,
    PassComplete,
    PassIncomplete,
    Sack,
    Interception,
    Fumble,
    Punt,
    FieldGoal,
    ExtraPoint,
    TwoPointConversion,
    Penalty,
    TurnoverOnDowns,
    Injury,
    PeriodEnd,
    GameEnd,
}

impl EventKind {
    /// Events that credit player statistics.
    pub fn is_play(&self) -> bool {
        !matches!(self, EventKind::Injury | EventKind::PeriodEnd | EventKind::GameEnd)
    }
}

/// Structured scoring tag. Merging in the scoring summary keys off this,
/// never off description text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    Touchdown,
    FieldGoal,
    ExtraPoint,
    TwoPoint,
    Safety,
}

impl ScoreCategory {
    /// Points awarded when the attempt succeeds.
    pub fn value(&self) -> u8 {
        match self {
            ScoreCategory::Touchdown => 6,
            ScoreCategory::FieldGoal => 3,
            ScoreCategory::ExtraPoint => 1,
            ScoreCategory::TwoPoint => 2,
            ScoreCategory::Safety => 2,
        }
    }

    /// Fallback text used when the event carries no description.
    pub fn label(&self, good: bool) -> &'static str {
        match (self, good) {
            (ScoreCategory::Touchdown, _) => "Touchdown",
            (ScoreCategory::FieldGoal, true) => "Field goal good",
            (ScoreCategory::FieldGoal, false) => "Field goal missed",
            (ScoreCategory::ExtraPoint, true) => "Extra point good",
            (ScoreCategory::ExtraPoint, false) => "Extra point missed",
            (ScoreCategory::TwoPoint, true) => "Two-point conversion good",
            (ScoreCategory::TwoPoint, false) => "Two-point conversion failed",
            (ScoreCategory::Safety, _) => "Safety",
        }
    }
}

/// Where in the game an event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameTime {
    pub period: Period,
    /// Seconds remaining in the period.
    pub clock_secs: u32,
    /// Seconds elapsed since the opening kickoff.
    pub game_secs: u32,
}

/// One entry of the event log. Never modified after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEvent {
    pub seq: u32,
    pub period: Period,
    pub clock_secs: u32,
    pub game_secs: u32,
    /// Acting side (the offense, or the kicking team).
    pub side: Side,
    /// Side that receives `points`. Differs from `side` only on a safety.
    pub credited_side: Side,
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ScoreCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yards: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GameEvent {
    /// Bare event; `seq` is assigned when the event is appended to a log.
    pub fn new(kind: EventKind, side: Side, at: GameTime) -> Self {
        Self {
            seq: 0,
            period: at.period,
            clock_secs: at.clock_secs,
            game_secs: at.game_secs,
            side,
            credited_side: side,
            kind,
            category: None,
            points: None,
            yards: None,
            participants: Vec::new(),
            description: None,
        }
    }

    /// Touchdown on `kind` (rush, reception, return), worth 6 to `side`.
    pub fn touchdown(kind: EventKind, side: Side, at: GameTime, yards: i32) -> Self {
        Self::new(kind, side, at)
            .with_score(ScoreCategory::Touchdown, 6)
            .with_yards(yards)
    }

    pub fn field_goal(side: Side, at: GameTime, distance: i32, good: bool) -> Self {
        Self::new(EventKind::FieldGoal, side, at)
            .with_score(ScoreCategory::FieldGoal, if good { 3 } else { 0 })
            .with_yards(distance)
    }

    pub fn extra_point(side: Side, at: GameTime, good: bool) -> Self {
        Self::new(EventKind::ExtraPoint, side, at)
            .with_score(ScoreCategory::ExtraPoint, if good { 1 } else { 0 })
    }

    pub fn two_point(side: Side, at: GameTime, good: bool) -> Self {
        Self::new(EventKind::TwoPointConversion, side, at)
            .with_score(ScoreCategory::TwoPoint, if good { 2 } else { 0 })
    }

    /// `offense` was downed in its own end zone; the other side scores 2.
    pub fn safety(kind: EventKind, offense: Side, at: GameTime, yards: i32) -> Self {
        let mut event = Self::new(kind, offense, at)
            .with_score(ScoreCategory::Safety, 2)
            .with_yards(yards);
        event.credited_side = offense.other();
        event
    }

    pub fn injury(side: Side, at: GameTime, player: PlayerId) -> Self {
        Self::new(EventKind::Injury, side, at).with_participants(vec![player])
    }

    pub fn period_end(at: GameTime) -> Self {
        Self::new(EventKind::PeriodEnd, Side::Home, at)
    }

    pub fn game_end(at: GameTime) -> Self {
        Self::new(EventKind::GameEnd, Side::Home, at)
    }

    pub fn with_score(mut self, category: ScoreCategory, points: u8) -> Self {
        self.category = Some(category);
        self.points = Some(points);
        self
    }

    pub fn with_yards(mut self, yards: i32) -> Self {
        self.yards = Some(yards);
        self
    }

    pub fn with_participants(mut self, participants: Vec<PlayerId>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Points carried by this event, 0 when it is not a score.
    pub fn points_scored(&self) -> u32 {
        self.points.unwrap_or(0) as u32
    }
}

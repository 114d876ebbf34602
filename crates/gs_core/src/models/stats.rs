use serde::{Deserialize, Serialize};

use super::InjuryState;

/// Per-player counters credited by the simulator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatCounters {
    // Passing
    pub pass_att: u32,
    pub pass_cmp: u32,
    pub pass_yds: i32,
    pub pass_td: u32,
    pub pass_int: u32,
    pub sacked: u32,
    pub sack_yds_lost: u32,

    // Rushing
    pub rush_att: u32,
    pub rush_yds: i32,
    pub rush_td: u32,
    pub rush_long: i32,

    // Receiving
    pub targets: u32,
    pub receptions: u32,
    pub rec_yds: i32,
    pub rec_td: u32,
    pub rec_long: i32,

    pub fumbles: u32,
    pub fumbles_lost: u32,

    // Defense
    pub tackles: u32,
    pub sacks: u32,
    pub def_int: u32,
    pub passes_defended: u32,
    pub fumbles_forced: u32,
    pub fumbles_recovered: u32,
    pub def_td: u32,

    // Kicking
    pub fg_att: u32,
    pub fg_made: u32,
    pub fg_long: i32,
    pub xp_att: u32,
    pub xp_made: u32,
    pub punts: u32,
    pub punt_yds: i32,
    pub punt_long: i32,

    // Returns
    pub kick_returns: u32,
    pub kick_return_yds: i32,
    pub punt_returns: u32,
    pub punt_return_yds: i32,

    pub two_pt_att: u32,
    pub two_pt_made: u32,
}

impl StatCounters {
    /// True when any counter moved.
    pub fn has_any(&self) -> bool {
        *self != StatCounters::default()
    }

    /// Sum `other` into `self`; "long" fields keep the maximum.
    pub fn accumulate(&mut self, other: &StatCounters) {
        self.pass_att += other.pass_att;
        self.pass_cmp += other.pass_cmp;
        self.pass_yds += other.pass_yds;
        self.pass_td += other.pass_td;
        self.pass_int += other.pass_int;
        self.sacked += other.sacked;
        self.sack_yds_lost += other.sack_yds_lost;

        self.rush_att += other.rush_att;
        self.rush_yds += other.rush_yds;
        self.rush_td += other.rush_td;
        self.rush_long = self.rush_long.max(other.rush_long);

        self.targets += other.targets;
        self.receptions += other.receptions;
        self.rec_yds += other.rec_yds;
        self.rec_td += other.rec_td;
        self.rec_long = self.rec_long.max(other.rec_long);

        self.fumbles += other.fumbles;
        self.fumbles_lost += other.fumbles_lost;

        self.tackles += other.tackles;
        self.sacks += other.sacks;
        self.def_int += other.def_int;
        self.passes_defended += other.passes_defended;
        self.fumbles_forced += other.fumbles_forced;
        self.fumbles_recovered += other.fumbles_recovered;
        self.def_td += other.def_td;

        self.fg_att += other.fg_att;
        self.fg_made += other.fg_made;
        self.fg_long = self.fg_long.max(other.fg_long);
        self.xp_att += other.xp_att;
        self.xp_made += other.xp_made;
        self.punts += other.punts;
        self.punt_yds += other.punt_yds;
        self.punt_long = self.punt_long.max(other.punt_long);

        self.kick_returns += other.kick_returns;
        self.kick_return_yds += other.kick_return_yds;
        self.punt_returns += other.punt_returns;
        self.punt_return_yds += other.punt_return_yds;

        self.two_pt_att += other.two_pt_att;
        self.two_pt_made += other.two_pt_made;
    }

    /// Net yards from scrimmage, sack losses deducted.
    pub fn scrimmage_yds(&self) -> i32 {
        self.pass_yds + self.rush_yds - self.sack_yds_lost as i32
    }
}

/// Stats that only make sense for a team as a whole.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TeamCounters {
    pub first_downs: u32,
    pub third_down_att: u32,
    pub third_down_conv: u32,
    pub fourth_down_att: u32,
    pub fourth_down_conv: u32,
    pub turnovers: u32,
    pub time_of_possession_secs: u32,
    pub penalties: u32,
    pub penalty_yards: u32,
    pub safeties_allowed: u32,
}

/// Everything the simulator records about one player during a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct GamePlayerRecord {
    pub stats: StatCounters,
    pub seconds_played: u32,
    pub injury: InjuryState,
}

impl GamePlayerRecord {
    /// Players with neither a counted stat nor time on the field are left
    /// out of the box score.
    pub fn participated(&self) -> bool {
        self.stats.has_any() || self.seconds_played > 0
    }
}

/// Ratios computed from counters. `None` whenever the denominator is zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct DerivedStats {
    pub completion_pct: Option<f64>,
    pub yards_per_pass_att: Option<f64>,
    pub passer_rating: Option<f64>,
    pub yards_per_rush: Option<f64>,
    pub yards_per_catch: Option<f64>,
    pub fg_pct: Option<f64>,
    pub xp_pct: Option<f64>,
    pub yards_per_punt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_down_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fourth_down_pct: Option<f64>,
}

fn ratio(num: f64, den: u32) -> Option<f64> {
    if den > 0 {
        Some(num / den as f64)
    } else {
        None
    }
}

fn pct(num: u32, den: u32) -> Option<f64> {
    ratio(num as f64 * 100.0, den)
}

impl DerivedStats {
    pub fn from_counters(stats: &StatCounters) -> Self {
        Self {
            completion_pct: pct(stats.pass_cmp, stats.pass_att),
            yards_per_pass_att: ratio(stats.pass_yds as f64, stats.pass_att),
            passer_rating: passer_rating(stats),
            yards_per_rush: ratio(stats.rush_yds as f64, stats.rush_att),
            yards_per_catch: ratio(stats.rec_yds as f64, stats.receptions),
            fg_pct: pct(stats.fg_made, stats.fg_att),
            xp_pct: pct(stats.xp_made, stats.xp_att),
            yards_per_punt: ratio(stats.punt_yds as f64, stats.punts),
            third_down_pct: None,
            fourth_down_pct: None,
        }
    }

    pub fn for_team(stats: &StatCounters, team: &TeamCounters) -> Self {
        Self {
            third_down_pct: pct(team.third_down_conv, team.third_down_att),
            fourth_down_pct: pct(team.fourth_down_conv, team.fourth_down_att),
            ..Self::from_counters(stats)
        }
    }
}

/// NFL passer rating, each component clamped to [0, 2.375].
fn passer_rating(stats: &StatCounters) -> Option<f64> {
    if stats.pass_att == 0 {
        return None;
    }
    let att = stats.pass_att as f64;
    let clamp = |v: f64| v.clamp(0.0, 2.375);
    let a = clamp((stats.pass_cmp as f64 / att - 0.3) * 5.0);
    let b = clamp((stats.pass_yds as f64 / att - 3.0) * 0.25);
    let c = clamp(stats.pass_td as f64 / att * 20.0);
    let d = clamp(2.375 - stats.pass_int as f64 / att * 25.0);
    Some((a + b + c + d) / 6.0 * 100.0)
}

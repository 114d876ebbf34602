//! Possession-by-possession game simulator.
//!
//! A [`GameEngine`] owns both rosters, the per-player counters and the event
//! log for one game. [`GameEngine::simulate`] consumes it and hands
//! everything over as a [`SimOutput`]; nothing is shared between games.
//!
//! ## Flow
//! - The home side receives the opening kickoff; the other side receives
//!   after halftime.
//! - Each step resolves one kickoff, try, or scrimmage play.
//! - A tied game goes to sudden-death overtime unless ties are allowed.

mod injuries;
mod plays;
mod selection;
#[cfg(test)]
pub mod test_fixtures;

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

pub use selection::{fatigue, Personnel, DEFENSE_UNIT, FATIGUE_SECS, OFFENSE_UNIT};

use super::config::GameConfig;
use super::event_log::EventLog;
use super::probability;
use crate::error::{ConfigError, GameSimError, InternalError};
use crate::models::{
    GameEvent, GamePlayerRecord, GameTime, Period, Player, PlayerId, PlayerRatings, Position,
    Side, StatCounters, Team, TeamCounters,
};

/// Overtime periods allowed before the game is declared non-terminating.
pub const MAX_OVERTIMES: u8 = 50;

/// A rostered player plus everything that changes during the game.
#[derive(Debug, Clone)]
pub struct GamePlayer {
    pub id: PlayerId,
    pub side: Side,
    pub name: String,
    pub position: Position,
    pub ratings: PlayerRatings,
    pub record: GamePlayerRecord,
    roster_order: usize,
}

impl GamePlayer {
    fn new(player: &Player, side: Side, roster_order: usize) -> Self {
        Self {
            id: player.id,
            side,
            name: player.name.clone(),
            position: player.position,
            ratings: player.ratings,
            record: GamePlayerRecord::default(),
            roster_order,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.record.injury.is_injured()
    }

    /// Depth-chart ranking score.
    pub fn depth_score(&self) -> f64 {
        self.ratings.ovr as f64 * fatigue(self.record.seconds_played)
    }
}

/// Ball position and down for the side in possession.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drive {
    offense: Side,
    /// Yards from the offense's own goal line.
    ball_on: i32,
    down: u8,
    to_go: i32,
}

impl Drive {
    fn first_and_ten(offense: Side, ball_on: i32) -> Self {
        let ball_on = ball_on.clamp(1, 99);
        Self { offense, ball_on, down: 1, to_go: 10.min(100 - ball_on) }
    }
}

/// What the next step of the game is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restart {
    Kickoff { kicking: Side },
    /// Free kick by the side that just conceded a safety.
    FreeKick { kicking: Side },
    Try { side: Side },
    Scrimmage,
}

/// Everything a finished game produced. Moved, never cloned, into the
/// box-score aggregator.
#[derive(Debug, Clone)]
pub struct SimOutput {
    pub log: EventLog,
    pub teams: [Team; 2],
    pub counters: BTreeMap<PlayerId, GamePlayerRecord>,
    pub team_stats: [TeamCounters; 2],
    /// Running score kept by the simulator, independent of the log.
    pub tally: [u32; 2],
    pub period_scores: Vec<[u32; 2]>,
    pub regulation_periods: u8,
    pub overtimes: u8,
}

pub struct GameEngine {
    config: GameConfig,
    seed: u64,
    rng: ChaCha8Rng,
    teams: [Team; 2],
    players: BTreeMap<PlayerId, GamePlayer>,
    team_stats: [TeamCounters; 2],
    log: EventLog,
    score: [u32; 2],
    period_scores: Vec<[u32; 2]>,
    period: Period,
    clock: u32,
    elapsed: u32,
    overtimes: u8,
    /// Home advantage and cohesion combined, per side.
    multipliers: [f64; 2],
    drive: Drive,
    next: Restart,
}

impl GameEngine {
    /// Validates the configuration and both rosters. Nothing is simulated
    /// until [`simulate`](Self::simulate) is called.
    pub fn new(home: Team, away: Team, config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        for (team, expected) in [(&home, Side::Home), (&away, Side::Away)] {
            if team.side != expected {
                return Err(ConfigError::SideMismatch { expected, found: team.side });
            }
            team.validate()?;
        }

        let mut players = BTreeMap::new();
        for team in [&home, &away] {
            for (order, player) in team.players.iter().enumerate() {
                let game_player = GamePlayer::new(player, team.side, order);
                if players.insert(player.id, game_player).is_some() {
                    return Err(ConfigError::DuplicatePlayer { id: player.id });
                }
            }
        }

        let cohesion = config.cohesion_multiplier();
        let multipliers = [config.home_multiplier() * cohesion, cohesion];

        Ok(Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            teams: [home, away],
            players,
            team_stats: [TeamCounters::default(); 2],
            log: EventLog::new(),
            score: [0, 0],
            period_scores: Vec::new(),
            period: Period::Regulation(1),
            clock: config.period_secs,
            elapsed: 0,
            overtimes: 0,
            multipliers,
            drive: Drive::first_and_ten(Side::Home, 25),
            next: Restart::Kickoff { kicking: Side::Away },
            config,
        })
    }

    /// Plays the whole game.
    pub fn simulate(mut self) -> Result<SimOutput, InternalError> {
        info!(
            "Simulating {} vs {} (seed {})",
            self.teams[0].name, self.teams[1].name, self.seed
        );

        for quarter in 1..=self.config.num_periods {
            self.start_period(Period::Regulation(quarter), self.config.period_secs);
            if quarter == 1 {
                self.next = Restart::Kickoff { kicking: Side::Away };
            } else if self.config.halftime_after() == Some(quarter - 1) {
                self.next = Restart::Kickoff { kicking: Side::Home };
            }
            self.play_period(false)?;
            self.end_period();
        }

        while self.score[0] == self.score[1] && !self.config.ties_allowed {
            if self.overtimes >= MAX_OVERTIMES {
                warn!("Game still tied after {} overtimes", self.overtimes);
                return Err(InternalError::NonTerminating { overtimes: self.overtimes });
            }
            self.overtimes += 1;
            debug!("Starting overtime {}", self.overtimes);

            self.start_period(Period::Overtime(self.overtimes), self.config.overtime_secs);
            let home_receives = probability::roll(&mut self.rng, "overtime coin toss", 0.5)?;
            let receiving = if home_receives { Side::Home } else { Side::Away };
            self.next = Restart::Kickoff { kicking: receiving.other() };
            self.play_period(true)?;
            self.end_period();
        }

        let text = self.describe(|| {
            format!(
                "Final: {} {}, {} {}",
                self.teams[0].abbrev, self.score[0], self.teams[1].abbrev, self.score[1]
            )
        });
        self.log.append(GameEvent::game_end(self.now()).with_description(text));

        info!(
            "Final: {} {} - {} {} ({} events)",
            self.teams[0].name,
            self.score[0],
            self.score[1],
            self.teams[1].name,
            self.log.len()
        );

        Ok(self.into_output())
    }

    fn into_output(self) -> SimOutput {
        let counters = self.players.into_iter().map(|(id, p)| (id, p.record)).collect();
        SimOutput {
            log: self.log,
            teams: self.teams,
            counters,
            team_stats: self.team_stats,
            tally: self.score,
            period_scores: self.period_scores,
            regulation_periods: self.config.num_periods,
            overtimes: self.overtimes,
        }
    }

    /// Plays until the clock runs out. An overtime period keeps going past
    /// zero until both sides have run a scrimmage play.
    fn play_period(&mut self, sudden_death: bool) -> Result<(), InternalError> {
        let mut had_ball = [false; 2];
        loop {
            // A try is untimed, so a touchdown on the last snap still gets one.
            let pending_try = matches!(self.next, Restart::Try { .. });
            let both_had_ball = had_ball[0] && had_ball[1];
            if self.clock == 0 && !pending_try && (!sudden_death || both_had_ball) {
                return Ok(());
            }

            if self.next == Restart::Scrimmage {
                had_ball[self.drive.offense.index()] = true;
            }
            let before = self.score;
            self.step()?;
            if sudden_death && self.score != before {
                return Ok(());
            }
        }
    }

    fn step(&mut self) -> Result<(), InternalError> {
        match self.next {
            Restart::Kickoff { kicking } => self.kickoff(kicking, false),
            Restart::FreeKick { kicking } => self.kickoff(kicking, true),
            Restart::Try { side } => self.attempt_try(side),
            Restart::Scrimmage => self.scrimmage(),
        }
    }

    fn start_period(&mut self, period: Period, secs: u32) {
        debug!("Start of {}", period);
        self.period = period;
        self.clock = secs;
        self.period_scores.push([0, 0]);
    }

    fn end_period(&mut self) {
        let period = self.period;
        let text = self.describe(|| format!("End of {}", period.label()));
        self.log.append(GameEvent::period_end(self.now()).with_description(text));
        debug!("End of {} ({}-{})", period, self.score[0], self.score[1]);
    }

    fn now(&self) -> GameTime {
        GameTime { period: self.period, clock_secs: self.clock, game_secs: self.elapsed }
    }

    /// Runs off up to `secs`; returns what was actually used.
    fn run_clock(&mut self, secs: u32, possession: Side) -> u32 {
        let used = secs.min(self.clock);
        self.clock -= used;
        self.elapsed += used;
        self.team_stats[possession.index()].time_of_possession_secs += used;
        used
    }

    fn push(&mut self, event: GameEvent) -> u32 {
        trace!(
            "{} {:>3}s {:?} {:?} yards={:?} points={:?}",
            event.period,
            event.clock_secs,
            event.side,
            event.kind,
            event.yards,
            event.points
        );
        self.log.append(event)
    }

    fn credit_time(&mut self, ids: &[PlayerId], secs: u32) {
        for id in ids {
            if let Some(player) = self.players.get_mut(id) {
                player.record.seconds_played += secs;
            }
        }
    }

    fn credit(&mut self, id: PlayerId, update: impl FnOnce(&mut StatCounters)) {
        if let Some(player) = self.players.get_mut(&id) {
            update(&mut player.record.stats);
        }
    }

    fn award(&mut self, side: Side, points: u32) {
        self.score[side.index()] += points;
        if let Some(current) = self.period_scores.last_mut() {
            current[side.index()] += points;
        }
    }

    fn describe(&self, text: impl FnOnce() -> String) -> Option<String> {
        if self.config.do_play_by_play {
            Some(text())
        } else {
            None
        }
    }

    fn name(&self, id: PlayerId) -> &str {
        self.players.get(&id).map_or("Unknown", |p| p.name.as_str())
    }

    fn team_name(&self, side: Side) -> &str {
        &self.teams[side.index()].name
    }

    fn is_final_period(&self) -> bool {
        self.period.is_overtime() || self.period == Period::Regulation(self.config.num_periods)
    }
}

/// One independent game for [`simulate_many`].
#[derive(Debug, Clone)]
pub struct SimJob {
    pub home: Team,
    pub away: Team,
    pub config: GameConfig,
    pub seed: u64,
}

impl SimJob {
    pub fn run(self) -> Result<SimOutput, GameSimError> {
        let engine = GameEngine::new(self.home, self.away, self.config, self.seed)?;
        Ok(engine.simulate()?)
    }
}

/// Simulates independent games in parallel. Results keep the input order.
pub fn simulate_many(jobs: Vec<SimJob>) -> Vec<Result<SimOutput, GameSimError>> {
    jobs.into_par_iter().map(SimJob::run).collect()
}

//! Box-score aggregation.
//!
//! Pure function of a finished game: no I/O, no randomness. Besides summing
//! counters it cross-checks the event log against the simulator's own tally,
//! so a box score is never produced from an inconsistent game.

use std::collections::BTreeMap;

use tracing::warn;

use super::event_log::EventLog;
use super::game_sim::SimOutput;
use super::scoring_summary::scoring_plays;
use crate::error::InternalError;
use crate::models::{
    BoxScore, DerivedStats, GamePlayerRecord, PlayerId, PlayerLine, Side, StatCounters, Team,
    TeamBox, TeamCounters, TeamLine,
};

/// Everything the aggregator consumes. Counters and teams are moved in; the
/// log is only read.
#[derive(Debug)]
pub struct AggregateInput<'a> {
    pub game_id: u64,
    pub log: &'a EventLog,
    pub teams: [Team; 2],
    pub counters: BTreeMap<PlayerId, GamePlayerRecord>,
    pub team_stats: [TeamCounters; 2],
    pub tally: [u32; 2],
    pub period_scores: Vec<[u32; 2]>,
    pub regulation_periods: u8,
    pub overtimes: u8,
}

impl SimOutput {
    /// Separates the log from the rest of the output so the aggregator can
    /// borrow the log while taking ownership of everything else.
    pub fn split_log(self, game_id: u64) -> (EventLog, PendingAggregate) {
        let SimOutput {
            log,
            teams,
            counters,
            team_stats,
            tally,
            period_scores,
            regulation_periods,
            overtimes,
        } = self;
        let pending = PendingAggregate {
            game_id,
            teams,
            counters,
            team_stats,
            tally,
            period_scores,
            regulation_periods,
            overtimes,
        };
        (log, pending)
    }
}

/// A [`SimOutput`] minus its log, waiting to be paired with a log borrow.
#[derive(Debug)]
pub struct PendingAggregate {
    game_id: u64,
    teams: [Team; 2],
    counters: BTreeMap<PlayerId, GamePlayerRecord>,
    team_stats: [TeamCounters; 2],
    tally: [u32; 2],
    period_scores: Vec<[u32; 2]>,
    regulation_periods: u8,
    overtimes: u8,
}

impl PendingAggregate {
    pub fn with_log(self, log: &EventLog) -> AggregateInput<'_> {
        AggregateInput {
            game_id: self.game_id,
            log,
            teams: self.teams,
            counters: self.counters,
            team_stats: self.team_stats,
            tally: self.tally,
            period_scores: self.period_scores,
            regulation_periods: self.regulation_periods,
            overtimes: self.overtimes,
        }
    }
}

pub struct BoxScoreAggregator;

impl BoxScoreAggregator {
    pub fn aggregate(input: AggregateInput<'_>) -> Result<BoxScore, InternalError> {
        let AggregateInput {
            game_id,
            log,
            teams,
            mut counters,
            team_stats,
            tally,
            period_scores,
            regulation_periods,
            overtimes,
        } = input;

        // Every counter must belong to a rostered player.
        for id in counters.keys() {
            if !teams.iter().any(|team| team.find_player(*id).is_some()) {
                warn!("Counters recorded for player {} who is on neither roster", id);
                return Err(InternalError::UnknownPlayer { id: *id });
            }
        }

        let final_score = log.final_score();
        if final_score != tally {
            warn!("Event log folds to {:?} but simulator tallied {:?}", final_score, tally);
            return Err(InternalError::ScoreMismatch { folded: final_score, tally });
        }

        let period_total =
            period_scores.iter().fold([0, 0], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
        if period_total != final_score {
            warn!("Period scores sum to {:?}, final score is {:?}", period_total, final_score);
            return Err(InternalError::PeriodScoreMismatch { period_total, final_score });
        }

        let scoring_summary: Vec<_> = scoring_plays(log).collect();
        let summary_score = scoring_summary.last().map_or([0, 0], |play| play.score);
        if summary_score != final_score {
            warn!("Scoring summary ends at {:?}, final score is {:?}", summary_score, final_score);
            return Err(InternalError::ScoreMismatch { folded: summary_score, tally: final_score });
        }

        let [home, away] = teams;
        let home_box = Self::team_box(home, &mut counters, team_stats[0], final_score[0]);
        let away_box = Self::team_box(away, &mut counters, team_stats[1], final_score[1]);

        let winner = match final_score[0].cmp(&final_score[1]) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        };

        Ok(BoxScore {
            game_id,
            final_score,
            regulation_periods,
            overtimes,
            winner,
            period_scores,
            teams: [home_box, away_box],
            scoring_summary,
        })
    }

    /// Builds one side's box. Player lines follow roster order.
    fn team_box(
        team: Team,
        counters: &mut BTreeMap<PlayerId, GamePlayerRecord>,
        team_stats: TeamCounters,
        points: u32,
    ) -> TeamBox {
        let ovr = team.ovr();
        let mut totals = StatCounters::default();
        let mut players = Vec::new();

        for player in team.players {
            let Some(record) = counters.remove(&player.id) else {
                continue;
            };
            if !record.participated() {
                continue;
            }
            totals.accumulate(&record.stats);
            players.push(PlayerLine {
                id: player.id,
                name: player.name,
                position: player.position,
                seconds_played: record.seconds_played,
                derived: DerivedStats::from_counters(&record.stats),
                stats: record.stats,
                injury: record.injury.is_injured().then_some(record.injury),
            });
        }

        TeamBox {
            side: team.side,
            name: team.name,
            abbrev: team.abbrev,
            colors: team.colors,
            ovr,
            players,
            derived: DerivedStats::for_team(&totals, &team_stats),
            totals: TeamLine {
                points,
                total_yards: totals.scrimmage_yds(),
                stats: totals,
                team: team_stats,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GameConfig;
    use crate::engine::game_sim::test_fixtures::create_test_team;
    use crate::engine::game_sim::GameEngine;
    use crate::models::{EventKind, GameEvent, GameTime, InjuryState, Period};
    use proptest::prelude::*;

    fn teams() -> [Team; 2] {
        [create_test_team(Side::Home, "Home", 100), create_test_team(Side::Away, "Away", 200)]
    }

    fn empty_input(log: &EventLog) -> AggregateInput<'_> {
        AggregateInput {
            game_id: 1,
            log,
            teams: teams(),
            counters: BTreeMap::new(),
            team_stats: [TeamCounters::default(); 2],
            tally: [0, 0],
            period_scores: Vec::new(),
            regulation_periods: 4,
            overtimes: 0,
        }
    }

    fn at() -> GameTime {
        GameTime { period: Period::Regulation(1), clock_secs: 600, game_secs: 300 }
    }

    #[test]
    fn test_empty_log_is_scoreless_tie() {
        let log = EventLog::new();
        let box_score = BoxScoreAggregator::aggregate(empty_input(&log)).unwrap();

        assert_eq!(box_score.final_score, [0, 0]);
        assert!(box_score.is_tie());
        assert!(box_score.teams.iter().all(|t| t.players.is_empty()));
        assert!(box_score.scoring_summary.is_empty());
        assert!(box_score.teams[0].derived.completion_pct.is_none());
    }

    #[test]
    fn test_unknown_player_rejected() {
        let log = EventLog::new();
        let mut input = empty_input(&log);
        input.counters.insert(999, GamePlayerRecord { seconds_played: 5, ..Default::default() });

        assert_eq!(
            BoxScoreAggregator::aggregate(input),
            Err(InternalError::UnknownPlayer { id: 999 })
        );
    }

    #[test]
    fn test_score_mismatch_rejected() {
        let mut log = EventLog::new();
        log.append(GameEvent::field_goal(Side::Home, at(), 30, true));
        let mut input = empty_input(&log);
        input.period_scores = vec![[3, 0]];

        assert_eq!(
            BoxScoreAggregator::aggregate(input),
            Err(InternalError::ScoreMismatch { folded: [3, 0], tally: [0, 0] })
        );
    }

    #[test]
    fn test_period_mismatch_rejected() {
        let mut log = EventLog::new();
        log.append(GameEvent::field_goal(Side::Away, at(), 30, true));
        let mut input = empty_input(&log);
        input.tally = [0, 3];
        input.period_scores = vec![[0, 0], [0, 0]];

        assert_eq!(
            BoxScoreAggregator::aggregate(input),
            Err(InternalError::PeriodScoreMismatch { period_total: [0, 0], final_score: [0, 3] })
        );
    }

    #[test]
    fn test_participation_filter_and_totals() {
        let mut log = EventLog::new();
        log.append(GameEvent::new(EventKind::Rush, Side::Home, at()).with_yards(12));
        let mut input = empty_input(&log);

        let mut runner = GamePlayerRecord { seconds_played: 40, ..Default::default() };
        runner.stats.rush_att = 1;
        runner.stats.rush_yds = 12;
        input.counters.insert(101, runner);
        input.counters.insert(102, GamePlayerRecord::default());
        input.counters.insert(
            201,
            GamePlayerRecord {
                seconds_played: 40,
                injury: InjuryState::Injured { games_out: 5, severe: true },
                ..Default::default()
            },
        );
        input.team_stats[0].third_down_att = 2;
        input.team_stats[0].third_down_conv = 1;

        let box_score = BoxScoreAggregator::aggregate(input).unwrap();
        let home = box_score.team(Side::Home);
        assert_eq!(home.players.len(), 1);
        assert_eq!(home.players[0].id, 101);
        assert_eq!(home.totals.stats.rush_yds, 12);
        assert_eq!(home.totals.total_yards, 12);
        assert_eq!(home.derived.yards_per_rush, Some(12.0));
        assert_eq!(home.derived.third_down_pct, Some(50.0));
        assert!(home.derived.fourth_down_pct.is_none());

        let away = box_score.team(Side::Away);
        assert_eq!(away.players.len(), 1);
        assert_eq!(
            away.players[0].injury,
            Some(InjuryState::Injured { games_out: 5, severe: true })
        );
    }

    #[test]
    fn test_unfolded_try_still_matches_final_score() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(), 2));
        log.append(GameEvent::new(EventKind::Kickoff, Side::Home, at()));
        log.append(GameEvent::extra_point(Side::Away, at(), true));
        let mut input = empty_input(&log);
        input.tally = [6, 1];
        input.period_scores = vec![[6, 1]];

        let box_score = BoxScoreAggregator::aggregate(input).unwrap();
        assert_eq!(box_score.scoring_summary.len(), 2);
        assert_eq!(box_score.scoring_summary.last().map(|p| p.score), Some([6, 1]));
    }

    #[test]
    fn test_simulated_game_aggregates() {
        let engine = GameEngine::new(
            create_test_team(Side::Home, "Home", 100),
            create_test_team(Side::Away, "Away", 200),
            GameConfig::default(),
            31,
        )
        .unwrap();
        let (log, rest) = engine.simulate().unwrap().split_log(31);
        let box_score = BoxScoreAggregator::aggregate(rest.with_log(&log)).unwrap();

        assert_eq!(box_score.final_score, log.final_score());
        assert_eq!(box_score.period_scores.len(), 4 + box_score.overtimes as usize);
        assert_eq!(
            box_score.scoring_summary.last().map(|p| p.score),
            if box_score.final_score == [0, 0] { None } else { Some(box_score.final_score) }
        );
        for (side, team) in Side::BOTH.iter().zip(&box_score.teams) {
            assert_eq!(team.totals.points, box_score.final_score[side.index()]);
            assert!(team.players.iter().all(|p| p.seconds_played > 0 || p.stats.has_any()));
        }
        assert!(box_score.winner.is_some());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_summary_ends_at_final_score(
            seed in 0u64..10_000,
            num_periods in 1u8..=4,
            period_secs in 60u32..=900,
            overtime_secs in 1u32..=600,
            ties_allowed in any::<bool>(),
            base_injury_rate in 0.0f64..0.05,
            do_play_by_play in any::<bool>(),
        ) {
            let config = GameConfig {
                num_periods,
                period_secs,
                overtime_secs,
                ties_allowed,
                base_injury_rate,
                do_play_by_play,
                ..Default::default()
            };
            let engine = GameEngine::new(
                create_test_team(Side::Home, "Home", 100),
                create_test_team(Side::Away, "Away", 200),
                config,
                seed,
            )
            .unwrap();
            let (log, rest) = engine.simulate().unwrap().split_log(seed);
            let box_score = BoxScoreAggregator::aggregate(rest.with_log(&log)).unwrap();

            let last = box_score.scoring_summary.last().map_or([0, 0], |p| p.score);
            prop_assert_eq!(last, box_score.final_score);
            for play in &box_score.scoring_summary {
                prop_assert_eq!(play.score, log.replay_score(play.seq_range.1 as usize + 1));
            }
        }
    }
}

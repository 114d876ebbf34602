//! Scoring summary reconstruction.
//!
//! Walks an [`EventLog`] and yields one [`ScoringPlay`] per score, folding a
//! try (extra point or two-point attempt) into the touchdown it follows. The
//! iterator borrows the log and holds no other state, so calling
//! [`scoring_plays`] again always reproduces the same sequence.

use std::iter::Peekable;
use std::slice::Iter;

use super::event_log::EventLog;
use crate::models::{GameEvent, ScoreCategory, ScoringPlay};

pub fn scoring_plays(log: &EventLog) -> ScoringPlays<'_> {
    ScoringPlays { events: log.iter().peekable(), score: [0, 0] }
}

/// Lazy iterator over the scoring plays of a log.
pub struct ScoringPlays<'a> {
    events: Peekable<Iter<'a, GameEvent>>,
    score: [u32; 2],
}

impl ScoringPlays<'_> {
    fn credit(&mut self, event: &GameEvent) {
        self.score[event.credited_side.index()] += event.points_scored();
    }

    /// Folds the try that directly follows a touchdown into `play`. Injury
    /// and period markers may sit in between; any other play closes the
    /// window.
    fn fold_try(&mut self, play: &mut ScoringPlay) {
        while let Some(&next) = self.events.peek() {
            if !next.kind.is_play() {
                self.events.next();
                continue;
            }
            if let (true, Some(category)) = (Self::absorbs(play, next), next.category) {
                self.events.next();
                self.credit(next);
                play.text = format!("{} ({})", play.text, event_text(next, category));
                play.score = self.score;
                play.seq_range.1 = next.seq;
            }
            return;
        }
    }

    /// Whether `next` folds into a touchdown play started by `play`.
    fn absorbs(play: &ScoringPlay, next: &GameEvent) -> bool {
        match next.category {
            Some(ScoreCategory::ExtraPoint) => true,
            Some(ScoreCategory::TwoPoint) => next.side == play.side,
            _ => false,
        }
    }
}

impl Iterator for ScoringPlays<'_> {
    type Item = ScoringPlay;

    fn next(&mut self) -> Option<ScoringPlay> {
        loop {
            let event = self.events.next()?;
            let Some(category) = event.category else {
                continue;
            };

            // A try with no touchdown to join only matters for the score.
            if event.points_scored() == 0 {
                continue;
            }

            self.credit(event);
            let mut play = ScoringPlay {
                side: event.side,
                period: event.period,
                clock_secs: event.clock_secs,
                score: self.score,
                category,
                text: event_text(event, category),
                seq_range: (event.seq, event.seq),
            };

            if category == ScoreCategory::Touchdown {
                self.fold_try(&mut play);
            }

            return Some(play);
        }
    }
}

fn event_text(event: &GameEvent, category: ScoreCategory) -> String {
    match &event.description {
        Some(text) => text.clone(),
        None => category.label(event.points_scored() > 0).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, GameTime, Period, Side};

    fn at(game_secs: u32) -> GameTime {
        GameTime { period: Period::Regulation(1), clock_secs: 900 - game_secs, game_secs }
    }

    fn collect(log: &EventLog) -> Vec<ScoringPlay> {
        scoring_plays(log).collect()
    }

    #[test]
    fn test_touchdown_with_good_extra_point_is_one_play() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(30), 3));
        log.append(GameEvent::extra_point(Side::Home, at(30), true));

        let plays = collect(&log);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].score, [7, 0]);
        assert_eq!(plays[0].text, "Touchdown (Extra point good)");
        assert_eq!(plays[0].seq_range, (0, 1));
    }

    #[test]
    fn test_missed_extra_point_still_folds() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(30), 3));
        log.append(GameEvent::extra_point(Side::Home, at(30), false));

        let plays = collect(&log);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].score, [6, 0]);
        assert_eq!(plays[0].text, "Touchdown (Extra point missed)");
    }

    #[test]
    fn test_safety_keeps_acting_side() {
        let mut log = EventLog::new();
        log.append(GameEvent::safety(EventKind::Rush, Side::Away, at(100), -2));

        let plays = collect(&log);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].side, Side::Away);
        assert_eq!(plays[0].score, [2, 0]);
        assert_eq!(plays[0].category, ScoreCategory::Safety);
    }

    #[test]
    fn test_two_point_only_folds_on_same_side() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::PassComplete, Side::Home, at(10), 12));
        log.append(GameEvent::two_point(Side::Away, at(10), true));

        let plays = collect(&log);
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[0].score, [6, 0]);
        assert_eq!(plays[1].side, Side::Away);
        assert_eq!(plays[1].score, [6, 2]);
    }

    #[test]
    fn test_extra_point_folds_regardless_of_side() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Interception, Side::Away, at(10), 40));
        log.append(GameEvent::extra_point(Side::Home, at(10), true));

        let plays = collect(&log);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].side, Side::Away);
        assert_eq!(plays[0].score, [1, 6]);
    }

    #[test]
    fn test_try_after_change_of_possession_stands_alone() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(10), 4));
        log.append(GameEvent::new(EventKind::Kickoff, Side::Home, at(10)));
        log.append(GameEvent::new(EventKind::Rush, Side::Away, at(40)).with_yards(6));
        log.append(GameEvent::new(EventKind::Interception, Side::Away, at(70)));
        log.append(GameEvent::extra_point(Side::Away, at(70), true));

        let plays = collect(&log);
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[0].side, Side::Home);
        assert_eq!(plays[0].score, [6, 0]);
        assert_eq!(plays[0].text, "Touchdown");
        assert_eq!(plays[0].seq_range, (0, 0));
        assert_eq!(plays[1].side, Side::Away);
        assert_eq!(plays[1].category, ScoreCategory::ExtraPoint);
        assert_eq!(plays[1].score, [6, 1]);
        assert_eq!(plays[1].seq_range, (4, 4));
    }

    #[test]
    fn test_injury_between_touchdown_and_try_still_folds() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::PassComplete, Side::Away, at(10), 22));
        log.append(GameEvent::injury(Side::Home, at(10), 105));
        log.append(GameEvent::two_point(Side::Away, at(10), true));

        let plays = collect(&log);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].score, [0, 8]);
        assert_eq!(plays[0].text, "Touchdown (Two-point conversion good)");
        assert_eq!(plays[0].seq_range, (0, 2));
    }

    #[test]
    fn test_try_only_folds_once() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(10), 1));
        log.append(GameEvent::extra_point(Side::Home, at(10), true));
        log.append(GameEvent::extra_point(Side::Home, at(10), true));

        let plays = collect(&log);
        assert_eq!(plays.len(), 2);
        assert_eq!(plays[0].score, [7, 0]);
        assert_eq!(plays[1].category, ScoreCategory::ExtraPoint);
        assert_eq!(plays[1].score, [8, 0]);
    }

    #[test]
    fn test_missed_field_goal_is_not_a_play() {
        let mut log = EventLog::new();
        log.append(GameEvent::field_goal(Side::Home, at(10), 51, false));
        log.append(GameEvent::field_goal(Side::Away, at(200), 33, true));

        let plays = collect(&log);
        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].side, Side::Away);
        assert_eq!(plays[0].score, [0, 3]);
        assert_eq!(plays[0].text, "Field goal good");
    }

    #[test]
    fn test_descriptions_take_precedence() {
        let mut log = EventLog::new();
        log.append(
            GameEvent::touchdown(EventKind::Rush, Side::Home, at(10), 7)
                .with_description(Some("J. Doe 7 yd run".to_string())),
        );
        log.append(
            GameEvent::extra_point(Side::Home, at(10), true)
                .with_description(Some("K. Foot extra point made".to_string())),
        );

        let plays = collect(&log);
        assert_eq!(plays[0].text, "J. Doe 7 yd run (K. Foot extra point made)");
    }

    #[test]
    fn test_recompute_is_identical() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(10), 1));
        log.append(GameEvent::two_point(Side::Home, at(10), false));
        log.append(GameEvent::field_goal(Side::Away, at(400), 40, true));

        assert_eq!(collect(&log), collect(&log));
    }

    #[test]
    fn test_empty_log_has_no_plays() {
        assert_eq!(scoring_plays(&EventLog::new()).count(), 0);
    }

    #[test]
    fn test_summary_snapshot() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(30), 3));
        log.append(GameEvent::extra_point(Side::Home, at(30), true));
        log.append(GameEvent::safety(EventKind::Sack, Side::Home, at(300), -9));

        let plays = collect(&log);
        insta::assert_json_snapshot!(plays, @r###"
        [
          {
            "side": "home",
            "period": {
              "regulation": 1
            },
            "clock_secs": 870,
            "score": [
              7,
              0
            ],
            "category": "touchdown",
            "text": "Touchdown (Extra point good)",
            "seq_range": [
              0,
              1
            ]
          },
          {
            "side": "home",
            "period": {
              "regulation": 1
            },
            "clock_secs": 600,
            "score": [
              7,
              2
            ],
            "category": "safety",
            "text": "Safety",
            "seq_range": [
              2,
              2
            ]
          }
        ]
        "###);
    }
}

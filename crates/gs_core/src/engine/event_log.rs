//! Append-only game event log.

use serde::{Deserialize, Serialize};

use crate::models::GameEvent;

/// Ordered, append-only sequence of [`GameEvent`]s.
///
/// `seq` always equals the event's position. There is no way to edit or
/// remove an event once appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event`, overwriting its `seq` with the log position.
    pub fn append(&mut self, mut event: GameEvent) -> u32 {
        let seq = self.events.len() as u32;
        event.seq = seq;
        self.events.push(event);
        seq
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GameEvent> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GameEvent> {
        self.events.iter()
    }

    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&GameEvent> {
        self.events.last()
    }

    /// Score after events `0..up_to`, folded by credited side.
    pub fn replay_score(&self, up_to: usize) -> [u32; 2] {
        fold_score(&self.events[..up_to.min(self.events.len())])
    }

    pub fn final_score(&self) -> [u32; 2] {
        fold_score(&self.events)
    }
}

/// Sums points of `events` into `[home, away]` using `credited_side`.
pub fn fold_score(events: &[GameEvent]) -> [u32; 2] {
    events.iter().fold([0, 0], |mut score, event| {
        score[event.credited_side.index()] += event.points_scored();
        score
    })
}

impl<'a> IntoIterator for &'a EventLog {
    type Item = &'a GameEvent;
    type IntoIter = std::slice::Iter<'a, GameEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventKind, GameTime, Period, Side};

    fn at(secs: u32) -> GameTime {
        GameTime { period: Period::Regulation(1), clock_secs: 900 - secs, game_secs: secs }
    }

    #[test]
    fn test_append_assigns_sequence() {
        let mut log = EventLog::new();
        let mut event = GameEvent::new(EventKind::Kickoff, Side::Home, at(0));
        event.seq = 99;
        assert_eq!(log.append(event), 0);
        assert_eq!(log.append(GameEvent::new(EventKind::Rush, Side::Away, at(5))), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0).map(|e| e.seq), Some(0));
        assert_eq!(log.get(1).map(|e| e.seq), Some(1));
    }

    #[test]
    fn test_replay_score_uses_credited_side() {
        let mut log = EventLog::new();
        log.append(GameEvent::touchdown(EventKind::Rush, Side::Home, at(10), 4));
        log.append(GameEvent::extra_point(Side::Home, at(10), true));
        log.append(GameEvent::safety(EventKind::Sack, Side::Home, at(200), -8));

        assert_eq!(log.replay_score(0), [0, 0]);
        assert_eq!(log.replay_score(1), [6, 0]);
        assert_eq!(log.replay_score(2), [7, 0]);
        assert_eq!(log.replay_score(3), [7, 2]);
        assert_eq!(log.replay_score(50), log.final_score());
    }

    #[test]
    fn test_empty_log() {
        let log = EventLog::new();
        assert!(log.is_empty());
        assert_eq!(log.final_score(), [0, 0]);
        assert!(log.last().is_none());
    }
}

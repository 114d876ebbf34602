use std::sync::Arc;

use tracing::debug;

use super::{
    CancellationToken, PlaybackConfig, PlaybackError, PlaybackMessage, PlaybackOutcome,
    PlaybackSink, TickSource,
};
use crate::engine::event_log::fold_score;
use crate::engine::GameRecord;

/// Per-viewer position in a shared record.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    pub next_index: usize,
    /// `game_secs` of the last delivered event; the pacing anchor.
    pub last_game_secs: u32,
    pub token: CancellationToken,
    score: [u32; 2],
}

impl PlaybackCursor {
    fn new(token: CancellationToken) -> Self {
        Self { next_index: 0, last_game_secs: 0, token, score: [0, 0] }
    }

    /// Cumulative score of everything delivered so far.
    pub fn score(&self) -> [u32; 2] {
        self.score
    }
}

pub struct PlaybackSession {
    record: Arc<GameRecord>,
    cursor: PlaybackCursor,
    config: PlaybackConfig,
    finished: bool,
}

impl PlaybackSession {
    pub fn new(
        record: Arc<GameRecord>,
        config: PlaybackConfig,
        token: CancellationToken,
    ) -> Result<Self, PlaybackError> {
        config.validate()?;
        Ok(Self { record, cursor: PlaybackCursor::new(token), config, finished: false })
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cursor.token
    }

    /// True once the completion message has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Consumer-pull mode: the next message with no pacing. `None` after
    /// completion or once the token is cancelled.
    pub fn poll_next(&mut self) -> Option<PlaybackMessage> {
        if self.finished || self.cursor.token.is_cancelled() {
            return None;
        }
        let end = self.batch_end();
        if end > self.cursor.next_index {
            Some(self.take_batch(end))
        } else {
            Some(self.complete())
        }
    }

    /// Timer-driven mode. Suspends only in `ticks.wait` and `sink.deliver`.
    ///
    /// Calling `run` on a finished session delivers nothing and reports zero
    /// batches.
    pub fn run<S, T>(&mut self, sink: &mut S, ticks: &mut T) -> Result<PlaybackOutcome, PlaybackError>
    where
        S: PlaybackSink + ?Sized,
        T: TickSource + ?Sized,
    {
        let mut batches = 0;
        let mut events = 0;
        let mut delivered = 0;

        if self.finished {
            return Ok(PlaybackOutcome::Completed { batches, events });
        }

        while self.cursor.next_index < self.record.log.len() {
            if let Some(outcome) = self.check_cancelled() {
                return Ok(outcome);
            }

            let end = self.batch_end();
            let elapsed = self.record.log.as_slice()[end - 1]
                .game_secs
                .saturating_sub(self.cursor.last_game_secs);
            ticks.wait(self.config.pacing.delay(elapsed));

            if let Some(outcome) = self.check_cancelled() {
                return Ok(outcome);
            }

            let count = end - self.cursor.next_index;
            let message = self.take_batch(end);
            if !sink.deliver(message) {
                debug!("Game {} playback sink closed after {} messages", self.record.game_id, delivered);
                return Err(PlaybackError::SinkClosed { delivered });
            }
            delivered += 1;
            batches += 1;
            events += count;
            debug!(
                "Game {} delivered batch {} (events up to {})",
                self.record.game_id, batches, self.cursor.next_index
            );
        }

        if let Some(outcome) = self.check_cancelled() {
            return Ok(outcome);
        }
        let completion = self.complete();
        if !sink.deliver(completion) {
            return Err(PlaybackError::SinkClosed { delivered });
        }
        debug!("Game {} playback complete: {} batches", self.record.game_id, batches);

        Ok(PlaybackOutcome::Completed { batches, events })
    }

    fn check_cancelled(&self) -> Option<PlaybackOutcome> {
        if self.cursor.token.is_cancelled() {
            debug!(
                "Game {} playback cancelled at index {}",
                self.record.game_id, self.cursor.next_index
            );
            Some(PlaybackOutcome::Cancelled { stopped_at: self.cursor.next_index })
        } else {
            None
        }
    }

    fn batch_end(&self) -> usize {
        (self.cursor.next_index + self.config.batch_size).min(self.record.log.len())
    }

    fn take_batch(&mut self, end: usize) -> PlaybackMessage {
        let first_index = self.cursor.next_index;
        let events = self.record.log.as_slice()[first_index..end].to_vec();

        let batch_score = fold_score(&events);
        self.cursor.score[0] += batch_score[0];
        self.cursor.score[1] += batch_score[1];
        if let Some(last) = events.last() {
            self.cursor.last_game_secs = last.game_secs;
        }
        self.cursor.next_index = end;

        PlaybackMessage::Batch { events, first_index, next_index: end, score: self.cursor.score }
    }

    fn complete(&mut self) -> PlaybackMessage {
        self.finished = true;
        PlaybackMessage::Completed(Box::new(self.record.box_score.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;
    use crate::engine::game_sim::test_fixtures::create_test_team;
    use crate::engine::{AggregateInput, BoxScoreAggregator, EventLog, GameConfig, GameEngine};
    use crate::models::{Side, TeamCounters};
    use crate::playback::{FnSink, HookTicks, ManualTicks, PacingPolicy};

    fn simulated(seed: u64) -> Arc<GameRecord> {
        let output = GameEngine::new(
            create_test_team(Side::Home, "Home", 100),
            create_test_team(Side::Away, "Away", 200),
            GameConfig::default(),
            seed,
        )
        .unwrap()
        .simulate()
        .unwrap();
        Arc::new(GameRecord::from_sim(seed, seed, output).unwrap())
    }

    fn empty_record() -> Arc<GameRecord> {
        let log = EventLog::new();
        let box_score = BoxScoreAggregator::aggregate(AggregateInput {
            game_id: 0,
            log: &log,
            teams: [
                create_test_team(Side::Home, "Home", 100),
                create_test_team(Side::Away, "Away", 200),
            ],
            counters: BTreeMap::new(),
            team_stats: [TeamCounters::default(); 2],
            tally: [0, 0],
            period_scores: Vec::new(),
            regulation_periods: 4,
            overtimes: 0,
        })
        .unwrap();
        Arc::new(GameRecord { game_id: 0, seed: 0, log, box_score })
    }

    fn session(record: &Arc<GameRecord>, batch_size: usize) -> PlaybackSession {
        PlaybackSession::new(
            Arc::clone(record),
            PlaybackConfig::fixed(5, batch_size),
            CancellationToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_batch_count_and_completion() {
        let record = simulated(17);
        let n = record.log.len();

        for batch_size in [1, 7, 25, n + 3] {
            let mut messages: Vec<PlaybackMessage> = Vec::new();
            let mut ticks = ManualTicks::new();
            let outcome = session(&record, batch_size).run(&mut messages, &mut ticks).unwrap();

            let expected_batches = n.div_ceil(batch_size);
            assert_eq!(outcome, PlaybackOutcome::Completed { batches: expected_batches, events: n });
            assert_eq!(messages.len(), expected_batches + 1);
            assert_eq!(ticks.requested.len(), expected_batches);
            assert!(ticks.requested.iter().all(|d| *d == Duration::from_millis(5)));

            let mut replayed = Vec::new();
            let mut expected_first = 0;
            for message in &messages[..expected_batches] {
                let PlaybackMessage::Batch { events, first_index, next_index, score } = message else {
                    panic!("expected a batch, got {:?}", message);
                };
                assert_eq!(*first_index, expected_first);
                assert_eq!(*next_index, first_index + events.len());
                assert_eq!(*score, record.log.replay_score(*next_index));
                expected_first = *next_index;
                replayed.extend(events.iter().cloned());
            }
            assert_eq!(replayed.as_slice(), record.log.as_slice());
            assert_eq!(
                messages.last(),
                Some(&PlaybackMessage::Completed(Box::new(record.box_score.clone())))
            );
        }
    }

    #[test]
    fn test_empty_log_only_completes() {
        let record = empty_record();
        let mut messages: Vec<PlaybackMessage> = Vec::new();
        let mut ticks = ManualTicks::new();
        let outcome = session(&record, 4).run(&mut messages, &mut ticks).unwrap();

        assert_eq!(outcome, PlaybackOutcome::Completed { batches: 0, events: 0 });
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], PlaybackMessage::Completed(_)));
        assert!(ticks.requested.is_empty());
    }

    #[test]
    fn test_cancel_before_first_batch() {
        let record = simulated(3);
        let mut playback = session(&record, 10);
        playback.token().cancel();

        let mut messages: Vec<PlaybackMessage> = Vec::new();
        let outcome = playback.run(&mut messages, &mut ManualTicks::new()).unwrap();
        assert_eq!(outcome, PlaybackOutcome::Cancelled { stopped_at: 0 });
        assert!(messages.is_empty());
        assert_eq!(playback.poll_next(), None);
    }

    #[test]
    fn test_cancel_after_k_batches() {
        let record = simulated(4);
        let batch_size = 6;
        let k = 3;
        assert!(record.log.len() > (k + 1) * batch_size);

        let mut playback = session(&record, batch_size);
        let token = playback.token().clone();
        // Cancel during the wait that precedes batch k + 1.
        let mut ticks = HookTicks::new(move |tick| {
            if tick == k + 1 {
                token.cancel();
            }
        });

        let mut messages: Vec<PlaybackMessage> = Vec::new();
        let outcome = playback.run(&mut messages, &mut ticks).unwrap();
        assert_eq!(outcome, PlaybackOutcome::Cancelled { stopped_at: k * batch_size });
        assert_eq!(messages.len(), k);
        assert_eq!(playback.cursor().next_index, k * batch_size);
    }

    #[test]
    fn test_poll_matches_run() {
        let record = simulated(8);
        let mut pushed: Vec<PlaybackMessage> = Vec::new();
        session(&record, 9).run(&mut pushed, &mut ManualTicks::new()).unwrap();

        let mut pulled = Vec::new();
        let mut playback = session(&record, 9);
        while let Some(message) = playback.poll_next() {
            pulled.push(message);
        }
        assert_eq!(pulled, pushed);
        assert!(playback.is_finished());
        assert_eq!(playback.cursor().score(), record.box_score.final_score);
    }

    #[test]
    fn test_game_clock_pacing_follows_elapsed_time() {
        let record = simulated(12);
        let config = PlaybackConfig {
            pacing: PacingPolicy::GameClock { speed: 1.0, min_delay_ms: 0, max_delay_ms: u64::MAX },
            batch_size: 1,
        };
        let mut playback =
            PlaybackSession::new(Arc::clone(&record), config, CancellationToken::new()).unwrap();
        let mut ticks = ManualTicks::new();
        playback.run(&mut Vec::<PlaybackMessage>::new(), &mut ticks).unwrap();

        let last_secs = record.log.last().map_or(0, |e| e.game_secs);
        assert_eq!(ticks.total(), Duration::from_secs(last_secs as u64));
    }

    #[test]
    fn test_channel_sink_with_backpressure() {
        let record = simulated(21);
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut playback = session(&record, 16);

        let consumer = std::thread::spawn(move || rx.iter().collect::<Vec<PlaybackMessage>>());
        let mut sender = tx;
        let outcome = playback.run(&mut sender, &mut ManualTicks::new()).unwrap();
        drop(sender);

        let received = consumer.join().unwrap();
        let PlaybackOutcome::Completed { batches, .. } = outcome else {
            panic!("playback did not complete: {:?}", outcome);
        };
        assert_eq!(received.len(), batches + 1);
        assert!(matches!(received.last(), Some(PlaybackMessage::Completed(_))));
    }

    #[test]
    fn test_closed_sink_is_an_error() {
        let record = simulated(22);
        let (tx, rx) = crossbeam_channel::bounded::<PlaybackMessage>(1);
        drop(rx);
        let mut sender = tx;

        let result = session(&record, 16).run(&mut sender, &mut ManualTicks::new());
        assert_eq!(result, Err(PlaybackError::SinkClosed { delivered: 0 }));
    }

    #[test]
    fn test_viewers_share_one_record() {
        let record = simulated(30);
        let handles: Vec<_> = [4, 11]
            .into_iter()
            .map(|batch_size| {
                let record = Arc::clone(&record);
                std::thread::spawn(move || {
                    let mut count = 0;
                    let mut sink = FnSink(|_message: PlaybackMessage| count += 1);
                    session(&record, batch_size).run(&mut sink, &mut ManualTicks::new()).unwrap();
                    (batch_size, count)
                })
            })
            .collect();

        for handle in handles {
            let (batch_size, count) = handle.join().unwrap();
            assert_eq!(count, record.log.len().div_ceil(batch_size) + 1);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let record = empty_record();
        let result = PlaybackSession::new(record, PlaybackConfig::fixed(1, 0), CancellationToken::new());
        assert!(matches!(result, Err(PlaybackError::InvalidConfig(_))));
    }
}

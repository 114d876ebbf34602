//! Live playback of a finished game.
//!
//! A [`PlaybackSession`] walks one [`GameRecord`](crate::engine::GameRecord)
//! in batches, pacing delivery either by a fixed delay or by the game clock.
//! The record is shared behind an `Arc`, so any number of viewers can replay
//! the same game independently, each with its own cursor and token.

mod cancel;
mod pacing;
mod session;
mod sink;
mod tick;

use serde::{Deserialize, Serialize};

pub use cancel::CancellationToken;
pub use pacing::{PacingPolicy, PlaybackConfig};
pub use session::{PlaybackCursor, PlaybackSession};
pub use sink::{FnSink, PlaybackSink};
pub use tick::{HookTicks, ManualTicks, ThreadSleep, TickSource};

pub use crate::error::PlaybackError;
use crate::models::{BoxScore, GameEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackMessage {
    Batch {
        events: Vec<GameEvent>,
        /// Log index of `events[0]`.
        first_index: usize,
        /// Log index one past the last event.
        next_index: usize,
        /// Cumulative `[home, away]` score after this batch.
        score: [u32; 2],
    },
    Completed(Box<BoxScore>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackOutcome {
    Completed { batches: usize, events: usize },
    /// `stopped_at` is the log index of the first undelivered event.
    Cancelled { stopped_at: usize },
}

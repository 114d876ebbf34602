use crossbeam_channel::Sender;

use super::PlaybackMessage;

/// Receiver side of a playback session.
///
/// `deliver` may block; the session waits rather than dropping a message.
/// Returning `false` means the consumer is gone.
pub trait PlaybackSink {
    fn deliver(&mut self, message: PlaybackMessage) -> bool;
}

impl PlaybackSink for Vec<PlaybackMessage> {
    fn deliver(&mut self, message: PlaybackMessage) -> bool {
        self.push(message);
        true
    }
}

/// A bounded channel blocks the session while it is full.
impl PlaybackSink for Sender<PlaybackMessage> {
    fn deliver(&mut self, message: PlaybackMessage) -> bool {
        self.send(message).is_ok()
    }
}

/// Adapts a closure into a sink that never closes.
pub struct FnSink<F>(pub F);

impl<F: FnMut(PlaybackMessage)> PlaybackSink for FnSink<F> {
    fn deliver(&mut self, message: PlaybackMessage) -> bool {
        (self.0)(message);
        true
    }
}

use std::time::Duration;

/// Where a playback session suspends between batches.
pub trait TickSource {
    fn wait(&mut self, delay: Duration);
}

/// Real timer backed by `std::thread::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl TickSource for ThreadSleep {
    fn wait(&mut self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Returns immediately and remembers every requested delay.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks {
    pub requested: Vec<Duration>,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> Duration {
        self.requested.iter().sum()
    }
}

impl TickSource for ManualTicks {
    fn wait(&mut self, delay: Duration) {
        self.requested.push(delay);
    }
}

/// Runs a hook on every tick, after recording the delay. Lets tests act
/// between the wait and the delivery of a batch.
pub struct HookTicks<F> {
    pub inner: ManualTicks,
    hook: F,
}

impl<F: FnMut(usize)> HookTicks<F> {
    pub fn new(hook: F) -> Self {
        Self { inner: ManualTicks::new(), hook }
    }
}

impl<F: FnMut(usize)> TickSource for HookTicks<F> {
    fn wait(&mut self, delay: Duration) {
        self.inner.wait(delay);
        (self.hook)(self.inner.requested.len());
    }
}

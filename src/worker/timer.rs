use std::time::Duration;

/// Counts whole time units down from a fixed duration.
///
/// `tick` is the only thing that advances it, and each tick also waits one
/// unit of wall time, so a loop of ticks paces itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownTimer {
    duration: u64,
    elapsed: u64,
    remaining: u64,
    unit: Duration,
}

impl CountdownTimer {
    pub fn new(unit: Duration) -> Self {
        Self {
            duration: 0,
            elapsed: 0,
            remaining: 0,
            unit,
        }
    }

    pub fn arm(&mut self, duration: u64) {
        self.duration = duration;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
        self.remaining = self.duration;
    }

    /// Advance one unit, then sleep for one unit.
    pub async fn tick(&mut self) {
        self.advance();
        tokio::time::sleep(self.unit).await;
    }

    fn advance(&mut self) {
        self.elapsed = (self.elapsed + 1).min(self.duration);
        self.remaining = self.remaining.saturating_sub(1);
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0 || self.elapsed == self.duration
    }

    /// Zero duration: runs until stopped by hand.
    pub fn is_unbounded(&self) -> bool {
        self.duration == 0
    }

    /// Run `action` once if the countdown is over.
    pub fn auto_stop<T>(&self, action: impl FnOnce() -> T) -> Option<T> {
        self.is_finished().then(action)
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn unit(&self) -> Duration {
        self.unit
    }
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

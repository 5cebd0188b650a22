//! Elapsed-time clock for a match.

use std::time::Instant;

/// Counts whole seconds since the match started.
///
/// The displayed value is only recomputed by [`MatchClock::tick`], which the
/// host calls on a fixed interval. Once stopped, ticks are ignored and the
/// last value stays frozen.
#[derive(Debug, Clone, Default)]
pub struct MatchClock {
    /// When the match started (if running)
    started_at: Option<Instant>,
    /// Last computed value
    elapsed_secs: u64,
    running: bool,
}

impl MatchClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `now`, resetting the displayed value to zero.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.elapsed_secs = 0;
        self.running = true;
    }

    /// Freeze the clock at its last computed value.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Recompute the elapsed seconds. Returns true if the value changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let Some(started) = self.started_at else {
            return false;
        };
        let secs = now.saturating_duration_since(started).as_secs();
        // Instants are monotonic, but never let a late tick move the display backwards
        if secs > self.elapsed_secs {
            self.elapsed_secs = secs;
            return true;
        }
        false
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }
}

/// Format seconds as HH:MM:SS
pub fn format_elapsed(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod clock_tests;

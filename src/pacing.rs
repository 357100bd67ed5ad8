//! Tick scheduling for the hosting event loop
//!
//! The board only needs ticks while something animates. When it does, the
//! host waits at least one frame, and longer if the last update was slow,
//! so the simulation stays under its CPU budget.

use std::time::Duration;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPacer {
    pub max_fps: f64,
    pub max_cpu_load: f64,
}

impl Default for TickPacer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl TickPacer {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_fps: settings.max_fps,
            max_cpu_load: settings.max_cpu_load,
        }
    }

    /// Shortest allowed gap between ticks
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.max_fps)
    }

    /// Delay before the next tick, or `None` to stop ticking until input arrives
    pub fn next_delay(&self, last_update: Duration, has_pending_animations: bool) -> Option<Duration> {
        if !has_pending_animations {
            return None;
        }
        let budgeted = Duration::from_secs_f64(last_update.as_secs_f64() / self.max_cpu_load);
        Some(budgeted.max(self.frame_duration()))
    }
}

//! Per-frame animation time.
//!
//! The sky follows wall-clock seconds. The water follows either the same
//! clock or a fixed 1/60 s per rendered frame, selected by [`WaterClock`].
//! Fixed-step time is computed as `frames * step` rather than summed, so it
//! is exact after any number of frames.

use std::time::Duration;

use aether_config::WaterClock;
use tracing::debug;

/// Water time added per rendered frame in [`WaterClock::FixedStep`] mode.
pub const WATER_STEP: f64 = 1.0 / 60.0;

/// Frames further apart than this are reported as stalls.
pub const STALL_THRESHOLD: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct AnimationClock {
    water_clock: WaterClock,
    elapsed: Duration,
    frame_count: u64,
}

impl AnimationClock {
    pub fn new(water_clock: WaterClock) -> Self {
        Self {
            water_clock,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance one frame. `elapsed` is the wall-clock time since start, not a delta.
    pub fn tick(&mut self, elapsed: Duration) {
        let delta = elapsed.saturating_sub(self.elapsed);
        if self.frame_count > 0 && delta > STALL_THRESHOLD {
            debug!("Frame stalled for {:.1}ms", delta.as_secs_f64() * 1000.0);
        }
        self.elapsed = elapsed.max(self.elapsed);
        self.frame_count += 1;
    }

    /// Sky time.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn water_time(&self) -> f64 {
        match self.water_clock {
            WaterClock::FixedStep => self.frame_count as f64 * WATER_STEP,
            WaterClock::WallClock => self.elapsed_seconds(),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn water_clock(&self) -> WaterClock {
        self.water_clock
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(WaterClock::default())
    }
}

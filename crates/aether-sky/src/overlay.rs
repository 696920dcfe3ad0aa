//! Frame timing observers.

use std::time::Duration;

use tracing::info;

/// Notified once per rendered frame. Observers cannot affect the frame.
pub trait FrameObserver {
    /// `elapsed` is wall-clock time since start.
    fn on_frame(&mut self, elapsed: Duration);
}

/// Logs a smoothed frame rate every `interval`.
pub struct FpsReporter {
    interval: Duration,
    last_frame: Option<Duration>,
    last_report: Duration,
    frame_time_ema: f64,
    frames_since_report: u32,
}

impl FpsReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_frame: None,
            last_report: Duration::ZERO,
            frame_time_ema: 1.0 / 60.0,
            frames_since_report: 0,
        }
    }

    pub fn fps(&self) -> f64 {
        if self.frame_time_ema > 0.0 {
            1.0 / self.frame_time_ema
        } else {
            0.0
        }
    }

    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time_ema * 1000.0
    }
}

impl FrameObserver for FpsReporter {
    fn on_frame(&mut self, elapsed: Duration) {
        if let Some(last) = self.last_frame {
            let dt = elapsed.saturating_sub(last).as_secs_f64();
            self.frame_time_ema = self.frame_time_ema * 0.9 + dt * 0.1;
        }
        self.last_frame = Some(elapsed);
        self.frames_since_report += 1;

        if elapsed.saturating_sub(self.last_report) >= self.interval {
            info!(
                "{:.1} fps ({:.2}ms, {} frames)",
                self.fps(),
                self.frame_time_ms(),
                self.frames_since_report
            );
            self.last_report = elapsed;
            self.frames_since_report = 0;
        }
    }
}

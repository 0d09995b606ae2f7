//! Frame timing counters for the render loop.

use log::{debug, info};
use std::collections::VecDeque;
use std::time::Duration;

const WINDOW: usize = 120;
const SUMMARY_INTERVAL: u64 = 600;

/// Rolling frame-time statistics. Over-budget frames are counted and logged;
/// a summary line goes out every `SUMMARY_INTERVAL` frames.
pub struct PerfMonitor {
    frame_times: VecDeque<Duration>,
    frames: u64,
    over_budget: u64,
}

impl PerfMonitor {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(WINDOW),
            frames: 0,
            over_budget: 0,
        }
    }

    pub fn record(&mut self, frame_time: Duration, budget: Duration) {
        self.frames += 1;
        if self.frame_times.len() == WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);

        if frame_time > budget {
            self.over_budget += 1;
            debug!(
                "frame took {:.1}ms of a {:.1}ms budget",
                frame_time.as_secs_f64() * 1000.0,
                budget.as_secs_f64() * 1000.0
            );
        }
        if self.frames % SUMMARY_INTERVAL == 0 {
            info!(
                "{} frames rendered, avg {:.2}ms, {} over budget",
                self.frames,
                self.average_frame_ms(),
                self.over_budget
            );
        }
    }

    pub fn average_frame_ms(&self) -> f64 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.frame_times.iter().sum();
        total.as_secs_f64() * 1000.0 / self.frame_times.len() as f64
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn over_budget(&self) -> u64 {
        self.over_budget
    }
}

impl Default for PerfMonitor {
    fn default() -> Self {
        Self::new()
    }
}

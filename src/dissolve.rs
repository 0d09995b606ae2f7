//! Per-LED crossfade between two scene/effect/palette patterns.
//!
//! Both sides keep animating while the fade runs; each LED follows its own
//! window from the active dissolve pattern. LEDs past the end of the pattern
//! switch to the target immediately.

use crate::color::{interpolate_color, Rgb, BLACK};
use crate::types::{DissolvePattern, FadeWindow, Selection};
use std::time::Instant;

/// The fading-out side of a dissolve.
#[derive(Clone, Debug)]
pub enum DissolveSource {
    /// A live pattern, re-rendered every frame.
    Selection(Selection),
    /// A frozen frame, captured when a running dissolve was replaced
    /// mid-flight by a new trigger.
    Frame(Vec<Rgb>),
}

/// A running transition from `source` to `target`.
#[derive(Clone, Debug)]
pub struct Dissolve {
    pub t0: Instant,
    pub pattern: DissolvePattern,
    pub source: DissolveSource,
    pub target: Selection,
}

impl Dissolve {
    pub fn new(pattern: DissolvePattern, source: DissolveSource, target: Selection) -> Self {
        Self {
            t0: Instant::now(),
            pattern,
            source,
            target,
        }
    }

    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.t0).as_millis() as u64
    }

    /// Blend the two rendered frames according to each LED's fade window.
    pub fn merged_frame(&self, source: &[Rgb], target: &[Rgb], now: Instant) -> Vec<Rgb> {
        let t = self.elapsed_ms(now);
        let led_count = target.len();
        let mut out = Vec::with_capacity(led_count);
        for led in 0..led_count {
            let from = source.get(led).copied().unwrap_or(BLACK);
            let to = target[led];
            let color = match self.pattern.get(led) {
                Some(window) => blend_led(window, t, from, to),
                None => to,
            };
            out.push(color);
        }
        out
    }

    /// True once every covered LED has run out its full window. Uncovered
    /// LEDs switched at `t = 0` and never hold a transition open.
    pub fn is_complete(&self, now: Instant, led_count: usize) -> bool {
        let t = self.elapsed_ms(now);
        self.pattern
            .iter()
            .take(led_count)
            .all(|window| t >= window.end_ms())
    }
}

fn blend_led(window: &FadeWindow, t: u64, source: Rgb, target: Rgb) -> Rgb {
    if t < window.start_ms {
        return source;
    }
    let mut local = t - window.start_ms;
    if local < window.fade_in_ms {
        let f = local as f32 / window.fade_in_ms as f32;
        return interpolate_color(source, target, f);
    }
    local -= window.fade_in_ms;
    if local < window.hold_ms {
        return target;
    }
    local -= window.hold_ms;
    if local < window.fade_out_ms {
        // The documented brief return toward the source before committing.
        let f = local as f32 / window.fade_out_ms as f32;
        return interpolate_color(target, source, f);
    }
    target
}

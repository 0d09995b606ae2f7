use crate::color::{
    calculate_segment_color, interpolate_color, interpolate_transparency, Rgb, BLACK,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Every palette carries exactly this many color entries.
pub const PALETTE_SIZE: usize = 6;

fn default_led_count() -> usize {
    225
}
fn default_fps() -> u32 {
    60
}
fn default_true() -> bool {
    true
}
fn default_move_range() -> [i64; 2] {
    [0, 224]
}

/// Look up a palette entry by color index. Out-of-range indices resolve to
/// black rather than failing the frame.
pub fn palette_color(palette: &[Rgb], index: i64) -> Rgb {
    if index < 0 {
        return BLACK;
    }
    palette.get(index as usize).copied().unwrap_or(BLACK)
}

/// One step of a looping dimmer envelope: a linear brightness ramp over a
/// duration, brightness in integer percent.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(from = "(i64, i64, i64)", into = "(i64, i64, i64)")]
pub struct DimmerStep {
    pub duration_ms: u64,
    pub start_brightness: u8,
    pub end_brightness: u8,
}

impl From<(i64, i64, i64)> for DimmerStep {
    fn from((duration, start, end): (i64, i64, i64)) -> Self {
        // Negative durations are treated as zero.
        Self {
            duration_ms: duration.max(0) as u64,
            start_brightness: start.clamp(0, 100) as u8,
            end_brightness: end.clamp(0, 100) as u8,
        }
    }
}

impl From<DimmerStep> for (i64, i64, i64) {
    fn from(step: DimmerStep) -> Self {
        (
            step.duration_ms as i64,
            step.start_brightness as i64,
            step.end_brightness as i64,
        )
    }
}

/// Evaluate a dimmer envelope at `elapsed_ms` since segment birth.
///
/// The envelope loops over its total duration. An empty or zero-length
/// envelope means full brightness.
pub fn envelope_value(steps: &[DimmerStep], elapsed_ms: u64) -> f32 {
    let total: u64 = steps.iter().map(|s| s.duration_ms).sum();
    if total == 0 {
        return 1.0;
    }
    let mut local = elapsed_ms % total;
    for step in steps {
        if local < step.duration_ms {
            let progress = local as f32 / step.duration_ms as f32;
            let start = step.start_brightness as f32;
            let end = step.end_brightness as f32;
            return ((start + (end - start) * progress) / 100.0).clamp(0.0, 1.0);
        }
        local -= step.duration_ms;
    }
    // Unreachable while total > 0; hold the final brightness regardless.
    steps
        .last()
        .map(|s| s.end_brightness as f32 / 100.0)
        .unwrap_or(1.0)
}

/// The atomic visual primitive: a run of color points with per-part lengths,
/// movement over a bounded range and a looping dimmer envelope.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Segment {
    #[serde(default)]
    pub segment_id: u32,
    /// Palette color indices, one per color point.
    #[serde(default)]
    pub color: Vec<i64>,
    /// Transparency per color point, 0.0 opaque .. 1.0 black.
    #[serde(default)]
    pub transparency: Vec<f32>,
    /// LED count of each part between consecutive color points.
    #[serde(default)]
    pub length: Vec<i64>,
    /// LEDs per second, signed.
    #[serde(default)]
    pub move_speed: f32,
    /// Bounds for the segment's first LED, inclusive.
    #[serde(default = "default_move_range")]
    pub move_range: [i64; 2],
    #[serde(default)]
    pub initial_position: i64,
    #[serde(skip)]
    pub current_position: i64,
    /// true: bounce at the range ends; false: wrap around.
    #[serde(default = "default_true")]
    pub is_edge_reflect: bool,
    #[serde(default)]
    pub dimmer_time: Vec<DimmerStep>,
    #[serde(skip, default = "Instant::now")]
    pub segment_start_time: Instant,
    #[serde(skip)]
    pub fractional_accumulator: f32,
}

impl Segment {
    pub fn new(segment_id: u32) -> Self {
        Self {
            segment_id,
            color: Vec::new(),
            transparency: Vec::new(),
            length: Vec::new(),
            move_speed: 0.0,
            move_range: default_move_range(),
            initial_position: 0,
            current_position: 0,
            is_edge_reflect: true,
            dimmer_time: Vec::new(),
            segment_start_time: Instant::now(),
            fractional_accumulator: 0.0,
        }
    }

    /// Normalize freshly ingested data so the render path never revalidates.
    pub fn sanitize(&mut self) {
        for t in &mut self.transparency {
            *t = t.clamp(0.0, 1.0);
        }
        while self.transparency.len() < self.color.len() {
            self.transparency.push(0.0);
        }
        self.transparency.truncate(self.color.len());
        self.length.truncate(self.color.len());
        for len in &mut self.length {
            *len = (*len).max(0);
        }
        if self.move_range[0] > self.move_range[1] {
            self.move_range.swap(0, 1);
        }
        self.current_position = self.initial_position;
        self.fractional_accumulator = 0.0;
    }

    /// Total LEDs this segment emits: the part lengths plus one LED for each
    /// surplus color point.
    pub fn total_led_count(&self) -> usize {
        let parts: i64 = self.length.iter().map(|l| (*l).max(0)).sum();
        parts as usize + self.color.len().saturating_sub(self.length.len())
    }

    /// Dimmer envelope value at `now`, on the wall clock since segment birth.
    pub fn brightness_at(&self, now: Instant) -> f32 {
        let elapsed = now
            .saturating_duration_since(self.segment_start_time)
            .as_millis() as u64;
        envelope_value(&self.dimmer_time, elapsed)
    }

    /// Advance the position by one frame.
    ///
    /// The per-frame step is `move_speed * speed_factor / fps`; whatever does
    /// not reach a whole LED is carried to the next frame. Reflection mirrors
    /// the position back into range and flips the stored speed sign so
    /// subsequent frames continue in the new direction.
    pub fn advance(&mut self, fps: f32, speed_factor: f32) {
        if fps <= 0.0 {
            return;
        }
        let delta = self.move_speed * speed_factor / fps + self.fractional_accumulator;
        let whole = delta.trunc();
        self.fractional_accumulator = delta - whole;

        let mut p = self.current_position + whole as i64;
        let [lo, hi] = self.move_range;
        if self.is_edge_reflect {
            if hi - lo <= 0 {
                p = lo;
            } else {
                for _ in 0..2 {
                    if p < lo {
                        p = lo + (lo - p);
                        self.move_speed = -self.move_speed;
                    } else if p > hi {
                        p = hi - (p - hi);
                        self.move_speed = -self.move_speed;
                    } else {
                        break;
                    }
                }
                p = p.clamp(lo, hi);
            }
        } else {
            p = lo + (p - lo).rem_euclid(hi - lo + 1);
        }
        self.current_position = p;
    }

    /// Render this segment's LED contribution at `now`.
    ///
    /// Each part ramps from its color point toward the next one when a next
    /// point exists; surplus color points emit trailing single solid LEDs.
    /// A fully dark envelope contributes nothing.
    pub fn render(&self, palette: &[Rgb], now: Instant) -> Vec<Rgb> {
        let brightness = self.brightness_at(now);
        if brightness <= 0.0 {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(self.total_led_count());
        for (part, &part_len) in self.length.iter().enumerate() {
            if part_len <= 0 {
                continue;
            }
            let color_index = self.color.get(part).copied().unwrap_or(0);
            let transparency = self.transparency.get(part).copied().unwrap_or(0.0);
            let next = if part + 1 < self.color.len() {
                Some((
                    self.color[part + 1],
                    self.transparency.get(part + 1).copied().unwrap_or(0.0),
                ))
            } else {
                None
            };

            let part_len = part_len as usize;
            for led in 0..part_len {
                let (color, tau) = match next {
                    Some((next_index, next_transparency)) if part_len > 1 => {
                        let f = led as f32 / (part_len - 1) as f32;
                        (
                            interpolate_color(
                                palette_color(palette, color_index),
                                palette_color(palette, next_index),
                                f,
                            ),
                            interpolate_transparency(transparency, next_transparency, f),
                        )
                    }
                    _ => (palette_color(palette, color_index), transparency),
                };
                out.push(calculate_segment_color(color, tau, brightness));
            }
        }

        for extra in self.length.len()..self.color.len() {
            let color = palette_color(palette, self.color[extra]);
            let transparency = self.transparency.get(extra).copied().unwrap_or(0.0);
            out.push(calculate_segment_color(color, transparency, brightness));
        }
        out
    }
}

/// An ordered list of segments composited onto the strip in list order.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Effect {
    #[serde(default)]
    pub effect_id: u32,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Effect {
    pub fn sanitize(&mut self) {
        for segment in &mut self.segments {
            segment.sanitize();
        }
    }

    /// Run the movement integrator over every segment.
    pub fn advance_all(&mut self, fps: f32, speed_factor: f32) {
        for segment in &mut self.segments {
            segment.advance(fps, speed_factor);
        }
    }

    /// Composite all segments onto `frame`. Later segments overwrite earlier
    /// ones; indices outside the strip are discarded. Transparency is already
    /// folded into the segment colors, so overwrite is the whole story.
    pub fn render_to(&self, palette: &[Rgb], now: Instant, frame: &mut [Rgb]) {
        frame.fill(BLACK);
        for segment in &self.segments {
            let colors = segment.render(palette, now);
            let start = segment.current_position;
            for (offset, color) in colors.into_iter().enumerate() {
                let index = start + offset as i64;
                if index >= 0 && (index as usize) < frame.len() {
                    frame[index as usize] = color;
                }
            }
        }
    }
}

/// Strip-level container: physical properties plus the palette and effect
/// sets, with the default effect/palette selection baked in.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Scene {
    #[serde(default)]
    pub scene_id: u32,
    #[serde(default = "default_led_count")]
    pub led_count: usize,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default)]
    pub current_effect_id: usize,
    #[serde(default)]
    pub current_palette_id: usize,
    #[serde(default)]
    pub palettes: Vec<Vec<Rgb>>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Scene {
    pub fn sanitize(&mut self) {
        self.led_count = self.led_count.max(1);
        self.fps = self.fps.clamp(1, 240);
        for palette in &mut self.palettes {
            palette.resize(PALETTE_SIZE, BLACK);
        }
        for effect in &mut self.effects {
            effect.sanitize();
        }
    }

    pub fn palette(&self, index: usize) -> &[Rgb] {
        self.palettes.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The loaded show: an ordered list of scenes.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SceneSet {
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl SceneSet {
    pub fn sanitize(&mut self) {
        for scene in &mut self.scenes {
            scene.sanitize();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

/// A (scene, effect, palette) triple, all zero-origin indices into the
/// loaded arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Selection {
    pub scene: usize,
    pub effect: usize,
    pub palette: usize,
}

/// Per-LED dissolve timing: wait, crossfade to the target, hold it, then
/// optionally ease back toward the source before committing.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(from = "(i64, i64, i64, i64)", into = "(i64, i64, i64, i64)")]
pub struct FadeWindow {
    pub start_ms: u64,
    pub fade_in_ms: u64,
    pub hold_ms: u64,
    pub fade_out_ms: u64,
}

impl FadeWindow {
    /// Time at which this LED's transition is complete.
    pub fn end_ms(&self) -> u64 {
        self.start_ms + self.fade_in_ms + self.hold_ms + self.fade_out_ms
    }
}

impl From<(i64, i64, i64, i64)> for FadeWindow {
    fn from((start, fade_in, hold, fade_out): (i64, i64, i64, i64)) -> Self {
        Self {
            start_ms: start.max(0) as u64,
            fade_in_ms: fade_in.max(0) as u64,
            hold_ms: hold.max(0) as u64,
            fade_out_ms: fade_out.max(0) as u64,
        }
    }
}

impl From<FadeWindow> for (i64, i64, i64, i64) {
    fn from(w: FadeWindow) -> Self {
        (
            w.start_ms as i64,
            w.fade_in_ms as i64,
            w.hold_ms as i64,
            w.fade_out_ms as i64,
        )
    }
}

/// One dissolve pattern: fade windows indexed by LED position. A pattern
/// shorter than the strip covers a prefix; uncovered LEDs switch instantly.
pub type DissolvePattern = Vec<FadeWindow>;

/// All loaded dissolve patterns.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DissolveSet {
    #[serde(default)]
    pub dissolve_patterns: Vec<DissolvePattern>,
}

impl DissolveSet {
    pub fn pattern(&self, index: usize) -> Option<&DissolvePattern> {
        self.dissolve_patterns.get(index)
    }
}

//! Pure color math over RGB triples.
//!
//! All narrowing conversions truncate toward zero; `as u8` on an f32 also
//! saturates at the type bounds, so intermediate values never wrap.

/// One LED color.
pub type Rgb = [u8; 3];

pub const BLACK: Rgb = [0, 0, 0];

/// Apply transparency to a color. 0.0 is fully opaque, 1.0 is black.
pub fn apply_transparency(color: Rgb, transparency: f32) -> Rgb {
    let transparency = transparency.clamp(0.0, 1.0);
    if transparency >= 1.0 {
        return BLACK;
    }
    let alpha = 1.0 - transparency;
    color.map(|c| (c as f32 * alpha) as u8)
}

/// Scale a color by a brightness factor in [0, 1].
pub fn apply_brightness(color: Rgb, brightness: f32) -> Rgb {
    let brightness = brightness.clamp(0.0, 1.0);
    color.map(|c| (c as f32 * brightness) as u8)
}

/// Linear interpolation between two colors, `factor` clamped to [0, 1].
pub fn interpolate_color(from: Rgb, to: Rgb, factor: f32) -> Rgb {
    let factor = factor.clamp(0.0, 1.0);
    let mut out = BLACK;
    for i in 0..3 {
        out[i] = (from[i] as f32 + (to[i] as f32 - from[i] as f32) * factor) as u8;
    }
    out
}

/// Linear interpolation between two transparency values.
pub fn interpolate_transparency(from: f32, to: f32, factor: f32) -> f32 {
    let factor = factor.clamp(0.0, 1.0);
    from + (to - from) * factor
}

/// Final color of one segment LED: transparency first, then the dimmer
/// envelope value.
pub fn calculate_segment_color(base: Rgb, transparency: f32, brightness: f32) -> Rgb {
    apply_brightness(apply_transparency(base, transparency), brightness)
}

/// Apply the global 0-255 master brightness.
///
/// Integer math keeps full-range channels exact: 255 under master 128 is
/// exactly 128, not a float rounding away from it.
pub fn apply_master_brightness(color: Rgb, master: u8) -> Rgb {
    if master == 255 {
        return color;
    }
    color.map(|c| (c as u32 * master as u32 / 255) as u8)
}

/// Apply master brightness across a whole frame in place.
pub fn apply_master_brightness_to_frame(frame: &mut [Rgb], master: u8) {
    if master == 255 {
        return;
    }
    for led in frame.iter_mut() {
        *led = apply_master_brightness(*led, master);
    }
}

//! Circle coverage: an annulus with a 1-pixel linear ramp on both the inner
//! and outer edge.

use crate::command::CircleCommand;

fn ramp_coverage(r: f32, inner: f32, outer: f32) -> f32 {
    if r < inner - 1.0 || r >= outer + 1.0 {
        0.0
    } else if r < inner {
        (r - (inner - 1.0)).clamp(0.0, 1.0)
    } else if r < outer {
        1.0
    } else {
        (1.0 - (r - outer)).clamp(0.0, 1.0)
    }
}

/// Coverage alpha (0..=255) for one destination pixel.
pub fn alpha(cmd: &CircleCommand, px: i32, py: i32) -> u8 {
    let x = px as f32 + 0.5;
    let y = py as f32 + 0.5;
    let r = ((x - cmd.cx).powi(2) + (y - cmd.cy).powi(2)).sqrt();
    let (inner, outer) = if cmd.thickness == -1 {
        (0.0, cmd.radius)
    } else {
        let inner = cmd.radius - cmd.thickness as f32 / 2.0;
        (inner, inner + cmd.thickness as f32)
    };
    let coverage = ramp_coverage(r, inner, outer);
    (cmd.color.a as f32 * coverage).round() as u8
}

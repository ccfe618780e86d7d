//! Rectangle coverage: signed cross-product inside test, with optional 4x
//! multisampling on the border for antialiasing.

use crate::command::RectangleCommand;

const MSAA_OFFSETS: [(f32, f32); 4] = [(-0.25, -0.25), (0.25, -0.25), (-0.25, 0.25), (0.25, 0.25)];

/// Left-handed winding "inside" test: a point is inside iff the signed
/// cross product of every edge with the vector to the point is strictly
/// negative.
fn inside(corners: &[(f32, f32); 4], x: f32, y: f32) -> bool {
    for i in 0..4 {
        let (ox, oy) = corners[i];
        let (dx, dy) = corners[(i + 1) % 4];
        let edge = (dx - ox, dy - oy);
        let to_p = (x - ox, y - oy);
        let cross = edge.0 * to_p.1 - edge.1 * to_p.0;
        if cross >= 0.0 {
            return false;
        }
    }
    true
}

fn hit(cmd: &RectangleCommand, x: f32, y: f32) -> bool {
    let filled = cmd.thickness == -1;
    inside(&cmd.outer, x, y) && (filled || !inside(&cmd.inner, x, y))
}

/// Coverage alpha (0..=255) for one destination pixel. `allow_msaa` is the
/// launch-wide rotation/MSAA capability switch; it is ANDed with the
/// command's own `interpolation` request so a launch compiled without MSAA
/// support cannot be asked for it by an individual command.
pub fn alpha(cmd: &RectangleCommand, px: i32, py: i32, allow_msaa: bool) -> u8 {
    if cmd.interpolation && allow_msaa {
        let cx = px as f32 + 0.5;
        let cy = py as f32 + 0.5;
        let hits = MSAA_OFFSETS
            .iter()
            .filter(|(dx, dy)| hit(cmd, cx + dx, cy + dy))
            .count() as u32;
        ((cmd.color.a as u32 * hits) / 4) as u8
    } else if hit(cmd, px as f32 + 0.5, py as f32 + 0.5) {
        cmd.color.a
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BoundingBox, Color};

    fn filled_square() -> RectangleCommand {
        RectangleCommand {
            bounds: BoundingBox { left: 4, top: 4, right: 12, bottom: 12 },
            color: Color { r: 255, g: 0, b: 0, a: 128 },
            outer: [(4.0, 4.0), (12.0, 4.0), (12.0, 12.0), (4.0, 12.0)],
            inner: [(0.0, 0.0); 4],
            thickness: -1,
            interpolation: false,
        }
    }

    #[test]
    fn inside_is_opaque_to_command_alpha_outside_is_zero() {
        let cmd = filled_square();
        assert_eq!(alpha(&cmd, 8, 8, true), 128);
        assert_eq!(alpha(&cmd, 0, 0, true), 0);
        assert_eq!(alpha(&cmd, 20, 20, true), 0);
    }

    #[test]
    fn hollow_rectangle_excludes_interior() {
        let mut cmd = filled_square();
        cmd.thickness = 1;
        cmd.inner = [(6.0, 6.0), (10.0, 6.0), (10.0, 10.0), (6.0, 10.0)];
        assert_eq!(alpha(&cmd, 8, 8, true), 0);
        assert_eq!(alpha(&cmd, 5, 5, true), 128);
    }

    #[test]
    fn msaa_disabled_by_launch_flag_falls_back_to_single_sample() {
        let mut cmd = filled_square();
        cmd.interpolation = true;
        assert_eq!(alpha(&cmd, 8, 8, false), 128);
    }
}

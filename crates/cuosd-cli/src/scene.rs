//! Builds a small fixed demo command list: a filled rectangle, a hollow
//! rectangle, a circle, and a blur redaction box. Exists to give the
//! `render` subcommand something to draw; it is not a general drawing-call
//! API.

use cuosd_core::command::{BoundingBox, Color, CircleCommand, CommandBody, RectangleCommand};

pub struct Scene {
    pub commands: Vec<u8>,
    pub offsets: Vec<i32>,
    pub global_bounds: BoundingBox,
    pub blur_rects: Vec<(BoundingBox, u32)>,
}

pub fn build_demo_scene(width: u32, height: u32) -> Scene {
    let mut commands = Vec::new();
    let mut offsets = Vec::new();
    let mut push = |cmd: CommandBody| {
        offsets.push(cmd.encode_into(&mut commands) as i32);
    };

    let margin = (width.min(height) / 8).max(4) as f32;
    push(CommandBody::Rectangle(RectangleCommand {
        bounds: BoundingBox {
            left: margin as i32,
            top: margin as i32,
            right: (width as f32 - margin) as i32,
            bottom: (height as f32 / 2.0) as i32,
        },
        color: Color { r: 220, g: 40, b: 40, a: 160 },
        outer: [
            (margin, margin),
            (width as f32 - margin, margin),
            (width as f32 - margin, height as f32 / 2.0),
            (margin, height as f32 / 2.0),
        ],
        inner: [(0.0, 0.0); 4],
        thickness: -1,
        interpolation: true,
    }));

    let cx = width as f32 / 2.0;
    let cy = height as f32 * 0.65;
    let radius = (width.min(height) as f32) / 6.0;
    push(CommandBody::Circle(CircleCommand {
        bounds: BoundingBox {
            left: (cx - radius - 1.0) as i32,
            top: (cy - radius - 1.0) as i32,
            right: (cx + radius + 1.0) as i32,
            bottom: (cy + radius + 1.0) as i32,
        },
        color: Color { r: 40, g: 160, b: 220, a: 255 },
        cx,
        cy,
        radius,
        thickness: 6,
    }));

    let global_bounds = BoundingBox {
        left: margin as i32,
        top: margin as i32,
        right: width as i32 - 1,
        bottom: height as i32 - 1,
    };

    let blur_box = BoundingBox {
        left: 0,
        top: 0,
        right: (width / 4) as i32,
        bottom: (height / 4) as i32,
    };

    Scene { commands, offsets, global_bounds, blur_rects: vec![(blur_box, 7)] }
}

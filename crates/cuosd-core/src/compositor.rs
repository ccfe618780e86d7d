//! The composite kernel: one logical thread per destination 2x2 quad,
//! iterating the command list in order and committing the accumulated
//! foreground once per quad.
//!
//! "One thread per quad" is realized with a `rayon` parallel iterator over
//! the quad grid. Each quad only ever reads the (shared, read-only) command
//! list and aux buffers and produces its own [`Accumulator`]; nothing is
//! written to the destination surface until every quad's result is in hand,
//! so the parallel phase never touches `&mut Surface` and needs no unsafe
//! aliasing to stay disjoint.

use rayon::prelude::*;

use crate::blend::Accumulator;
use crate::command::{BoundingBox, CommandBody, TextLocation};
use crate::config::Config;
use crate::coverage::{circle, image, rect, segment, text};
use crate::error::CuosdError;
use crate::surface::Surface;

/// Read-only auxiliary buffers a launch may reference, shared by every quad.
pub struct AuxInputs<'a> {
    pub text_locations: &'a [TextLocation],
    /// Cumulative glyph-range boundaries, length `num_text_commands + 1`.
    /// `line_location_base[k]..line_location_base[k+1]` is the location
    /// range for the `k`-th text command encountered in command order.
    pub line_location_base: &'a [i32],
    pub atlas: &'a [u8],
    pub atlas_stride: usize,
    pub seg_masks: &'a [f32],
    pub rgba_sources: &'a [u8],
    pub nv12_y_sources: &'a [u8],
    pub nv12_uv_sources: &'a [u8],
}

impl<'a> AuxInputs<'a> {
    pub fn empty() -> Self {
        Self {
            text_locations: &[],
            line_location_base: &[],
            atlas: &[],
            atlas_stride: 0,
            seg_masks: &[],
            rgba_sources: &[],
            nv12_y_sources: &[],
            nv12_uv_sources: &[],
        }
    }
}

/// Parse every command once up front. The kernel itself never mutates or
/// reparses this list; one parse pass amortizes across every quad instead
/// of every thread re-parsing the same bytes.
fn parse_all(commands: &[u8], offsets: &[i32]) -> Result<Vec<CommandBody>, CuosdError> {
    offsets.iter().map(|&off| CommandBody::parse(commands, off as usize)).collect()
}

fn text_command_count(parsed: &[CommandBody]) -> usize {
    parsed.iter().filter(|c| matches!(c, CommandBody::Text(_))).count()
}

/// Run the composite kernel over `surface`.
///
/// `global_bounds` is the union bounding box of all non-blur commands; the
/// launch grid covers it rounded to quad (2x2) granularity, matching the
/// original's grid-sizing rule. `have_rotate_msaa` is the launch-wide
/// specialization switch (see [`crate::dispatch`]); it gates whether any
/// command's `interpolation` request is honored.
pub fn composite(
    surface: &mut Surface,
    commands: &[u8],
    offsets: &[i32],
    aux: &AuxInputs,
    global_bounds: BoundingBox,
    have_rotate_msaa: bool,
    config: &Config,
) -> Result<(), CuosdError> {
    if offsets.is_empty() {
        return Err(CuosdError::EmptyDrawList);
    }
    let parsed = parse_all(commands, offsets)?;
    let expected_text_entries = text_command_count(&parsed) + 1;
    if !parsed.is_empty() && expected_text_entries > 1 && aux.line_location_base.len() < expected_text_entries {
        log::warn!(
            target: "cuosd::compositor",
            "line_location_base has {} entries, fewer than the {} text commands require",
            aux.line_location_base.len(),
            expected_text_entries - 1,
        );
    }

    let grid_left = global_bounds.left.div_euclid(2);
    let grid_top = global_bounds.top.div_euclid(2);
    let grid_right = global_bounds.right.div_euclid(2);
    let grid_bottom = global_bounds.bottom.div_euclid(2);
    if grid_right < grid_left || grid_bottom < grid_top {
        return Err(CuosdError::DegenerateBoundingBox {
            left: global_bounds.left,
            top: global_bounds.top,
            right: global_bounds.right,
            bottom: global_bounds.bottom,
        });
    }

    let quads_w = (grid_right - grid_left + 1) as usize;
    let quads_h = (grid_bottom - grid_top + 1) as usize;
    let total_quads = quads_w * quads_h;

    let compute_quad = |qi: usize| -> (i32, i32, Accumulator) {
        let qx = grid_left + (qi % quads_w) as i32;
        let qy = grid_top + (qi / quads_w) as i32;
        let acc = accumulate_quad(&parsed, aux, qx, qy, have_rotate_msaa);
        (qx, qy, acc)
    };

    let results: Vec<(i32, i32, Accumulator)> = if total_quads < config.parallel_threshold {
        (0..total_quads).map(compute_quad).collect()
    } else {
        let collect = || (0..total_quads).into_par_iter().map(compute_quad).collect();
        match config.thread_pool {
            Some(pool) => pool.install(collect),
            None => collect(),
        }
    };

    for (qx, qy, acc) in results {
        commit_quad(surface, qx, qy, &acc);
    }

    Ok(())
}

/// Per-quad coverage evaluation and accumulation. Pure with respect to the
/// destination surface; this is the function `rayon` fans out across quads.
fn accumulate_quad(
    parsed: &[CommandBody],
    aux: &AuxInputs,
    qx: i32,
    qy: i32,
    have_rotate_msaa: bool,
) -> Accumulator {
    let ix = qx * 2;
    let iy = qy * 2;
    let mut acc = Accumulator::new();
    let mut text_line_counter: usize = 0;

    for cmd in parsed {
        let bounds = cmd.bounds();
        let quad_intersects = bounds.intersects_quad(ix, iy);

        if let CommandBody::Text(_) = cmd {
            if !quad_intersects {
                // The text-line counter must advance even when the
                // command is culled, or every later text command on this
                // thread would read the wrong glyph range.
                text_line_counter += 1;
                continue;
            }
        } else if !quad_intersects {
            continue;
        }

        match cmd {
            CommandBody::Rectangle(c) => {
                for (i, (px, py)) in quad_pixels(ix, iy).enumerate() {
                    let a = rect::alpha(c, px, py, have_rotate_msaa);
                    acc.blend(i, [c.color.r, c.color.g, c.color.b], a);
                }
            }
            CommandBody::Circle(c) => {
                for (i, (px, py)) in quad_pixels(ix, iy).enumerate() {
                    let a = circle::alpha(c, px, py);
                    acc.blend(i, [c.color.r, c.color.g, c.color.b], a);
                }
            }
            CommandBody::Text(c) => {
                let begin = *aux.line_location_base.get(text_line_counter).unwrap_or(&0) as usize;
                let end =
                    *aux.line_location_base.get(text_line_counter + 1).unwrap_or(&0) as usize;
                text_line_counter += 1;
                for (i, (px, py)) in quad_pixels(ix, iy).enumerate() {
                    match text::sample(
                        c.color.a,
                        aux.text_locations,
                        begin,
                        end,
                        aux.atlas,
                        aux.atlas_stride,
                        px,
                        py,
                    ) {
                        Ok(a) => acc.blend(i, [c.color.r, c.color.g, c.color.b], a),
                        Err(e) => {
                            log::warn!(target: "cuosd::compositor", "skipping text sample: {e}");
                        }
                    }
                }
            }
            CommandBody::Segment(c) => {
                let mask = aux.seg_masks.get(c.mask_offset as usize..).unwrap_or(&[]);
                for (i, (px, py)) in quad_pixels(ix, iy).enumerate() {
                    let a = segment::alpha(c, mask, px, py);
                    acc.blend(i, [c.color.r, c.color.g, c.color.b], a);
                }
            }
            CommandBody::RgbaSource(c) => {
                for (i, (px, py)) in quad_pixels(ix, iy).enumerate() {
                    if let Some((rgb, a)) = image::rgba_sample(c, aux.rgba_sources, px, py) {
                        acc.blend(i, rgb, a);
                    }
                }
            }
            CommandBody::Nv12Source(c) => {
                let y_src = aux.nv12_y_sources.get(c.y_offset as usize..).unwrap_or(&[]);
                let uv_src = aux.nv12_uv_sources.get(c.uv_offset as usize..).unwrap_or(&[]);
                for (i, (px, py)) in quad_pixels(ix, iy).enumerate() {
                    if let Some((yuv, a)) = image::nv12_sample(c, y_src, uv_src, px, py) {
                        acc.blend(i, yuv, a);
                    }
                }
            }
            CommandBody::BoxBlur(_) => {
                // Blur commands are routed to `crate::blur` before this
                // kernel runs; one turning up here means the caller mixed
                // the two streams.
                log::warn!(
                    target: "cuosd::compositor",
                    "ignoring a box-blur command found in the composite command stream"
                );
            }
        }
    }

    acc
}

fn commit_quad(surface: &mut Surface, qx: i32, qy: i32, acc: &Accumulator) {
    if qx < 0 || qy < 0 || !acc.any_opaque() {
        return;
    }
    let ix = qx as u32 * 2;
    let iy = qy as u32 * 2;
    if ix >= surface.width() || iy >= surface.height() {
        return;
    }
    for (i, (px, py)) in quad_pixels(ix as i32, iy as i32).enumerate() {
        if px < 0 || py < 0 {
            continue;
        }
        let p = acc.pixels[i];
        surface.blend_luma_or_rgb(px as u32, py as u32, p.rgb, p.a);
    }
    surface.blend_chroma(
        qx as u32,
        qy as u32,
        [acc.pixels[0].rgb, acc.pixels[1].rgb, acc.pixels[2].rgb, acc.pixels[3].rgb],
        [acc.pixels[0].a, acc.pixels[1].a, acc.pixels[2].a, acc.pixels[3].a],
    );
}

fn quad_pixels(ix: i32, iy: i32) -> impl Iterator<Item = (i32, i32)> {
    [(ix, iy), (ix + 1, iy), (ix, iy + 1), (ix + 1, iy + 1)].into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Color, RectangleCommand};
    use crate::surface::{RgbaSurface, Surface};

    fn solid_rgba(w: u32, h: u32, fill: [u8; 4]) -> Vec<u8> {
        let mut v = vec![0u8; (w * h * 4) as usize];
        for px in v.chunks_mut(4) {
            px.copy_from_slice(&fill);
        }
        v
    }

    #[test]
    fn empty_command_list_is_rejected_before_touching_surface() {
        let mut data = solid_rgba(4, 4, [0, 0, 0, 255]);
        let mut surface =
            Surface::Rgba(RgbaSurface { data: &mut data, width: 4, height: 4, stride: 16 });
        let aux = AuxInputs::empty();
        let bounds = BoundingBox { left: 0, top: 0, right: 3, bottom: 3 };
        let err = composite(&mut surface, &[], &[], &aux, bounds, true, &Config::default());
        assert!(matches!(err, Err(CuosdError::EmptyDrawList)));
    }

    #[test]
    fn filled_rectangle_blends_into_interior_only() {
        let mut data = solid_rgba(16, 16, [0, 0, 0, 255]);
        let mut buf = Vec::new();
        let cmd = CommandBody::Rectangle(RectangleCommand {
            bounds: BoundingBox { left: 4, top: 4, right: 11, bottom: 11 },
            color: Color { r: 255, g: 0, b: 0, a: 128 },
            outer: [(4.0, 4.0), (12.0, 4.0), (12.0, 12.0), (4.0, 12.0)],
            inner: [(0.0, 0.0); 4],
            thickness: -1,
            interpolation: false,
        });
        let offset = cmd.encode_into(&mut buf) as i32;

        let mut surface =
            Surface::Rgba(RgbaSurface { data: &mut data, width: 16, height: 16, stride: 64 });
        let aux = AuxInputs::empty();
        let bounds = BoundingBox { left: 4, top: 4, right: 11, bottom: 11 };
        composite(&mut surface, &buf, &[offset], &aux, bounds, true, &Config::default()).unwrap();

        assert_eq!(surface.sample_rgb(8, 8), [128, 0, 0]);
        assert_eq!(surface.sample_rgb(0, 0), [0, 0, 0]);
    }

    #[test]
    fn command_order_is_paint_order_for_overlapping_rectangles() {
        let mut data = solid_rgba(16, 16, [0, 0, 0, 255]);
        let mut buf = Vec::new();
        let blue = CommandBody::Rectangle(RectangleCommand {
            bounds: BoundingBox { left: 0, top: 0, right: 9, bottom: 9 },
            color: Color { r: 0, g: 0, b: 255, a: 255 },
            outer: [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)],
            inner: [(0.0, 0.0); 4],
            thickness: -1,
            interpolation: false,
        });
        let red = CommandBody::Rectangle(RectangleCommand {
            bounds: BoundingBox { left: 5, top: 5, right: 14, bottom: 14 },
            color: Color { r: 255, g: 0, b: 0, a: 255 },
            outer: [(5.0, 5.0), (15.0, 5.0), (15.0, 15.0), (5.0, 15.0)],
            inner: [(0.0, 0.0); 4],
            thickness: -1,
            interpolation: false,
        });
        let off0 = blue.encode_into(&mut buf) as i32;
        let off1 = red.encode_into(&mut buf) as i32;

        let mut surface =
            Surface::Rgba(RgbaSurface { data: &mut data, width: 16, height: 16, stride: 64 });
        let aux = AuxInputs::empty();
        let bounds = BoundingBox { left: 0, top: 0, right: 14, bottom: 14 };
        composite(&mut surface, &buf, &[off0, off1], &aux, bounds, true, &Config::default())
            .unwrap();

        assert_eq!(surface.sample_rgb(7, 7), [255, 0, 0]);
        assert_eq!(surface.sample_rgb(1, 1), [0, 0, 255]);
    }
}

//! Segmentation-mask coverage: the mask is binarized against a threshold,
//! then bilinearly upsampled at 11-bit fixed-point weights.

use crate::command::SegmentCommand;

const WEIGHT_BITS: i32 = 11;
const WEIGHT_SCALE: f32 = (1 << WEIGHT_BITS) as f32;
const BINARY_HIGH: i32 = 127;

fn binarized(mask: &[f32], seg_width: u32, seg_height: u32, x: i32, y: i32, threshold: f32) -> i32 {
    if x < 0 || y < 0 || x as u32 >= seg_width || y as u32 >= seg_height {
        return 0;
    }
    let idx = y as usize * seg_width as usize + x as usize;
    if mask[idx] > threshold {
        BINARY_HIGH
    } else {
        0
    }
}

/// Coverage alpha (0..=255) for one destination pixel, already premultiplied
/// by the command's foreground alpha.
///
/// `mask` is the command's slice of the shared mask arena, `mask_offset`
/// already applied by the caller (see [`crate::command::SegmentCommand::mask_offset`]).
pub fn alpha(cmd: &SegmentCommand, mask: &[f32], px: i32, py: i32) -> u8 {
    let lx = px - cmd.bounds.left;
    let ly = py - cmd.bounds.top;
    let src_x = (lx as f32 + 0.5) * cmd.scale_x - 0.5;
    let src_y = (ly as f32 + 0.5) * cmd.scale_y - 0.5;
    let x0 = src_x.floor() as i32;
    let y0 = src_y.floor() as i32;
    let wx = ((src_x - x0 as f32) * WEIGHT_SCALE).round() as i32;
    let wy = ((src_y - y0 as f32) * WEIGHT_SCALE).round() as i32;
    let wx = wx.clamp(0, WEIGHT_SCALE as i32);
    let wy = wy.clamp(0, WEIGHT_SCALE as i32);

    let v00 = binarized(mask, cmd.seg_width, cmd.seg_height, x0, y0, cmd.seg_threshold);
    let v10 = binarized(mask, cmd.seg_width, cmd.seg_height, x0 + 1, y0, cmd.seg_threshold);
    let v01 = binarized(mask, cmd.seg_width, cmd.seg_height, x0, y0 + 1, cmd.seg_threshold);
    let v11 = binarized(mask, cmd.seg_width, cmd.seg_height, x0 + 1, y0 + 1, cmd.seg_threshold);

    let top = v00 * (WEIGHT_SCALE as i32 - wx) + v10 * wx;
    let bottom = v01 * (WEIGHT_SCALE as i32 - wx) + v11 * wx;
    let value = (top * (WEIGHT_SCALE as i32 - wy) + bottom * wy) >> (2 * WEIGHT_BITS);

    ((value.clamp(0, BINARY_HIGH) as u32 * cmd.color.a as u32) / BINARY_HIGH as u32) as u8
}

//! Image-stamp coverage: RGBA nearest-sample, and NV12 nearest-sample with
//! chroma-key transparency.
//!
//! NV12 stamps store their YUV bytes directly in the RGBA foreground
//! channels (R<-Y, G<-U, B<-V); the blender treats them as YUV when writing
//! an NV12 destination and as a deliberately unsupported combination
//! otherwise. See the design notes on channel reuse.

use crate::command::{Nv12SourceCommand, RgbaSourceCommand};
use crate::surface::block_linear_offset;

/// Nearest-sample an RGBA stamp. Returns `None` outside the stamp's extent
/// or if the source arena is too short for the requested sample.
pub fn rgba_sample(cmd: &RgbaSourceCommand, src: &[u8], px: i32, py: i32) -> Option<([u8; 3], u8)> {
    if px < cmd.cx || py < cmd.cy || px >= cmd.cx + cmd.width as i32 || py >= cmd.cy + cmd.height as i32
    {
        return None;
    }
    let lx = (px - cmd.cx) as u32;
    let ly = (py - cmd.cy) as u32;
    let idx = cmd.src_offset as usize + (ly * cmd.width + lx) as usize * 4;
    let bytes = src.get(idx..idx + 4)?;
    Some(([bytes[0], bytes[1], bytes[2]], bytes[3]))
}

/// Nearest-sample an NV12 stamp, applying the chroma-key. `y_src`/`uv_src`
/// are the command's slices of the shared NV12 source arena, offsets
/// already applied by the caller.
pub fn nv12_sample(
    cmd: &Nv12SourceCommand,
    y_src: &[u8],
    uv_src: &[u8],
    px: i32,
    py: i32,
) -> Option<([u8; 3], u8)> {
    if px < cmd.cx || py < cmd.cy || px >= cmd.cx + cmd.width as i32 || py >= cmd.cy + cmd.height as i32
    {
        return None;
    }
    let lx = (px - cmd.cx) as u32;
    let ly = (py - cmd.cy) as u32;
    let y_idx = if cmd.block_linear {
        block_linear_offset(lx, ly, cmd.width)
    } else {
        (ly * cmd.width + lx) as usize
    };
    let cx = lx & !1;
    let cy = ly / 2;
    let uv_idx = if cmd.block_linear {
        block_linear_offset(cx, cy, cmd.width)
    } else {
        (cy * cmd.width + cx) as usize
    };
    let y = *y_src.get(y_idx)?;
    let u = *uv_src.get(uv_idx)?;
    let v = *uv_src.get(uv_idx + 1)?;
    let (ky, ku, kv) = cmd.chroma_key;
    let alpha = if (y, u, v) == (ky, ku, kv) { 0 } else { cmd.trans_alpha };
    Some(([y, u, v], alpha))
}

//! Command record wire format: the tagged byte layout the composite kernel
//! parses, plus the matching encoders used by tests and the demo CLI to
//! produce conforming byte streams.
//!
//! This module deliberately stops short of a drawing-call API (`.rectangle()`,
//! `.circle()`, ...). It only serializes and parses already-decided command
//! values, which is the minimum glue needed to drive the kernel without
//! reintroducing the host-side command builder.

use bytemuck::{Pod, Zeroable};

use crate::error::CuosdError;

/// Inclusive-integer axis-aligned bounding box in destination pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn intersects_quad(&self, qx: i32, qy: i32) -> bool {
        let (qx0, qy0, qx1, qy1) = (qx, qy, qx + 1, qy + 1);
        qx1 >= self.left && qx0 <= self.right && qy1 >= self.top && qy0 <= self.bottom
    }
}

/// One glyph placement, referenced by a [`CommandBody::Text`] command's
/// slice of the shared array a caller passes to [`crate::launch`] (see
/// [`TextCommand::text_line_size`]).
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
#[repr(C)]
pub struct TextLocation {
    pub image_x: i32,
    pub image_y: i32,
    pub text_x: i32,
    pub text_w: i32,
    pub text_h: i32,
}

/// Command kind tag, stored as the first byte of every record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandKind {
    Rectangle = 0,
    Circle = 1,
    Text = 2,
    Segment = 3,
    RgbaSource = 4,
    Nv12Source = 5,
    BoxBlur = 6,
}

impl CommandKind {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Rectangle),
            1 => Some(Self::Circle),
            2 => Some(Self::Text),
            3 => Some(Self::Segment),
            4 => Some(Self::RgbaSource),
            5 => Some(Self::Nv12Source),
            6 => Some(Self::BoxBlur),
            _ => None,
        }
    }
}

/// RGBA default foreground color carried by every non-source-image command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct RectangleCommand {
    pub bounds: BoundingBox,
    pub color: Color,
    /// Outer quad corners, in drawing order.
    pub outer: [(f32, f32); 4],
    /// Inner quad corners; only meaningful when `thickness >= 0`.
    pub inner: [(f32, f32); 4],
    /// -1 means filled; >= 0 is a hollow stroke width.
    pub thickness: i32,
    /// 4x MSAA on borders at +/-0.25 sub-pixel offsets.
    pub interpolation: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct CircleCommand {
    pub bounds: BoundingBox,
    pub color: Color,
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub thickness: i32,
}

#[derive(Clone, Copy, Debug)]
pub struct TextCommand {
    pub bounds: BoundingBox,
    pub color: Color,
    /// Number of glyph locations on this line. The actual glyph range is
    /// not read from this field directly: it is looked up through the
    /// shared `line_location_base` cumulative array at the index of "the
    /// nth text command this thread has seen so far", a running count that
    /// must advance even for a culled command (see [`crate::compositor`]).
    pub text_line_size: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct SegmentCommand {
    pub bounds: BoundingBox,
    pub color: Color,
    /// Offset, in `f32` elements, of this mask's data within the shared
    /// mask arena passed to `launch`.
    pub mask_offset: u32,
    pub seg_width: u32,
    pub seg_height: u32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub seg_threshold: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct RgbaSourceCommand {
    pub bounds: BoundingBox,
    pub cx: i32,
    pub cy: i32,
    pub width: u32,
    pub height: u32,
    /// Byte offset of this stamp's RGBA data within the shared RGBA source
    /// arena.
    pub src_offset: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct Nv12SourceCommand {
    pub bounds: BoundingBox,
    pub cx: i32,
    pub cy: i32,
    pub width: u32,
    pub height: u32,
    /// Byte offsets of this stamp's luma and chroma planes within the
    /// shared NV12 source arena.
    pub y_offset: u32,
    pub uv_offset: u32,
    pub block_linear: bool,
    pub chroma_key: (u8, u8, u8),
    pub trans_alpha: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct BoxBlurCommand {
    pub bounds: BoundingBox,
    /// Must be odd.
    pub kernel_size: u32,
}

#[derive(Clone, Copy, Debug)]
pub enum CommandBody {
    Rectangle(RectangleCommand),
    Circle(CircleCommand),
    Text(TextCommand),
    Segment(SegmentCommand),
    RgbaSource(RgbaSourceCommand),
    Nv12Source(Nv12SourceCommand),
    BoxBlur(BoxBlurCommand),
}

impl CommandBody {
    pub fn bounds(&self) -> BoundingBox {
        match self {
            CommandBody::Rectangle(c) => c.bounds,
            CommandBody::Circle(c) => c.bounds,
            CommandBody::Text(c) => c.bounds,
            CommandBody::Segment(c) => c.bounds,
            CommandBody::RgbaSource(c) => c.bounds,
            CommandBody::Nv12Source(c) => c.bounds,
            CommandBody::BoxBlur(c) => c.bounds,
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            CommandBody::Rectangle(_) => CommandKind::Rectangle,
            CommandBody::Circle(_) => CommandKind::Circle,
            CommandBody::Text(_) => CommandKind::Text,
            CommandBody::Segment(_) => CommandKind::Segment,
            CommandBody::RgbaSource(_) => CommandKind::RgbaSource,
            CommandBody::Nv12Source(_) => CommandKind::Nv12Source,
            CommandBody::BoxBlur(_) => CommandKind::BoxBlur,
        }
    }

    /// Append this command's wire representation to `buf` and return the
    /// offset it was written at (the value to push into the caller's
    /// offsets table).
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> usize {
        let start = buf.len();
        buf.push(self.kind() as u8);
        encode_bounds(buf, &self.bounds());
        match self {
            CommandBody::Rectangle(c) => {
                encode_color(buf, &c.color);
                for (x, y) in c.outer {
                    buf.extend_from_slice(&x.to_le_bytes());
                    buf.extend_from_slice(&y.to_le_bytes());
                }
                for (x, y) in c.inner {
                    buf.extend_from_slice(&x.to_le_bytes());
                    buf.extend_from_slice(&y.to_le_bytes());
                }
                buf.extend_from_slice(&c.thickness.to_le_bytes());
                buf.push(c.interpolation as u8);
            }
            CommandBody::Circle(c) => {
                encode_color(buf, &c.color);
                buf.extend_from_slice(&c.cx.to_le_bytes());
                buf.extend_from_slice(&c.cy.to_le_bytes());
                buf.extend_from_slice(&c.radius.to_le_bytes());
                buf.extend_from_slice(&c.thickness.to_le_bytes());
            }
            CommandBody::Text(c) => {
                encode_color(buf, &c.color);
                buf.extend_from_slice(&c.text_line_size.to_le_bytes());
            }
            CommandBody::Segment(c) => {
                encode_color(buf, &c.color);
                buf.extend_from_slice(&c.mask_offset.to_le_bytes());
                buf.extend_from_slice(&c.seg_width.to_le_bytes());
                buf.extend_from_slice(&c.seg_height.to_le_bytes());
                buf.extend_from_slice(&c.scale_x.to_le_bytes());
                buf.extend_from_slice(&c.scale_y.to_le_bytes());
                buf.extend_from_slice(&c.seg_threshold.to_le_bytes());
            }
            CommandBody::RgbaSource(c) => {
                buf.extend_from_slice(&c.cx.to_le_bytes());
                buf.extend_from_slice(&c.cy.to_le_bytes());
                buf.extend_from_slice(&c.width.to_le_bytes());
                buf.extend_from_slice(&c.height.to_le_bytes());
                buf.extend_from_slice(&c.src_offset.to_le_bytes());
            }
            CommandBody::Nv12Source(c) => {
                buf.extend_from_slice(&c.cx.to_le_bytes());
                buf.extend_from_slice(&c.cy.to_le_bytes());
                buf.extend_from_slice(&c.width.to_le_bytes());
                buf.extend_from_slice(&c.height.to_le_bytes());
                buf.extend_from_slice(&c.y_offset.to_le_bytes());
                buf.extend_from_slice(&c.uv_offset.to_le_bytes());
                buf.push(c.block_linear as u8);
                buf.push(c.chroma_key.0);
                buf.push(c.chroma_key.1);
                buf.push(c.chroma_key.2);
                buf.push(c.trans_alpha);
            }
            CommandBody::BoxBlur(c) => {
                buf.extend_from_slice(&c.kernel_size.to_le_bytes());
            }
        }
        start
    }

    /// Parse the command record starting at `offset`. `offset` must come
    /// from the caller's offsets table; out-of-range or truncated records
    /// are reported rather than read past the buffer, since this crate does
    /// not trust the offsets table to be internally consistent.
    pub fn parse(buf: &[u8], offset: usize) -> Result<Self, CuosdError> {
        let mut r = Reader { buf, pos: offset };
        let tag = r.u8()?;
        let kind = CommandKind::from_tag(tag).ok_or(CuosdError::UnknownCommandKind(tag))?;
        let bounds = decode_bounds(&mut r)?;
        let body = match kind {
            CommandKind::Rectangle => {
                let color = decode_color(&mut r)?;
                let mut outer = [(0.0, 0.0); 4];
                for p in &mut outer {
                    *p = (r.f32()?, r.f32()?);
                }
                let mut inner = [(0.0, 0.0); 4];
                for p in &mut inner {
                    *p = (r.f32()?, r.f32()?);
                }
                let thickness = r.i32()?;
                let interpolation = r.u8()? != 0;
                CommandBody::Rectangle(RectangleCommand {
                    bounds,
                    color,
                    outer,
                    inner,
                    thickness,
                    interpolation,
                })
            }
            CommandKind::Circle => {
                let color = decode_color(&mut r)?;
                let cx = r.f32()?;
                let cy = r.f32()?;
                let radius = r.f32()?;
                let thickness = r.i32()?;
                CommandBody::Circle(CircleCommand { bounds, color, cx, cy, radius, thickness })
            }
            CommandKind::Text => {
                let color = decode_color(&mut r)?;
                let text_line_size = r.u32()?;
                CommandBody::Text(TextCommand { bounds, color, text_line_size })
            }
            CommandKind::Segment => {
                let color = decode_color(&mut r)?;
                let mask_offset = r.u32()?;
                let seg_width = r.u32()?;
                let seg_height = r.u32()?;
                let scale_x = r.f32()?;
                let scale_y = r.f32()?;
                let seg_threshold = r.f32()?;
                CommandBody::Segment(SegmentCommand {
                    bounds,
                    color,
                    mask_offset,
                    seg_width,
                    seg_height,
                    scale_x,
                    scale_y,
                    seg_threshold,
                })
            }
            CommandKind::RgbaSource => {
                let cx = r.i32()?;
                let cy = r.i32()?;
                let width = r.u32()?;
                let height = r.u32()?;
                let src_offset = r.u32()?;
                CommandBody::RgbaSource(RgbaSourceCommand {
                    bounds,
                    cx,
                    cy,
                    width,
                    height,
                    src_offset,
                })
            }
            CommandKind::Nv12Source => {
                let cx = r.i32()?;
                let cy = r.i32()?;
                let width = r.u32()?;
                let height = r.u32()?;
                let y_offset = r.u32()?;
                let uv_offset = r.u32()?;
                let block_linear = r.u8()? != 0;
                let chroma_key = (r.u8()?, r.u8()?, r.u8()?);
                let trans_alpha = r.u8()?;
                CommandBody::Nv12Source(Nv12SourceCommand {
                    bounds,
                    cx,
                    cy,
                    width,
                    height,
                    y_offset,
                    uv_offset,
                    block_linear,
                    chroma_key,
                    trans_alpha,
                })
            }
            CommandKind::BoxBlur => {
                let kernel_size = r.u32()?;
                CommandBody::BoxBlur(BoxBlurCommand { bounds, kernel_size })
            }
        };
        Ok(body)
    }
}

fn encode_bounds(buf: &mut Vec<u8>, b: &BoundingBox) {
    buf.extend_from_slice(&b.left.to_le_bytes());
    buf.extend_from_slice(&b.top.to_le_bytes());
    buf.extend_from_slice(&b.right.to_le_bytes());
    buf.extend_from_slice(&b.bottom.to_le_bytes());
}

fn encode_color(buf: &mut Vec<u8>, c: &Color) {
    buf.extend_from_slice(&[c.r, c.g, c.b, c.a]);
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn need(&self, n: usize) -> Result<(), CuosdError> {
        if self.pos + n > self.buf.len() {
            Err(CuosdError::MalformedCommand { offset: self.pos, buffer_len: self.buf.len() })
        } else {
            Ok(())
        }
    }

    fn u8(&mut self) -> Result<u8, CuosdError> {
        self.need(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    fn u32(&mut self) -> Result<u32, CuosdError> {
        self.need(4)?;
        let v = u32::from_le_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    fn i32(&mut self) -> Result<i32, CuosdError> {
        self.need(4)?;
        let v = i32::from_le_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }

    fn f32(&mut self) -> Result<f32, CuosdError> {
        self.need(4)?;
        let v = f32::from_le_bytes(self.buf[self.pos..self.pos + 4].try_into().unwrap());
        self.pos += 4;
        Ok(v)
    }
}

fn decode_bounds(r: &mut Reader) -> Result<BoundingBox, CuosdError> {
    Ok(BoundingBox { left: r.i32()?, top: r.i32()?, right: r.i32()?, bottom: r.i32()? })
}

fn decode_color(r: &mut Reader) -> Result<Color, CuosdError> {
    Ok(Color { r: r.u8()?, g: r.u8()?, b: r.u8()?, a: r.u8()? })
}

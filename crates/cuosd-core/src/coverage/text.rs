//! Text coverage: monochrome glyph-atlas sampling. First glyph on the line
//! whose rectangle contains the pixel wins; later glyphs are not consulted.

use crate::command::TextLocation;
use crate::error::CuosdError;

/// Coverage alpha (0..=255) for one destination pixel, sampled against the
/// glyph-location slice `[begin, end)`. That range is not read from the
/// command itself: the caller derives it from the shared
/// `line_location_base` array at the index of "the nth text command this
/// thread has seen so far" (see [`crate::compositor`], which is the only
/// place that running count is tracked). Returns `Ok(0)` if no glyph in the
/// range covers the pixel.
pub fn sample(
    color_alpha: u8,
    locations: &[TextLocation],
    begin: usize,
    end: usize,
    atlas: &[u8],
    atlas_stride: usize,
    px: i32,
    py: i32,
) -> Result<u8, CuosdError> {
    if end > locations.len() || begin > end {
        return Err(CuosdError::TextLocationOutOfBounds { begin, end, len: locations.len() });
    }
    for loc in &locations[begin..end] {
        if px < loc.image_x
            || py < loc.image_y
            || px >= loc.image_x + loc.text_w
            || py >= loc.image_y + loc.text_h
        {
            continue;
        }
        let fx = (px - loc.image_x) as usize;
        let fy = (py - loc.image_y) as usize;
        let atlas_x = loc.text_x as usize + fx;
        let idx = fy * atlas_stride + atlas_x;
        let Some(&coverage) = atlas.get(idx) else {
            continue;
        };
        return Ok(((color_alpha as u32 * coverage as u32) / 255) as u8);
    }
    Ok(0)
}

//! Dispatch shim: selects a kernel specialization from a small compile-time
//! table keyed on destination format (and, for the composite kernel, a
//! rotation/MSAA capability switch) instead of branching on format inside
//! the per-pixel hot loop.
//!
//! On this host the "specialization" is not a separate monomorphized
//! function per table entry (the compositor and blur kernels already
//! dispatch on format internally through [`crate::surface::Surface`]'s
//! match arms, which the optimizer inlines the same way); this module's
//! job is to validate the format tag once per launch and log which entry
//! was selected, the way the original shim's table lookup would.

use crate::error::CuosdError;
use crate::surface::SurfaceFormat;

/// Composite kernel table has 8 entries: 4 formats x {MSAA off, MSAA on}.
pub fn composite_specialization_index(format: SurfaceFormat, have_rotate_msaa: bool) -> usize {
    (have_rotate_msaa as usize) * 4 + format.table_index()
}

/// Blur kernel table has 4 entries, one per format.
pub fn blur_specialization_index(format: SurfaceFormat) -> usize {
    format.table_index()
}

/// Decode the external format tag, reporting unsupported values the way the
/// original shim would refuse an out-of-range table index.
pub fn resolve_format(tag: u32) -> Result<SurfaceFormat, CuosdError> {
    SurfaceFormat::from_bits(tag).map_err(|bad| CuosdError::UnsupportedFormat(bad.0))
}

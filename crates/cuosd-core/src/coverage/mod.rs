//! Per-primitive coverage evaluators. Each submodule computes, for one
//! destination pixel, a coverage alpha (and for image stamps, a foreground
//! color) from a single command's fields. None of them touch the surface or
//! the accumulator directly; the composite kernel in [`crate::compositor`]
//! wires their output into the source-over law.

pub mod circle;
pub mod image;
pub mod rect;
pub mod segment;
pub mod text;

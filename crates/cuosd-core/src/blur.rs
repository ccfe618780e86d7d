//! Box-blur redaction kernel: one 32x32 staging tile per blur rectangle,
//! a box-mean filter of configurable odd kernel size, then a nearest
//! resample back out to the rectangle's original extent.
//!
//! On the GPU this is one thread block of 32x32 threads per rectangle, with
//! two barriers between the three phases. On this host, the barriers
//! disappear because the 32x32 tile is a private buffer on the task's own
//! stack/heap: each blur rectangle is one `rayon` task running its three
//! phases sequentially, and rectangles run in parallel with each other.

use rayon::prelude::*;

use crate::command::BoundingBox;
use crate::config::Config;
use crate::error::CuosdError;
use crate::surface::Surface;

const TILE: usize = 32;

/// Blur every rectangle in `bounds_list` against `surface`, in the caller's
/// list order. Rectangles are independent rayon tasks; overlapping
/// rectangles are *not* disjoint and will race if blurred in parallel, so
/// overlapping pairs fall back to running in list order (matching the
/// "later command wins" ordering the rest of this crate already commits
/// to) rather than being split across tasks.
pub fn blur(
    surface: &mut Surface,
    bounds_list: &[(BoundingBox, u32)],
    config: &Config,
) -> Result<(), CuosdError> {
    if bounds_list.is_empty() {
        return Err(CuosdError::EmptyDrawList);
    }

    let groups = partition_disjoint_groups(bounds_list);
    for group in groups {
        let tiles: Vec<(usize, [[u8; 3]; TILE * TILE])> = if group.len() < config.parallel_threshold
        {
            group.iter().map(|&gi| (gi, stage_and_filter(surface, &bounds_list[gi]))).collect()
        } else {
            let compute = || {
                group
                    .par_iter()
                    .map(|&gi| (gi, stage_and_filter(surface, &bounds_list[gi])))
                    .collect()
            };
            match config.thread_pool {
                Some(pool) => pool.install(compute),
                None => compute(),
            }
        };
        for (gi, tile) in tiles {
            upsample_into(surface, &bounds_list[gi].0, &tile);
        }
    }
    Ok(())
}

/// Greedily groups rectangle indices so rectangles within a group never
/// overlap (safe to blur in parallel); groups are still processed in
/// increasing-index order across groups, preserving painter's-algorithm
/// ordering for any two rectangles that do overlap.
fn partition_disjoint_groups(bounds_list: &[(BoundingBox, u32)]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    'next: for (i, (b, _)) in bounds_list.iter().enumerate() {
        for group in &mut groups {
            if group.iter().all(|&gi| !overlaps(b, &bounds_list[gi].0)) {
                group.push(i);
                continue 'next;
            }
        }
        groups.push(vec![i]);
    }
    groups
}

fn overlaps(a: &BoundingBox, b: &BoundingBox) -> bool {
    a.left <= b.right && b.left <= a.right && a.top <= b.bottom && b.top <= a.bottom
}

/// Phase 1 + 2: downsample the rectangle into a 32x32 tile in surface RGB,
/// then box-mean filter it in place.
fn stage_and_filter(surface: &Surface, entry: &(BoundingBox, u32)) -> [[u8; 3]; TILE * TILE] {
    let (bounds, kernel_size) = entry;
    let box_w = (bounds.right - bounds.left + 1).max(1) as f32;
    let box_h = (bounds.bottom - bounds.top + 1).max(1) as f32;

    let mut tile = [[0u8; 3]; TILE * TILE];
    for ty in 0..TILE {
        for tx in 0..TILE {
            let sx = bounds.left as f32 + (tx as f32 / TILE as f32) * box_w;
            let sy = bounds.top as f32 + (ty as f32 / TILE as f32) * box_h;
            tile[ty * TILE + tx] = surface.sample_rgb(sx as i32, sy as i32);
        }
    }

    let k = (*kernel_size).max(1) as i32;
    let half = k / 2;
    let mut filtered = tile;
    for ty in 0..TILE as i32 {
        for tx in 0..TILE as i32 {
            let mut sum = [0u32; 3];
            let mut n = 0u32;
            for dy in -half..=half {
                for dx in -half..=half {
                    let (sx, sy) = (tx + dx, ty + dy);
                    if sx < 0 || sy < 0 || sx >= TILE as i32 || sy >= TILE as i32 {
                        continue;
                    }
                    let px = tile[sy as usize * TILE + sx as usize];
                    for c in 0..3 {
                        sum[c] += px[c] as u32;
                    }
                    n += 1;
                }
            }
            let idx = ty as usize * TILE + tx as usize;
            for c in 0..3 {
                filtered[idx][c] = (sum[c] / n.max(1)) as u8;
            }
        }
    }
    filtered
}

/// Phase 3: nearest-resample the filtered tile back out over the
/// rectangle's original extent.
fn upsample_into(surface: &mut Surface, bounds: &BoundingBox, tile: &[[u8; 3]; TILE * TILE]) {
    let box_w = (bounds.right - bounds.left + 1).max(1);
    let box_h = (bounds.bottom - bounds.top + 1).max(1);
    for y in 0..box_h {
        for x in 0..box_w {
            let tx = ((x * TILE as i32) / box_w).clamp(0, TILE as i32 - 1) as usize;
            let ty = ((y * TILE as i32) / box_h).clamp(0, TILE as i32 - 1) as usize;
            let rgb = tile[ty * TILE + tx];
            let dst_x = bounds.left + x;
            let dst_y = bounds.top + y;
            if dst_x < 0 || dst_y < 0 {
                continue;
            }
            surface.blit_rgb(dst_x as u32, dst_y as u32, rgb);
        }
    }
}

use glam::Vec3;

use crate::BoundingBox;

/// Segments shorter than this are treated as a single point
pub const MIN_SEGMENT_LENGTH: f32 = 0.1;

/// Slab test of the segment `start..end` against `bbox`.
///
/// Returns the fraction along the segment where it first touches the box, or
/// `None` if it misses. A segment starting inside the box returns `Some(0.0)`.
pub fn segment_enters_box(start: Vec3, end: Vec3, bbox: &BoundingBox) -> Option<f32> {
    let delta = end - start;
    let mut enter = 0.0f32;
    let mut leave = 1.0f32;

    for axis in 0..3 {
        let (s, d) = (start[axis], delta[axis]);
        let (lo, hi) = (bbox.mins[axis], bbox.maxs[axis]);

        if d.abs() < f32::EPSILON {
            // Parallel to this slab, must already be between the faces
            if s < lo || s > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (lo - s) * inv;
        let mut t1 = (hi - s) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        enter = enter.max(t0);
        leave = leave.min(t1);
        if enter > leave {
            return None;
        }
    }

    Some(enter)
}

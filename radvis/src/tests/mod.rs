//! Scenario tests over small hand built scenes

mod scene_tests;

use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Vec3;
use math::{BoundingBox, segment_enters_box};

use crate::{Occlusion, Tracer};

/// Solid walls block `test_line`, tinted windows attenuate `test_opaque`. A
/// window with no transmission at all blocks.
pub(crate) struct WallTracer {
    pub leaf_of: fn(Vec3) -> usize,
    pub walls: Vec<BoundingBox>,
    pub windows: Vec<(BoundingBox, Vec3)>,
    pub line_calls: AtomicUsize,
    pub opaque_calls: AtomicUsize,
}

impl WallTracer {
    pub fn new(leaf_of: fn(Vec3) -> usize) -> Self {
        Self {
            leaf_of,
            walls: Vec::new(),
            windows: Vec::new(),
            line_calls: AtomicUsize::new(0),
            opaque_calls: AtomicUsize::new(0),
        }
    }

    pub fn oracle_calls(&self) -> (usize, usize) {
        (
            self.line_calls.load(Ordering::Relaxed),
            self.opaque_calls.load(Ordering::Relaxed),
        )
    }
}

impl Tracer for WallTracer {
    fn point_in_leaf(&self, point: Vec3) -> usize {
        (self.leaf_of)(point)
    }

    fn test_line(&self, start: Vec3, end: Vec3) -> bool {
        self.line_calls.fetch_add(1, Ordering::Relaxed);
        self.walls
            .iter()
            .all(|wall| segment_enters_box(start, end, wall).is_none())
    }

    fn test_opaque(&self, start: Vec3, end: Vec3) -> Occlusion {
        self.opaque_calls.fetch_add(1, Ordering::Relaxed);
        let mut transparency = Vec3::ONE;
        for (window, tint) in &self.windows {
            if segment_enters_box(start, end, window).is_some() {
                transparency *= *tint;
            }
        }
        if transparency.max_element() <= 0.0 {
            Occlusion::Blocked
        } else {
            Occlusion::Transmits(transparency)
        }
    }
}

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use log::{debug, info};
use std::ops::{Add, AddAssign};
use vismatrix::SharedVisMatrix;

use crate::pvs::{leaf_visible, pvs_row_bytes};
use crate::{Occlusion, Scene, Tracer, VisError, WorkQueue};

/// Patches closer than this to a plane count as behind it. Keeps patches on
/// or grazing a plane from passing through float noise.
pub const MINIMUM_PATCH_DISTANCE: f32 = 1.0;

/// Tallies from one or more workers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CullStats {
    /// Whole faces skipped because the source patch was behind them
    pub faces_behind: usize,
    /// Candidate pairs reaching the per-patch tests
    pub pairs: usize,
    pub behind_plane: usize,
    pub line_blocked: usize,
    pub opaque_blocked: usize,
    pub visible: usize,
}

impl Add for CullStats {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for CullStats {
    fn add_assign(&mut self, rhs: Self) {
        self.faces_behind += rhs.faces_behind;
        self.pairs += rhs.pairs;
        self.behind_plane += rhs.behind_plane;
        self.line_blocked += rhs.line_blocked;
        self.opaque_blocked += rhs.opaque_blocked;
        self.visible += rhs.visible;
    }
}

impl CullStats {
    pub fn log(&self) {
        let percent = if self.pairs > 0 {
            self.visible as f32 / self.pairs as f32 * 100.0
        } else {
            0.0
        };
        info!(
            "Vis pairs: {}/{} visible ({:.1}%), {} behind plane, {} line blocked, {} opaque \
             blocked, {} faces skipped",
            self.visible,
            self.pairs,
            percent,
            self.behind_plane,
            self.line_blocked,
            self.opaque_blocked,
            self.faces_behind
        );
    }
}

/// Runs the patch to patch tests and writes confirmed pairs to the matrix
pub struct VisCuller<'a, T: Tracer + ?Sized> {
    scene: &'a Scene,
    tracer: &'a T,
    matrix: &'a SharedVisMatrix,
}

impl<'a, T: Tracer + ?Sized> VisCuller<'a, T> {
    pub fn new(scene: &'a Scene, tracer: &'a T, matrix: &'a SharedVisMatrix) -> Self {
        Self {
            scene,
            tracer,
            matrix,
        }
    }

    /// Test `patch` against every patch on `face` with a higher index.
    pub fn test_patch_to_face(
        &self,
        patch: usize,
        face: usize,
        stats: &mut CullStats,
    ) -> Result<(), VisError> {
        #[cfg(feature = "hprof")]
        profile!("test_patch_to_face");
        let source = &self.scene.patches[patch];
        let target = &self.scene.faces[face];

        if target.first_patch.is_none() {
            return Ok(());
        }
        // Nothing on a face can be seen from behind it
        if !target.plane.in_front(source.origin, MINIMUM_PATCH_DISTANCE) {
            stats.faces_behind += 1;
            return Ok(());
        }

        let source_plane = &self.scene.faces[source.face].plane;
        for (other, other_patch) in self.scene.face_patches(face) {
            // Lower indices test against us from their side
            if other <= patch {
                continue;
            }
            stats.pairs += 1;

            if !source_plane.in_front(other_patch.origin, MINIMUM_PATCH_DISTANCE) {
                stats.behind_plane += 1;
                continue;
            }
            if !self.tracer.test_line(source.origin, other_patch.origin) {
                stats.line_blocked += 1;
                continue;
            }
            match self.tracer.test_opaque(source.origin, other_patch.origin) {
                Occlusion::Blocked => stats.opaque_blocked += 1,
                Occlusion::Transmits(transparency) => {
                    self.matrix.set_attenuated(patch, other, transparency)?;
                    stats.visible += 1;
                }
            }
        }

        Ok(())
    }

    /// Test `patch` against every face in every leaf flagged in `pvs`.
    ///
    /// `face_tested` must be one flag per face; it is cleared here and used to
    /// skip faces listed by more than one leaf.
    pub fn build_vis_row(
        &self,
        patch: usize,
        pvs: &[u8],
        face_tested: &mut [bool],
        stats: &mut CullStats,
    ) -> Result<(), VisError> {
        #[cfg(feature = "hprof")]
        profile!("build_vis_row");
        face_tested.fill(false);

        // Leaf 0 is solid
        for (leaf_index, leaf) in self.scene.leafs.iter().enumerate().skip(1) {
            if !leaf_visible(pvs, leaf_index) {
                continue;
            }
            for &face in &leaf.faces {
                if std::mem::replace(&mut face_tested[face], true) {
                    continue;
                }
                self.test_patch_to_face(patch, face, stats)?;
            }
        }
        Ok(())
    }

    /// Worker body: drain `queue` of leafs (unit `n` is leaf `n + 1`) and
    /// build rows for every patch whose origin lies in that leaf.
    pub fn build_vis_leafs(&self, worker: usize, queue: &WorkQueue) -> Result<CullStats, VisError> {
        let mut stats = CullStats::default();
        let mut pvs = vec![0u8; pvs_row_bytes(self.scene.leafs.len())];
        let mut face_tested = vec![false; self.scene.faces.len()];
        let entity_faces = self.scene.entity_faces();
        let mut leafs_done = 0;

        while let Some(unit) = queue.claim_next() {
            let leaf_index = unit + 1;
            let leaf = &self.scene.leafs[leaf_index];
            self.scene.decompress_leaf_pvs(leaf_index, &mut pvs)?;

            for &face in &leaf.faces {
                for (patch, patch_data) in self.scene.face_patches(face) {
                    // Faces span leafs, only take the patches that sit in this one
                    if self.tracer.point_in_leaf(patch_data.origin) != leaf_index {
                        continue;
                    }
                    self.build_vis_row(patch, &pvs, &mut face_tested, &mut stats)?;

                    // Entity faces aren't in any leaf so the PVS can't cull them
                    for entity_face in entity_faces.clone() {
                        self.test_patch_to_face(patch, entity_face, &mut stats)?;
                    }
                }
            }
            leafs_done += 1;
        }

        debug!(
            "Worker {worker} finished {leafs_done} leafs, {} of {} pairs visible",
            stats.visible, stats.pairs
        );
        Ok(stats)
    }
}

//! Procedural rooms: an axis aligned box cut in to slab leafs along X, with
//! solid pillars, tinted windows and free standing panels.
//!
//! ```toml
//! size = [512.0, 256.0, 128.0]
//! leafs = 4
//! patch_size = 32.0
//!
//! [[pillars]]
//! mins = [240.0, 112.0, 0.0]
//! maxs = [272.0, 144.0, 128.0]
//!
//! [[windows]]
//! mins = [380.0, 0.0, 0.0]
//! maxs = [384.0, 256.0, 128.0]
//! tint = [0.2, 0.6, 0.9]
//!
//! [[panels]]
//! x = 64.0
//! y = [96.0, 160.0]
//! z = [0.0, 96.0]
//! ```

use std::error::Error;
use std::path::Path;

use glam::Vec3;
use math::{BoundingBox, BoundingState, MIN_SEGMENT_LENGTH, Plane, segment_enters_box};
use radvis::log::{info, warn};
use radvis::pvs::{compress_vis, pvs_row_bytes};
use radvis::{Face, Leaf, Model, Occlusion, Patch, Scene, Tracer};
use serde::{Deserialize, Serialize};

/// Points this far outside the room still classify as inside
const LEAF_EPSILON: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDesc {
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
}

impl BoxDesc {
    fn bounds(&self) -> BoundingBox {
        BoundingBox::new(Vec3::from_array(self.mins), Vec3::from_array(self.maxs))
    }
}

/// A translucent brush. A tint of zero in every channel is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDesc {
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub tint: [f32; 3],
}

impl WindowDesc {
    fn bounds(&self) -> BoundingBox {
        BoundingBox::new(Vec3::from_array(self.mins), Vec3::from_array(self.maxs))
    }
}

/// A brush entity face standing on the plane `x`, facing +X unless `flip`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDesc {
    pub x: f32,
    pub y: [f32; 2],
    pub z: [f32; 2],
    #[serde(default)]
    pub flip: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomDesc {
    /// Length along X, width along Y, height along Z
    pub size: [f32; 3],
    /// Number of equal slabs along X, one leaf each
    pub leafs: usize,
    /// Largest edge of a patch
    pub patch_size: f32,
    pub pillars: Vec<BoxDesc>,
    pub windows: Vec<WindowDesc>,
    pub panels: Vec<PanelDesc>,
}

impl Default for RoomDesc {
    fn default() -> Self {
        Self {
            size: [256.0, 256.0, 128.0],
            leafs: 2,
            patch_size: 32.0,
            pillars: Vec::new(),
            windows: Vec::new(),
            panels: Vec::new(),
        }
    }
}

impl RoomDesc {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let text = std::fs::read_to_string(path)?;
        let room: RoomDesc = toml::from_str(&text)?;
        room.check()?;
        info!(
            "Loaded room {:?}: {:?} in {} leafs",
            path, room.size, room.leafs
        );
        Ok(room)
    }

    fn check(&self) -> Result<(), String> {
        if self.size.iter().any(|&s| s <= 0.0) {
            return Err(format!("room size {:?} must be positive", self.size));
        }
        if self.leafs == 0 {
            return Err("a room needs at least one leaf".into());
        }
        if self.patch_size <= 0.0 {
            return Err(format!("patch size {} must be positive", self.patch_size));
        }

        let room = self.bounds();
        let pillars = self.pillars.iter().map(|p| ("pillar", p.bounds()));
        let windows = self.windows.iter().map(|w| ("window", w.bounds()));
        let brushes = pillars.enumerate().chain(windows.enumerate());
        for (i, (kind, brush)) in brushes {
            if brush.is_empty() {
                return Err(format!(
                    "{kind} {i} has mins {} past maxs {}",
                    brush.mins, brush.maxs
                ));
            }
            match brush.test(&room) {
                BoundingState::Subset => {}
                BoundingState::Union => {
                    warn!("{kind} {i} pokes outside the room, the outside part is ignored")
                }
                BoundingState::Disjoint => {
                    return Err(format!("{kind} {i} is outside the room"));
                }
                BoundingState::Superset => {
                    return Err(format!("{kind} {i} fills the whole room"));
                }
            }
        }
        Ok(())
    }

    fn extent(&self) -> Vec3 {
        Vec3::from_array(self.size)
    }

    fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        bounds.add_point(Vec3::ZERO);
        bounds.add_point(self.extent());
        bounds
    }

    pub fn build(&self) -> (Scene, BrushTracer) {
        let [length, width, height] = self.size;
        let slab = length / self.leafs as f32;
        let mut scene = Scene {
            leafs: vec![Leaf::default()],
            ..Default::default()
        };

        // Every slab sees every other, so one row serves all leafs
        let mut row = vec![0u8; pvs_row_bytes(self.leafs + 1)];
        for bit in 0..self.leafs {
            row[bit >> 3] |= 1 << (bit & 7);
        }
        scene.vis_data = compress_vis(&row);

        for n in 0..self.leafs {
            let x0 = n as f32 * slab;
            let along = Vec3::new(slab, 0.0, 0.0);
            let corner = Vec3::new(x0, 0.0, 0.0);

            let mut faces = vec![
                // floor, ceiling
                self.push_quad(&mut scene, Vec3::Z, corner, along, Vec3::Y * width),
                self.push_quad(
                    &mut scene,
                    -Vec3::Z,
                    corner + Vec3::Z * height,
                    along,
                    Vec3::Y * width,
                ),
                // side walls
                self.push_quad(&mut scene, Vec3::Y, corner, along, Vec3::Z * height),
                self.push_quad(
                    &mut scene,
                    -Vec3::Y,
                    corner + Vec3::Y * width,
                    along,
                    Vec3::Z * height,
                ),
            ];
            if n == 0 {
                faces.push(self.push_quad(
                    &mut scene,
                    Vec3::X,
                    Vec3::ZERO,
                    Vec3::Y * width,
                    Vec3::Z * height,
                ));
            }
            if n + 1 == self.leafs {
                faces.push(self.push_quad(
                    &mut scene,
                    -Vec3::X,
                    Vec3::X * length,
                    Vec3::Y * width,
                    Vec3::Z * height,
                ));
            }

            scene.leafs.push(Leaf {
                vis_offset: Some(0),
                faces,
            });
        }

        scene.models.push(Model {
            first_face: 0,
            num_faces: scene.faces.len(),
        });
        for panel in &self.panels {
            let normal = if panel.flip { -Vec3::X } else { Vec3::X };
            let face = self.push_quad(
                &mut scene,
                normal,
                Vec3::new(panel.x, panel.y[0], panel.z[0]),
                Vec3::Y * (panel.y[1] - panel.y[0]),
                Vec3::Z * (panel.z[1] - panel.z[0]),
            );
            scene.models.push(Model {
                first_face: face,
                num_faces: 1,
            });
        }

        info!(
            "Room has {} faces and {} patches",
            scene.faces.len(),
            scene.num_patches()
        );
        (scene, BrushTracer::new(self))
    }

    /// Add a rectangular face spanned by `u` and `v` from `corner`, cut in to
    /// a grid of patches no bigger than `patch_size`. Returns the face index.
    fn push_quad(&self, scene: &mut Scene, normal: Vec3, corner: Vec3, u: Vec3, v: Vec3) -> usize {
        let face = scene.faces.len();
        let cuts = |edge: Vec3| (edge.length() / self.patch_size).ceil().max(1.0) as usize;
        let (nu, nv) = (cuts(u), cuts(v));

        let first = scene.patches.len();
        for j in 0..nv {
            for i in 0..nu {
                let s = (i as f32 + 0.5) / nu as f32;
                let t = (j as f32 + 0.5) / nv as f32;
                let index = scene.patches.len();
                scene.patches.push(Patch {
                    origin: corner + u * s + v * t,
                    face,
                    next: None,
                });
                if index > first {
                    scene.patches[index - 1].next = Some(index);
                }
            }
        }

        scene.faces.push(Face {
            plane: Plane::from_point_normal(corner, normal),
            first_patch: Some(first),
        });
        face
    }
}

/// Answers line of sight against a room's brushes
#[derive(Debug, Clone)]
pub struct BrushTracer {
    bounds: BoundingBox,
    slab_width: f32,
    leafs: usize,
    pillars: Vec<BoundingBox>,
    windows: Vec<(BoundingBox, Vec3)>,
}

impl BrushTracer {
    pub fn new(room: &RoomDesc) -> Self {
        let grow = Vec3::splat(LEAF_EPSILON);
        let mut bounds = room.bounds();
        bounds.add_point(bounds.mins - grow);
        bounds.add_point(bounds.maxs + grow);
        Self {
            bounds,
            slab_width: room.size[0] / room.leafs as f32,
            leafs: room.leafs,
            pillars: room.pillars.iter().map(BoxDesc::bounds).collect(),
            windows: room
                .windows
                .iter()
                .map(|w| (w.bounds(), Vec3::from_array(w.tint)))
                .collect(),
        }
    }
}

impl Tracer for BrushTracer {
    fn point_in_leaf(&self, point: Vec3) -> usize {
        if !self.bounds.contains(point) {
            return 0;
        }
        let slab = (point.x / self.slab_width).floor().max(0.0) as usize;
        slab.min(self.leafs - 1) + 1
    }

    fn test_line(&self, start: Vec3, end: Vec3) -> bool {
        if start.distance(end) < MIN_SEGMENT_LENGTH {
            return true;
        }
        !self
            .pillars
            .iter()
            .any(|pillar| segment_enters_box(start, end, pillar).is_some())
    }

    fn test_opaque(&self, start: Vec3, end: Vec3) -> Occlusion {
        let mut transparency = Vec3::ONE;
        for (bounds, tint) in &self.windows {
            if segment_enters_box(start, end, bounds).is_some() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use radvis::{VisConfig, VisMode, VisQuery, build_vis_matrix};

    fn small_room() -> RoomDesc {
        RoomDesc {
            size: [128.0, 64.0, 64.0],
            leafs: 2,
            patch_size: 32.0,
            ..Default::default()
        }
    }

    #[test]
    fn quads_are_cut_in_to_patches() {
        let (scene, _) = small_room().build();
        assert!(scene.validate().is_ok());
        // Two slabs of 64x64x64: 4 quads of 2x2 patches each, plus one end
        // wall of 2x2 per slab
        assert_eq!(scene.faces.len(), 10);
        assert_eq!(scene.num_patches(), 40);
        assert_eq!(scene.leafs.len(), 3);
        assert_eq!(scene.leafs[1].faces.len(), 5);
        assert!(scene.entity_faces().is_empty());
    }

    #[test]
    fn patches_classify_in_to_their_slab() {
        let (scene, tracer) = small_room().build();
        for (l, leaf) in scene.leafs.iter().enumerate().skip(1) {
            for &face in &leaf.faces {
                for (_, patch) in scene.face_patches(face) {
                    assert_eq!(tracer.point_in_leaf(patch.origin), l);
                }
            }
        }
        assert_eq!(tracer.point_in_leaf(Vec3::new(-10.0, 0.0, 0.0)), 0);
        assert_eq!(tracer.point_in_leaf(Vec3::new(128.0, 64.0, 64.0)), 2);
    }

    #[test]
    fn pillar_blocks_and_window_tints() {
        let room = RoomDesc {
            pillars: vec![BoxDesc {
                mins: [60.0, 0.0, 0.0],
                maxs: [68.0, 16.0, 64.0],
            }],
            windows: vec![
                WindowDesc {
                    mins: [60.0, 48.0, 0.0],
                    maxs: [68.0, 64.0, 64.0],
                    tint: [0.5, 0.5, 1.0],
                },
                WindowDesc {
                    mins: [60.0, 16.0, 48.0],
                    maxs: [68.0, 48.0, 64.0],
                    tint: [0.0, 0.0, 0.0],
                },
            ],
            ..small_room()
        };
        let tracer = BrushTracer::new(&room);
        let at = |y, z| (Vec3::new(10.0, y, z), Vec3::new(120.0, y, z));

        let (a, b) = at(8.0, 32.0);
        assert!(!tracer.test_line(a, b));
        let (a, b) = at(32.0, 16.0);
        assert!(tracer.test_line(a, b));
        assert_eq!(tracer.test_opaque(a, b), Occlusion::Transmits(Vec3::ONE));
        let (a, b) = at(56.0, 16.0);
        assert_eq!(
            tracer.test_opaque(a, b),
            Occlusion::Transmits(Vec3::new(0.5, 0.5, 1.0))
        );
        let (a, b) = at(32.0, 56.0);
        assert_eq!(tracer.test_opaque(a, b), Occlusion::Blocked);
    }

    #[test]
    fn panels_are_entity_faces() {
        let room = RoomDesc {
            panels: vec![PanelDesc {
                x: 32.0,
                y: [16.0, 48.0],
                z: [0.0, 32.0],
                flip: false,
            }],
            ..small_room()
        };
        let (scene, tracer) = room.build();
        assert_eq!(scene.models.len(), 2);
        assert_eq!(scene.entity_faces(), 10..11);

        let config = VisConfig {
            threads: 2,
            incremental: false,
            mode: VisMode::Binary,
            estimate: false,
        };
        let vis = build_vis_matrix(&scene, &tracer, &config).unwrap();
        let panel = scene.face_patches(10).next().unwrap().0;
        // The far end wall faces the panel head on
        let (end_wall, _) = scene.face_patches(9).next().unwrap();
        assert!(vis.check(end_wall, panel).visible);
        // The near end wall is behind it
        let (near_wall, _) = scene.face_patches(4).next().unwrap();
        assert!(!vis.check(near_wall, panel).visible);
        assert_eq!(vis.num_patches(), scene.num_patches());
    }

    #[test]
    fn room_file_parses() {
        let room: RoomDesc = toml::from_str(
            r#"
            size = [512.0, 256.0, 128.0]
            leafs = 4

            [[windows]]
            mins = [380.0, 0.0, 0.0]
            maxs = [384.0, 256.0, 128.0]
            tint = [0.2, 0.6, 0.9]
            "#,
        )
        .unwrap();
        assert_eq!(room.leafs, 4);
        assert_eq!(room.patch_size, 32.0);
        assert_eq!(room.windows.len(), 1);
        assert!(room.check().is_ok());
        assert!(RoomDesc { leafs: 0, ..room }.check().is_err());
    }

    #[test]
    fn brushes_must_sit_in_the_room() {
        let pillar = |mins, maxs| RoomDesc {
            pillars: vec![BoxDesc { mins, maxs }],
            ..small_room()
        };
        assert!(pillar([60.0, 0.0, 0.0], [68.0, 16.0, 64.0]).check().is_ok());
        // Poking out of the ceiling only warns
        assert!(pillar([60.0, 0.0, 0.0], [68.0, 16.0, 80.0]).check().is_ok());

        let err = pillar([68.0, 0.0, 0.0], [60.0, 16.0, 64.0]).check().unwrap_err();
        assert!(err.contains("past maxs"), "{err}");
        let err = pillar([200.0, 0.0, 0.0], [210.0, 16.0, 64.0]).check().unwrap_err();
        assert!(err.contains("outside"), "{err}");
        let err = pillar([-1.0, -1.0, -1.0], [200.0, 80.0, 80.0]).check().unwrap_err();
        assert!(err.contains("whole room"), "{err}");

        let room = RoomDesc {
            windows: vec![WindowDesc {
                mins: [60.0, 70.0, 0.0],
                maxs: [68.0, 90.0, 64.0],
                tint: [0.5; 3],
            }],
            ..small_room()
        };
        let err = room.check().unwrap_err();
        assert!(err.starts_with("window 0"), "{err}");
    }
}

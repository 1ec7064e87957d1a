use glam::Vec3;
use math::{BoundingBox, Plane};

use super::WallTracer;
use crate::pvs::compress_vis;
use crate::vismatrix::SharedVisMatrix;
use crate::{
    CullStats, Face, Leaf, Model, Patch, Scene, VisConfig, VisCuller, VisMode, VisQuery,
    WorkQueue, build_vis_matrix,
};

/// Two leafs split at x = 50, one single-patch face in each. Patch 0 sits at
/// the origin facing +X, patch 1 at x = 100 with a face normal of
/// `far_normal`.
fn facing_pair(far_normal: Vec3) -> Scene {
    let far_origin = Vec3::new(100.0, 0.0, 0.0);
    Scene {
        patches: vec![
            Patch {
                origin: Vec3::ZERO,
                face: 0,
                next: None,
            },
            Patch {
                origin: far_origin,
                face: 1,
                next: None,
            },
        ],
        faces: vec![
            Face {
                plane: Plane::from_point_normal(Vec3::ZERO, Vec3::X),
                first_patch: Some(0),
            },
            Face {
                plane: Plane::from_point_normal(far_origin, far_normal),
                first_patch: Some(1),
            },
        ],
        leafs: vec![
            Leaf::default(),
            Leaf {
                vis_offset: Some(0),
                faces: vec![0],
            },
            Leaf {
                vis_offset: Some(0),
                faces: vec![1],
            },
        ],
        models: vec![Model {
            first_face: 0,
            num_faces: 2,
        }],
        vis_data: compress_vis(&[0b11]),
    }
}

fn split_at_50(point: Vec3) -> usize {
    if point.x < 50.0 { 1 } else { 2 }
}

fn wall_between() -> BoundingBox {
    BoundingBox::new(Vec3::new(40.0, -50.0, -50.0), Vec3::new(60.0, 50.0, 50.0))
}

fn config(mode: VisMode) -> VisConfig {
    VisConfig {
        threads: 2,
        incremental: false,
        mode,
        estimate: false,
    }
}

#[test]
fn facing_patches_see_each_other() {
    let scene = facing_pair(-Vec3::X);
    let tracer = WallTracer::new(split_at_50);
    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Binary)).unwrap();

    assert!(vis.check(0, 1).visible);
    assert!(vis.check(1, 0).visible);
    assert_eq!(vis.check(0, 1).transparency, Vec3::ONE);
    // Tested once, from the lower index only
    assert_eq!(tracer.oracle_calls(), (1, 1));
}

#[test]
fn wall_blocks_line_of_sight() {
    let scene = facing_pair(-Vec3::X);
    let mut tracer = WallTracer::new(split_at_50);
    tracer.walls.push(wall_between());
    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Binary)).unwrap();

    assert!(!vis.check(0, 1).visible);
    assert!(!vis.check(1, 0).visible);
    // Line test failed so the opaque check never ran
    assert_eq!(tracer.oracle_calls(), (1, 0));
}

#[test]
fn patch_behind_plane_skips_oracles() {
    // Far face now points away from the near patch
    let scene = facing_pair(Vec3::X);
    let tracer = WallTracer::new(split_at_50);
    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Binary)).unwrap();

    assert!(!vis.check(0, 1).visible);
    assert_eq!(tracer.oracle_calls(), (0, 0));
}

#[test]
fn target_behind_source_plane_skips_oracles() {
    // The far face points the same way as the near one but sits behind it:
    // patch 0 is in front of the far face, patch 1 is behind patch 0's face
    let behind = Vec3::new(-100.0, 0.0, 0.0);
    let mut scene = facing_pair(Vec3::X);
    scene.patches[1].origin = behind;
    scene.faces[1].plane = Plane::from_point_normal(behind, Vec3::X);
    let tracer = WallTracer::new(split_at_50);

    let matrix = SharedVisMatrix::new(scene.num_patches(), VisMode::Binary).unwrap();
    let queue = WorkQueue::new(scene.leafs.len() - 1, false);
    let stats = VisCuller::new(&scene, &tracer, &matrix)
        .build_vis_leafs(0, &queue)
        .unwrap();

    assert_eq!(
        stats,
        CullStats {
            faces_behind: 1,
            pairs: 1,
            behind_plane: 1,
            ..Default::default()
        }
    );
    assert!(!matrix.into_vis_matrix().unwrap().check(0, 1).visible);
    assert_eq!(tracer.oracle_calls(), (0, 0));

    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Binary)).unwrap();
    assert!(!vis.check(1, 0).visible);
    assert_eq!(tracer.oracle_calls(), (0, 0));
}

#[test]
fn tinted_window_attenuates() {
    let tint = Vec3::new(0.5, 0.75, 1.0);
    let scene = facing_pair(-Vec3::X);
    let mut tracer = WallTracer::new(split_at_50);
    tracer.windows.push((wall_between(), tint));

    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Attenuated)).unwrap();
    let result = vis.check(1, 0);
    assert!(result.visible);
    assert_eq!(result.transparency, tint);
    assert_eq!(vis.transparency().len(), 1);

    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Binary)).unwrap();
    assert_eq!(vis.check(1, 0).transparency, Vec3::ONE);
    assert!(vis.transparency().is_empty());
}

#[test]
fn opaque_window_blocks() {
    let scene = facing_pair(-Vec3::X);
    let mut tracer = WallTracer::new(split_at_50);
    tracer.windows.push((wall_between(), Vec3::ZERO));
    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Attenuated)).unwrap();

    assert!(!vis.check(0, 1).visible);
    assert_eq!(tracer.oracle_calls(), (1, 1));
}

#[test]
fn patch_outside_its_leaf_is_not_a_source() {
    // Both patches classify in to leaf 1, so the leaf 2 worker skips patch 1
    // while the leaf 1 worker only finds patch 0 on its own faces.
    let scene = facing_pair(-Vec3::X);
    let tracer = WallTracer::new(|_| 1);
    let vis = build_vis_matrix(&scene, &tracer, &config(VisMode::Binary)).unwrap();

    assert!(vis.check(0, 1).visible);
    assert_eq!(tracer.oracle_calls(), (1, 1));
}

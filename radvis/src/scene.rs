//! The parts of a compiled level the visibility stage reads. Everything here is
//! produced by earlier stages (BSP, vis, patch subdivision) and never mutated.

use std::ops::Range;

use glam::Vec3;
use math::Plane;

use crate::VisError;

/// A small piece of surface used as one unit of light transport. Patches on
/// the same face form a singly linked chain through `next`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub origin: Vec3,
    /// Index of the face this patch was cut from
    pub face: usize,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub plane: Plane,
    /// Head of the patch chain, `None` for faces that were not subdivided
    pub first_patch: Option<usize>,
}

/// A convex BSP leaf. Leaf 0 is the shared solid leaf and is never processed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Leaf {
    /// Where this leaf's compressed PVS starts in `Scene::vis_data`. A leaf
    /// without vis data can see everything.
    pub vis_offset: Option<usize>,
    /// Faces touching this leaf (marksurfaces). A face may be listed by
    /// several leaves.
    pub faces: Vec<usize>,
}

/// Model 0 is the world. Faces of every other model (brush entities) are not
/// referenced by any leaf.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Model {
    pub first_face: usize,
    pub num_faces: usize,
}

#[derive(Debug, Default, Clone)]
pub struct Scene {
    pub patches: Vec<Patch>,
    pub faces: Vec<Face>,
    pub leafs: Vec<Leaf>,
    pub models: Vec<Model>,
    pub vis_data: Vec<u8>,
}

impl Scene {
    pub fn num_patches(&self) -> usize {
        self.patches.len()
    }

    /// Walk the patch chain of `face`, yielding `(patch_index, patch)`
    pub fn face_patches(&self, face: usize) -> FacePatches<'_> {
        FacePatches {
            patches: &self.patches,
            next: self.faces.get(face).and_then(|f| f.first_patch),
        }
    }

    /// Faces belonging to brush entities: everything from the first face of
    /// model 1 to the end of the face list.
    pub fn entity_faces(&self) -> Range<usize> {
        match self.models.get(1) {
            Some(model) => model.first_face.min(self.faces.len())..self.faces.len(),
            None => 0..0,
        }
    }

    /// Check every cross reference so the workers can index without bounds
    /// surprises.
    pub fn validate(&self) -> Result<(), VisError> {
        let invalid = |msg: String| Err(VisError::InvalidScene(msg));

        if self.leafs.is_empty() {
            return invalid("no leafs, the solid leaf 0 is required".into());
        }

        for (i, patch) in self.patches.iter().enumerate() {
            if patch.face >= self.faces.len() {
                return invalid(format!("patch {i} references missing face {}", patch.face));
            }
            if let Some(next) = patch.next {
                if next >= self.patches.len() {
                    return invalid(format!("patch {i} links to missing patch {next}"));
                }
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            if let Some(first) = face.first_patch {
                if first >= self.patches.len() {
                    return invalid(format!("face {i} starts at missing patch {first}"));
                }
            }
            let mut steps = 0;
            for (p, patch) in self.face_patches(i) {
                if patch.face != i {
                    return invalid(format!(
                        "patch {p} is chained on face {i} but belongs to face {}",
                        patch.face
                    ));
                }
                steps += 1;
                if steps > self.patches.len() {
                    return invalid(format!("patch chain of face {i} loops"));
                }
            }
        }

        // Leaf that last marked each face, to catch a face listed twice
        let mut marked_by = vec![usize::MAX; self.faces.len()];
        for (i, leaf) in self.leafs.iter().enumerate() {
            if let Some(offset) = leaf.vis_offset {
                if offset >= self.vis_data.len() {
                    return invalid(format!(
                        "leaf {i} vis offset {offset} is past {} bytes of vis data",
                        self.vis_data.len()
                    ));
                }
            }
            for &face in &leaf.faces {
                let Some(mark) = marked_by.get_mut(face) else {
                    return invalid(format!("leaf {i} marks missing face {face}"));
                };
                if std::mem::replace(mark, i) == i {
                    return invalid(format!("leaf {i} marks face {face} twice"));
                }
            }
        }

        for (i, model) in self.models.iter().enumerate() {
            let end = model.first_face.checked_add(model.num_faces);
            if end.is_none_or(|end| end > self.faces.len()) {
                return invalid(format!("model {i} faces run past the face list"));
            }
        }

        Ok(())
    }
}

pub struct FacePatches<'a> {
    patches: &'a [Patch],
    next: Option<usize>,
}

impl<'a> Iterator for FacePatches<'a> {
    type Item = (usize, &'a Patch);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next?;
        let patch = self.patches.get(index)?;
        self.next = patch.next;
        Some((index, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane() -> Plane {
        Plane::new(Vec3::Z, 0.0)
    }

    fn two_face_scene() -> Scene {
        Scene {
            patches: vec![
                Patch {
                    origin: Vec3::ZERO,
                    face: 0,
                    next: Some(2),
                },
                Patch {
                    origin: Vec3::X,
                    face: 1,
                    next: None,
                },
                Patch {
                    origin: Vec3::Y,
                    face: 0,
                    next: None,
                },
            ],
            faces: vec![
                Face {
                    plane: plane(),
                    first_patch: Some(0),
                },
                Face {
                    plane: plane(),
                    first_patch: Some(1),
                },
            ],
            leafs: vec![
                Leaf::default(),
                Leaf {
                    vis_offset: None,
                    faces: vec![0, 1],
                },
            ],
            models: vec![
                Model {
                    first_face: 0,
                    num_faces: 1,
                },
                Model {
                    first_face: 1,
                    num_faces: 1,
                },
            ],
            vis_data: Vec::new(),
        }
    }

    #[test]
    fn walks_patch_chain() {
        let scene = two_face_scene();
        let chain: Vec<usize> = scene.face_patches(0).map(|(i, _)| i).collect();
        assert_eq!(chain, vec![0, 2]);
        assert_eq!(scene.face_patches(1).count(), 1);
        assert_eq!(scene.face_patches(9).count(), 0);
    }

    #[test]
    fn entity_faces_start_at_model_one() {
        let mut scene = two_face_scene();
        assert_eq!(scene.entity_faces(), 1..2);
        scene.models.truncate(1);
        assert!(scene.entity_faces().is_empty());
    }

    #[test]
    fn valid_scene_passes() {
        assert!(two_face_scene().validate().is_ok());
    }

    #[test]
    fn detects_looping_chain() {
        let mut scene = two_face_scene();
        scene.patches[2].next = Some(0);
        let err = scene.validate().unwrap_err();
        assert!(err.to_string().contains("loops"), "{err}");
    }

    #[test]
    fn detects_bad_references() {
        let mut scene = two_face_scene();
        scene.leafs[1].faces.push(7);
        assert!(matches!(scene.validate(), Err(VisError::InvalidScene(_))));

        let mut scene = two_face_scene();
        scene.leafs[1].vis_offset = Some(0);
        assert!(matches!(scene.validate(), Err(VisError::InvalidScene(_))));

        let mut scene = two_face_scene();
        scene.patches[1].face = 0;
        assert!(matches!(scene.validate(), Err(VisError::InvalidScene(_))));

        let mut scene = two_face_scene();
        scene.leafs.clear();
        assert!(matches!(scene.validate(), Err(VisError::InvalidScene(_))));
    }

    #[test]
    fn detects_face_marked_twice_by_one_leaf() {
        let mut scene = two_face_scene();
        scene.leafs[1].faces.push(0);
        let err = scene.validate().unwrap_err();
        assert!(err.to_string().contains("twice"), "{err}");

        // Different leafs may share a face
        let mut scene = two_face_scene();
        scene.leafs.push(Leaf {
            vis_offset: None,
            faces: vec![0],
        });
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn detects_overflowing_model_range() {
        let mut scene = two_face_scene();
        scene.models[1] = Model {
            first_face: 1,
            num_faces: usize::MAX,
        };
        assert!(matches!(scene.validate(), Err(VisError::InvalidScene(_))));
    }
}

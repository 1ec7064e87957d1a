use glam::Vec3;

/// How one box relates to another, from the point of view of `self`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundingState {
    /// The boxes do not touch
    Disjoint,
    /// The boxes overlap partially
    Union,
    /// `self` is inside the other box
    Subset,
    /// `self` completely envelops the other box
    Superset,
}

/// Axis aligned box. A fresh box from `empty()` is inverted so that the first
/// `add_point` collapses it onto that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub const fn new(mins: Vec3, maxs: Vec3) -> Self {
        Self { mins, maxs }
    }

    pub const fn empty() -> Self {
        Self {
            mins: Vec3::splat(f32::MAX),
            maxs: Vec3::splat(f32::MIN),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mins.x > self.maxs.x || self.mins.y > self.maxs.y || self.mins.z > self.maxs.z
    }

    pub fn add_point(&mut self, point: Vec3) {
        self.mins = self.mins.min(point);
        self.maxs = self.maxs.max(point);
    }

    /// Inclusive on all faces
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.mins).all() && point.cmple(self.maxs).all()
    }

    /// The other box is completely outside of this one
    pub fn test_disjoint(&self, other: &BoundingBox) -> bool {
        self.mins.cmpgt(other.maxs).any() || self.maxs.cmplt(other.mins).any()
    }

    /// This box is completely inside the other
    pub fn test_subset(&self, other: &BoundingBox) -> bool {
        self.mins.cmpge(other.mins).all() && self.maxs.cmple(other.maxs).all()
    }

    /// This box contains the other completely
    pub fn test_superset(&self, other: &BoundingBox) -> bool {
        other.test_subset(self)
    }

    pub fn test(&self, other: &BoundingBox) -> BoundingState {
        if self.test_disjoint(other) {
            BoundingState::Disjoint
        } else if self.test_subset(other) {
            BoundingState::Subset
        } else if self.test_superset(other) {
            BoundingState::Superset
        } else {
            BoundingState::Union
        }
    }
}

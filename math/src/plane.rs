use glam::Vec3;

/// A plane in Hesse normal form. Points where `normal · p == dist` lie on it.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f32,
}

impl Plane {
    #[inline]
    pub const fn new(normal: Vec3, dist: f32) -> Self {
        Self { normal, dist }
    }

    /// Build the plane through `point`. `normal` is expected to be unit length.
    #[inline]
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            dist: normal.dot(point),
        }
    }

    /// Signed distance, positive on the side the normal points to
    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.dist
    }

    /// True if `point` is further than `epsilon` in front of the plane. Points
    /// on the plane or within `epsilon` of it count as behind.
    #[inline]
    pub fn in_front(&self, point: Vec3, epsilon: f32) -> bool {
        self.normal.dot(point) > self.dist + epsilon
    }
}

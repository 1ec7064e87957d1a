use glam::Vec3;

/// What the opaque entity check found along a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Occlusion {
    /// Something solid is in the way
    Blocked,
    /// Light gets through, scaled per channel. `Vec3::ONE` when nothing
    /// translucent was crossed.
    Transmits(Vec3),
}

/// Geometry queries owned by the BSP stage. Implementations are called from
/// every worker thread at once and must not need `&mut self`.
pub trait Tracer: Sync {
    /// Index of the leaf containing `point`, 0 for solid space
    fn point_in_leaf(&self, point: Vec3) -> usize;

    /// True if the segment passes only through empty world space
    fn test_line(&self, start: Vec3, end: Vec3) -> bool;

    /// Check the segment against opaque and translucent brush entities
    fn test_opaque(&self, start: Vec3, end: Vec3) -> Occlusion;
}

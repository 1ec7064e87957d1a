//! Small geometric helpers shared by the visibility stage and the scene
//! generators: planes, axis aligned bounding boxes and segment tracing.

mod bounds;
mod plane;
mod trace;

pub use bounds::*;
pub use glam::Vec3;
pub use plane::*;
pub use trace::*;

/// Average of the three components. Used to judge colour attenuation.
#[inline]
pub fn vec3_avg(v: Vec3) -> f32 {
    (v.x + v.y + v.z) / 3.0
}

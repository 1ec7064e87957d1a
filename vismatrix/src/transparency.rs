use glam::Vec3;
use math::vec3_avg;

use crate::{MatrixError, ordered};

/// Smallest number of records the list grows by
const TRANSPARENCY_GROW_MIN: usize = 128;

/// An attenuation whose average is this close to 1.0 is treated as clear
pub const TRANSMISSIVE_EPSILON: f32 = 0.001;

/// True if light passes unattenuated
#[inline]
pub fn is_fully_transmissive(transparency: Vec3) -> bool {
    (vec3_avg(transparency) - 1.0).abs() < TRANSMISSIVE_EPSILON
}

/// Colour attenuation between a visible pair, `x < y`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransparencyEntry {
    pub x: u32,
    pub y: u32,
    pub transparency: Vec3,
}

/// Unordered list of pairs that see each other through something translucent.
///
/// Lookups are a linear scan. The list is only consulted when attenuated
/// visibility was requested.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TransparencyList {
    entries: Vec<TransparencyEntry>,
    peak_capacity: usize,
}

impl TransparencyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the attenuation for a pair. Capacity doubles when full.
    pub fn push(&mut self, x: usize, y: usize, transparency: Vec3) -> Result<(), MatrixError> {
        let (x, y) = ordered(x, y);
        if self.entries.len() == self.entries.capacity() {
            let grow = self.entries.capacity().max(TRANSPARENCY_GROW_MIN);
            self.entries
                .try_reserve_exact(grow)
                .map_err(|_| MatrixError::OutOfMemory {
                    what: "custom shadow array",
                    requested: (self.entries.capacity() + grow) * size_of::<TransparencyEntry>(),
                })?;
            self.peak_capacity = self.peak_capacity.max(self.entries.capacity());
        }

        self.entries.push(TransparencyEntry {
            x: x as u32,
            y: y as u32,
            transparency,
        });
        Ok(())
    }

    /// Attenuation recorded for the pair, or full transmission if none was
    pub fn find(&self, x: usize, y: usize) -> Vec3 {
        let (x, y) = ordered(x, y);
        self.entries
            .iter()
            .find(|e| e.x as usize == x && e.y as usize == y)
            .map(|e| e.transparency)
            .unwrap_or(Vec3::ONE)
    }

    pub fn entries(&self) -> &[TransparencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest allocation the list reached, in bytes
    pub fn peak_bytes(&self) -> usize {
        self.peak_capacity * size_of::<TransparencyEntry>()
    }
}

use std::sync::Mutex;

use glam::Vec3;

use crate::{
    MatrixError, SparseVisMatrix, TransparencyList, VisMatrix, VisMode, is_fully_transmissive,
};

struct VisState {
    matrix: SparseVisMatrix,
    transparency: TransparencyList,
}

/// The matrix while it is being built. Workers share one of these by
/// reference and every write goes through a single lock.
pub struct SharedVisMatrix {
    state: Mutex<VisState>,
    num_patches: usize,
    mode: VisMode,
}

impl SharedVisMatrix {
    pub fn new(num_patches: usize, mode: VisMode) -> Result<Self, MatrixError> {
        Ok(Self {
            state: Mutex::new(VisState {
                matrix: SparseVisMatrix::new(num_patches)?,
                transparency: TransparencyList::new(),
            }),
            num_patches,
            mode,
        })
    }

    pub fn num_patches(&self) -> usize {
        self.num_patches
    }

    pub fn mode(&self) -> VisMode {
        self.mode
    }

    pub fn set(&self, x: usize, y: usize) -> Result<(), MatrixError> {
        let mut state = self.state.lock().map_err(|_| MatrixError::Poisoned)?;
        state.matrix.set(x, y)
    }

    /// Mark the pair visible and, in attenuated mode, remember any
    /// attenuation that isn't full transmission. Both happen under the same
    /// lock.
    pub fn set_attenuated(&self, x: usize, y: usize, transparency: Vec3) -> Result<(), MatrixError> {
        let mut state = self.state.lock().map_err(|_| MatrixError::Poisoned)?;
        state.matrix.set(x, y)?;
        if self.mode == VisMode::Attenuated && !is_fully_transmissive(transparency) {
            state.transparency.push(x, y, transparency)?;
        }
        Ok(())
    }

    pub fn into_vis_matrix(self) -> Result<VisMatrix, MatrixError> {
        let state = self.state.into_inner().map_err(|_| MatrixError::Poisoned)?;
        Ok(VisMatrix {
            matrix: state.matrix,
            transparency: state.transparency,
            mode: self.mode,
        })
    }
}

use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{SparseVisMatrix, TransparencyList};

/// What a visibility query reports for a visible pair
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisMode {
    /// Visible or not, light always passes at full strength
    #[default]
    Binary,
    /// Visible pairs also carry the colour attenuation of any translucent
    /// brushes between them
    Attenuated,
}

impl FromStr for VisMode {
    type Err = std::io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "attenuated" => Ok(Self::Attenuated),
            _ => Err(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "Invalid visibility mode",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    pub visible: bool,
    /// Per channel fraction of light that gets through, `Vec3::ONE` if clear
    pub transparency: Vec3,
}

impl Visibility {
    pub const CLEAR: Self = Self {
        visible: true,
        transparency: Vec3::ONE,
    };
    pub const HIDDEN: Self = Self {
        visible: false,
        transparency: Vec3::ONE,
    };
}

/// Read-only access to patch to patch visibility, as the transfer solver sees
/// it
pub trait VisQuery {
    fn num_patches(&self) -> usize;

    fn check(&self, x: usize, y: usize) -> Visibility;
}

/// A finished visibility matrix
#[derive(Debug, Clone)]
pub struct VisMatrix {
    pub(crate) matrix: SparseVisMatrix,
    pub(crate) transparency: TransparencyList,
    pub(crate) mode: VisMode,
}

impl VisMatrix {
    pub fn matrix(&self) -> &SparseVisMatrix {
        &self.matrix
    }

    pub fn transparency(&self) -> &TransparencyList {
        &self.transparency
    }

    pub fn mode(&self) -> VisMode {
        self.mode
    }
}

impl VisQuery for VisMatrix {
    fn num_patches(&self) -> usize {
        self.matrix.num_patches()
    }

    fn check(&self, x: usize, y: usize) -> Visibility {
        if x == y {
            return Visibility::CLEAR;
        }
        if !self.matrix.test(x, y) {
            return Visibility::HIDDEN;
        }
        match self.mode {
            VisMode::Binary => Visibility::CLEAR,
            VisMode::Attenuated => Visibility {
                visible: true,
                transparency: self.transparency.find(x, y),
            },
        }
    }
}

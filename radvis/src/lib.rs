//! Patch to patch visibility for the radiosity stage of a map compiler.
//!
//! Given the compiled BSP (leafs, faces, compressed PVS) and the patches cut
//! from every face, decide which pairs of patches can exchange light. Work is
//! split by BSP leaf across a fixed pool of threads; each patch is tested only
//! against faces in leafs its own leaf can potentially see, plus every brush
//! entity face. Confirmed pairs go in to a sparse bit matrix that the transfer
//! solver then queries.
//!
//! ```text,ignore
//!   WorkQueue ──leaf──> VisCuller::build_vis_leafs
//!                          │ decompress PVS
//!                          │ for each patch in the leaf
//!                          └─> build_vis_row ─> test_patch_to_face
//!                                                  │ plane checks
//!                                                  │ Tracer::test_line
//!                                                  │ Tracer::test_opaque
//!                                                  └─> SharedVisMatrix::set_attenuated
//! ```

mod cache;
mod config;
mod culler;
mod error;
pub mod pvs;
mod scene;
mod scheduler;
mod tracer;
mod transfer;

pub use cache::TransferCache;
pub use config::VisConfig;
pub use culler::{CullStats, MINIMUM_PATCH_DISTANCE, VisCuller};
pub use error::{CacheError, PvsError, VisError};
pub use glam;
pub use log;
pub use scene::{Face, FacePatches, Leaf, Model, Patch, Scene};
pub use scheduler::{WorkQueue, run_workers};
pub use tracer::{Occlusion, Tracer};
pub use transfer::{Transfers, build_vis_matrix, make_scales};
pub use vismatrix;
pub use vismatrix::{VisMatrix, VisMode, VisQuery, Visibility};

#[cfg(test)]
mod tests;

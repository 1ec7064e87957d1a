use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("{count} patches exceeds the sparse vismatrix limit of {max}")]
    TooManyPatches { count: usize, max: usize },
    #[error("failed to allocate {requested} bytes for the {what}")]
    OutOfMemory { what: &'static str, requested: usize },
    #[error("patch {patch} is out of range, the matrix holds {count} patches")]
    PatchOutOfRange { patch: usize, count: usize },
    #[error("visibility matrix lock was poisoned by a panicking worker")]
    Poisoned,
}

use thiserror::Error;
use vismatrix::MatrixError;

/// Problems decoding a leaf's compressed visibility
#[derive(Debug, Error)]
pub enum PvsError {
    #[error("compressed vis ran out after {available} bytes, {needed} were needed")]
    Truncated { needed: usize, available: usize },
    #[error("zero run of {run} at byte {position} overflows a {row_bytes} byte vis row")]
    RunOverflow {
        position: usize,
        run: usize,
        row_bytes: usize,
    },
    #[error("vis offset {offset} is outside of the {len} bytes of vis data")]
    OffsetOutOfRange { offset: usize, len: usize },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("not a transfer cache file")]
    BadMagic,
    #[error("transfer cache claims {claimed} payload bytes but only {available} remain")]
    Truncated { claimed: u64, available: u64 },
}

#[derive(Debug, Error)]
pub enum VisError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Pvs(#[from] PvsError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("invalid scene: {0}")]
    InvalidScene(String),
    #[error("could not start worker threads: {0}")]
    ThreadPool(String),
    #[error("transfer solver failed: {0}")]
    Solver(Box<dyn std::error::Error + Send + Sync>),
}

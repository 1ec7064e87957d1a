//! Sparse storage for the "can patch X see patch Y" relation.
//!
//! Only pairs with `x < y` are stored. Each patch `x` owns a column, and each
//! column is a sorted list of packed rows. A row covers eight consecutive `y`
//! values:
//!
//! ```text,ignore
//!                 <──────────── 32 bits ────────────>
//!                 ┌──────────────────────┬──────────┐
//!      SparseRow  │  offset (y >> 3)     │  values  │
//!                 │  24 bits             │  8 bits  │
//!                 └──────────────────────┴──────────┘
//!
//!      column x ─┬─> [ off 0 | 0b0000_0110 ]   y = 1, 2
//!                ├─> [ off 3 | 0b1000_0000 ]   y = 31
//!                └─> [ off 9 | 0b0000_0001 ]   y = 72
//! ```
//!
//! Row offsets within a column are strictly increasing so lookups are a binary
//! search on `y >> 3`. A pair with no row, or with a clear bit, is "not
//! visible".
//!
//! While workers are building, the matrix lives inside a [`SharedVisMatrix`]
//! where every mutation happens under one lock. Once built it becomes a
//! read-only [`VisMatrix`] answering [`VisQuery::check`].

mod error;
mod query;
mod shared;
mod sparse;
mod telemetry;
mod transparency;

pub use error::MatrixError;
pub use query::{VisMatrix, VisMode, VisQuery, Visibility};
pub use shared::SharedVisMatrix;
pub use sparse::{MAX_SPARSE_VISMATRIX_PATCHES, SparseColumn, SparseRow, SparseVisMatrix};
pub use telemetry::{MemoryReport, human_bytes};
pub use transparency::{
    TRANSMISSIVE_EPSILON, TransparencyEntry, TransparencyList, is_fully_transmissive,
};

/// Order a pair so the smaller index comes first
#[inline]
pub(crate) const fn ordered(x: usize, y: usize) -> (usize, usize) {
    if x > y { (y, x) } else { (x, y) }
}

#[cfg(feature = "hprof")]
use coarse_prof::profile;

use crate::{MatrixError, ordered};

/// Width of the byte offset packed in to a `SparseRow`
const ROW_OFFSET_BITS: u32 = 24;

/// Patch indices must fit in a row offset once divided by eight
pub const MAX_SPARSE_VISMATRIX_PATCHES: usize = 1 << (ROW_OFFSET_BITS + 3);

/// Eight visibility bits for `y` in `offset * 8 .. offset * 8 + 8`, packed as
/// `offset << 8 | values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SparseRow(u32);

impl SparseRow {
    #[inline]
    fn new(offset: u32, values: u8) -> Self {
        debug_assert!(offset < 1 << ROW_OFFSET_BITS);
        Self((offset << 8) | values as u32)
    }

    #[inline]
    pub const fn offset(self) -> u32 {
        self.0 >> 8
    }

    #[inline]
    pub const fn values(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    fn set_bit(&mut self, bit: u32) {
        self.0 |= 1 << bit;
    }
}

/// All rows for one patch `x`, sorted by offset with no duplicates
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SparseColumn {
    rows: Vec<SparseRow>,
}

impl SparseColumn {
    /// `Ok(index)` of the row holding `offset`, or `Err(index)` where it
    /// would have to be inserted to keep the column sorted.
    #[inline]
    fn find_row(&self, offset: u32) -> Result<usize, usize> {
        self.rows.binary_search_by_key(&offset, |row| row.offset())
    }

    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Upper triangular bit matrix over patch pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseVisMatrix {
    columns: Vec<SparseColumn>,
}

impl SparseVisMatrix {
    /// Allocate one empty column per patch. Fails rather than aborting if the
    /// patch count can't be addressed or the columns can't be allocated.
    pub fn new(num_patches: usize) -> Result<Self, MatrixError> {
        if num_patches >= MAX_SPARSE_VISMATRIX_PATCHES {
            return Err(MatrixError::TooManyPatches {
                count: num_patches,
                max: MAX_SPARSE_VISMATRIX_PATCHES,
            });
        }

        let mut columns = Vec::new();
        columns
            .try_reserve_exact(num_patches)
            .map_err(|_| MatrixError::OutOfMemory {
                what: "visibility matrix",
                requested: num_patches * size_of::<SparseColumn>(),
            })?;
        columns.resize_with(num_patches, SparseColumn::default);

        Ok(Self { columns })
    }

    pub fn num_patches(&self) -> usize {
        self.columns.len()
    }

    /// Mark `x` and `y` as mutually visible. `set(x, x)` does nothing.
    pub fn set(&mut self, x: usize, y: usize) -> Result<(), MatrixError> {
        #[cfg(feature = "hprof")]
        profile!("sparse_set");
        if x == y {
            return Ok(());
        }
        let (x, y) = ordered(x, y);
        if y >= self.columns.len() {
            return Err(MatrixError::PatchOutOfRange {
                patch: y,
                count: self.columns.len(),
            });
        }

        let offset = (y >> 3) as u32;
        let bit = (y & 7) as u32;
        let column = &mut self.columns[x];

        match column.find_row(offset) {
            Ok(index) => column.rows[index].set_bit(bit),
            Err(index) => {
                column
                    .rows
                    .try_reserve(1)
                    .map_err(|_| MatrixError::OutOfMemory {
                        what: "visibility matrix row",
                        requested: (column.rows.len() + 1) * size_of::<SparseRow>(),
                    })?;
                column.rows.insert(index, SparseRow::new(offset, 1 << bit));
            }
        }
        Ok(())
    }

    /// True if the pair was marked visible. A patch always sees itself, pairs
    /// outside the matrix never are.
    pub fn test(&self, x: usize, y: usize) -> bool {
        #[cfg(feature = "hprof")]
        profile!("sparse_test");
        if x == y {
            return true;
        }
        let (x, y) = ordered(x, y);
        let Some(column) = self.columns.get(x) else {
            return false;
        };
        if y >= self.columns.len() {
            return false;
        }

        match column.find_row((y >> 3) as u32) {
            Ok(index) => column.rows[index].values() & (1 << (y & 7)) != 0,
            Err(_) => false,
        }
    }

    pub fn column(&self, x: usize) -> Option<&SparseColumn> {
        self.columns.get(x)
    }

    pub fn columns(&self) -> impl Iterator<Item = &SparseColumn> {
        self.columns.iter()
    }

    /// Total rows across all columns
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(SparseColumn::len).sum()
    }

    /// Column headers for every patch plus the rows actually stored
    pub fn memory_usage(&self) -> usize {
        size_of::<SparseColumn>() * self.columns.len()
            + self.row_count() * size_of::<SparseRow>()
    }
}

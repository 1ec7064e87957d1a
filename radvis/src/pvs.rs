//! Run length coded potentially visible sets.
//!
//! Each leaf's PVS is a bit row with one bit per leaf, leaf `n` at bit
//! `n - 1` (the solid leaf 0 has no bit). Rows are stored compressed: any
//! non-zero byte is stored as is, a run of zero bytes is stored as a `0`
//! followed by the run length.

use crate::{PvsError, Scene};

/// Bytes needed for an uncompressed row covering `num_leafs` leafs
#[inline]
pub const fn pvs_row_bytes(num_leafs: usize) -> usize {
    (num_leafs.saturating_sub(1) + 7) >> 3
}

/// True if `leaf` is flagged in a decompressed row. Leaf 0 never is.
#[inline]
pub fn leaf_visible(row: &[u8], leaf: usize) -> bool {
    if leaf == 0 {
        return false;
    }
    let bit = leaf - 1;
    row.get(bit >> 3)
        .is_some_and(|byte| byte & (1 << (bit & 7)) != 0)
}

/// Expand `compressed` in to `row`, filling it exactly. Trailing input past
/// the end of the row is ignored.
pub fn decompress_vis(compressed: &[u8], row: &mut [u8]) -> Result<(), PvsError> {
    let mut input = 0;
    let mut out = 0;

    while out < row.len() {
        let Some(&byte) = compressed.get(input) else {
            return Err(PvsError::Truncated {
                needed: input + 1,
                available: compressed.len(),
            });
        };
        if byte != 0 {
            row[out] = byte;
            out += 1;
            input += 1;
            continue;
        }

        let Some(&run) = compressed.get(input + 1) else {
            return Err(PvsError::Truncated {
                needed: input + 2,
                available: compressed.len(),
            });
        };
        let run = run as usize;
        if out + run > row.len() {
            return Err(PvsError::RunOverflow {
                position: input,
                run,
                row_bytes: row.len(),
            });
        }
        row[out..out + run].fill(0);
        out += run;
        input += 2;
    }

    Ok(())
}

/// The inverse of `decompress_vis`. Zero runs are split at 255.
pub fn compress_vis(row: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(row.len());
    let mut i = 0;

    while i < row.len() {
        if row[i] != 0 {
            out.push(row[i]);
            i += 1;
            continue;
        }
        let mut run = 1;
        while i + run < row.len() && row[i + run] == 0 && run < 255 {
            run += 1;
        }
        out.push(0);
        out.push(run as u8);
        i += run;
    }

    out
}

impl Scene {
    /// Decompress the PVS of `leaf` in to `row`, which must be
    /// `pvs_row_bytes(self.leafs.len())` long. Leafs without vis data see
    /// every leaf.
    pub fn decompress_leaf_pvs(&self, leaf: usize, row: &mut [u8]) -> Result<(), PvsError> {
        let Some(offset) = self.leafs.get(leaf).and_then(|l| l.vis_offset) else {
            row.fill(0xFF);
            return Ok(());
        };
        let compressed = self
            .vis_data
            .get(offset..)
            .ok_or(PvsError::OffsetOutOfRange {
                offset,
                len: self.vis_data.len(),
            })?;
        decompress_vis(compressed, row)
    }
}

//! A stand-in for the transfer solver: for every patch, how many others it
//! can see and how much light gets through to them in total. The per-patch
//! table is what gets cached between incremental runs.

use math::vec3_avg;
use radvis::VisQuery;
use radvis::log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchTransfers {
    pub visible: u32,
    /// Sum of the average transmission to each visible patch
    pub transmission: f32,
}

pub fn count_transfers(vis: &dyn VisQuery) -> Vec<PatchTransfers> {
    let n = vis.num_patches();
    let mut table = vec![PatchTransfers::default(); n];

    for x in 0..n {
        for y in x + 1..n {
            let v = vis.check(x, y);
            if !v.visible {
                continue;
            }
            let transmission = vec3_avg(v.transparency);
            for p in [x, y] {
                table[p].visible += 1;
                table[p].transmission += transmission;
            }
        }
    }
    table
}

pub fn encode(table: &[PatchTransfers]) -> bincode::Result<Vec<u8>> {
    bincode::serialize(table)
}

pub fn decode(bytes: &[u8]) -> bincode::Result<Vec<PatchTransfers>> {
    bincode::deserialize(bytes)
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TransferSummary {
    pub patches: usize,
    /// Each visible pair counted once
    pub pairs: usize,
    /// Patches that see nothing at all
    pub isolated: usize,
    pub mean_transmission: f32,
}

impl TransferSummary {
    pub fn of(table: &[PatchTransfers]) -> Self {
        let links: usize = table.iter().map(|p| p.visible as usize).sum();
        let transmission: f32 = table.iter().map(|p| p.transmission).sum();
        Self {
            patches: table.len(),
            pairs: links / 2,
            isolated: table.iter().filter(|p| p.visible == 0).count(),
            mean_transmission: if links > 0 {
                transmission / links as f32
            } else {
                0.0
            },
        }
    }

    pub fn log(&self) {
        let possible = self.patches * self.patches.saturating_sub(1) / 2;
        let percent = if possible > 0 {
            self.pairs as f32 / possible as f32 * 100.0
        } else {
            0.0
        };
        info!(
            "{} patches, {} visible pairs ({percent:.1}% of possible), {} isolated, mean \
             transmission {:.3}",
            self.patches, self.pairs, self.isolated, self.mean_transmission
        );
    }
}

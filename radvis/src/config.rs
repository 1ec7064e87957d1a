use serde::{Deserialize, Serialize};
use vismatrix::VisMode;

fn default_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

/// Knobs for one visibility build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisConfig {
    /// Worker thread count
    pub threads: usize,
    /// Reuse and keep the on-disk transfer cache
    pub incremental: bool,
    pub mode: VisMode,
    /// Log progress while the workers run
    pub estimate: bool,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            incremental: false,
            mode: VisMode::default(),
            estimate: true,
        }
    }
}

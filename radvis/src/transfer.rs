use std::path::Path;
use std::time::Instant;

use log::info;
#[cfg(feature = "hprof")]
use log::warn;
use vismatrix::{
    MAX_SPARSE_VISMATRIX_PATCHES, MatrixError, MemoryReport, SharedVisMatrix, VisMatrix, VisQuery,
};

use crate::scheduler::run_workers;
use crate::{CullStats, Scene, Tracer, TransferCache, VisConfig, VisCuller, VisError, WorkQueue};

/// Solver output along with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfers {
    pub data: Vec<u8>,
    pub from_cache: bool,
}

/// Build the patch visibility matrix for `scene` using `config.threads`
/// workers, one BSP leaf at a time.
pub fn build_vis_matrix<T: Tracer + ?Sized>(
    scene: &Scene,
    tracer: &T,
    config: &VisConfig,
) -> Result<VisMatrix, VisError> {
    scene.validate()?;

    info!(
        "Building visibility matrix for {} patches over {} leafs with {} threads",
        scene.num_patches(),
        scene.leafs.len(),
        config.threads
    );
    let start = Instant::now();

    let matrix = SharedVisMatrix::new(scene.num_patches(), config.mode)?;
    // Leaf 0 is solid and never claimed
    let queue = WorkQueue::new(scene.leafs.len().saturating_sub(1), config.estimate);
    let culler = VisCuller::new(scene, tracer, &matrix);

    let stats = run_workers(config.threads, &queue, |worker| {
        culler.build_vis_leafs(worker, &queue)
    })?;
    stats.into_iter().fold(CullStats::default(), |a, b| a + b).log();

    info!(
        "Visibility matrix took {:.2}s",
        start.elapsed().as_secs_f32()
    );
    Ok(matrix.into_vis_matrix()?)
}

/// Produce transfer data for `scene`, reusing the cache next to `source` when
/// incremental builds are on.
///
/// `solver` gets read-only access to the finished matrix; its output is what
/// gets cached. The matrix is released before the cache is written. A failed
/// solve leaves any existing cache untouched.
pub fn make_scales<T, F, E>(
    scene: &Scene,
    tracer: &T,
    config: &VisConfig,
    source: &Path,
    solver: F,
) -> Result<Transfers, VisError>
where
    T: Tracer + ?Sized,
    F: FnOnce(&dyn VisQuery) -> Result<Vec<u8>, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let num_patches = scene.num_patches();
    if num_patches >= MAX_SPARSE_VISMATRIX_PATCHES {
        return Err(MatrixError::TooManyPatches {
            count: num_patches,
            max: MAX_SPARSE_VISMATRIX_PATCHES,
        }
        .into());
    }

    let cache = TransferCache::for_source(source, config.incremental);
    if let Some(data) = cache.load(num_patches) {
        return Ok(Transfers {
            data,
            from_cache: true,
        });
    }

    let vis = build_vis_matrix(scene, tracer, config)?;
    MemoryReport::of(&vis).log();

    let start = Instant::now();
    let solved = solver(&vis);
    drop(vis);
    let data = solved.map_err(|e| VisError::Solver(e.into()))?;
    info!(
        "Transfer solver took {:.2}s, {} bytes",
        start.elapsed().as_secs_f32(),
        data.len()
    );

    cache.finish(num_patches, &data)?;

    #[cfg(feature = "hprof")]
    if let Err(e) = coarse_prof::write(&mut std::io::stdout()) {
        warn!("Could not write profile: {e}");
    }

    Ok(Transfers {
        data,
        from_cache: false,
    })
}

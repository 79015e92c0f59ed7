//! Parallel chunk pregeneration.
//!
//! Positions are fanned out over a crossbeam work channel to scoped worker
//! threads that all call [`ChunkStore::get_or_generate_chunk`]. The store's
//! per-slot gate keeps generation at most once per coordinate, so duplicate
//! positions are harmless.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::unbounded;
use tracing::{debug, info};

use crate::chunk::ChunkPos;
use crate::storage::ChunkStore;

/// Outcome of a pregeneration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PregenReport {
    /// Positions handed to workers.
    pub requested: usize,
    /// Chunks the generator actually ran for during the call.
    pub generated: u64,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Default worker count: one per logical CPU.
pub fn default_workers() -> usize {
    num_cpus::get().max(1)
}

/// Chunk positions in a square of `radius` around `center`, nearest first.
pub fn positions_around(center: ChunkPos, radius: i32) -> Vec<ChunkPos> {
    let radius = radius.max(0);
    let mut positions = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            positions.push(ChunkPos::new(center.x + dx, center.z + dz));
        }
    }
    positions.sort_by_key(|pos| {
        let dx = i64::from(pos.x - center.x);
        let dz = i64::from(pos.z - center.z);
        (dx * dx + dz * dz, pos.z, pos.x)
    });
    positions
}

/// Generate every position using `workers` threads (`None` = one per CPU).
pub fn pregenerate<I>(store: &ChunkStore, positions: I, workers: Option<usize>) -> PregenReport
where
    I: IntoIterator<Item = ChunkPos>,
{
    let start = Instant::now();
    let before = store.stats().generated;

    let (sender, receiver) = unbounded::<ChunkPos>();
    let mut requested = 0usize;
    for pos in positions {
        // The receiver is alive until the end of this function.
        let _ = sender.send(pos);
        requested += 1;
    }
    drop(sender);

    let workers = workers.unwrap_or_else(default_workers).clamp(1, requested.max(1));
    debug!(requested, workers, "Starting pregeneration");

    thread::scope(|scope| {
        for worker in 0..workers {
            let receiver = receiver.clone();
            scope.spawn(move || {
                let mut done = 0usize;
                while let Ok(pos) = receiver.recv() {
                    store.get_or_generate_chunk(pos);
                    done += 1;
                }
                debug!(worker, chunks = done, "Pregeneration worker finished");
            });
        }
    });

    let report = PregenReport {
        requested,
        generated: store.stats().generated - before,
        workers,
        elapsed: start.elapsed(),
    };
    info!(
        requested = report.requested,
        generated = report.generated,
        workers = report.workers,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "Pregeneration complete"
    );
    report
}

//! Bounded parallel execution of per-tile tasks
//!
//! Each call to `run` builds its own rayon pool sized to the resolved worker
//! count, submits every tile at once and drops the pool before returning.
//! Tasks share nothing: a tile path goes in, a `TaskOutcome` comes out.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::resolve_worker_count;
use crate::error::{ErrorKind, PipelineError, PipelineResult};
use crate::patches::PolygonFeature;
use crate::utils::progress::ProgressTracker;

/// Result of one tile task
#[derive(Debug)]
pub enum TaskOutcome {
    Success {
        tile: PathBuf,
        features: Vec<PolygonFeature>,
    },
    Failure {
        tile: PathBuf,
        error: PipelineError,
    },
}

/// A task that did not produce features
#[derive(Debug)]
pub struct TaskFailure {
    pub tile: PathBuf,
    pub error: PipelineError,
}

/// Aggregated outcome of a parallel run
#[derive(Debug)]
pub struct ExecutionReport {
    pub attempted: usize,
    /// Feature sets of the successful tasks, in tile order
    pub succeeded: Vec<Vec<PolygonFeature>>,
    pub failures: Vec<TaskFailure>,
    pub workers: usize,
    pub elapsed: Duration,
}

impl ExecutionReport {
    pub fn succeeded_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn feature_count(&self) -> usize {
        self.succeeded.iter().map(Vec::len).sum()
    }
}

/// Runs tile tasks on a bounded, run-scoped worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelExecutor {
    workers: usize,
}

impl ParallelExecutor {
    /// Sizes the pool from the requested count and the machine's cores
    pub fn new(requested: Option<usize>) -> PipelineResult<Self> {
        let workers = resolve_worker_count(requested, num_cpus::get())?;
        Ok(ParallelExecutor { workers })
    }

    /// Uses exactly `workers` threads
    pub fn with_workers(workers: usize) -> PipelineResult<Self> {
        if workers == 0 {
            return Err(PipelineError::Configuration("worker count must be positive".to_string()));
        }
        Ok(ParallelExecutor { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs `task` once per tile
    ///
    /// Task errors and panics are recorded as failures and never abort the
    /// other tasks. Only a pool that cannot be started is an error here.
    ///
    /// # Arguments
    /// * `tiles` - Tile files, one task each
    /// * `task` - Extraction applied to a tile path
    /// * `progress` - Advanced once per finished task
    pub fn run<F>(&self, tiles: &[PathBuf], task: F, progress: &ProgressTracker) -> PipelineResult<ExecutionReport>
    where
        F: Fn(&Path) -> PipelineResult<Vec<PolygonFeature>> + Sync,
    {
        let start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("rasterpatch-worker-{}", i))
            .build()
            .map_err(|e| PipelineError::Resource(format!("Cannot start worker pool: {}", e)))?;

        info!("Extracting patches from {} tiles with {} workers", tiles.len(), self.workers);

        let outcomes: Vec<TaskOutcome> = pool.install(|| {
            tiles.par_iter()
                .map(|tile| {
                    let outcome = run_task(tile, &task);
                    progress.increment(1);
                    outcome
                })
                .collect()
        });
        drop(pool);
        progress.finish();

        let mut succeeded = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Success { tile, features } => {
                    debug!("{}: {} features", tile.display(), features.len());
                    succeeded.push(features);
                }
                TaskOutcome::Failure { tile, error } => {
                    warn!("Skipping tile {}: {}", tile.display(), error);
                    failures.push(TaskFailure { tile, error });
                }
            }
        }

        Ok(ExecutionReport {
            attempted: tiles.len(),
            succeeded,
            failures,
            workers: self.workers,
            elapsed: start.elapsed(),
        })
    }
}

fn run_task<F>(tile: &Path, task: &F) -> TaskOutcome
where
    F: Fn(&Path) -> PipelineResult<Vec<PolygonFeature>> + Sync,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| task(tile)))
        .unwrap_or_else(|payload| Err(PipelineError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("worker panicked: {}", panic_message(payload.as_ref())),
        ))));

    match result {
        Ok(features) => TaskOutcome::Success { tile: tile.to_path_buf(), features },
        Err(error) => {
            let error = if error.kind() == ErrorKind::Processing {
                error
            } else {
                PipelineError::processing(tile, error)
            };
            TaskOutcome::Failure { tile: tile.to_path_buf(), error }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown cause".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use crate::patches::PatchGeometry;

    fn feature() -> PolygonFeature {
        PolygonFeature::new(PatchGeometry::Polygon(
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)])).with_attribute("area", 0.5)
    }

    fn tiles(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("tile_0000_{:04}.tif", i))).collect()
    }

    #[test]
    fn test_failures_do_not_stop_other_tasks() {
        let executor = ParallelExecutor::with_workers(3).unwrap();
        let report = executor.run(&tiles(6), |tile| {
            if tile.to_string_lossy().ends_with("0004.tif") {
                Err(PipelineError::Vector("corrupt".into()))
            } else {
                Ok(vec![feature(), feature()])
            }
        }, &ProgressTracker::hidden(6)).unwrap();

        assert_eq!(report.attempted, 6);
        assert_eq!(report.succeeded_count(), 5);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.feature_count(), 10);
        assert_eq!(report.failures[0].tile, PathBuf::from("tile_0000_0004.tif"));
        assert_eq!(report.failures[0].error.kind(), ErrorKind::Processing);
    }

    #[test]
    fn test_panicking_task_is_recorded() {
        let executor = ParallelExecutor::with_workers(2).unwrap();
        let report = executor.run(&tiles(3), |tile| {
            if tile.to_string_lossy().contains("0001") {
                panic!("decoder exploded");
            }
            Ok(vec![])
        }, &ProgressTracker::hidden(3)).unwrap();

        assert_eq!(report.succeeded_count(), 2);
        assert!(report.failures[0].error.to_string().contains("decoder exploded"));
    }

    #[test]
    fn test_results_independent_of_worker_count() {
        let task = |tile: &Path| -> PipelineResult<Vec<PolygonFeature>> {
            let digit = tile.to_string_lossy().chars().rev().nth(4)
                .and_then(|c| c.to_digit(10))
                .unwrap_or(0);
            Ok(vec![feature(); digit as usize % 3])
        };
        let one = ParallelExecutor::with_workers(1).unwrap()
            .run(&tiles(8), task, &ProgressTracker::hidden(8)).unwrap();
        let four = ParallelExecutor::with_workers(4).unwrap()
            .run(&tiles(8), task, &ProgressTracker::hidden(8)).unwrap();
        assert_eq!(one.succeeded, four.succeeded);
    }

    #[test]
    fn test_progress_counts_every_task() {
        let progress = ProgressTracker::hidden(4);
        ParallelExecutor::with_workers(2).unwrap()
            .run(&tiles(4), |_| Ok(vec![]), &progress).unwrap();
        assert_eq!(progress.position(), 4);
    }

    #[test]
    fn test_worker_bounds() {
        assert!(ParallelExecutor::with_workers(0).is_err());
        assert!(ParallelExecutor::new(Some(0)).is_err());
        let auto = ParallelExecutor::new(None).unwrap();
        assert!(auto.workers() >= 1 && auto.workers() <= 10);
    }
}

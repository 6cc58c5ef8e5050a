//! One ticking task per session.
//!
//! The runner owns the only `watch::Sender` for its session. Each tick it
//! computes the next grid from the current snapshot on the blocking pool and
//! publishes the new `(generation, grid)` pair in a single send, so readers
//! never see a grid from one generation paired with another's number.
//!
//! A tick that panics is logged and skipped; the runner keeps going and other
//! sessions are unaffected.

use std::sync::Arc;
use std::time::{Duration, Instant};

use life_engine::grid::Grid;
use tokio::sync::{oneshot, watch};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use super::Snapshot;
use crate::metrics::Metrics;

/// A generation function: current grid in, next grid out. Must not mutate
/// shared state; the runner may call it on any blocking-pool thread.
pub type StepFn = fn(&Grid) -> Grid;

/// Start a runner at generation 0.
///
/// Returns the snapshot receiver and the stop handle. The runner exits when
/// the stop handle fires or is dropped.
pub(crate) fn spawn(
    id: Uuid,
    grid: Grid,
    period: Duration,
    step: StepFn,
    metrics: Arc<Metrics>,
) -> (watch::Receiver<Snapshot>, oneshot::Sender<()>) {
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot {
        generation: 0,
        grid: Arc::new(grid),
    });
    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(run(id, snapshot_tx, stop_rx, period, step, metrics));
    (snapshot_rx, stop_tx)
}

async fn run(
    id: Uuid,
    snapshot_tx: watch::Sender<Snapshot>,
    mut stop: oneshot::Receiver<()>,
    period: Duration,
    step: StepFn,
    metrics: Arc<Metrics>,
) {
    let mut interval = tokio::time::interval(period);
    // A slow generation pushes the schedule back instead of bursting to catch up.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so generation 0 is visible for a full period.
    interval.tick().await;

    tracing::debug!("Session runner {} started (period {:?})", id, period);

    loop {
        tokio::select! {
            _ = &mut stop => break,
            _ = interval.tick() => {}
        }

        let current = snapshot_tx.borrow().clone();
        let next_generation = current.generation + 1;
        let started = Instant::now();

        match tokio::task::spawn_blocking(move || step(&current.grid)).await {
            Ok(next) => {
                snapshot_tx.send_replace(Snapshot {
                    generation: next_generation,
                    grid: Arc::new(next),
                });
                metrics.record_tick(started.elapsed());
            }
            Err(e) => {
                metrics.tick_failed();
                tracing::error!(
                    "Session {}: generation {} failed, skipping tick: {}",
                    id,
                    next_generation,
                    e
                );
            }
        }
    }

    tracing::debug!(
        "Session runner {} stopped at generation {}",
        id,
        snapshot_tx.borrow().generation
    );
}

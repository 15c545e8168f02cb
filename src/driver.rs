//! The outer sweep that advances a group of blocks through one timestep. The
//! schedule is cooperative: each sweep gives every block one pass over its
//! task list, so a block stalled on a receive yields while its neighbors
//! compute, and the messages it is waiting for get produced.

use rayon::prelude::*;

use crate::block::MeshBlock;
use crate::task_list::{TaskListStatus, TimeIntegratorTaskList};

/// Advance every block from `time` to `time + dt`, running the stages in
/// order with a group-wide barrier between them. Within a stage, blocks are
/// swept repeatedly until all of them report completion. Returns the new
/// time, which every block's clock is set to exactly.
///
pub fn advance_step(
    list: &TimeIntegratorTaskList,
    blocks: &mut [MeshBlock],
    time: f64,
    dt: f64,
) -> f64 {
    for pmb in blocks.iter_mut() {
        pmb.time = time;
        pmb.dt = dt;
    }

    for stage in 1..=list.nstages() {
        for pmb in blocks.iter_mut() {
            list.startup_task_list(pmb, stage);
        }

        let mut running = blocks.len();
        while running > 0 {
            running = blocks
                .iter_mut()
                .map(|pmb| list.do_available(pmb, stage))
                .filter(|status| *status == TaskListStatus::Running)
                .count();
        }
    }

    for pmb in blocks.iter_mut() {
        pmb.time = time + dt;
    }
    time + dt
}

/// The smallest timestep proposed by any block on the final stage of the
/// previous step.
///
pub fn min_block_dt(blocks: &[MeshBlock]) -> f64 {
    blocks
        .iter()
        .map(|pmb| pmb.new_block_dt)
        .fold(f64::MAX, f64::min)
}

/// Like [`advance_step`], but each sweep runs the blocks' passes on the
/// rayon thread pool. Blocks only interact through the boundary transport,
/// so the per-block passes within one sweep are independent.
///
pub fn advance_step_par(
    list: &TimeIntegratorTaskList,
    blocks: &mut [MeshBlock],
    time: f64,
    dt: f64,
) -> f64 {
    for pmb in blocks.iter_mut() {
        pmb.time = time;
        pmb.dt = dt;
    }

    for stage in 1..=list.nstages() {
        for pmb in blocks.iter_mut() {
            list.startup_task_list(pmb, stage);
        }

        let mut running = blocks.len();
        while running > 0 {
            running = blocks
                .par_iter_mut()
                .map(|pmb| list.do_available(pmb, stage))
                .filter(|status| *status == TaskListStatus::Running)
                .count();
        }
    }

    for pmb in blocks.iter_mut() {
        pmb.time = time + dt;
    }
    time + dt
}

//! Multistage time integration for block-structured finite-volume
//! simulations, organized as a per-block task list. A family of explicit
//! Runge-Kutta schemes is expressed in a unified low-storage 2S/3S* form,
//! and each stage of each block runs a dependency-driven DAG of tasks: flux
//! computation, inter-block boundary exchange, conserved-variable updates,
//! source terms, prolongation at refinement interfaces, primitive recovery,
//! and boundary conditions. Communication tasks poll their transport and
//! retry, so blocks interleave computation with their neighbors' messages
//! instead of blocking on them.
//!
//! The physics lives behind the collaborator traits in [`kernels`] and
//! [`bvals`]; this crate owns the scheduling, the register algebra, and the
//! integrator coefficient tables.

pub mod array;
pub mod block;
pub mod bvals;
pub mod config;
pub mod driver;
pub mod error;
pub mod integrator;
pub mod kernels;
pub mod solvers;
pub mod task;
pub mod task_list;

#[cfg(test)]
pub mod testutil;

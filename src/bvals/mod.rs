pub mod local;

use crate::array::{EdgeField, FaceField, FieldArray, FluxRegisters};

/// The primitive registers handed to the physical boundary-condition kernels
/// at the end of a stage.
///
pub struct BoundaryPrims<'a> {
    pub w: &'a mut FieldArray,
    pub r: Option<&'a mut FieldArray>,
    pub rad: Option<&'a mut FieldArray>,
}

/// Interface for the block-level boundary machinery: buffer lifecycles,
/// refinement-interface prolongation, shearing-box geometry, and the
/// physical boundary kernels. The underlying transport can in principle be
/// in-process channels, TCP, or a higher level abstraction like MPI.
///
/// The executor invokes `start_receiving` exactly once at the startup of
/// every stage, and `clear_boundary` exactly once when the stage's task list
/// terminates.
///
pub trait BoundaryValues {
    /// Post all receives for the coming stage.
    fn start_receiving(&mut self);

    /// Tear down the receive posts at the end of the stage.
    fn clear_boundary(&mut self);

    /// Recompute the shearing-box offset for the given time. Invoked at
    /// stage startup when the shearing box is active.
    fn compute_shear(&mut self, _time: f64) {}

    /// Propagate coarse boundary data to this block's ghost zones at
    /// refinement interfaces.
    fn prolongate_boundaries(&mut self, _time: f64, _dt: f64) {}

    /// Apply the physical boundary-condition kernels to the primitive
    /// registers.
    fn apply_physical_boundaries(&mut self, time: f64, dt: f64, prim: BoundaryPrims<'_>);

    /// The refinement level of the neighbor at offset (k, j, i) from this
    /// block, each offset in 0..3 with 1 meaning this block itself, or -1
    /// where there is no neighbor. Face probes decide how far the
    /// conservative-to-primitive pass reaches into the ghost zones.
    fn nblevel(&self, _k: usize, _j: usize, _i: usize) -> i64 {
        -1
    }
}

/// Interface for exchanging one cell-centered variable family with the
/// neighboring blocks. Receives poll the transport and report readiness;
/// the executor keeps retrying a receive task until its buffers arrive.
///
/// The variable register to operate on is passed explicitly on every call:
/// the conserved register during the exchange phases, the primitive register
/// when the physical-boundary phase re-points the interface.
///
pub trait CellCenteredBoundary {
    /// Send this block's fluxes at refinement interfaces for conservative
    /// correction on the coarse side.
    fn send_flux_correction(&mut self, _flux: &FluxRegisters) {}

    /// Receive and apply flux corrections from finer neighbors. Returns
    /// false while any correction is still in flight.
    fn receive_flux_correction(&mut self, _flux: &mut FluxRegisters) -> bool {
        true
    }

    /// Send the ghost-zone payloads of `var` to all neighbors. Must not
    /// block.
    fn send_boundary_buffers(&mut self, var: &FieldArray);

    /// Poll for neighbor payloads. Returns true once every expected buffer
    /// has arrived.
    fn receive_boundary_buffers(&mut self) -> bool;

    /// Copy the received payloads into the ghost zones of `var`.
    fn set_boundaries(&mut self, var: &mut FieldArray);

    fn send_shear_buffers(&mut self, _var: &FieldArray) {}

    fn receive_shear_buffers(&mut self, _var: &mut FieldArray) -> bool {
        true
    }
}

/// Interface for exchanging the face-centered field with the neighboring
/// blocks. The flux-correction currency of this family is the edge-centered
/// EMF rather than face fluxes; under the shearing box the azimuthal EMF is
/// additionally remapped across the radial boundaries.
///
pub trait FieldBoundary {
    fn send_flux_correction(&mut self, _e: &EdgeField) {}

    fn receive_flux_correction(&mut self, _e: &mut EdgeField) -> bool {
        true
    }

    fn send_boundary_buffers(&mut self, b: &FaceField);

    fn receive_boundary_buffers(&mut self) -> bool;

    fn set_boundaries(&mut self, b: &mut FaceField);

    fn send_shear_buffers(&mut self, _b: &FaceField) {}

    fn receive_shear_buffers(&mut self, _b: &mut FaceField) -> bool {
        true
    }

    fn send_emf_shear(&mut self, _e: &EdgeField) {}

    fn receive_emf_shear(&mut self, _e: &mut EdgeField) -> bool {
        true
    }

    fn remap_emf_shear(&mut self, _e: &mut EdgeField) {}
}

use crate::array::{EdgeField, FaceField, FieldArray, FluxRegisters};
use crate::block::CellBounds;

/// Interface to the flux, diffusion, and source-term machinery of the fluid.
/// The task list never looks inside these calls: reconstruction, Riemann
/// solves, and the structure of the divergence stencil all belong to the
/// implementation. The one convention the task list imposes is that every
/// coefficient it passes is the full stage weight `beta * dt`; kernels must
/// not fold in another factor of dt.
///
pub trait HydroKernels {
    /// Compute face fluxes of the conserved variables from the primitive
    /// state, at the given order of spatial reconstruction.
    fn calculate_fluxes(
        &mut self,
        w: &FieldArray,
        b: Option<&FaceField>,
        bcc: Option<&FieldArray>,
        order: usize,
        flux: &mut FluxRegisters,
    );

    /// Apply `u <- u + wght * Div(F)` over the interior zones.
    fn add_flux_divergence(&self, wght: f64, flux: &FluxRegisters, u: &mut FieldArray);

    /// Whether any diffusive process contributes to the fluxes.
    fn diffusion_defined(&self) -> bool {
        false
    }

    /// Compute the diffusive contributions ahead of the advective fluxes.
    /// The results stay inside the kernel object; `calculate_fluxes` folds
    /// them into the face fluxes it produces.
    fn calc_diffusion_flux(&mut self, _w: &FieldArray, _u: &FieldArray) {}

    /// Whether any non-geometric source terms are defined.
    fn source_terms_defined(&self) -> bool {
        false
    }

    /// Apply the source terms evaluated at the given time, scaled by `dt`.
    fn add_source_terms(
        &mut self,
        _time: f64,
        _dt: f64,
        _flux: &FluxRegisters,
        _w: &FieldArray,
        _bcc: Option<&FieldArray>,
        _u: &mut FieldArray,
    ) {
    }

    /// Propose the next timestep for this block from the current primitive
    /// state. Invoked on the final stage only.
    fn new_block_time_step(&self, _w: &FieldArray) -> f64 {
        f64::MAX
    }
}

/// Interface to the constrained-transport machinery of the magnetic field.
///
pub trait FieldKernels {
    /// Compute the corner-centered electromotive force from the primitive
    /// state and the cell-centered field.
    fn compute_corner_e(&mut self, w: &FieldArray, bcc: &FieldArray, e: &mut EdgeField);

    /// Apply the constrained-transport update `b <- b + wght * curl(E)`.
    fn ct(&mut self, wght: f64, e: &EdgeField, b: &mut FaceField);

    fn diffusion_defined(&self) -> bool {
        false
    }

    /// Accumulate the diffusive (resistive) EMF before the CT update.
    fn calc_diffusion_emf(&mut self, _b: &FaceField, _bcc: &FieldArray, _e: &mut EdgeField) {}
}

/// Interface to the passive-scalar advection kernels.
///
pub trait ScalarKernels {
    fn calculate_fluxes(&mut self, r: &FieldArray, order: usize, flux: &mut FluxRegisters);

    fn add_flux_divergence(&self, wght: f64, flux: &FluxRegisters, s: &mut FieldArray);

    fn diffusion_defined(&self) -> bool {
        false
    }

    /// Fill the dedicated scalar diffusion flux registers; the registers are
    /// zero-cleared by the task body before this is invoked.
    fn diffusive_flux(&mut self, _r: &FieldArray, _w: &FieldArray, _flux: &mut FluxRegisters) {}
}

/// Interface to the radiation transport kernels. The moments are evolved with
/// the same register algebra as the fluid; opacity and source coupling stay
/// behind this trait.
///
pub trait RadiationKernels {
    fn calculate_fluxes(&mut self, prim: &FieldArray, order: usize, flux: &mut FluxRegisters);

    fn add_flux_divergence(
        &self,
        wght: f64,
        prim: &FieldArray,
        flux: &FluxRegisters,
        cons: &mut FieldArray,
    );

    fn source_terms_defined(&self) -> bool {
        false
    }

    /// Apply the radiation source terms and deposit the back-reaction into
    /// the hydro conserved variables.
    fn add_source_terms(
        &mut self,
        _time: f64,
        _dt: f64,
        _prim: &FieldArray,
        _w: &FieldArray,
        _cons: &mut FieldArray,
        _u: &mut FieldArray,
    ) {
    }

    /// Recover the radiation primitives over the given zone range.
    fn conserved_to_primitive(
        &mut self,
        cons: &FieldArray,
        prim_out: &mut FieldArray,
        w: &FieldArray,
        bounds: &CellBounds,
    );

    /// Refresh the opacity from the updated fluid primitives.
    fn update_opacity(&mut self, _w: &FieldArray) {}
}

/// Interface to the equation of state. The zone range passed in covers the
/// interior plus however many ghost layers the caller has valid conserved
/// data for.
///
pub trait EquationOfState {
    /// Recover primitives from conserved variables. `w_old` carries the
    /// previous stage's primitives as an initial guess for iterative solvers.
    fn conserved_to_primitive(
        &self,
        u: &FieldArray,
        w_old: &FieldArray,
        b: Option<&FaceField>,
        w_out: &mut FieldArray,
        bcc: Option<&mut FieldArray>,
        bounds: &CellBounds,
    );

    /// The fourth-order correction pass, operating on cell averages over a
    /// range shrunk by one zone on every interior-adjacent side.
    fn conserved_to_primitive_cell_average(
        &self,
        _u: &FieldArray,
        _w_old: &FieldArray,
        _b: Option<&FaceField>,
        _w_out: &mut FieldArray,
        _bcc: Option<&mut FieldArray>,
        _bounds: &CellBounds,
    ) {
    }

    /// Recover the scalar concentrations from their conserved densities,
    /// given the already-updated fluid primitives.
    fn scalars_to_primitive(
        &self,
        _s: &FieldArray,
        _w: &FieldArray,
        _r: &mut FieldArray,
        _bounds: &CellBounds,
    ) {
    }

    fn scalars_to_primitive_cell_average(
        &self,
        _s: &FieldArray,
        _w: &FieldArray,
        _r: &mut FieldArray,
        _bounds: &CellBounds,
    ) {
    }
}

/// Interface to the geometric source terms of the coordinate system. In
/// Cartesian coordinates these vanish identically.
///
pub trait Coordinates {
    fn add_coord_terms(
        &self,
        wght: f64,
        flux: &FluxRegisters,
        w: &FieldArray,
        bcc: Option<&FieldArray>,
        u: &mut FieldArray,
    );
}

/// Cartesian coordinates: no geometric source terms.
///
pub struct Cartesian;

impl Coordinates for Cartesian {
    fn add_coord_terms(
        &self,
        _wght: f64,
        _flux: &FluxRegisters,
        _w: &FieldArray,
        _bcc: Option<&FieldArray>,
        _u: &mut FieldArray,
    ) {
    }
}

/// End-of-timestep hooks owned by the application: problem-specific work and
/// the refinement-condition check. Both run on the final stage only.
///
pub trait BlockHooks {
    fn user_work_in_loop(&mut self) {}

    fn check_refinement(&mut self) {}
}

/// Hooks that do nothing.
///
pub struct NoHooks;

impl BlockHooks for NoHooks {}

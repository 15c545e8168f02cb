//! Mock collaborators for exercising the task list without a mesh: a scalar
//! ODE "fluid" on a single zone, null kernels for the other families, and
//! boundary stand-ins with scripted arrival delays.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::array::{EdgeField, FaceField, FieldArray, FluxRegisters};
use crate::block::{BlockBounds, CellBounds, Field, Hydro, MeshBlock, PassiveScalars, Radiation};
use crate::bvals::local::{ChainExchange, LocalDomain};
use crate::bvals::CellCenteredBoundary;
use crate::bvals::FieldBoundary;
use crate::kernels::{
    BlockHooks, Cartesian, FieldKernels, HydroKernels, RadiationKernels, ScalarKernels,
};
use crate::solvers::advect1d::PassthroughEos;

pub type Recorder = Arc<Mutex<Vec<&'static str>>>;

pub fn recorder() -> Recorder {
    Arc::new(Mutex::new(Vec::new()))
}

/// The right-hand side of the scalar ODE du/dt = f(u).
pub enum Rhs {
    Const(f64),
    Linear,
}

/// Hydro kernels for a zero-dimensional ODE: the "flux" register caches the
/// RHS evaluated at the stage's primitive state, and the "divergence" adds
/// it with the stage weight. Runge-Kutta order behavior is then exactly that
/// of the textbook schemes.
pub struct OdeKernels {
    pub rhs: Rhs,
    pub record: Option<Recorder>,
}

impl OdeKernels {
    pub fn new(rhs: Rhs) -> Self {
        Self { rhs, record: None }
    }
}

impl HydroKernels for OdeKernels {
    fn calculate_fluxes(
        &mut self,
        w: &FieldArray,
        _b: Option<&FaceField>,
        _bcc: Option<&FieldArray>,
        _order: usize,
        flux: &mut FluxRegisters,
    ) {
        for (f, &w) in flux.x1.data_mut().iter_mut().zip(w.data()) {
            *f = match self.rhs {
                Rhs::Const(c) => c,
                Rhs::Linear => w,
            };
        }
    }

    fn add_flux_divergence(&self, wght: f64, flux: &FluxRegisters, u: &mut FieldArray) {
        for (u, &f) in u.data_mut().iter_mut().zip(flux.x1.data()) {
            *u += wght * f;
        }
    }

    fn source_terms_defined(&self) -> bool {
        self.record.is_some()
    }

    fn add_source_terms(
        &mut self,
        _time: f64,
        _dt: f64,
        _flux: &FluxRegisters,
        _w: &FieldArray,
        _bcc: Option<&FieldArray>,
        _u: &mut FieldArray,
    ) {
        if let Some(record) = &self.record {
            record.lock().unwrap().push("srcterm_hyd");
        }
    }
}

/// A single-zone block evolving the scalar ODE, with no neighbors.
pub fn ode_block(u0: f64, rhs: Rhs) -> MeshBlock {
    ode_block_with(u0, OdeKernels::new(rhs), Box::new(ChainExchange::solitary(0)))
}

pub fn ode_block_with(
    u0: f64,
    kernels: OdeKernels,
    bvar: Box<dyn CellCenteredBoundary + Send>,
) -> MeshBlock {
    let u = FieldArray::from_fn(1, |_| [u0]);
    let w = u.clone();
    let flux = FluxRegisters {
        x1: FieldArray::zeros(1, 1),
        ..FluxRegisters::default()
    };
    let hydro = Hydro::new(u, w, flux, Box::new(kernels), bvar);

    MeshBlock::new(
        0,
        BlockBounds::one_dim(1, 0),
        hydro,
        Box::new(PassthroughEos),
        Box::new(Cartesian),
        Box::new(LocalDomain::isolated()),
        Box::new(NullHooks::default()),
    )
}

/// Hooks that count their invocations, for asserting the final-stage-only
/// tasks run exactly once per timestep.
#[derive(Default)]
pub struct NullHooks {
    pub user_work_calls: Arc<AtomicUsize>,
    pub refinement_calls: Arc<AtomicUsize>,
}

impl BlockHooks for NullHooks {
    fn user_work_in_loop(&mut self) {
        self.user_work_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_refinement(&mut self) {
        self.refinement_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// A boundary whose receive reports not-ready a scripted number of times
/// before delegating to the wrapped exchange.
pub struct Laggy<B> {
    pub inner: B,
    pub remaining: usize,
}

impl<B: CellCenteredBoundary> CellCenteredBoundary for Laggy<B> {
    fn send_boundary_buffers(&mut self, var: &FieldArray) {
        self.inner.send_boundary_buffers(var);
    }

    fn receive_boundary_buffers(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            return false;
        }
        self.inner.receive_boundary_buffers()
    }

    fn set_boundaries(&mut self, var: &mut FieldArray) {
        self.inner.set_boundaries(var);
    }
}

pub struct NullCcBoundary;

impl CellCenteredBoundary for NullCcBoundary {
    fn send_boundary_buffers(&mut self, _var: &FieldArray) {}

    fn receive_boundary_buffers(&mut self) -> bool {
        true
    }

    fn set_boundaries(&mut self, _var: &mut FieldArray) {}
}

pub struct NullFcBoundary;

impl FieldBoundary for NullFcBoundary {
    fn send_boundary_buffers(&mut self, _b: &FaceField) {}

    fn receive_boundary_buffers(&mut self) -> bool {
        true
    }

    fn set_boundaries(&mut self, _b: &mut FaceField) {}
}

pub struct NullFieldKernels;

impl FieldKernels for NullFieldKernels {
    fn compute_corner_e(&mut self, _w: &FieldArray, _bcc: &FieldArray, _e: &mut EdgeField) {}

    fn ct(&mut self, _wght: f64, _e: &EdgeField, _b: &mut FaceField) {}
}

pub struct NullScalarKernels;

impl ScalarKernels for NullScalarKernels {
    fn calculate_fluxes(&mut self, _r: &FieldArray, _order: usize, _flux: &mut FluxRegisters) {}

    fn add_flux_divergence(&self, _wght: f64, _flux: &FluxRegisters, _s: &mut FieldArray) {}
}

pub struct NullRadKernels {
    pub record: Option<Recorder>,
}

impl RadiationKernels for NullRadKernels {
    fn calculate_fluxes(&mut self, _prim: &FieldArray, _order: usize, _flux: &mut FluxRegisters) {}

    fn add_flux_divergence(
        &self,
        _wght: f64,
        _prim: &FieldArray,
        _flux: &FluxRegisters,
        _cons: &mut FieldArray,
    ) {
    }

    fn source_terms_defined(&self) -> bool {
        self.record.is_some()
    }

    fn add_source_terms(
        &mut self,
        _time: f64,
        _dt: f64,
        _prim: &FieldArray,
        _w: &FieldArray,
        _cons: &mut FieldArray,
        _u: &mut FieldArray,
    ) {
        if let Some(record) = &self.record {
            record.lock().unwrap().push("srcterm_rad");
        }
    }

    fn conserved_to_primitive(
        &mut self,
        cons: &FieldArray,
        prim_out: &mut FieldArray,
        _w: &FieldArray,
        _bounds: &CellBounds,
    ) {
        prim_out.clone_from(cons);
    }
}

/// Attach a mock field family to a block, for the startup-register checks.
pub fn mock_field(num_zones: usize) -> Field {
    let face = FaceField {
        x1f: FieldArray::from_fn(num_zones + 1, |i| [i as f64 + 1.0]),
        x2f: FieldArray::from_fn(num_zones, |i| [i as f64 + 2.0]),
        x3f: FieldArray::from_fn(num_zones, |i| [i as f64 + 3.0]),
    };
    Field::new(
        face,
        FieldArray::zeros(1, num_zones),
        EdgeField::default(),
        Box::new(NullFieldKernels),
        Box::new(NullFcBoundary),
    )
}

/// Attach a mock passive-scalar family to a block.
pub fn mock_scalars(num_zones: usize) -> PassiveScalars {
    let s = FieldArray::from_fn(num_zones, |i| [i as f64 + 0.5, 2.0 * i as f64 + 0.25]);
    let r = s.clone();
    PassiveScalars::new(
        s,
        r,
        FluxRegisters::default(),
        Box::new(NullScalarKernels),
        Box::new(NullCcBoundary),
    )
}

/// Attach a mock radiation family to a block.
pub fn mock_radiation(num_zones: usize, record: Option<Recorder>) -> Radiation {
    let cons = FieldArray::from_fn(num_zones, |i| [2.0 * i as f64 + 1.0]);
    let prim = cons.clone();
    Radiation::new(
        cons,
        prim,
        FluxRegisters::default(),
        Box::new(NullRadKernels { record }),
        Box::new(NullCcBoundary),
    )
}

use crate::array::{EdgeField, FaceField, FieldArray, FluxRegisters};
use crate::bvals::{BoundaryValues, CellCenteredBoundary, FieldBoundary};
use crate::kernels::{
    BlockHooks, Coordinates, EquationOfState, FieldKernels, HydroKernels, RadiationKernels,
    ScalarKernels,
};

/// The index extent of a block's interior zones, plus the ghost-layer depth.
/// Interior zones run `is..=ie` along the first axis, and similarly for the
/// other two; a one- or two-dimensional block collapses the unused axes to a
/// single zone.
///
#[derive(Clone, Copy, Debug)]
pub struct BlockBounds {
    pub is: i64,
    pub ie: i64,
    pub js: i64,
    pub je: i64,
    pub ks: i64,
    pub ke: i64,
    pub nghost: i64,
}

impl BlockBounds {
    /// Bounds for a 1-D block with the given interior zone count and ghost
    /// depth.
    ///
    pub fn one_dim(num_zones: i64, nghost: i64) -> Self {
        Self {
            is: nghost,
            ie: nghost + num_zones - 1,
            js: 0,
            je: 0,
            ks: 0,
            ke: 0,
            nghost,
        }
    }

    /// The loop limits covering exactly the interior.
    ///
    pub fn interior(&self) -> CellBounds {
        CellBounds {
            il: self.is,
            iu: self.ie,
            jl: self.js,
            ju: self.je,
            kl: self.ks,
            ku: self.ke,
        }
    }
}

/// Inclusive loop limits over a range of zones, possibly reaching into the
/// ghost layers.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellBounds {
    pub il: i64,
    pub iu: i64,
    pub jl: i64,
    pub ju: i64,
    pub kl: i64,
    pub ku: i64,
}

/// Whether a task has run to completion in the current stage.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Complete,
}

/// Per-block completion record for one stage of the task list: the bitmask
/// of finished task ids, the number of tasks still to run, and the per-task
/// indicators. Reset at every stage startup.
///
#[derive(Clone, Debug, Default)]
pub struct TaskStates {
    pub finished: u64,
    pub num_tasks_left: usize,
    states: Vec<TaskState>,
}

impl TaskStates {
    pub fn reset(&mut self, ntasks: usize) {
        self.finished = 0;
        self.num_tasks_left = ntasks;
        self.states.clear();
        self.states.resize(ntasks, TaskState::Pending);
    }

    pub fn is_complete(&self, index: usize) -> bool {
        self.states[index] == TaskState::Complete
    }

    pub fn mark_complete(&mut self, index: usize, id: u64) {
        debug_assert_eq!(self.states[index], TaskState::Pending);
        self.states[index] = TaskState::Complete;
        self.finished |= id;
        self.num_tasks_left -= 1;
    }
}

/// The fluid state of a block: the conserved register `u`, its running-sum
/// scratch `u1`, the extra register `u2` referenced by the three-register
/// schemes (left empty otherwise), the primitive register pair, and the face
/// fluxes.
///
pub struct Hydro {
    pub u: FieldArray,
    pub u1: FieldArray,
    pub u2: FieldArray,
    pub w: FieldArray,
    pub w1: FieldArray,
    pub flux: FluxRegisters,
    pub kernels: Box<dyn HydroKernels + Send>,
    pub bvar: Box<dyn CellCenteredBoundary + Send>,
}

impl Hydro {
    pub fn new(
        u: FieldArray,
        w: FieldArray,
        flux: FluxRegisters,
        kernels: Box<dyn HydroKernels + Send>,
        bvar: Box<dyn CellCenteredBoundary + Send>,
    ) -> Self {
        let u1 = FieldArray::zeros(u.num_fields(), u.num_zones());
        let w1 = w.clone();
        Self {
            u,
            u1,
            u2: FieldArray::default(),
            w,
            w1,
            flux,
            kernels,
            bvar,
        }
    }
}

/// The face-centered magnetic field of a block, with its register triplet,
/// the cell-centered averages, and the corner EMF.
///
pub struct Field {
    pub b: FaceField,
    pub b1: FaceField,
    pub b2: FaceField,
    pub bcc: FieldArray,
    pub e: EdgeField,
    pub kernels: Box<dyn FieldKernels + Send>,
    pub bvar: Box<dyn FieldBoundary + Send>,
}

impl Field {
    pub fn new(
        b: FaceField,
        bcc: FieldArray,
        e: EdgeField,
        kernels: Box<dyn FieldKernels + Send>,
        bvar: Box<dyn FieldBoundary + Send>,
    ) -> Self {
        let b1 = FaceField {
            x1f: FieldArray::zeros(b.x1f.num_fields(), b.x1f.num_zones()),
            x2f: FieldArray::zeros(b.x2f.num_fields(), b.x2f.num_zones()),
            x3f: FieldArray::zeros(b.x3f.num_fields(), b.x3f.num_zones()),
        };
        Self {
            b,
            b1,
            b2: FaceField::default(),
            bcc,
            e,
            kernels,
            bvar,
        }
    }
}

/// The passive scalars of a block: conserved densities `s`, concentrations
/// `r`, and a dedicated diffusion flux separate from the advective one.
///
pub struct PassiveScalars {
    pub s: FieldArray,
    pub s1: FieldArray,
    pub s2: FieldArray,
    pub r: FieldArray,
    pub flux: FluxRegisters,
    pub diffusion_flux: FluxRegisters,
    pub kernels: Box<dyn ScalarKernels + Send>,
    pub bvar: Box<dyn CellCenteredBoundary + Send>,
}

impl PassiveScalars {
    pub fn new(
        s: FieldArray,
        r: FieldArray,
        flux: FluxRegisters,
        kernels: Box<dyn ScalarKernels + Send>,
        bvar: Box<dyn CellCenteredBoundary + Send>,
    ) -> Self {
        let s1 = FieldArray::zeros(s.num_fields(), s.num_zones());
        let diffusion_flux = flux.clone();
        Self {
            s,
            s1,
            s2: FieldArray::default(),
            r,
            flux,
            diffusion_flux,
            kernels,
            bvar,
        }
    }
}

/// The radiation moments of a block, evolved with the same register algebra
/// as the fluid.
///
pub struct Radiation {
    pub cons: FieldArray,
    pub cons1: FieldArray,
    pub cons2: FieldArray,
    pub prim: FieldArray,
    pub prim1: FieldArray,
    pub flux: FluxRegisters,
    pub kernels: Box<dyn RadiationKernels + Send>,
    pub bvar: Box<dyn CellCenteredBoundary + Send>,
}

impl Radiation {
    pub fn new(
        cons: FieldArray,
        prim: FieldArray,
        flux: FluxRegisters,
        kernels: Box<dyn RadiationKernels + Send>,
        bvar: Box<dyn CellCenteredBoundary + Send>,
    ) -> Self {
        let cons1 = FieldArray::zeros(cons.num_fields(), cons.num_zones());
        let prim1 = prim.clone();
        Self {
            cons,
            cons1,
            cons2: FieldArray::default(),
            prim,
            prim1,
            flux,
            kernels,
            bvar,
        }
    }
}

/// One block of the mesh: the evolved variable families with their storage
/// registers, the collaborator handles the task bodies delegate to, and the
/// per-stage bookkeeping owned by the task-list executor. Registers are
/// owned exclusively by the block; tasks of different blocks only interact
/// through the boundary transport.
///
pub struct MeshBlock {
    /// Identifies the block within its group, for diagnostics.
    pub gid: usize,

    /// Time at the beginning of the current step.
    pub time: f64,

    /// The current full timestep.
    pub dt: f64,

    /// The timestep this block proposes for the next cycle, refreshed by the
    /// final stage.
    pub new_block_dt: f64,

    /// Accumulated wall time of the load-balanced tasks.
    pub lb_cost: f64,

    pub bounds: BlockBounds,

    /// Effective time offset of the (u, u1, u2) registers after each stage,
    /// indexed `[stage][register]`. Rebuilt at every step startup.
    pub stage_abscissae: Vec<[f64; 3]>,

    pub task_states: TaskStates,

    pub hydro: Hydro,
    pub field: Option<Field>,
    pub scalars: Option<PassiveScalars>,
    pub rad: Option<Radiation>,

    pub eos: Box<dyn EquationOfState + Send>,
    pub coord: Box<dyn Coordinates + Send>,
    pub bval: Box<dyn BoundaryValues + Send>,
    pub hooks: Box<dyn BlockHooks + Send>,
}

impl MeshBlock {
    pub fn new(
        gid: usize,
        bounds: BlockBounds,
        hydro: Hydro,
        eos: Box<dyn EquationOfState + Send>,
        coord: Box<dyn Coordinates + Send>,
        bval: Box<dyn BoundaryValues + Send>,
        hooks: Box<dyn BlockHooks + Send>,
    ) -> Self {
        Self {
            gid,
            time: 0.0,
            dt: 0.0,
            new_block_dt: f64::MAX,
            lb_cost: 0.0,
            bounds,
            stage_abscissae: Vec::new(),
            task_states: TaskStates::default(),
            hydro,
            field: None,
            scalars: None,
            rad: None,
            eos,
            coord,
            bval,
            hooks,
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_scalars(mut self, scalars: PassiveScalars) -> Self {
        self.scalars = Some(scalars);
        self
    }

    pub fn with_radiation(mut self, rad: Radiation) -> Self {
        self.rad = Some(rad);
        self
    }
}

use serde::{Deserialize, Serialize};

/// Time-integration settings, as read from the `time` section of a parameter
/// file. The CFL number is clamped to the selected scheme's stability limit
/// when the task list is built.
///
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimeConfig {
    pub integrator: String,
    pub cfl_number: f64,
}

impl TimeConfig {
    /// Settings for the given CFL number and the default integrator (`vl2`).
    ///
    pub fn new(cfl_number: f64) -> Self {
        Self {
            integrator: String::from("vl2"),
            cfl_number,
        }
    }

    pub fn with_integrator(mut self, name: &str) -> Self {
        self.integrator = String::from(name);
        self
    }
}

/// The physics toggles that shape a time-integrator task list. These are
/// fixed for the lifetime of a task list; rebuilding the list is the way to
/// change them.
///
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Evolve a face-centered magnetic field alongside the fluid.
    pub magnetic_fields: bool,

    /// Number of passive scalar fields advected with the flow.
    pub nscalars: usize,

    /// Evolve the radiation moments and couple them back into the fluid.
    pub radiation: bool,

    /// Static or adaptive mesh refinement is in use, so flux correction and
    /// prolongation tasks are required at refinement interfaces.
    pub multilevel: bool,

    /// Refinement is adaptive; blocks flag themselves for regridding at the
    /// end of each timestep.
    pub adaptive: bool,

    /// Shearing-box boundary remaps are in effect.
    pub shearing_box: bool,

    /// Diffusion terms are handled by a super-time-stepping loop outside this
    /// task list, so the diffusive-flux tasks are omitted here.
    pub sts: bool,

    /// The fluid is evolved (as opposed to held fixed, e.g. for tracer-only
    /// or kinematic problems).
    pub fluid_evolved: bool,

    /// Spatial dimensionality of the mesh, 1 to 3.
    pub ndim: usize,

    /// Order of spatial reconstruction; 4 selects the cell-averaged
    /// primitive-variable correction.
    pub xorder: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            magnetic_fields: false,
            nscalars: 0,
            radiation: false,
            multilevel: false,
            adaptive: false,
            shearing_box: false,
            sts: false,
            fluid_evolved: true,
            ndim: 1,
            xorder: 2,
        }
    }
}

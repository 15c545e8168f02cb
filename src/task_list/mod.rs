pub mod time_integrator;

use std::time::Instant;

use crate::block::MeshBlock;
use crate::config::{PhysicsConfig, TimeConfig};
use crate::error::Error;
use crate::integrator::Integrator;
use crate::task::{id, lookup, Task, TaskStatus};

/// Whether a block still has pending tasks in the current stage.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskListStatus {
    Running,
    Complete,
}

/// The task list of one multistage time-integration cycle. Built once from
/// the time and physics configuration; every stage of every block then runs
/// the same list, with per-block completion state living on the block.
///
pub struct TimeIntegratorTaskList {
    integrator: Integrator,
    phys: PhysicsConfig,
    cfl_number: f64,
    tasks: Vec<Task>,
}

impl TimeIntegratorTaskList {
    /// Assemble the task list for the configured integrator and physics.
    /// The requested CFL number is clamped to the scheme's stability limit
    /// when the fluid is evolved.
    ///
    pub fn new(time: &TimeConfig, phys: &PhysicsConfig) -> Result<Self, Error> {
        let integrator = Integrator::from_name(&time.integrator, phys.ndim)?;

        if !time.cfl_number.is_finite() || time.cfl_number <= 0.0 {
            return Err(Error::InvalidConfiguration(format!(
                "cfl_number must be positive, got {}",
                time.cfl_number
            )));
        }
        let cfl_number = integrator.clamp_cfl(time.cfl_number, phys.fluid_evolved);

        let mut list = Self {
            integrator,
            phys: phys.clone(),
            cfl_number,
            tasks: Vec::new(),
        };
        list.assemble()?;
        Ok(list)
    }

    fn assemble(&mut self) -> Result<(), Error> {
        let mhd = self.phys.magnetic_fields;
        let scalars = self.phys.nscalars > 0;
        let rad = self.phys.radiation;
        let multilevel = self.phys.multilevel;
        let shear = self.phys.shearing_box;

        // Diffusive fluxes come first so the advective flux computation can
        // fold them in; under STS the diffusion tasks belong to the outer
        // super-time-stepping list instead.
        if !self.phys.sts {
            self.add_task(id::DIFFUSE_HYD, id::NONE)?;
            if mhd {
                self.add_task(id::DIFFUSE_FLD, id::NONE)?;
                self.add_task(id::CALC_HYDFLX, id::DIFFUSE_HYD | id::DIFFUSE_FLD)?;
            } else {
                self.add_task(id::CALC_HYDFLX, id::DIFFUSE_HYD)?;
            }
            if scalars {
                self.add_task(id::DIFFUSE_SCLR, id::NONE)?;
                self.add_task(id::CALC_SCLRFLX, id::CALC_HYDFLX | id::DIFFUSE_SCLR)?;
            }
        } else {
            self.add_task(id::CALC_HYDFLX, id::NONE)?;
            if scalars {
                self.add_task(id::CALC_SCLRFLX, id::CALC_HYDFLX)?;
            }
        }

        if multilevel {
            self.add_task(id::SEND_HYDFLX, id::CALC_HYDFLX)?;
            self.add_task(id::RECV_HYDFLX, id::CALC_HYDFLX)?;
            self.add_task(id::INT_HYD, id::RECV_HYDFLX)?;
        } else {
            self.add_task(id::INT_HYD, id::CALC_HYDFLX)?;
        }

        // Radiation source terms deposit their back-reaction into the hydro
        // conserved variables, so the hydro source terms wait for them.
        if rad {
            self.add_task(id::SRCTERM_HYD, id::INT_HYD | id::SRCTERM_RAD)?;
        } else {
            self.add_task(id::SRCTERM_HYD, id::INT_HYD)?;
        }
        self.add_task(id::SEND_HYD, id::SRCTERM_HYD)?;
        self.add_task(id::RECV_HYD, id::NONE)?;
        self.add_task(id::SETB_HYD, id::RECV_HYD | id::SRCTERM_HYD)?;
        if shear {
            self.add_task(id::SEND_HYDSH, id::SETB_HYD)?;
            self.add_task(id::RECV_HYDSH, id::SETB_HYD)?;
        }

        if mhd {
            self.add_task(id::CALC_FLDFLX, id::CALC_HYDFLX)?;
            self.add_task(id::SEND_FLDFLX, id::CALC_FLDFLX)?;
            self.add_task(id::RECV_FLDFLX, id::SEND_FLDFLX)?;
            if shear {
                self.add_task(id::SEND_EMFSH, id::RECV_FLDFLX)?;
                self.add_task(id::RECV_EMFSH, id::RECV_FLDFLX)?;
                self.add_task(id::RMAP_EMFSH, id::RECV_EMFSH)?;
                self.add_task(id::INT_FLD, id::RMAP_EMFSH)?;
            } else {
                self.add_task(id::INT_FLD, id::RECV_FLDFLX)?;
            }
            self.add_task(id::SEND_FLD, id::INT_FLD)?;
            self.add_task(id::RECV_FLD, id::NONE)?;
            self.add_task(id::SETB_FLD, id::RECV_FLD | id::INT_FLD)?;
            if shear {
                self.add_task(id::SEND_FLDSH, id::SETB_FLD)?;
                self.add_task(id::RECV_FLDSH, id::SETB_FLD)?;
            }
        }

        if scalars {
            if multilevel {
                self.add_task(id::SEND_SCLRFLX, id::CALC_SCLRFLX)?;
                self.add_task(id::RECV_SCLRFLX, id::CALC_SCLRFLX)?;
                self.add_task(id::INT_SCLR, id::RECV_SCLRFLX)?;
            } else {
                self.add_task(id::INT_SCLR, id::CALC_SCLRFLX)?;
            }
            // there is no scalar source-term task
            self.add_task(id::SEND_SCLR, id::INT_SCLR)?;
            self.add_task(id::RECV_SCLR, id::NONE)?;
            self.add_task(id::SETB_SCLR, id::RECV_SCLR | id::INT_SCLR)?;
        }

        if rad {
            self.add_task(id::CALC_RADFLX, id::NONE)?;
            if multilevel {
                self.add_task(id::SEND_RADFLX, id::CALC_RADFLX)?;
                self.add_task(id::RECV_RADFLX, id::CALC_RADFLX)?;
                self.add_task(id::INT_RAD, id::RECV_RADFLX)?;
            } else {
                self.add_task(id::INT_RAD, id::CALC_RADFLX)?;
            }
            self.add_task(id::SRCTERM_RAD, id::INT_RAD)?;
            self.add_task(id::SEND_RAD, id::SRCTERM_RAD | id::SRCTERM_HYD)?;
            self.add_task(id::RECV_RAD, id::NONE)?;
            self.add_task(id::SETB_RAD, id::RECV_RAD | id::SRCTERM_RAD)?;
        }

        if multilevel {
            let mut prolong_req = id::SEND_HYD | id::SETB_HYD;
            if mhd {
                prolong_req |= id::SEND_FLD | id::SETB_FLD;
            }
            if scalars {
                prolong_req |= id::SEND_SCLR | id::SETB_SCLR;
            }
            if rad {
                prolong_req |= id::SEND_RAD | id::SETB_RAD;
            }
            self.add_task(id::PROLONG, prolong_req)?;
        }

        let cons2prim_req = if multilevel {
            id::PROLONG
        } else {
            let mut req = id::SETB_HYD;
            if shear {
                req |= id::RECV_HYDSH;
            }
            if mhd {
                req |= id::SETB_FLD;
                if shear {
                    req |= id::RECV_FLDSH | id::RMAP_EMFSH;
                }
            }
            if scalars {
                req |= id::SETB_SCLR;
            }
            if rad {
                req |= id::SETB_RAD;
            }
            req
        };
        self.add_task(id::CONS2PRIM, cons2prim_req)?;

        self.add_task(id::PHY_BVAL, id::CONS2PRIM)?;
        if rad {
            self.add_task(id::CALC_OPACITY, id::PHY_BVAL)?;
            self.add_task(id::USERWORK, id::CALC_OPACITY)?;
        } else {
            self.add_task(id::USERWORK, id::PHY_BVAL)?;
        }
        self.add_task(id::NEW_DT, id::USERWORK)?;
        if self.phys.adaptive {
            self.add_task(id::FLAG_AMR, id::USERWORK)?;
            self.add_task(id::CLEAR_ALLBND, id::FLAG_AMR)?;
        } else {
            self.add_task(id::CLEAR_ALLBND, id::NEW_DT)?;
        }
        Ok(())
    }

    fn add_task(&mut self, task_id: u64, dependency: u64) -> Result<(), Error> {
        let (func, lb_time) = lookup(task_id)?;
        self.tasks.push(Task {
            id: task_id,
            dependency,
            func,
            lb_time,
        });
        Ok(())
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.phys
    }

    /// The effective CFL number after clamping to the scheme limit.
    ///
    pub fn cfl_number(&self) -> f64 {
        self.cfl_number
    }

    pub fn nstages(&self) -> usize {
        self.integrator.nstages()
    }

    pub fn ntasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The dependency mask of the given task id, if the id is in this list.
    ///
    pub fn dependency_of(&self, task_id: u64) -> Option<u64> {
        self.tasks
            .iter()
            .find(|t| t.id == task_id)
            .map(|t| t.dependency)
    }

    /// Run every task of this block whose dependencies are satisfied, in the
    /// fixed list order. A task returning `Next` triggers an immediate
    /// rescan from the top, so chains unblocked by a freshly completed
    /// receive drain without yielding. A task returning `Fail` stays pending
    /// for a later sweep. Control returns to the caller after one pass so
    /// other blocks can make progress.
    ///
    pub fn do_available(&self, pmb: &mut MeshBlock, stage: usize) -> TaskListStatus {
        if pmb.task_states.num_tasks_left == 0 {
            return TaskListStatus::Complete;
        }

        let mut index = 0;
        while index < self.tasks.len() {
            let task = &self.tasks[index];

            if pmb.task_states.is_complete(index)
                || pmb.task_states.finished & task.dependency != task.dependency
            {
                index += 1;
                continue;
            }

            let clock = Instant::now();
            let status = (task.func)(self, pmb, stage);

            match status {
                TaskStatus::Fail => {
                    index += 1;
                }
                TaskStatus::Success | TaskStatus::Next => {
                    if task.lb_time {
                        pmb.lb_cost += clock.elapsed().as_secs_f64();
                    }
                    pmb.task_states.mark_complete(index, task.id);

                    if pmb.task_states.num_tasks_left == 0 {
                        return TaskListStatus::Complete;
                    }
                    index = if status == TaskStatus::Next {
                        0
                    } else {
                        index + 1
                    };
                }
            }
        }

        if pmb.task_states.num_tasks_left == 0 {
            TaskListStatus::Complete
        } else {
            TaskListStatus::Running
        }
    }
}

// ============================================================================
#[cfg(test)]
mod test {

    use super::TimeIntegratorTaskList;
    use crate::config::{PhysicsConfig, TimeConfig};
    use crate::task::id;

    fn configs() -> Vec<PhysicsConfig> {
        let mut out = Vec::new();

        for mhd in [false, true] {
            for nscalars in [0, 2] {
                for radiation in [false, true] {
                    for multilevel in [false, true] {
                        for shearing_box in [false, true] {
                            for sts in [false, true] {
                                out.push(PhysicsConfig {
                                    magnetic_fields: mhd,
                                    nscalars,
                                    radiation,
                                    multilevel,
                                    adaptive: multilevel,
                                    shearing_box,
                                    sts,
                                    ..PhysicsConfig::default()
                                });
                            }
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn unknown_integrator_fails_construction() {
        let time = TimeConfig::new(0.3).with_integrator("leapfrog");
        assert!(TimeIntegratorTaskList::new(&time, &PhysicsConfig::default()).is_err());
    }

    #[test]
    fn nonpositive_cfl_fails_construction() {
        assert!(TimeIntegratorTaskList::new(&TimeConfig::new(0.0), &PhysicsConfig::default())
            .is_err());
        assert!(TimeIntegratorTaskList::new(&TimeConfig::new(-0.5), &PhysicsConfig::default())
            .is_err());
    }

    #[test]
    fn cfl_is_clamped_to_the_scheme_limit_in_3d() {
        let time = TimeConfig::new(1.0);
        let phys = PhysicsConfig {
            ndim: 3,
            ..PhysicsConfig::default()
        };
        let list = TimeIntegratorTaskList::new(&time, &phys).unwrap();
        assert_eq!(list.cfl_number(), 1.0 / 3.0);
    }

    #[test]
    fn every_dependency_bit_names_a_task_in_the_list() {
        let time = TimeConfig::new(0.3);

        for phys in configs() {
            let list = TimeIntegratorTaskList::new(&time, &phys).unwrap();
            let all: u64 = list.tasks().iter().map(|t| t.id).fold(0, |a, b| a | b);

            for task in list.tasks() {
                assert_eq!(
                    task.dependency & !all,
                    0,
                    "dangling dependency bits for task {:#x} under {:?}",
                    task.id,
                    phys
                );
            }
        }
    }

    #[test]
    fn task_lists_are_acyclic() {
        // Kahn-style elimination: repeatedly complete every task whose
        // dependencies are already complete. If a pass makes no progress
        // before the list is exhausted, there is a cycle.
        let time = TimeConfig::new(0.3);

        for phys in configs() {
            let list = TimeIntegratorTaskList::new(&time, &phys).unwrap();
            let mut finished = 0u64;
            let mut remaining: Vec<_> = list.tasks().iter().collect();

            while !remaining.is_empty() {
                let before = remaining.len();
                remaining.retain(|task| {
                    if finished & task.dependency == task.dependency {
                        finished |= task.id;
                        false
                    } else {
                        true
                    }
                });
                assert!(remaining.len() < before, "cycle detected under {:?}", phys);
            }
        }
    }

    #[test]
    fn full_physics_list_wires_the_shearing_remap_and_prolongation() {
        let time = TimeConfig::new(0.3);
        let phys = PhysicsConfig {
            magnetic_fields: true,
            nscalars: 2,
            radiation: true,
            multilevel: true,
            shearing_box: true,
            ..PhysicsConfig::default()
        };
        let list = TimeIntegratorTaskList::new(&time, &phys).unwrap();

        assert_eq!(list.dependency_of(id::RMAP_EMFSH), Some(id::RECV_EMFSH));
        assert_eq!(list.dependency_of(id::CONS2PRIM), Some(id::PROLONG));
    }

    #[test]
    fn flux_correction_tasks_appear_only_under_multilevel() {
        let time = TimeConfig::new(0.3);
        let uniform = TimeIntegratorTaskList::new(&time, &PhysicsConfig::default()).unwrap();
        assert!(uniform.dependency_of(id::SEND_HYDFLX).is_none());
        assert!(uniform.dependency_of(id::RECV_HYDFLX).is_none());
        assert_eq!(uniform.dependency_of(id::INT_HYD), Some(id::CALC_HYDFLX));

        let refined = TimeIntegratorTaskList::new(
            &time,
            &PhysicsConfig {
                multilevel: true,
                ..PhysicsConfig::default()
            },
        )
        .unwrap();
        assert_eq!(refined.dependency_of(id::INT_HYD), Some(id::RECV_HYDFLX));
        assert_eq!(
            refined.dependency_of(id::SEND_HYDFLX),
            Some(id::CALC_HYDFLX)
        );
    }

    #[test]
    fn diffusion_precedes_flux_computation_unless_sts() {
        let time = TimeConfig::new(0.3);
        let list = TimeIntegratorTaskList::new(&time, &PhysicsConfig::default()).unwrap();
        assert_eq!(list.dependency_of(id::CALC_HYDFLX), Some(id::DIFFUSE_HYD));

        let sts = TimeIntegratorTaskList::new(
            &time,
            &PhysicsConfig {
                sts: true,
                ..PhysicsConfig::default()
            },
        )
        .unwrap();
        assert!(sts.dependency_of(id::DIFFUSE_HYD).is_none());
        assert_eq!(sts.dependency_of(id::CALC_HYDFLX), Some(id::NONE));
    }

    #[test]
    fn terminator_follows_the_amr_flag_only_when_adaptive() {
        let time = TimeConfig::new(0.3);
        let fixed = TimeIntegratorTaskList::new(&time, &PhysicsConfig::default()).unwrap();
        assert_eq!(fixed.dependency_of(id::CLEAR_ALLBND), Some(id::NEW_DT));
        assert!(fixed.dependency_of(id::FLAG_AMR).is_none());

        let adaptive = TimeIntegratorTaskList::new(
            &time,
            &PhysicsConfig {
                multilevel: true,
                adaptive: true,
                ..PhysicsConfig::default()
            },
        )
        .unwrap();
        assert_eq!(adaptive.dependency_of(id::FLAG_AMR), Some(id::USERWORK));
        assert_eq!(adaptive.dependency_of(id::CLEAR_ALLBND), Some(id::FLAG_AMR));
    }
}

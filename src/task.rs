use crate::block::MeshBlock;
use crate::error::Error;
use crate::task_list::{time_integrator as ti, TimeIntegratorTaskList};

/// What a task reports back to the executor.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// The task completed.
    Success,

    /// The task completed, and the executor should immediately rescan for
    /// newly unblocked successors before yielding to other blocks.
    Next,

    /// The task could not run yet, typically because a message has not
    /// arrived. It stays pending and the executor retries on a later sweep.
    Fail,
}

/// The signature shared by every task body: the task list (for integrator
/// weights and physics toggles), the block being advanced, and the 1-based
/// stage number.
///
pub type TaskFn = fn(&TimeIntegratorTaskList, &mut MeshBlock, usize) -> TaskStatus;

/// One entry of a task list: a unique id bit, the bitwise-OR of the ids that
/// must finish first, the task body, and whether the task's wall time counts
/// toward load balancing.
///
pub struct Task {
    pub id: u64,
    pub dependency: u64,
    pub func: TaskFn,
    pub lb_time: bool,
}

/// The closed catalogue of task identifiers. Each id occupies a distinct bit
/// of a 64-bit integer so that dependency sets are plain bitmasks.
///
pub mod id {
    pub const NONE: u64 = 0;

    pub const CLEAR_ALLBND: u64 = 1 << 0;

    pub const CALC_HYDFLX: u64 = 1 << 1;
    pub const SEND_HYDFLX: u64 = 1 << 2;
    pub const RECV_HYDFLX: u64 = 1 << 3;
    pub const INT_HYD: u64 = 1 << 4;
    pub const SRCTERM_HYD: u64 = 1 << 5;
    pub const SEND_HYD: u64 = 1 << 6;
    pub const RECV_HYD: u64 = 1 << 7;
    pub const SETB_HYD: u64 = 1 << 8;
    pub const DIFFUSE_HYD: u64 = 1 << 9;

    pub const CALC_FLDFLX: u64 = 1 << 10;
    pub const SEND_FLDFLX: u64 = 1 << 11;
    pub const RECV_FLDFLX: u64 = 1 << 12;
    pub const INT_FLD: u64 = 1 << 13;
    pub const SEND_FLD: u64 = 1 << 14;
    pub const RECV_FLD: u64 = 1 << 15;
    pub const SETB_FLD: u64 = 1 << 16;
    pub const DIFFUSE_FLD: u64 = 1 << 17;

    pub const SEND_HYDSH: u64 = 1 << 18;
    pub const RECV_HYDSH: u64 = 1 << 19;
    pub const SEND_FLDSH: u64 = 1 << 20;
    pub const RECV_FLDSH: u64 = 1 << 21;
    pub const SEND_EMFSH: u64 = 1 << 22;
    pub const RECV_EMFSH: u64 = 1 << 23;
    pub const RMAP_EMFSH: u64 = 1 << 24;

    pub const CALC_SCLRFLX: u64 = 1 << 25;
    pub const SEND_SCLRFLX: u64 = 1 << 26;
    pub const RECV_SCLRFLX: u64 = 1 << 27;
    pub const INT_SCLR: u64 = 1 << 28;
    pub const SEND_SCLR: u64 = 1 << 29;
    pub const RECV_SCLR: u64 = 1 << 30;
    pub const SETB_SCLR: u64 = 1 << 31;
    pub const DIFFUSE_SCLR: u64 = 1 << 32;

    pub const CALC_RADFLX: u64 = 1 << 33;
    pub const SEND_RADFLX: u64 = 1 << 34;
    pub const RECV_RADFLX: u64 = 1 << 35;
    pub const INT_RAD: u64 = 1 << 36;
    pub const SRCTERM_RAD: u64 = 1 << 37;
    pub const SEND_RAD: u64 = 1 << 38;
    pub const RECV_RAD: u64 = 1 << 39;
    pub const SETB_RAD: u64 = 1 << 40;
    pub const CALC_OPACITY: u64 = 1 << 41;

    pub const PROLONG: u64 = 1 << 42;
    pub const CONS2PRIM: u64 = 1 << 43;
    pub const PHY_BVAL: u64 = 1 << 44;
    pub const USERWORK: u64 = 1 << 45;
    pub const NEW_DT: u64 = 1 << 46;
    pub const FLAG_AMR: u64 = 1 << 47;
}

/// Resolve a task id to its body and load-balance flag. Receives poll the
/// transport rather than doing real work, so their wall time never counts
/// toward load balancing. An id outside the catalogue is a construction-time
/// error.
///
pub fn lookup(task_id: u64) -> Result<(TaskFn, bool), Error> {
    let entry: (TaskFn, bool) = match task_id {
        id::CLEAR_ALLBND => (ti::clear_all_boundary, false),

        id::CALC_HYDFLX => (ti::calculate_hydro_flux, true),
        id::SEND_HYDFLX => (ti::send_hydro_flux, true),
        id::RECV_HYDFLX => (ti::receive_and_correct_hydro_flux, false),
        id::INT_HYD => (ti::integrate_hydro, true),
        id::SRCTERM_HYD => (ti::add_source_terms_hydro, true),
        id::SEND_HYD => (ti::send_hydro, true),
        id::RECV_HYD => (ti::receive_hydro, false),
        id::SETB_HYD => (ti::set_boundaries_hydro, true),
        id::DIFFUSE_HYD => (ti::diffuse_hydro, true),

        id::CALC_FLDFLX => (ti::calculate_emf, true),
        id::SEND_FLDFLX => (ti::send_emf, true),
        id::RECV_FLDFLX => (ti::receive_and_correct_emf, false),
        id::INT_FLD => (ti::integrate_field, true),
        id::SEND_FLD => (ti::send_field, true),
        id::RECV_FLD => (ti::receive_field, false),
        id::SETB_FLD => (ti::set_boundaries_field, true),
        id::DIFFUSE_FLD => (ti::diffuse_field, true),

        id::SEND_HYDSH => (ti::send_hydro_shear, true),
        id::RECV_HYDSH => (ti::receive_hydro_shear, false),
        id::SEND_FLDSH => (ti::send_field_shear, true),
        id::RECV_FLDSH => (ti::receive_field_shear, false),
        id::SEND_EMFSH => (ti::send_emf_shear, true),
        id::RECV_EMFSH => (ti::receive_emf_shear, false),
        id::RMAP_EMFSH => (ti::remap_emf_shear, true),

        id::CALC_SCLRFLX => (ti::calculate_scalar_flux, true),
        id::SEND_SCLRFLX => (ti::send_scalar_flux, true),
        id::RECV_SCLRFLX => (ti::receive_scalar_flux, false),
        id::INT_SCLR => (ti::integrate_scalars, true),
        id::SEND_SCLR => (ti::send_scalars, true),
        id::RECV_SCLR => (ti::receive_scalars, false),
        id::SETB_SCLR => (ti::set_boundaries_scalars, true),
        id::DIFFUSE_SCLR => (ti::diffuse_scalars, true),

        id::CALC_RADFLX => (ti::calculate_rad_flux, true),
        id::SEND_RADFLX => (ti::send_rad_flux, true),
        id::RECV_RADFLX => (ti::receive_and_correct_rad_flux, false),
        id::INT_RAD => (ti::integrate_rad, true),
        id::SRCTERM_RAD => (ti::add_source_terms_rad, true),
        id::SEND_RAD => (ti::send_rad, true),
        id::RECV_RAD => (ti::receive_rad, false),
        id::SETB_RAD => (ti::set_boundaries_rad, true),
        id::CALC_OPACITY => (ti::calculate_opacity, true),

        id::PROLONG => (ti::prolongation, true),
        id::CONS2PRIM => (ti::primitives, true),
        id::PHY_BVAL => (ti::physical_boundary, true),
        id::USERWORK => (ti::user_work, true),
        id::NEW_DT => (ti::new_block_time_step, true),
        id::FLAG_AMR => (ti::check_refinement, true),

        _ => return Err(Error::UnknownTask(task_id)),
    };
    Ok(entry)
}

#[cfg(test)]
mod test {

    use super::{id, lookup};

    #[test]
    fn every_id_is_a_single_distinct_bit() {
        let ids = all_ids();
        let mut seen = 0u64;

        for &task_id in &ids {
            assert_eq!(task_id.count_ones(), 1);
            assert_eq!(seen & task_id, 0);
            seen |= task_id;
        }
        assert_eq!(ids.len() as u32, seen.count_ones());
    }

    #[test]
    fn catalogue_covers_every_id_and_nothing_else() {
        for task_id in all_ids() {
            assert!(lookup(task_id).is_ok());
        }
        assert!(lookup(1 << 63).is_err());
        assert!(lookup(id::CALC_HYDFLX | id::INT_HYD).is_err());
        assert!(lookup(id::NONE).is_err());
    }

    #[test]
    fn receives_are_never_load_balanced() {
        for task_id in [
            id::RECV_HYDFLX,
            id::RECV_HYD,
            id::RECV_FLDFLX,
            id::RECV_FLD,
            id::RECV_HYDSH,
            id::RECV_FLDSH,
            id::RECV_EMFSH,
            id::RECV_SCLRFLX,
            id::RECV_SCLR,
            id::RECV_RADFLX,
            id::RECV_RAD,
        ] {
            let (_, lb_time) = lookup(task_id).unwrap();
            assert!(!lb_time);
        }
    }

    fn all_ids() -> Vec<u64> {
        vec![
            id::CLEAR_ALLBND,
            id::CALC_HYDFLX,
            id::SEND_HYDFLX,
            id::RECV_HYDFLX,
            id::INT_HYD,
            id::SRCTERM_HYD,
            id::SEND_HYD,
            id::RECV_HYD,
            id::SETB_HYD,
            id::DIFFUSE_HYD,
            id::CALC_FLDFLX,
            id::SEND_FLDFLX,
            id::RECV_FLDFLX,
            id::INT_FLD,
            id::SEND_FLD,
            id::RECV_FLD,
            id::SETB_FLD,
            id::DIFFUSE_FLD,
            id::SEND_HYDSH,
            id::RECV_HYDSH,
            id::SEND_FLDSH,
            id::RECV_FLDSH,
            id::SEND_EMFSH,
            id::RECV_EMFSH,
            id::RMAP_EMFSH,
            id::CALC_SCLRFLX,
            id::SEND_SCLRFLX,
            id::RECV_SCLRFLX,
            id::INT_SCLR,
            id::SEND_SCLR,
            id::RECV_SCLR,
            id::SETB_SCLR,
            id::DIFFUSE_SCLR,
            id::CALC_RADFLX,
            id::SEND_RADFLX,
            id::RECV_RADFLX,
            id::INT_RAD,
            id::SRCTERM_RAD,
            id::SEND_RAD,
            id::RECV_RAD,
            id::SETB_RAD,
            id::CALC_OPACITY,
            id::PROLONG,
            id::CONS2PRIM,
            id::PHY_BVAL,
            id::USERWORK,
            id::NEW_DT,
            id::FLAG_AMR,
        ]
    }
}

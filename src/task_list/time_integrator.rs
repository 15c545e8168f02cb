//! The task bodies of the time-integrator task list. Each body consults the
//! integrator weights for its stage, delegates the physics to the block's
//! collaborator handles, and reports completion through its task status.

use std::mem;

use super::TimeIntegratorTaskList;
use crate::block::MeshBlock;
use crate::bvals::BoundaryPrims;
use crate::integrator::{Integrator, Scheme};
use crate::task::TaskStatus;

/// The F(u^(3)) coefficient of the Gottlieb (2009) SSPRK(5,4) final stage.
/// The scheme is a 3N method with no exact 3S* representation; its fourth
/// stage accumulates this extra flux-divergence term into the u2 register,
/// outside the regular weight tables.
const SSPRK54_PENULT_BETA: f64 = 0.063692468666290;

/// Per-register time offsets after each stage, indexed `[stage][register]`
/// for the (u, u1, u2) registers. Register 2 stays anchored at the beginning
/// of the step, except where the penultimate stage of SSPRK(5,4) overwrites
/// it with its partial sum; with that adjustment the register-0 offset lands
/// on `dt` at the final stage for every supported scheme.
///
pub fn stage_abscissae(integrator: &Integrator, dt: f64) -> Vec<[f64; 3]> {
    let nstages = integrator.nstages();
    let mut abscissae = vec![[0.0; 3]; nstages + 1];

    for l in 1..=nstages {
        let w = integrator.weights(l);
        let prev = abscissae[l - 1];

        // u1 = u1 + delta*u
        let a1 = prev[1] + w.delta * prev[0];
        // u = gamma_1*u + gamma_2*u1 + gamma_3*u2 + beta*dt*F(u)
        let a0 = w.gamma_1 * prev[0] + w.gamma_2 * a1 + w.gamma_3 * prev[2] + w.beta * dt;
        let a2 = if l == 4 && integrator.scheme() == Scheme::Ssprk54 {
            SSPRK54_PENULT_BETA * dt
        } else {
            0.0
        };
        abscissae[l] = [a0, a1, a2];
    }
    abscissae
}

impl TimeIntegratorTaskList {
    /// Prepare a block for one stage: on the first stage, rebuild the
    /// abscissa table for the step's dt, zero the running-sum registers, and
    /// cache the beginning-of-step state into the extra registers where the
    /// scheme calls for it. Every stage recomputes the shearing-box offset
    /// (when active), posts the boundary receives, and resets the completion
    /// record.
    ///
    pub fn startup_task_list(&self, pmb: &mut MeshBlock, stage: usize) {
        if stage == 1 {
            pmb.stage_abscissae = stage_abscissae(self.integrator(), pmb.dt);

            let extra = self.integrator().needs_extra_register();

            pmb.hydro.u1.zero_clear();
            if extra {
                pmb.hydro.u2.clone_from(&pmb.hydro.u);
            }
            if let Some(pf) = &mut pmb.field {
                pf.b1.zero_clear();
                if extra {
                    pf.b2.clone_from(&pf.b);
                }
            }
            if let Some(ps) = &mut pmb.scalars {
                ps.s1.zero_clear();
                if extra {
                    ps.s2.clone_from(&ps.s);
                }
            }
            if let Some(pr) = &mut pmb.rad {
                pr.cons1.zero_clear();
                if extra {
                    pr.cons2.clone_from(&pr.cons);
                }
            }
        }

        if self.physics().shearing_box {
            let dt = self.integrator().weights(stage).beta * pmb.dt;
            pmb.bval.compute_shear(pmb.time + dt);
        }
        pmb.bval.start_receiving();
        pmb.task_states.reset(self.ntasks());
    }
}

// ----------------------------------------------------------------------------
// ending communication

pub(crate) fn clear_all_boundary(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    pmb.bval.clear_boundary();
    TaskStatus::Success
}

// ----------------------------------------------------------------------------
// flux computation

fn flux_order(tl: &TimeIntegratorTaskList, stage: usize) -> usize {
    // the van Leer predictor runs its first stage at donor-cell order
    if stage == 1 && tl.integrator().scheme() == Scheme::Vl2 {
        1
    } else {
        tl.physics().xorder
    }
}

pub(crate) fn calculate_hydro_flux(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let order = flux_order(tl, stage);
    let MeshBlock {
        hydro: ph,
        field: pf,
        ..
    } = pmb;
    let (b, bcc) = match pf {
        Some(pf) => (Some(&pf.b), Some(&pf.bcc)),
        None => (None, None),
    };
    ph.kernels.calculate_fluxes(&ph.w, b, bcc, order, &mut ph.flux);
    TaskStatus::Next
}

pub(crate) fn calculate_emf(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let MeshBlock {
        hydro: ph,
        field: pf,
        ..
    } = pmb;
    let pf = match pf {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    pf.kernels.compute_corner_e(&ph.w, &pf.bcc, &mut pf.e);
    TaskStatus::Next
}

pub(crate) fn calculate_rad_flux(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let order = flux_order(tl, stage);
    let pr = match &mut pmb.rad {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    pr.kernels.calculate_fluxes(&pr.prim, order, &mut pr.flux);
    TaskStatus::Next
}

pub(crate) fn calculate_scalar_flux(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let order = flux_order(tl, stage);
    let ps = match &mut pmb.scalars {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };
    ps.kernels.calculate_fluxes(&ps.r, order, &mut ps.flux);
    TaskStatus::Next
}

// ----------------------------------------------------------------------------
// flux correction at refinement interfaces

pub(crate) fn send_hydro_flux(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let ph = &mut pmb.hydro;
    ph.bvar.send_flux_correction(&ph.flux);
    TaskStatus::Success
}

pub(crate) fn receive_and_correct_hydro_flux(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let ph = &mut pmb.hydro;
    if ph.bvar.receive_flux_correction(&mut ph.flux) {
        TaskStatus::Next
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn send_emf(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    pf.bvar.send_flux_correction(&pf.e);
    TaskStatus::Success
}

pub(crate) fn receive_and_correct_emf(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    if pf.bvar.receive_flux_correction(&mut pf.e) {
        TaskStatus::Next
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn send_rad_flux(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let pr = match &mut pmb.rad {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    pr.bvar.send_flux_correction(&pr.flux);
    TaskStatus::Success
}

pub(crate) fn receive_and_correct_rad_flux(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let pr = match &mut pmb.rad {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    if pr.bvar.receive_flux_correction(&mut pr.flux) {
        TaskStatus::Next
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn send_scalar_flux(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let ps = match &mut pmb.scalars {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };
    ps.bvar.send_flux_correction(&ps.flux);
    TaskStatus::Success
}

pub(crate) fn receive_scalar_flux(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let ps = match &mut pmb.scalars {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };
    if ps.bvar.receive_flux_correction(&mut ps.flux) {
        TaskStatus::Next
    } else {
        TaskStatus::Fail
    }
}

// ----------------------------------------------------------------------------
// integration of the conserved variables

pub(crate) fn integrate_hydro(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if !tl.physics().fluid_evolved {
        return TaskStatus::Next;
    }
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }

    let dt = pmb.dt;
    let sw = tl.integrator().weights(stage);
    let MeshBlock {
        hydro: ph,
        field: pf,
        coord,
        ..
    } = pmb;
    let bcc = pf.as_ref().map(|pf| &pf.bcc);

    // u1 <- u1 + delta*u. The same averaging logic drives the field, scalar,
    // and radiation families.
    ph.u1.weighted_average(&ph.u, &ph.u2, [1.0, sw.delta, 0.0]);

    // u <- gamma_1*u + gamma_2*u1 + gamma_3*u2, degenerating to an alias
    // swap of the owned registers when the weights are exactly (0, 1, 0)
    if sw.is_identity_average() {
        mem::swap(&mut ph.u, &mut ph.u1);
    } else {
        ph.u
            .weighted_average(&ph.u1, &ph.u2, [sw.gamma_1, sw.gamma_2, sw.gamma_3]);
    }

    let wght = sw.beta * dt;
    ph.kernels.add_flux_divergence(wght, &ph.flux, &mut ph.u);
    coord.add_coord_terms(wght, &ph.flux, &ph.w, bcc, &mut ph.u);

    // The penultimate stage of SSPRK(5,4) accumulates a partial sum of the
    // final stage into u2, which the regular 3S* weights cannot express.
    if stage == 4 && tl.integrator().scheme() == Scheme::Ssprk54 {
        let wght = SSPRK54_PENULT_BETA * dt;
        ph.u2.weighted_average(&ph.u1, &ph.u1, [-1.0, 0.0, 0.0]);
        ph.kernels.add_flux_divergence(wght, &ph.flux, &mut ph.u2);
        coord.add_coord_terms(wght, &ph.flux, &ph.w, bcc, &mut ph.u2);
    }
    TaskStatus::Next
}

pub(crate) fn integrate_field(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if !tl.physics().fluid_evolved {
        return TaskStatus::Next;
    }
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }

    let dt = pmb.dt;
    let sw = tl.integrator().weights(stage);
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };

    pf.b1.weighted_average(&pf.b, &pf.b2, [1.0, sw.delta, 0.0]);

    if sw.is_identity_average() {
        mem::swap(&mut pf.b, &mut pf.b1);
    } else {
        pf.b
            .weighted_average(&pf.b1, &pf.b2, [sw.gamma_1, sw.gamma_2, sw.gamma_3]);
    }

    pf.kernels.ct(sw.beta * dt, &pf.e, &mut pf.b);
    TaskStatus::Next
}

pub(crate) fn integrate_scalars(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }

    let dt = pmb.dt;
    let sw = tl.integrator().weights(stage);
    let ps = match &mut pmb.scalars {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };

    ps.s1.weighted_average(&ps.s, &ps.s2, [1.0, sw.delta, 0.0]);

    if sw.is_identity_average() {
        mem::swap(&mut ps.s, &mut ps.s1);
    } else {
        ps.s
            .weighted_average(&ps.s1, &ps.s2, [sw.gamma_1, sw.gamma_2, sw.gamma_3]);
    }

    ps.kernels.add_flux_divergence(sw.beta * dt, &ps.flux, &mut ps.s);

    if stage == 4 && tl.integrator().scheme() == Scheme::Ssprk54 {
        ps.s2.weighted_average(&ps.s1, &ps.s1, [-1.0, 0.0, 0.0]);
        ps.kernels
            .add_flux_divergence(SSPRK54_PENULT_BETA * dt, &ps.flux, &mut ps.s2);
    }
    TaskStatus::Next
}

pub(crate) fn integrate_rad(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }

    let dt = pmb.dt;
    let sw = tl.integrator().weights(stage);
    let pr = match &mut pmb.rad {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };

    pr.cons1
        .weighted_average(&pr.cons, &pr.cons2, [1.0, sw.delta, 0.0]);

    if sw.is_identity_average() {
        mem::swap(&mut pr.cons, &mut pr.cons1);
    } else {
        pr.cons
            .weighted_average(&pr.cons1, &pr.cons2, [sw.gamma_1, sw.gamma_2, sw.gamma_3]);
    }

    pr.kernels
        .add_flux_divergence(sw.beta * dt, &pr.prim, &pr.flux, &mut pr.cons);

    if stage == 4 && tl.integrator().scheme() == Scheme::Ssprk54 {
        pr.cons2
            .weighted_average(&pr.cons1, &pr.cons1, [-1.0, 0.0, 0.0]);
        pr.kernels.add_flux_divergence(
            SSPRK54_PENULT_BETA * dt,
            &pr.prim,
            &pr.flux,
            &mut pr.cons2,
        );
    }
    TaskStatus::Next
}

// ----------------------------------------------------------------------------
// source terms

pub(crate) fn add_source_terms_hydro(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if !pmb.hydro.kernels.source_terms_defined() || !tl.physics().fluid_evolved {
        return TaskStatus::Next;
    }
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }

    // time at the beginning of the stage for the u register
    let t_start_stage = pmb.time + pmb.stage_abscissae[stage - 1][0];
    let dt = tl.integrator().weights(stage).beta * pmb.dt;
    let MeshBlock {
        hydro: ph,
        field: pf,
        ..
    } = pmb;
    let bcc = pf.as_ref().map(|pf| &pf.bcc);

    ph.kernels
        .add_source_terms(t_start_stage, dt, &ph.flux, &ph.w, bcc, &mut ph.u);
    TaskStatus::Next
}

pub(crate) fn add_source_terms_rad(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    let t_start_stage = pmb.time + pmb.stage_abscissae[stage - 1][0];
    let dt = tl.integrator().weights(stage).beta * pmb.dt;
    let MeshBlock {
        hydro: ph, rad: pr, ..
    } = pmb;
    let pr = match pr {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    if !pr.kernels.source_terms_defined() {
        return TaskStatus::Next;
    }
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }

    pr.kernels
        .add_source_terms(t_start_stage, dt, &pr.prim, &ph.w, &mut pr.cons, &mut ph.u);
    TaskStatus::Next
}

pub(crate) fn calculate_opacity(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let MeshBlock {
        hydro: ph, rad: pr, ..
    } = pmb;
    let pr = match pr {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    pr.kernels.update_opacity(&ph.w);
    TaskStatus::Next
}

// ----------------------------------------------------------------------------
// diffusive fluxes

pub(crate) fn diffuse_hydro(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    let ph = &mut pmb.hydro;
    if !ph.kernels.diffusion_defined() || !tl.physics().fluid_evolved {
        return TaskStatus::Next;
    }
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    ph.kernels.calc_diffusion_flux(&ph.w, &ph.u);
    TaskStatus::Next
}

pub(crate) fn diffuse_field(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    if !pf.kernels.diffusion_defined() {
        return TaskStatus::Next;
    }
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    pf.kernels.calc_diffusion_emf(&pf.b, &pf.bcc, &mut pf.e);
    TaskStatus::Next
}

pub(crate) fn diffuse_scalars(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    let MeshBlock {
        hydro: ph,
        scalars: ps,
        ..
    } = pmb;
    let ps = match ps {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };
    if !ps.kernels.diffusion_defined() {
        return TaskStatus::Next;
    }
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    ps.diffusion_flux.zero_clear();
    ps.kernels
        .diffusive_flux(&ps.r, &ph.w, &mut ps.diffusion_flux);
    TaskStatus::Next
}

// ----------------------------------------------------------------------------
// boundary exchange of the conserved variables

pub(crate) fn send_hydro(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    // the boundary interface operates on the conserved register here, and on
    // the primitive register in the physical-boundary phase
    let ph = &mut pmb.hydro;
    ph.bvar.send_boundary_buffers(&ph.u);
    TaskStatus::Success
}

pub(crate) fn receive_hydro(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    if pmb.hydro.bvar.receive_boundary_buffers() {
        TaskStatus::Success
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn set_boundaries_hydro(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let ph = &mut pmb.hydro;
    ph.bvar.set_boundaries(&mut ph.u);
    TaskStatus::Success
}

pub(crate) fn send_field(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    pf.bvar.send_boundary_buffers(&pf.b);
    TaskStatus::Success
}

pub(crate) fn receive_field(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    if pf.bvar.receive_boundary_buffers() {
        TaskStatus::Success
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn set_boundaries_field(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    pf.bvar.set_boundaries(&mut pf.b);
    TaskStatus::Success
}

pub(crate) fn send_scalars(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let ps = match &mut pmb.scalars {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };
    ps.bvar.send_boundary_buffers(&ps.s);
    TaskStatus::Success
}

pub(crate) fn receive_scalars(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let ps = match &mut pmb.scalars {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };
    if ps.bvar.receive_boundary_buffers() {
        TaskStatus::Success
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn set_boundaries_scalars(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let ps = match &mut pmb.scalars {
        Some(ps) => ps,
        None => return TaskStatus::Next,
    };
    ps.bvar.set_boundaries(&mut ps.s);
    TaskStatus::Success
}

pub(crate) fn send_rad(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pr = match &mut pmb.rad {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    pr.bvar.send_boundary_buffers(&pr.cons);
    TaskStatus::Success
}

pub(crate) fn receive_rad(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pr = match &mut pmb.rad {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    if pr.bvar.receive_boundary_buffers() {
        TaskStatus::Success
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn set_boundaries_rad(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pr = match &mut pmb.rad {
        Some(pr) => pr,
        None => return TaskStatus::Next,
    };
    pr.bvar.set_boundaries(&mut pr.cons);
    TaskStatus::Success
}

// ----------------------------------------------------------------------------
// shearing-box remaps

pub(crate) fn send_hydro_shear(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let ph = &mut pmb.hydro;
    ph.bvar.send_shear_buffers(&ph.u);
    TaskStatus::Success
}

pub(crate) fn receive_hydro_shear(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let ph = &mut pmb.hydro;
    if ph.bvar.receive_shear_buffers(&mut ph.u) {
        TaskStatus::Success
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn send_field_shear(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    pf.bvar.send_shear_buffers(&pf.b);
    TaskStatus::Success
}

pub(crate) fn receive_field_shear(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    if pf.bvar.receive_shear_buffers(&mut pf.b) {
        TaskStatus::Success
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn send_emf_shear(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    pf.bvar.send_emf_shear(&pf.e);
    TaskStatus::Success
}

pub(crate) fn receive_emf_shear(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    if pf.bvar.receive_emf_shear(&mut pf.e) {
        TaskStatus::Next
    } else {
        TaskStatus::Fail
    }
}

pub(crate) fn remap_emf_shear(
    _tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    _stage: usize,
) -> TaskStatus {
    let pf = match &mut pmb.field {
        Some(pf) => pf,
        None => return TaskStatus::Next,
    };
    pf.bvar.remap_emf_shear(&mut pf.e);
    TaskStatus::Success
}

// ----------------------------------------------------------------------------
// everything else

pub(crate) fn prolongation(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    // time at the end of the stage for the (u, b) register pair
    let t_end_stage = pmb.time + pmb.stage_abscissae[stage][0];
    let dt = tl.integrator().weights(stage).beta * pmb.dt;
    pmb.bval.prolongate_boundaries(t_end_stage, dt);
    TaskStatus::Success
}

pub(crate) fn primitives(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let ng = pmb.bounds.nghost;
    let mut bounds = pmb.bounds.interior();
    let MeshBlock {
        hydro: ph,
        field: pf,
        scalars: ps,
        rad: pr,
        eos,
        bval,
        ..
    } = pmb;

    // reach into the ghost zones on every side that has a neighbor
    if bval.nblevel(1, 1, 0) != -1 {
        bounds.il -= ng;
    }
    if bval.nblevel(1, 1, 2) != -1 {
        bounds.iu += ng;
    }
    if bval.nblevel(1, 0, 1) != -1 {
        bounds.jl -= ng;
    }
    if bval.nblevel(1, 2, 1) != -1 {
        bounds.ju += ng;
    }
    if bval.nblevel(0, 1, 1) != -1 {
        bounds.kl -= ng;
    }
    if bval.nblevel(2, 1, 1) != -1 {
        bounds.ku += ng;
    }

    let (b, mut bcc) = match pf {
        Some(pf) => (Some(&pf.b), Some(&mut pf.bcc)),
        None => (None, None),
    };

    // On entry w holds the previous stage's primitives; w1 receives this
    // stage's output and the handles are swapped below.
    eos.conserved_to_primitive(&ph.u, &ph.w, b, &mut ph.w1, bcc.as_deref_mut(), &bounds);
    if let Some(ps) = ps.as_mut() {
        eos.scalars_to_primitive(&ps.s, &ph.w1, &mut ps.r, &bounds);
    }
    if let Some(pr) = pr.as_mut() {
        pr.kernels
            .conserved_to_primitive(&pr.cons, &mut pr.prim1, &ph.w1, &bounds);
    }

    if tl.physics().xorder == 4 {
        // the cell-averaged correction shrinks the buffer by one zone on
        // every side that was expanded
        if bval.nblevel(1, 1, 0) != -1 {
            bounds.il += 1;
        }
        if bval.nblevel(1, 1, 2) != -1 {
            bounds.iu -= 1;
        }
        if bval.nblevel(1, 0, 1) != -1 {
            bounds.jl += 1;
        }
        if bval.nblevel(1, 2, 1) != -1 {
            bounds.ju -= 1;
        }
        if bval.nblevel(0, 1, 1) != -1 {
            bounds.kl += 1;
        }
        if bval.nblevel(2, 1, 1) != -1 {
            bounds.ku -= 1;
        }
        eos.conserved_to_primitive_cell_average(
            &ph.u,
            &ph.w,
            b,
            &mut ph.w1,
            bcc.as_deref_mut(),
            &bounds,
        );
        if let Some(ps) = ps.as_mut() {
            eos.scalars_to_primitive_cell_average(&ps.s, &ph.w1, &mut ps.r, &bounds);
        }
    }

    // swap the register handles so that w holds the updated primitives
    mem::swap(&mut ph.w, &mut ph.w1);
    if let Some(pr) = pr.as_mut() {
        mem::swap(&mut pr.prim, &mut pr.prim1);
    }
    TaskStatus::Success
}

pub(crate) fn physical_boundary(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage > tl.nstages() {
        return TaskStatus::Fail;
    }
    let t_end_stage = pmb.time + pmb.stage_abscissae[stage][0];
    let dt = tl.integrator().weights(stage).beta * pmb.dt;
    let MeshBlock {
        hydro: ph,
        scalars: ps,
        rad: pr,
        bval,
        ..
    } = pmb;

    // the boundary interface switches to the primitive registers here
    bval.apply_physical_boundaries(
        t_end_stage,
        dt,
        BoundaryPrims {
            w: &mut ph.w,
            r: ps.as_mut().map(|ps| &mut ps.r),
            rad: pr.as_mut().map(|pr| &mut pr.prim),
        },
    );
    TaskStatus::Success
}

pub(crate) fn user_work(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage != tl.nstages() {
        return TaskStatus::Success; // only do on last stage
    }
    pmb.hooks.user_work_in_loop();
    TaskStatus::Success
}

pub(crate) fn new_block_time_step(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage != tl.nstages() {
        return TaskStatus::Success; // only do on last stage
    }
    pmb.new_block_dt = pmb.hydro.kernels.new_block_time_step(&pmb.hydro.w);
    TaskStatus::Success
}

pub(crate) fn check_refinement(
    tl: &TimeIntegratorTaskList,
    pmb: &mut MeshBlock,
    stage: usize,
) -> TaskStatus {
    if stage != tl.nstages() {
        return TaskStatus::Success; // only do on last stage
    }
    pmb.hooks.check_refinement();
    TaskStatus::Success
}

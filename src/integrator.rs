use log::warn;

use crate::error::Error;

const ONE_3RD: f64 = 1.0 / 3.0;
const TWO_3RD: f64 = 2.0 / 3.0;

/// Per-stage coefficients of a low-storage explicit Runge-Kutta scheme in the
/// unified 2S/3S* form. At each stage l the conserved registers advance as
///
/// ```text
/// u1 <- u1 + delta * u
/// u  <- gamma_1 * u + gamma_2 * u1 + gamma_3 * u2 + beta * dt * F(u)
/// ```
///
/// where u2 caches the beginning-of-step state for the three-register
/// schemes. The weights depend on the stage and the integrator.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageWeights {
    pub delta: f64,
    pub gamma_1: f64,
    pub gamma_2: f64,
    pub gamma_3: f64,
    pub beta: f64,
}

impl StageWeights {
    fn new(delta: f64, gamma_1: f64, gamma_2: f64, gamma_3: f64, beta: f64) -> Self {
        Self {
            delta,
            gamma_1,
            gamma_2,
            gamma_3,
            beta,
        }
    }

    /// True when this stage's register average degenerates to the identity,
    /// in which case the integrate tasks rebind the (u, u1) aliases instead
    /// of copying data.
    ///
    pub fn is_identity_average(&self) -> bool {
        self.gamma_1 == 0.0 && self.gamma_2 == 1.0 && self.gamma_3 == 0.0
    }
}

/// The supported time-integration schemes.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheme {
    /// First-order forward Euler.
    Rk1,
    /// Second-order van Leer predictor-corrector (Stone & Gardiner 2009).
    Vl2,
    /// Heun's method / SSPRK(2,2), Gottlieb (2009) eq. 3.1.
    Rk2,
    /// SSPRK(3,3), Gottlieb (2009) eq. 3.2.
    Rk3,
    /// RK4()4[2S] from Table 2 of Ketcheson (2010).
    Rk4,
    /// SSPRK(5,4), Gottlieb (2009) section 3.1. A 3N method with no exact
    /// 3S* representation; the integrate tasks patch over the difference at
    /// the penultimate stage.
    Ssprk54,
}

impl Scheme {
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::Rk1 => "rk1",
            Scheme::Vl2 => "vl2",
            Scheme::Rk2 => "rk2",
            Scheme::Rk3 => "rk3",
            Scheme::Rk4 => "rk4",
            Scheme::Ssprk54 => "ssprk5_4",
        }
    }
}

/// A named integrator: the scheme, its per-stage weights, and the CFL
/// stability limit when coupled to the single-stage spatial operator.
///
#[derive(Clone, Debug)]
pub struct Integrator {
    scheme: Scheme,
    cfl_limit: f64,
    stage_wghts: Vec<StageWeights>,
}

impl Integrator {
    /// Look up an integrator by its parameter-file name. The stability limit
    /// of `vl2` depends on the dimensionality of the mesh; the other schemes
    /// carry their limit unconditionally.
    ///
    pub fn from_name(name: &str, ndim: usize) -> Result<Self, Error> {
        let (scheme, cfl_limit, stage_wghts) = match name {
            "rk1" => (
                Scheme::Rk1,
                1.0,
                vec![StageWeights::new(1.0, 0.0, 1.0, 0.0, 1.0)],
            ),
            "vl2" => (
                Scheme::Vl2,
                match ndim {
                    2 => 0.5,
                    3 => ONE_3RD,
                    _ => 1.0,
                },
                vec![
                    StageWeights::new(1.0, 0.0, 1.0, 0.0, 0.5),
                    StageWeights::new(0.0, 0.0, 1.0, 0.0, 1.0),
                ],
            ),
            "rk2" => (
                Scheme::Rk2,
                1.0,
                vec![
                    StageWeights::new(1.0, 0.0, 1.0, 0.0, 1.0),
                    StageWeights::new(0.0, 0.5, 0.5, 0.0, 0.5),
                ],
            ),
            "rk3" => (
                Scheme::Rk3,
                1.0,
                vec![
                    StageWeights::new(1.0, 0.0, 1.0, 0.0, 1.0),
                    StageWeights::new(0.0, 0.25, 0.75, 0.0, 0.25),
                    StageWeights::new(0.0, TWO_3RD, ONE_3RD, 0.0, TWO_3RD),
                ],
            ),
            "rk4" => (
                Scheme::Rk4,
                1.3925,
                vec![
                    StageWeights::new(1.0, 0.0, 1.0, 0.0, 1.193743905974738),
                    StageWeights::new(
                        0.217683334308543,
                        0.121098479554482,
                        0.721781678111411,
                        0.0,
                        0.099279895495783,
                    ),
                    StageWeights::new(
                        1.065841341361089,
                        -3.843833699660025,
                        2.121209265338722,
                        0.0,
                        1.131678018054042,
                    ),
                    StageWeights::new(
                        0.0,
                        0.546370891121863,
                        0.198653035682705,
                        0.0,
                        0.310665766509336,
                    ),
                ],
            ),
            "ssprk5_4" => (
                Scheme::Ssprk54,
                1.3925,
                vec![
                    StageWeights::new(1.0, 0.0, 1.0, 0.0, 0.391752226571890),
                    StageWeights::new(
                        0.0,
                        0.555629506348765,
                        0.444370493651235,
                        0.0,
                        0.368410593050371,
                    ),
                    StageWeights::new(
                        0.517231671970585,
                        0.379898148511597,
                        0.0,
                        0.620101851488403,
                        0.251891774271694,
                    ),
                    StageWeights::new(
                        0.096059710526147,
                        0.821920045606868,
                        0.0,
                        0.178079954393132,
                        0.544974750228521,
                    ),
                    StageWeights::new(0.0, 0.386708617503268, 1.0, 1.0, 0.226007483236906),
                ],
            ),
            _ => return Err(Error::UnknownIntegrator(String::from(name))),
        };
        Ok(Self {
            scheme,
            cfl_limit,
            stage_wghts,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn name(&self) -> &'static str {
        self.scheme.name()
    }

    pub fn nstages(&self) -> usize {
        self.stage_wghts.len()
    }

    pub fn cfl_limit(&self) -> f64 {
        self.cfl_limit
    }

    /// The weights of the given stage. Stages are numbered 1..=nstages.
    ///
    pub fn weights(&self, stage: usize) -> StageWeights {
        self.stage_wghts[stage - 1]
    }

    /// True for the schemes whose integrate tasks reference the u2 register,
    /// which must then be populated with the beginning-of-step state.
    ///
    pub fn needs_extra_register(&self) -> bool {
        self.scheme == Scheme::Ssprk54
    }

    /// Reconcile a requested CFL number with this scheme's stability limit.
    /// An over-limit request is clamped (with a warning) whenever the fluid
    /// is actually evolved.
    ///
    pub fn clamp_cfl(&self, cfl_number: f64, fluid_evolved: bool) -> f64 {
        if cfl_number > self.cfl_limit && fluid_evolved {
            warn!(
                "cfl_number {} must be smaller than {} for integrator={}; setting to limit",
                cfl_number,
                self.cfl_limit,
                self.name()
            );
            self.cfl_limit
        } else {
            cfl_number
        }
    }
}

#[cfg(test)]
mod test {

    use super::{Integrator, Scheme};

    #[test]
    fn unknown_integrator_is_rejected() {
        assert!(Integrator::from_name("rk5", 1).is_err());
        assert!(Integrator::from_name("", 3).is_err());
    }

    #[test]
    fn schemes_have_the_documented_shape() {
        for (name, nstages, cfl) in [
            ("rk1", 1, 1.0),
            ("rk2", 2, 1.0),
            ("rk3", 3, 1.0),
            ("rk4", 4, 1.3925),
            ("ssprk5_4", 5, 1.3925),
        ] {
            let integrator = Integrator::from_name(name, 1).unwrap();
            assert_eq!(integrator.nstages(), nstages);
            assert_eq!(integrator.cfl_limit(), cfl);
        }
    }

    #[test]
    fn vl2_limit_depends_on_dimensionality() {
        assert_eq!(Integrator::from_name("vl2", 1).unwrap().cfl_limit(), 1.0);
        assert_eq!(Integrator::from_name("vl2", 2).unwrap().cfl_limit(), 0.5);
        assert_eq!(
            Integrator::from_name("vl2", 3).unwrap().cfl_limit(),
            1.0 / 3.0
        );
    }

    #[test]
    fn requested_cfl_is_clamped_in_3d() {
        let integrator = Integrator::from_name("vl2", 3).unwrap();
        assert_eq!(integrator.clamp_cfl(1.0, true), 1.0 / 3.0);

        // A fluid that is not evolved keeps whatever the user asked for.
        assert_eq!(integrator.clamp_cfl(1.0, false), 1.0);
        assert_eq!(integrator.clamp_cfl(0.3, true), 0.3);
    }

    #[test]
    fn stage_weights_sum_consistently() {
        // Consistency condition of the Shu-Osher form: the register weights
        // of each stage's average sum to one once the running u1 sum is
        // unfolded. Spot-check the identity-average stages.
        let ssprk54 = Integrator::from_name("ssprk5_4", 1).unwrap();
        assert!(ssprk54.weights(1).is_identity_average());
        assert!(!ssprk54.weights(5).is_identity_average());
        assert_eq!(
            ssprk54.weights(3).gamma_1 + ssprk54.weights(3).gamma_3,
            1.0
        );
        assert_eq!(
            ssprk54.weights(4).gamma_1 + ssprk54.weights(4).gamma_3,
            1.0
        );
        assert_eq!(ssprk54.scheme(), Scheme::Ssprk54);
        assert!(ssprk54.needs_extra_register());

        let rk2 = Integrator::from_name("rk2", 1).unwrap();
        assert!(rk2.weights(1).is_identity_average());
        assert_eq!(rk2.weights(2).gamma_1 + rk2.weights(2).gamma_2, 1.0);
        assert!(!rk2.needs_extra_register());
    }
}

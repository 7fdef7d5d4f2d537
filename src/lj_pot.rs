use itertools::Itertools;
use nalgebra::Vector3;

use crate::system::{SimulationBox, System};

/// Pairwise-additive potential energy
pub trait PotentialEvaluator {
    /// Energy of a single pair under the box's distance and cutoff rules
    fn pair_energy(&self, sim_box: &SimulationBox, a: &Vector3<f64>, b: &Vector3<f64>) -> f64;

    /// Total potential energy, summed over every unordered pair b < c
    ///
    /// Fewer than two particles give +0.0.
    fn total_energy(&self, system: &System) -> f64 {
        system
            .positions
            .iter()
            .tuple_combinations()
            .map(|(a, b)| self.pair_energy(&system.sim_box, a, b))
            .fold(0.0, |acc, e| acc + e)
    }

    /// Energy of a particle at `pos` with every particle of `positions`
    ///
    /// # Arguments
    /// * `pos` - Position of the test particle
    /// * `skip_index` - Index in `positions` to leave out (the particle itself)
    fn particle_energy(
        &self,
        sim_box: &SimulationBox,
        positions: &[Vector3<f64>],
        pos: &Vector3<f64>,
        skip_index: Option<usize>,
    ) -> f64 {
        positions
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(i) != skip_index)
            .map(|(_, other)| self.pair_energy(sim_box, pos, other))
            .fold(0.0, |acc, e| acc + e)
    }
}

/// Lennard-Jones 12-6 potential
///
/// Pairs closer than the box cutoff (L/2) contribute nothing; only pairs at or
/// beyond the cutoff are summed. This is the inverse of the usual truncation
/// and is kept as the defined behaviour of the model.
#[derive(Debug, Clone)]
pub struct LennardJones {
    /// Well depth ε (Kelvin)
    pub epsilon: f64,
    /// Collision diameter σ (Ångström)
    pub sigma: f64,
    sigma6: f64,
    sigma12: f64,
}

impl LennardJones {
    /// Argon well depth in Kelvin
    pub const ARGON_EPSILON: f64 = 128.326802;
    /// Argon collision diameter in Ångström
    pub const ARGON_SIGMA: f64 = 3.371914;

    pub fn new(epsilon: f64, sigma: f64) -> Self {
        let s2 = sigma * sigma;
        let sigma6 = s2 * s2 * s2;
        LennardJones {
            epsilon,
            sigma,
            sigma6,
            sigma12: sigma6 * sigma6,
        }
    }

    pub fn argon() -> Self {
        Self::new(Self::ARGON_EPSILON, Self::ARGON_SIGMA)
    }

    /// 4ε(σ¹²/r¹² − σ⁶/r⁶)
    pub fn lj_potential(&self, r: f64) -> f64 {
        let rinv = 1.0 / r;
        let r2 = rinv * rinv;
        let r6 = r2 * r2 * r2;
        let r12 = r6 * r6;
        4.0 * self.epsilon * (self.sigma12 * r12 - self.sigma6 * r6)
    }
}

impl PotentialEvaluator for LennardJones {
    fn pair_energy(&self, sim_box: &SimulationBox, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        let r = sim_box.pairwise_distance(a, b);
        if r < sim_box.cutoff {
            return 0.0;
        }
        self.lj_potential(r)
    }
}

use tracing::info;

use crate::moves::MoveKind;

/// Attempt and acceptance counters per move kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveStatistics {
    /// Number of displacement moves attempted
    pub displacement_attempts: u64,
    /// Number of displacement moves accepted
    pub displacement_accepted: u64,
    /// Number of insertion moves attempted
    pub insertion_attempts: u64,
    /// Number of insertion moves accepted
    pub insertion_accepted: u64,
    /// Number of deletion moves attempted
    pub deletion_attempts: u64,
    /// Number of deletion moves accepted
    pub deletion_accepted: u64,
}

impl MoveStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempt of `kind` and whether it was accepted
    pub fn record(&mut self, kind: MoveKind, accepted: bool) {
        let (attempts, accepts) = match kind {
            MoveKind::Displacement => (&mut self.displacement_attempts, &mut self.displacement_accepted),
            MoveKind::Insertion => (&mut self.insertion_attempts, &mut self.insertion_accepted),
            MoveKind::Deletion => (&mut self.deletion_attempts, &mut self.deletion_accepted),
        };
        *attempts += 1;
        if accepted {
            *accepts += 1;
        }
    }

    pub fn attempts(&self, kind: MoveKind) -> u64 {
        match kind {
            MoveKind::Displacement => self.displacement_attempts,
            MoveKind::Insertion => self.insertion_attempts,
            MoveKind::Deletion => self.deletion_attempts,
        }
    }

    pub fn accepted(&self, kind: MoveKind) -> u64 {
        match kind {
            MoveKind::Displacement => self.displacement_accepted,
            MoveKind::Insertion => self.insertion_accepted,
            MoveKind::Deletion => self.deletion_accepted,
        }
    }

    /// Fraction of accepted attempts, 0 when nothing was attempted
    pub fn acceptance_rate(&self, kind: MoveKind) -> f64 {
        let attempts = self.attempts(kind);
        if attempts == 0 {
            0.0
        } else {
            self.accepted(kind) as f64 / attempts as f64
        }
    }

    pub fn total_attempts(&self) -> u64 {
        self.displacement_attempts + self.insertion_attempts + self.deletion_attempts
    }

    pub fn log_summary(&self) {
        for kind in [MoveKind::Displacement, MoveKind::Insertion, MoveKind::Deletion] {
            if self.attempts(kind) == 0 {
                continue;
            }
            info!(
                "{:<12} moves: {} / {} ({:.2}% accepted)",
                kind,
                self.accepted(kind),
                self.attempts(kind),
                100.0 * self.acceptance_rate(kind)
            );
        }
    }
}

/// Running sums over every sample of a run
///
/// The initial configuration counts as the first sample; each step adds one
/// more whether its move was accepted or rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsAccumulator {
    /// Sum of the energy of every sample
    pub energy_sum: f64,
    /// Sum of the pre-move energy of every accepted step
    pub past_energy_sum: f64,
    /// Sum of the squared energy of every sample
    pub energy_sq_sum: f64,
    /// Sum of the particle count of every sample
    pub particle_sum: f64,
    /// Sum of the squared particle count of every sample
    pub particle_sq_sum: f64,
    /// Sum of every QST estimate written so far
    pub qst_sum: f64,
    /// Number of QST estimates in `qst_sum`
    pub qst_samples: u64,
    /// Number of samples, initial state included
    pub samples: u64,
    pub moves: MoveStatistics,
}

impl StatisticsAccumulator {
    /// Start the sums from the initial configuration
    pub fn new(initial_energy: f64, initial_particles: usize) -> Self {
        let n = initial_particles as f64;
        Self {
            energy_sum: initial_energy,
            energy_sq_sum: initial_energy * initial_energy,
            past_energy_sum: 0.0,
            particle_sum: n,
            particle_sq_sum: n * n,
            qst_sum: 0.0,
            qst_samples: 0,
            samples: 1,
            moves: MoveStatistics::new(),
        }
    }

    /// Add the state left behind by one step
    pub fn record_sample(&mut self, energy: f64, n_particles: usize) {
        let n = n_particles as f64;
        self.energy_sum += energy;
        self.energy_sq_sum += energy * energy;
        self.particle_sum += n;
        self.particle_sq_sum += n * n;
        self.samples += 1;
    }

    /// Add one per-step QST estimate to the running mean
    pub fn record_qst(&mut self, qst: f64) {
        self.qst_sum += qst;
        self.qst_samples += 1;
    }

    /// Remember the energy an accepted move replaced
    pub fn record_replaced_energy(&mut self, past_energy: f64) {
        self.past_energy_sum += past_energy;
    }

    pub fn average_energy(&self) -> f64 {
        self.energy_sum / self.samples as f64
    }

    pub fn average_particles(&self) -> f64 {
        self.particle_sum / self.samples as f64
    }

    /// Sample standard deviation of the energy over all samples
    pub fn energy_std(&self) -> f64 {
        sample_std(self.energy_sum, self.energy_sq_sum, self.samples)
    }

    /// Sample standard deviation of the particle count over all samples
    pub fn particles_std(&self) -> f64 {
        sample_std(self.particle_sum, self.particle_sq_sum, self.samples)
    }

    /// Mean of the recorded QST estimates, 0 before the first one
    pub fn average_qst(&self) -> f64 {
        if self.qst_samples == 0 {
            0.0
        } else {
            self.qst_sum / self.qst_samples as f64
        }
    }

    /// Isosteric heat estimate at `step` (step ≥ 1)
    ///
    /// Moments are approximated from the running first moments: ⟨N²⟩ is taken
    /// as (⟨N⟩²)² and ⟨NU⟩ as ⟨N⟩⟨U⟩/step, with both sums divided by the step
    /// index. Without particle-number fluctuation the denominator vanishes and
    /// the estimate reduces to kT.
    pub fn isosteric_heat(&self, step: u64, kt: f64) -> f64 {
        let c = step as f64;
        let average_n = self.particle_sum / c;
        let average_n_all_squared = average_n * average_n;
        let average_energy = self.energy_sum / c;
        let average_of_n_squared = average_n_all_squared * average_n_all_squared;
        let average_n_energy = average_n * average_energy / c;

        let numerator = average_n_energy - average_n * average_energy;
        let denominator = average_of_n_squared - average_n_all_squared;
        if denominator == 0.0 {
            return kt;
        }
        kt - numerator / denominator
    }

    /// Helmholtz-like free energy kT·ln(exp(−βΔ)/step)
    ///
    /// Δ is the energy sum minus the replaced-energy sum after an accepted
    /// step and zero after a rejected one. Evaluated in log space.
    pub fn helmholtz(&self, step: u64, kt: f64, accepted: bool) -> f64 {
        let delta = if accepted {
            self.energy_sum - self.past_energy_sum
        } else {
            0.0
        };
        kt * (-delta / kt - (step as f64).ln())
    }
}

/// Standard deviation with the n − 1 denominator, from running sums
fn sample_std(sum: f64, sq_sum: f64, n: u64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let n = n as f64;
    let variance = (sq_sum - sum * sum / n) / (n - 1.0);
    // rounding can leave a tiny negative variance for constant samples
    variance.max(0.0).sqrt()
}

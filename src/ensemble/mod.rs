//! Monte Carlo drivers for the canonical and grand canonical ensembles
//!
//! A [`Simulation`] owns the whole run state: particles, current energy,
//! running statistics, the random stream and the output sink. Each call to
//! [`Simulation::step`] performs exactly one propose → evaluate → accept or
//! undo → record cycle.

mod gcmc;
mod nvt;

#[cfg(test)]
mod tests;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::acceptance::AcceptanceEngine;
use crate::config::Config;
use crate::error::{McError, Result};
use crate::io::{read_starting_positions, OutputSink};
use crate::lj_pot::{LennardJones, PotentialEvaluator};
use crate::moves::{MoveKind, MoveRecord};
use crate::stats::{MoveStatistics, StatisticsAccumulator};
use crate::system::System;

/// Statistical ensemble sampled by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EnsembleKind {
    /// Canonical: fixed N, V, T; displacement moves only
    #[default]
    Nvt,
    /// Grand canonical: fixed μ, V, T; displacement, insertion and deletion
    Gcmc,
}

/// How the energy of a trial state is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyEvaluation {
    /// Recompute the full pair sum after every move
    #[default]
    Full,
    /// Add the change in the moved particle's pair sum to the current energy
    Incremental,
}

/// What happened during one step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: u64,
    pub kind: MoveKind,
    pub accepted: bool,
    /// Energy before the move
    pub previous_energy: f64,
    /// Energy of the trial state
    pub proposed_energy: f64,
    /// Energy after the step (trial energy if accepted)
    pub energy: f64,
    pub n_particles: usize,
}

/// End-of-run figures
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ensemble: EnsembleKind,
    pub steps: u64,
    pub final_energy: f64,
    pub average_energy: f64,
    pub energy_std: f64,
    pub final_particles: usize,
    pub final_density: f64,
    pub average_particles: f64,
    pub particles_std: f64,
    /// Mean of the per-step QST estimates (GCMC only)
    pub average_qst: f64,
    pub moves: MoveStatistics,
}

impl RunSummary {
    pub fn log(&self) {
        info!("Steps run:          {}", self.steps);
        info!("Final energy:       {:.6}", self.final_energy);
        info!(
            "Average energy:     {:.6} ± {:.6}",
            self.average_energy, self.energy_std
        );
        if self.ensemble == EnsembleKind::Gcmc {
            info!("Final N particles:  {}", self.final_particles);
            info!("Final density:      {:.6e}", self.final_density);
            info!(
                "Average N particles: {:.2} ± {:.2}",
                self.average_particles, self.particles_std
            );
            info!("Average QST:        {:.6}", self.average_qst);
        }
        self.moves.log_summary();
    }
}

/// Seed derived from the wall clock
pub fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Single-chain Monte Carlo run
pub struct Simulation<S, P = LennardJones, R = StdRng> {
    pub ensemble: EnsembleKind,
    pub system: System,
    pub potential: P,
    pub acceptance: AcceptanceEngine,
    pub energy_evaluation: EnergyEvaluation,
    /// Total potential energy of the current state
    pub energy: f64,
    pub stats: StatisticsAccumulator,
    /// Number of steps performed so far
    pub step: u64,
    rng: R,
    sink: S,
}

impl<S: OutputSink> Simulation<S> {
    /// Build a Lennard-Jones run from a configuration
    ///
    /// Unset values take the ensemble defaults. NVT reads its particles from
    /// the starting file; GCMC starts empty unless a starting file is
    /// configured.
    pub fn from_config(config: &Config, sink: S) -> Result<Self> {
        let config = config.clone().with_defaults();
        config.validate()?;

        let box_length = config.box_length();
        let positions = match &config.start_file {
            Some(path) => read_starting_positions(path, config.particles)?,
            None => Vec::new(),
        };
        let system = System::from_positions(box_length, positions);

        let acceptance = AcceptanceEngine::with_species(
            config.temperature(),
            config.k_boltzmann,
            system.volume(),
            config.gcmc.planck,
            config.gcmc.mass,
        );
        let potential = LennardJones::new(config.potential.epsilon, config.potential.sigma);

        let seed = config.seed.unwrap_or_else(clock_seed);
        info!("Random seed: {}", seed);
        let rng = StdRng::seed_from_u64(seed);

        Ok(Simulation::new(config.ensemble, system, potential, acceptance, rng, sink)?
            .with_energy_evaluation(config.energy_evaluation))
    }
}

impl<S: OutputSink, P: PotentialEvaluator, R: Rng> Simulation<S, P, R> {
    /// Start a run and record the initial state as step 0
    ///
    /// Writes the initial trajectory frame and the `0 <energy>` line.
    pub fn new(
        ensemble: EnsembleKind,
        system: System,
        potential: P,
        acceptance: AcceptanceEngine,
        rng: R,
        mut sink: S,
    ) -> Result<Self> {
        if ensemble == EnsembleKind::Nvt && system.is_empty() {
            return Err(McError::Config(
                "NVT runs need at least one particle".to_string(),
            ));
        }

        let energy = potential.total_energy(&system);
        sink.write_frame(&system.positions)?;
        sink.write_energy(0, energy)?;

        info!(
            "Starting {:?} run: N = {}, L = {}, T = {}, initial energy = {:.6}",
            ensemble,
            system.n_particles(),
            system.box_length(),
            acceptance.temperature,
            energy
        );

        let stats = StatisticsAccumulator::new(energy, system.n_particles());
        Ok(Self {
            ensemble,
            system,
            potential,
            acceptance,
            energy_evaluation: EnergyEvaluation::Full,
            energy,
            stats,
            step: 0,
            rng,
            sink,
        })
    }

    pub fn with_energy_evaluation(mut self, energy_evaluation: EnergyEvaluation) -> Self {
        self.energy_evaluation = energy_evaluation;
        self
    }

    /// Perform one Monte Carlo step
    pub fn step(&mut self) -> Result<StepOutcome> {
        let outcome = match self.ensemble {
            EnsembleKind::Nvt => self.nvt_step()?,
            EnsembleKind::Gcmc => self.gcmc_step()?,
        };
        debug!(
            "step {}: {} dE = {:.6} {} (N = {})",
            outcome.step,
            outcome.kind,
            outcome.proposed_energy - outcome.previous_energy,
            if outcome.accepted { "accepted" } else { "rejected" },
            outcome.n_particles
        );
        Ok(outcome)
    }

    /// Perform `n_steps` Monte Carlo steps
    pub fn run(&mut self, n_steps: u64) -> Result<()> {
        for _ in 0..n_steps {
            self.step()?;
        }
        Ok(())
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ensemble: self.ensemble,
            steps: self.step,
            final_energy: self.energy,
            average_energy: self.stats.average_energy(),
            energy_std: self.stats.energy_std(),
            final_particles: self.system.n_particles(),
            final_density: self.system.density(),
            average_particles: self.stats.average_particles(),
            particles_std: self.stats.particles_std(),
            average_qst: self.stats.average_qst(),
            moves: self.stats.moves.clone(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Flush the output and hand back the sink
    pub fn finish(mut self) -> Result<(RunSummary, S)> {
        self.sink.flush()?;
        let summary = self.summary();
        Ok((summary, self.sink))
    }

    /// Energy of the trial state produced by `record`
    fn proposed_energy(&self, record: &MoveRecord) -> f64 {
        match self.energy_evaluation {
            EnergyEvaluation::Full => self.potential.total_energy(&self.system),
            EnergyEvaluation::Incremental => self.energy + self.energy_change(record),
        }
    }

    /// Change in total energy caused by the move `record` describes
    ///
    /// The system already holds the trial state.
    fn energy_change(&self, record: &MoveRecord) -> f64 {
        let sim_box = &self.system.sim_box;
        let positions = &self.system.positions;
        match *record {
            MoveRecord::Displacement {
                index,
                old_position,
                ..
            } => {
                let new = self
                    .potential
                    .particle_energy(sim_box, positions, &positions[index], Some(index));
                let old = self
                    .potential
                    .particle_energy(sim_box, positions, &old_position, Some(index));
                new - old
            }
            MoveRecord::Insertion { index, position } => {
                self.potential
                    .particle_energy(sim_box, positions, &position, Some(index))
            }
            MoveRecord::Deletion { position, .. } => {
                -self.potential.particle_energy(sim_box, positions, &position, None)
            }
        }
    }
}

use rand::Rng;

use super::{Simulation, StepOutcome};
use crate::error::{McError, Result};
use crate::io::OutputSink;
use crate::lj_pot::PotentialEvaluator;
use crate::moves::{random_displacement, MoveKind};

impl<S: OutputSink, P: PotentialEvaluator, R: Rng> Simulation<S, P, R> {
    /// One canonical step: a Metropolis displacement of a random particle
    ///
    /// The energy log receives the energy of the state kept after the step.
    pub(super) fn nvt_step(&mut self) -> Result<StepOutcome> {
        let step = self.step + 1;
        let previous_energy = self.energy;

        let record = random_displacement(&mut self.system, &mut self.rng)
            .ok_or_else(|| McError::Config("NVT run has no particles to move".to_string()))?;
        let proposed_energy = self.proposed_energy(&record);
        let n_particles = self.system.n_particles();

        let accepted = self.acceptance.accept(
            MoveKind::Displacement,
            previous_energy,
            proposed_energy,
            n_particles,
            &mut self.rng,
        );
        if accepted {
            self.stats.record_replaced_energy(previous_energy);
            self.energy = proposed_energy;
        } else {
            record.undo(&mut self.system);
        }

        self.stats.moves.record(MoveKind::Displacement, accepted);
        self.stats.record_sample(self.energy, n_particles);
        self.step = step;

        let kt = self.acceptance.kt();
        self.sink.write_energy(step, self.energy)?;
        self.sink.write_frame(&self.system.positions)?;
        self.sink
            .write_helmholtz(step, self.stats.helmholtz(step, kt, accepted))?;

        Ok(StepOutcome {
            step,
            kind: MoveKind::Displacement,
            accepted,
            previous_energy,
            proposed_energy,
            energy: self.energy,
            n_particles,
        })
    }
}

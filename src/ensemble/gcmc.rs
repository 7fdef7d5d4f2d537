use rand::Rng;

use super::{Simulation, StepOutcome};
use crate::error::Result;
use crate::io::OutputSink;
use crate::lj_pot::PotentialEvaluator;
use crate::moves::propose_gcmc;

impl<S: OutputSink, P: PotentialEvaluator, R: Rng> Simulation<S, P, R> {
    /// One grand canonical step: displacement, insertion or deletion
    ///
    /// The acceptance test sees the particle count of the trial state, and
    /// the chemical potential log is written for that same count. The energy
    /// log always receives the trial energy, accepted or not, while the
    /// running sums take the state kept after the step.
    pub(super) fn gcmc_step(&mut self) -> Result<StepOutcome> {
        let step = self.step + 1;
        let previous_energy = self.energy;

        let record = propose_gcmc(&mut self.system, &mut self.rng);
        let kind = record.kind();
        let proposed_energy = self.proposed_energy(&record);
        let trial_particles = self.system.n_particles();

        let accepted = self.acceptance.accept(
            kind,
            previous_energy,
            proposed_energy,
            trial_particles,
            &mut self.rng,
        );
        if accepted {
            self.energy = proposed_energy;
        } else {
            record.undo(&mut self.system);
        }

        let n_particles = self.system.n_particles();
        self.stats.moves.record(kind, accepted);
        self.stats.record_sample(self.energy, n_particles);
        self.step = step;

        let qst = self.stats.isosteric_heat(step, self.acceptance.kt());
        self.stats.record_qst(qst);

        self.sink.write_energy(step, proposed_energy)?;
        self.sink.write_frame(&self.system.positions)?;
        self.sink.write_qst(step, qst)?;
        self.sink.write_chemical_potential(
            step,
            self.acceptance.chemical_potential(trial_particles),
        )?;

        Ok(StepOutcome {
            step,
            kind,
            accepted,
            previous_energy,
            proposed_energy,
            energy: self.energy,
            n_particles,
        })
    }
}

use super::*;
use crate::io::MemoryOutput;
use crate::system::SimulationBox;
use approx::assert_relative_eq;
use nalgebra::Vector3;

/// Every pair contributes the same constant energy
struct ConstantPair(f64);

impl PotentialEvaluator for ConstantPair {
    fn pair_energy(&self, _sim_box: &SimulationBox, _a: &Vector3<f64>, _b: &Vector3<f64>) -> f64 {
        self.0
    }
}

/// Pair energy equal to the pair distance
struct DistanceEnergy;

impl PotentialEvaluator for DistanceEnergy {
    fn pair_energy(&self, sim_box: &SimulationBox, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        sim_box.pairwise_distance(a, b)
    }
}

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn lines(text: &str) -> Vec<&str> {
    text.lines().collect()
}

fn value_at(text: &str, step: u64) -> f64 {
    let step = step.to_string();
    let line = text
        .lines()
        .find(|l| l.split_whitespace().next() == Some(step.as_str()))
        .expect("step present");
    line.split_whitespace().nth(1).unwrap().parse().unwrap()
}

fn two_particle_nvt() -> Simulation<MemoryOutput> {
    let system = System::from_positions(
        200.0,
        vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
    );
    let acceptance = AcceptanceEngine::new(77.0, 1.0, system.volume());
    Simulation::new(
        EnsembleKind::Nvt,
        system,
        LennardJones::argon(),
        acceptance,
        rng(1),
        MemoryOutput::new(EnsembleKind::Nvt),
    )
    .unwrap()
}

fn gcmc<P: PotentialEvaluator>(system: System, potential: P, seed: u64) -> Simulation<MemoryOutput, P> {
    let acceptance = AcceptanceEngine::new(101.0, 1.0, system.volume());
    Simulation::new(
        EnsembleKind::Gcmc,
        system,
        potential,
        acceptance,
        rng(seed),
        MemoryOutput::new(EnsembleKind::Gcmc),
    )
    .unwrap()
}

#[test]
fn test_two_particle_nvt_zero_steps() {
    let mut sim = two_particle_nvt();
    sim.run(0).unwrap();
    let (summary, out) = sim.finish().unwrap();

    // the pair sits inside the cutoff of 100 and is skipped
    assert_eq!(summary.final_energy, 0.0);
    assert_eq!(out.energies(), "0 0.000000\n");
    assert_eq!(
        out.trajectory(),
        "2\n\nAr 0.000000 0.000000 0.000000\nAr 1.000000 0.000000 0.000000\n"
    );
    assert_eq!(out.free_energies().as_deref(), Some(""));
    assert_eq!(summary.steps, 0);
    assert_eq!(summary.average_energy, 0.0);
}

#[test]
fn test_gcmc_zero_steps() {
    let sim = gcmc(System::empty(22.0), LennardJones::argon(), 1);
    let (summary, out) = sim.finish().unwrap();
    assert_eq!(out.energies(), "0 0.000000\n");
    assert_eq!(out.trajectory(), "0\n\n");
    assert_eq!(out.qsts().as_deref(), Some(""));
    assert_eq!(summary.final_particles, 0);
}

#[test]
fn test_nvt_rejects_empty_system() {
    let system = System::empty(10.0);
    let acceptance = AcceptanceEngine::new(77.0, 1.0, system.volume());
    let result = Simulation::new(
        EnsembleKind::Nvt,
        system,
        LennardJones::argon(),
        acceptance,
        rng(1),
        MemoryOutput::new(EnsembleKind::Nvt),
    );
    assert!(matches!(result, Err(McError::Config(_))));
}

#[test]
fn test_gcmc_first_step_forces_insertion() {
    let mut sim = gcmc(System::empty(22.0), LennardJones::argon(), 9);
    let outcome = sim.step().unwrap();

    assert_eq!(outcome.kind, MoveKind::Insertion);
    // a lone particle has no pairs, so ΔE = 0 and the threshold test rejects
    assert!(!outcome.accepted);
    assert_eq!(outcome.proposed_energy, 0.0);
    assert!(sim.system.is_empty());
    assert_eq!(sim.stats.moves.insertion_attempts, 1);

    let out = sim.sink();
    assert_eq!(lines(&out.energies()), vec!["0 0.000000", "1 0.000000"]);
    assert_eq!(out.trajectory(), "0\n\n0\n\n");
    assert_eq!(lines(&out.qsts().unwrap()).len(), 1);
}

#[test]
fn test_nvt_run_records_every_step() {
    let positions = vec![
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(5.0, 5.0, 5.0),
        Vector3::new(9.0, 2.0, 7.0),
        Vector3::new(3.0, 8.0, 4.0),
    ];
    let system = System::from_positions(10.0, positions);
    let acceptance = AcceptanceEngine::new(1.0, 1.0, system.volume());
    let mut sim = Simulation::new(
        EnsembleKind::Nvt,
        system,
        LennardJones::new(1.0, 1.0),
        acceptance,
        rng(4),
        MemoryOutput::new(EnsembleKind::Nvt),
    )
    .unwrap();

    for _ in 0..50 {
        sim.step().unwrap();
        assert!(sim.system.all_in_box());
        assert_eq!(sim.system.n_particles(), 4);
        assert_relative_eq!(
            sim.energy,
            sim.potential.total_energy(&sim.system),
            epsilon = 1e-9
        );
    }

    assert_eq!(sim.stats.samples, 51);
    assert_eq!(sim.stats.moves.displacement_attempts, 50);
    let (summary, out) = sim.finish().unwrap();
    assert_eq!(summary.steps, 50);
    assert_eq!(lines(&out.energies()).len(), 51);
    assert_eq!(lines(&out.free_energies().unwrap()).len(), 50);
    assert_eq!(out.trajectory().matches("4\n\n").count(), 51);
}

#[test]
fn test_nvt_logs_kept_energy_and_undoes_rejections() {
    let positions = vec![
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(4.0, 6.0, 2.0),
        Vector3::new(8.0, 3.0, 9.0),
    ];
    let system = System::from_positions(10.0, positions);
    // effectively zero temperature: only downhill moves survive
    let acceptance = AcceptanceEngine::new(1e-12, 1.0, system.volume());
    let mut sim = Simulation::new(
        EnsembleKind::Nvt,
        system,
        DistanceEnergy,
        acceptance,
        rng(12),
        MemoryOutput::new(EnsembleKind::Nvt),
    )
    .unwrap();

    let mut saw_rejection = false;
    for _ in 0..40 {
        let before = sim.system.positions.clone();
        let outcome = sim.step().unwrap();
        assert_eq!(outcome.accepted, outcome.proposed_energy < outcome.previous_energy);
        if outcome.accepted {
            assert_eq!(outcome.energy, outcome.proposed_energy);
        } else {
            saw_rejection = true;
            assert_eq!(sim.system.positions, before);
            assert_eq!(outcome.energy, outcome.previous_energy);
            let helmholtz = value_at(&sim.sink().free_energies().unwrap(), outcome.step);
            assert_relative_eq!(
                helmholtz,
                -1e-12 * (outcome.step as f64).ln(),
                epsilon = 1e-6
            );
        }
        assert_relative_eq!(
            value_at(&sim.sink().energies(), outcome.step),
            sim.energy,
            epsilon = 1e-5
        );
    }
    assert!(saw_rejection);
}

#[test]
fn test_gcmc_downhill_insertions_always_accepted() {
    let system = System::from_positions(
        22.0,
        vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(12.0, 12.0, 12.0)],
    );
    let mut sim = gcmc(system, ConstantPair(-1.0), 21);

    for _ in 0..60 {
        let n_before = sim.system.n_particles();
        let outcome = sim.step().unwrap();
        match outcome.kind {
            // ΔE = -N < 0
            MoveKind::Insertion => {
                assert!(outcome.accepted);
                assert_eq!(sim.system.n_particles(), n_before + 1);
            }
            // ΔE = N - 1 > 0 and the threshold test rejects
            MoveKind::Deletion => {
                assert!(!outcome.accepted);
                assert_eq!(sim.system.n_particles(), n_before);
            }
            // ΔE = 0 passes any draw below one
            MoveKind::Displacement => assert!(outcome.accepted),
        }
        let n = sim.system.n_particles() as f64;
        assert_relative_eq!(sim.energy, -n * (n - 1.0) / 2.0);
        assert!(sim.system.all_in_box());
    }

    let moves = &sim.stats.moves;
    assert_eq!(moves.total_attempts(), 60);
    assert_eq!(moves.insertion_accepted, moves.insertion_attempts);
    assert_eq!(moves.deletion_accepted, 0);
    assert_eq!(
        sim.system.n_particles() as u64,
        2 + moves.insertion_attempts
    );
}

#[test]
fn test_gcmc_logs_proposed_energy() {
    let system = System::from_positions(
        22.0,
        vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(12.0, 12.0, 12.0)],
    );
    let mut sim = gcmc(system, ConstantPair(-1.0), 5);
    for _ in 0..30 {
        let outcome = sim.step().unwrap();
        assert_relative_eq!(
            value_at(&sim.sink().energies(), outcome.step),
            outcome.proposed_energy,
            epsilon = 1e-6
        );
    }
    let qsts = sim.sink().qsts().unwrap();
    assert_eq!(lines(&qsts).len(), 30);
}

#[test]
fn test_gcmc_particle_average() {
    let system = System::from_positions(
        22.0,
        vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(12.0, 12.0, 12.0)],
    );
    let mut sim = gcmc(system, ConstantPair(-1.0), 8);
    let mut sum = 2.0;
    for _ in 0..25 {
        sim.step().unwrap();
        sum += sim.system.n_particles() as f64;
    }
    assert_relative_eq!(sim.summary().average_particles, sum / 26.0, epsilon = 1e-12);
}

#[test]
fn test_incremental_energy_tracks_full_sum() {
    let positions = vec![
        Vector3::new(0.2, 0.4, 0.1),
        Vector3::new(2.3, 2.6, 2.9),
        Vector3::new(3.7, 0.9, 2.2),
        Vector3::new(1.4, 3.1, 3.8),
        Vector3::new(2.9, 1.8, 0.6),
    ];
    let system = System::from_positions(4.0, positions);
    let mut sim = gcmc(system, LennardJones::new(1.0, 1.0), 17)
        .with_energy_evaluation(EnergyEvaluation::Incremental);
    // a temperature high enough that displacements are routinely accepted
    sim.acceptance = AcceptanceEngine::new(1e4, 1.0, sim.system.volume());

    for _ in 0..200 {
        sim.step().unwrap();
        let full = sim.potential.total_energy(&sim.system);
        assert_relative_eq!(sim.energy, full, epsilon = 1e-6, max_relative = 1e-9);
    }
}

#[test]
fn test_same_seed_same_output() {
    let run = |seed| {
        let positions = vec![
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(5.0, 5.0, 5.0),
            Vector3::new(9.0, 2.0, 7.0),
        ];
        let system = System::from_positions(10.0, positions);
        let mut sim = gcmc(system, LennardJones::new(1.0, 1.0), seed);
        sim.run(40).unwrap();
        let (_, out) = sim.finish().unwrap();
        (out.trajectory(), out.energies(), out.qsts())
    };
    assert_eq!(run(33), run(33));
}

#[test]
fn test_gcmc_long_run_summary() {
    let system = System::from_positions(
        22.0,
        vec![Vector3::new(2.0, 3.0, 4.0), Vector3::new(15.0, 12.0, 18.0)],
    );
    let mut sim = gcmc(system, LennardJones::argon(), 2);
    sim.run(500).unwrap();
    let (summary, out) = sim.finish().unwrap();
    assert_eq!(summary.steps, 500);
    assert_eq!(summary.moves.total_attempts(), 500);
    assert!(summary.average_particles >= 0.0);
    assert!(summary.particles_std >= 0.0);
    assert!(summary.energy_std.is_finite());
    assert_relative_eq!(
        summary.final_density,
        summary.final_particles as f64 / 22.0f64.powi(3)
    );

    // one QST and one μ line per step, and the summary mean matches the log
    let qsts = out.qsts().unwrap();
    let values: Vec<f64> = qsts
        .lines()
        .map(|l| l.split_whitespace().nth(1).unwrap().parse().unwrap())
        .collect();
    assert_eq!(values.len(), 500);
    let mean = values.iter().sum::<f64>() / 500.0;
    assert_relative_eq!(summary.average_qst, mean, epsilon = 1e-5, max_relative = 1e-6);
    assert_eq!(lines(&out.chemical_potentials().unwrap()).len(), 500);
}

#[test]
fn test_gcmc_logs_chemical_potential_of_trial_state() {
    let system = System::from_positions(
        22.0,
        vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(12.0, 12.0, 12.0)],
    );
    let mut sim = gcmc(system, ConstantPair(-1.0), 13);
    for _ in 0..30 {
        let n_before = sim.system.n_particles();
        let outcome = sim.step().unwrap();
        let trial = match outcome.kind {
            MoveKind::Insertion => n_before + 1,
            MoveKind::Deletion => n_before - 1,
            MoveKind::Displacement => n_before,
        };
        let mu = value_at(&sim.sink().chemical_potentials().unwrap(), outcome.step);
        assert_relative_eq!(
            mu,
            sim.acceptance.chemical_potential(trial),
            epsilon = 1e-6,
            max_relative = 1e-6
        );
    }
}

#[test]
fn test_summary_spread_matches_samples() {
    let system = System::from_positions(
        22.0,
        vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(12.0, 12.0, 12.0)],
    );
    let mut sim = gcmc(system, ConstantPair(-1.0), 8);
    let mut counts = vec![2.0];
    let mut energies = vec![-1.0];
    for _ in 0..40 {
        sim.step().unwrap();
        counts.push(sim.system.n_particles() as f64);
        energies.push(sim.energy);
    }
    let spread = |v: &[f64]| {
        let mean = v.iter().sum::<f64>() / v.len() as f64;
        let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (v.len() - 1) as f64;
        var.sqrt()
    };
    let summary = sim.summary();
    assert_relative_eq!(summary.particles_std, spread(&counts), epsilon = 1e-9);
    assert_relative_eq!(summary.energy_std, spread(&energies), epsilon = 1e-6);
}

#[test]
fn test_nvt_writes_no_gcmc_streams() {
    let mut sim = two_particle_nvt();
    sim.run(5).unwrap();
    let (summary, out) = sim.finish().unwrap();
    assert_eq!(out.qsts(), None);
    assert_eq!(out.chemical_potentials(), None);
    assert_eq!(summary.average_qst, 0.0);
}

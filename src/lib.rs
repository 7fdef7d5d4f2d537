//! Metropolis Monte Carlo for Lennard-Jones particles in a cubic box
//!
//! Runs a single chain in the canonical (NVT) or grand canonical (GCMC)
//! ensemble and records a trajectory, an energy log and one ensemble-specific
//! observable per step.

pub mod acceptance;
pub mod config;
pub mod ensemble;
pub mod error;
pub mod io;
pub mod lj_pot;
pub mod moves;
pub mod stats;
pub mod system;

pub use acceptance::AcceptanceEngine;
pub use config::{Args, Config};
pub use ensemble::{EnergyEvaluation, EnsembleKind, RunSummary, Simulation, StepOutcome};
pub use error::{McError, Result};
pub use lj_pot::{LennardJones, PotentialEvaluator};
pub use moves::{MoveKind, MoveRecord};
pub use stats::{MoveStatistics, StatisticsAccumulator};
pub use system::{SimulationBox, System};

//! Command-line argument parsing for Monte Carlo runs

use clap::Parser;
use std::path::PathBuf;

use super::Config;
use crate::ensemble::{EnergyEvaluation, EnsembleKind};

/// Lennard-Jones Monte Carlo in the NVT or grand canonical ensemble
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    pub config_file: Option<String>,

    /// Ensemble to sample (overrides config file)
    #[arg(short, long, value_enum)]
    pub ensemble: Option<EnsembleKind>,

    /// Number of Monte Carlo steps; prompts on stdin when omitted
    #[arg(long)]
    pub steps: Option<u64>,

    /// Random seed (overrides config file)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Starting configuration file (overrides config file)
    #[arg(long)]
    pub start_file: Option<PathBuf>,

    /// Required particle count of the starting file
    #[arg(long)]
    pub particles: Option<usize>,

    /// Box side length
    #[arg(long)]
    pub box_length: Option<f64>,

    /// Temperature in Kelvin
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Directory for trajectory and data files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write log output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Update the energy from the moved particle only
    #[arg(long)]
    pub incremental: bool,

    /// Trace every Monte Carlo step
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Overlay command-line values onto `config`
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ensemble) = self.ensemble {
            config.ensemble = ensemble;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.start_file.is_some() {
            config.start_file = self.start_file.clone();
        }
        if self.particles.is_some() {
            config.particles = self.particles;
        }
        if self.box_length.is_some() {
            config.box_length = self.box_length;
        }
        if self.temperature.is_some() {
            config.temperature = self.temperature;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.incremental {
            config.energy_evaluation = EnergyEvaluation::Incremental;
        }
    }
}

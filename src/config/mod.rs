//! Configuration management for Monte Carlo runs
//!
//! This module handles the YAML run configuration, its per-ensemble defaults
//! and validation, and the command-line overrides.

mod args;

pub use args::Args;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::acceptance::{ARGON_MASS, PLANCK};
use crate::ensemble::{EnergyEvaluation, EnsembleKind};
use crate::error::{McError, Result};
use crate::lj_pot::LennardJones;

/// Resolved configuration saved next to the outputs, seed included
pub const RUN_CONFIG_FILE: &str = "run_config.yaml";

/// Run configuration
///
/// Box length, temperature, particle count and starting file are optional in
/// the file; missing values fall back to the defaults of the chosen ensemble.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Statistical ensemble to sample
    #[serde(default)]
    pub ensemble: EnsembleKind,
    /// Side length L of the cubic box
    pub box_length: Option<f64>,
    /// Temperature in Kelvin
    pub temperature: Option<f64>,
    /// Boltzmann constant (1.0 in reduced units)
    #[serde(default = "default_kb")]
    pub k_boltzmann: f64,
    /// Number of particles the starting file must contain
    pub particles: Option<usize>,
    /// Starting configuration, one `x y z` line per particle
    pub start_file: Option<PathBuf>,
    #[serde(default)]
    pub potential: PotentialParams,
    #[serde(default)]
    pub gcmc: GcmcParams,
    #[serde(default)]
    pub energy_evaluation: EnergyEvaluation,
    /// Fixed seed; a clock-derived seed is used when absent
    pub seed: Option<u64>,
    /// Directory receiving the trajectory and log files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Lennard-Jones parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PotentialParams {
    /// Well depth ε in Kelvin
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Collision diameter σ in Ångström
    #[serde(default = "default_sigma")]
    pub sigma: f64,
}

impl Default for PotentialParams {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            sigma: default_sigma(),
        }
    }
}

/// Species constants entering the thermal wavelength
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GcmcParams {
    #[serde(default = "default_planck")]
    pub planck: f64,
    /// Particle mass in atomic mass units
    #[serde(default = "default_mass")]
    pub mass: f64,
}

impl Default for GcmcParams {
    fn default() -> Self {
        Self {
            planck: default_planck(),
            mass: default_mass(),
        }
    }
}

// Default value functions
fn default_kb() -> f64 {
    1.0
}
fn default_epsilon() -> f64 {
    LennardJones::ARGON_EPSILON
}
fn default_sigma() -> f64 {
    LennardJones::ARGON_SIGMA
}
fn default_planck() -> f64 {
    PLANCK
}
fn default_mass() -> f64 {
    ARGON_MASS
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self::for_ensemble(EnsembleKind::default())
    }
}

impl Config {
    /// Configuration with every value left at its default
    pub fn for_ensemble(ensemble: EnsembleKind) -> Self {
        Self {
            ensemble,
            box_length: None,
            temperature: None,
            k_boltzmann: default_kb(),
            particles: None,
            start_file: None,
            potential: PotentialParams::default(),
            gcmc: GcmcParams::default(),
            energy_evaluation: EnergyEvaluation::default(),
            seed: None,
            output_dir: default_output_dir(),
        }
    }

    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| McError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yml::from_str(content).map_err(|e| McError::Config(e.to_string()))
    }

    /// Save configuration to YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = serde_yml::to_string(self).map_err(|e| McError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| McError::io(path, e))
    }

    /// Fill every ensemble-dependent value that is still unset
    ///
    /// NVT: L = 200, T = 77 K, 1000 particles from `startingpositions.txt`.
    /// GCMC: L = 22, T = 101 K, starting from an empty box.
    pub fn with_defaults(mut self) -> Self {
        match self.ensemble {
            EnsembleKind::Nvt => {
                self.box_length = self.box_length.or(Some(200.0));
                self.temperature = self.temperature.or(Some(77.0));
                if self.start_file.is_none() {
                    self.start_file = Some(PathBuf::from("startingpositions.txt"));
                    self.particles = self.particles.or(Some(1000));
                }
            }
            EnsembleKind::Gcmc => {
                self.box_length = self.box_length.or(Some(22.0));
                self.temperature = self.temperature.or(Some(101.0));
            }
        }
        self
    }

    pub fn box_length(&self) -> f64 {
        self.box_length.unwrap_or(match self.ensemble {
            EnsembleKind::Nvt => 200.0,
            EnsembleKind::Gcmc => 22.0,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(match self.ensemble {
            EnsembleKind::Nvt => 77.0,
            EnsembleKind::Gcmc => 101.0,
        })
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(McError::Config(format!("{} must be positive, got {}", name, value)))
            }
        };

        positive("box_length", self.box_length())?;
        positive("temperature", self.temperature())?;
        positive("k_boltzmann", self.k_boltzmann)?;
        positive("potential.epsilon", self.potential.epsilon)?;
        positive("potential.sigma", self.potential.sigma)?;
        positive("gcmc.planck", self.gcmc.planck)?;
        positive("gcmc.mass", self.gcmc.mass)?;

        if self.ensemble == EnsembleKind::Nvt {
            if self.start_file.is_none() {
                return Err(McError::Config(
                    "NVT runs need a start_file with the initial positions".to_string(),
                ));
            }
            if self.particles == Some(0) {
                return Err(McError::Config(
                    "NVT runs need at least one particle".to_string(),
                ));
            }
        }

        Ok(())
    }
}

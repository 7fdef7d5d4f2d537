//! Acceptance tests for trial moves
//!
//! Displacements use the Metropolis criterion. Insertions and deletions use
//! deterministic threshold tests on the grand canonical acceptance terms, with
//! a relative chemical potential derived from the instantaneous density. These
//! threshold forms differ from textbook GCMC, which compares the same terms
//! against a uniform draw.

use rand::Rng;
use std::f64::consts::PI;

use crate::moves::MoveKind;

/// Planck constant in J·s
pub const PLANCK: f64 = 6.626e-34;
/// Argon mass in atomic mass units
pub const ARGON_MASS: f64 = 39.948;

/// de Broglie thermal wavelength λ = h/√(2πmkT)
pub fn thermal_wavelength(planck: f64, mass: f64, k_boltzmann: f64, temperature: f64) -> f64 {
    planck / (2.0 * PI * mass * k_boltzmann * temperature).sqrt()
}

/// Ensemble acceptance rules for a box of fixed volume at fixed temperature
#[derive(Debug, Clone)]
pub struct AcceptanceEngine {
    pub temperature: f64,
    pub k_boltzmann: f64,
    pub volume: f64,
    /// λ³ of the particle species
    pub lambda_cubed: f64,
}

impl AcceptanceEngine {
    /// Engine for argon-like particles
    pub fn new(temperature: f64, k_boltzmann: f64, volume: f64) -> Self {
        Self::with_species(temperature, k_boltzmann, volume, PLANCK, ARGON_MASS)
    }

    /// Engine with an explicit Planck constant and particle mass
    pub fn with_species(
        temperature: f64,
        k_boltzmann: f64,
        volume: f64,
        planck: f64,
        mass: f64,
    ) -> Self {
        let lambda = thermal_wavelength(planck, mass, k_boltzmann, temperature);
        Self {
            temperature,
            k_boltzmann,
            volume,
            lambda_cubed: lambda * lambda * lambda,
        }
    }

    /// kT
    pub fn kt(&self) -> f64 {
        self.k_boltzmann * self.temperature
    }

    /// β = 1/(kT)
    pub fn beta(&self) -> f64 {
        1.0 / self.kt()
    }

    /// μ = kT·ln(λ³)·ρ at the density ρ = N/V
    pub fn chemical_potential(&self, n_particles: usize) -> f64 {
        if n_particles == 0 {
            return 0.0;
        }
        let density = n_particles as f64 / self.volume;
        self.kt() * self.lambda_cubed.ln() * density
    }

    /// μ − kT·ln(λ³)
    pub fn relative_chemical_potential(&self, n_particles: usize) -> f64 {
        self.chemical_potential(n_particles) - self.kt() * self.lambda_cubed.ln()
    }

    /// Accept iff `draw < exp(-βΔE)`
    pub fn metropolis(&self, delta_e: f64, draw: f64) -> bool {
        draw < (-self.beta() * delta_e).exp()
    }

    /// Accept iff exp(−βΔE + βμ_rel + ln(V/(N+1))) < 1
    pub fn insertion(&self, delta_e: f64, n_particles: usize) -> bool {
        let beta = self.beta();
        let mu_rel = self.relative_chemical_potential(n_particles);
        let exponent =
            -beta * delta_e + beta * mu_rel + (self.volume / (n_particles as f64 + 1.0)).ln();
        exponent.exp() < 1.0
    }

    /// Accept iff N / (V·exp(−βΔE − βμ_rel)) < 1
    pub fn deletion(&self, delta_e: f64, n_particles: usize) -> bool {
        let beta = self.beta();
        let mu_rel = self.relative_chemical_potential(n_particles);
        let term = (-beta * delta_e - beta * mu_rel).exp();
        n_particles as f64 / (self.volume * term) < 1.0
    }

    /// Decide a move given a uniform draw in [0, 1)
    ///
    /// `n_particles` is the count after the trial move was applied. A move
    /// that lowers the energy is accepted before any kind-specific rule.
    pub fn decide(
        &self,
        kind: MoveKind,
        old_energy: f64,
        new_energy: f64,
        n_particles: usize,
        draw: f64,
    ) -> bool {
        let delta_e = new_energy - old_energy;
        if delta_e < 0.0 {
            return true;
        }
        match kind {
            MoveKind::Displacement => self.metropolis(delta_e, draw),
            MoveKind::Insertion => self.insertion(delta_e, n_particles),
            MoveKind::Deletion => self.deletion(delta_e, n_particles),
        }
    }

    /// Decide a move, drawing from `rng` only when a Metropolis draw is needed
    pub fn accept<R: Rng + ?Sized>(
        &self,
        kind: MoveKind,
        old_energy: f64,
        new_energy: f64,
        n_particles: usize,
        rng: &mut R,
    ) -> bool {
        let needs_draw = kind == MoveKind::Displacement && new_energy - old_energy >= 0.0;
        let draw = if needs_draw { rng.gen::<f64>() } else { 0.0 };
        self.decide(kind, old_energy, new_energy, n_particles, draw)
    }
}

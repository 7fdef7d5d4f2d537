//! Input/Output for Monte Carlo runs
//!
//! This module handles logging setup, the starting configuration, the
//! step-count prompt and the per-step output files.

mod output;
mod prompt;
mod sink;
mod start;

pub use output::setup_output;
pub use prompt::{parse_step_count, prompt_step_count};
pub use sink::{
    FileOutput, MemoryOutput, OutputSink, TextOutput, CHEMICAL_POTENTIAL_FILE, ENERGY_FILE,
    FREE_ENERGY_FILE, QST_FILE, TRAJECTORY_FILE,
};
pub use start::{parse_starting_positions, read_starting_positions};

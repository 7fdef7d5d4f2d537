//! Monte Carlo Command-Line Interface
//!
//! Runs a Lennard-Jones NVT or GCMC simulation from an optional YAML
//! configuration and command-line overrides.

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use std::io;
use std::time::Instant;
use tracing::info;

use ljmc::config::RUN_CONFIG_FILE;
use ljmc::ensemble::clock_seed;
use ljmc::io::{prompt_step_count, setup_output, FileOutput};
use ljmc::{Args, Config, Simulation};

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_output(args.output.as_ref(), args.verbose);

    let mut config = match &args.config_file {
        Some(path) => {
            info!("Reading configuration from: {}", path);
            Config::from_file(path)
                .wrap_err_with(|| format!("Unable to load configuration file: {}", path))?
        }
        None => Config::default(),
    };
    args.apply_to(&mut config);
    let mut config = config.with_defaults();
    config.seed = Some(config.seed.unwrap_or_else(clock_seed));
    info!("Configuration loaded:\n{:?}", config);

    let steps = match args.steps {
        Some(steps) => steps,
        None => {
            let stdin = io::stdin();
            prompt_step_count(stdin.lock(), io::stdout()).wrap_err("Invalid step count")?
        }
    };

    let sink = FileOutput::create(&config.output_dir, config.ensemble)
        .wrap_err("Failed to open output files")?;
    let run_config = config.output_dir.join(RUN_CONFIG_FILE);
    config
        .to_file(&run_config)
        .wrap_err_with(|| format!("Unable to save run configuration: {}", run_config.display()))?;
    let mut simulation =
        Simulation::from_config(&config, sink).wrap_err("Failed to set up the simulation")?;

    let start = Instant::now();
    simulation
        .run(steps)
        .wrap_err_with(|| format!("Simulation failed after step {}", simulation.step))?;
    let elapsed = start.elapsed();

    let (summary, _) = simulation.finish().wrap_err("Failed to flush output files")?;
    summary.log();
    info!("Output written to: {}", config.output_dir.display());

    println!("Time elapsed: {:.3} s", elapsed.as_secs_f64());
    println!("Average energy: {:.6}", summary.average_energy);
    Ok(())
}

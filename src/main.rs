mod aerosol;
mod config;
mod error;
mod interp;
mod lut;
mod readers;
mod solver;
mod utils;

#[cfg(test)]
mod testing;

use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use aerosol::{GranuMode, Species};
use config::Config;
use lut::LutBuilder;
use readers::{ReferenceData, read_aerosol_hydrophilicity};
use solver::Mopsmap;

/// Builds aerosol optical property LUTs with the MOPSMAP solver
#[derive(Parser, Debug)]
#[command(name = "aerolut")]
#[command(version)]
struct Cli {
    /// JSON configuration; built-in defaults are used when the file is missing
    #[arg(long, default_value = "./data/config/lut_config.json")]
    config: PathBuf,

    /// Species key, e.g. `dust` or `sea_salt` (repeatable)
    #[arg(long, required = true)]
    species: Vec<Species>,

    /// Granulometry: `mono` or `bi`
    #[arg(long, default_value = "bi")]
    mode: GranuMode,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = if cli.config.is_file() {
        Config::from_file(&cli.config)?
    } else {
        warn!(
            "Configuration {} not found, using defaults",
            cli.config.display()
        );
        Config::default()
    };

    let reference = ReferenceData::open(&config.reference_dataset(), config.extrapolation())?;
    info!(
        "Loaded {} ({} species, versions {:?})",
        reference.path().display(),
        reference.species().len(),
        reference.versions()
    );
    info!(
        "Reference grids: RH {:?} %, wavelengths {:?} nm, out-of-grid queries: {}",
        reference.humidities(),
        reference.wavelengths_nm(),
        reference.extrapolation()
    );

    let solver = Mopsmap::from_config(&config)?;
    info!("Using solver {}", solver.executable().display());

    let builder = LutBuilder::new(&reference, solver, &config);

    for species in cli.species {
        let hydrophilic = read_aerosol_hydrophilicity(config.data_directory(), species)?;
        info!(
            "{} is {}",
            species,
            if hydrophilic { "hydrophilic" } else { "hydrophobic" }
        );

        let lut = builder.build(
            species,
            cli.mode,
            config.humidities(),
            config.wavelengths_nm(),
            config.n_theta(),
        )?;

        println!("{}", lut);
    }

    Ok(())
}

use chrono::Local;
use log::{debug, info};
use ndarray::{Array2, Array4, aview1, s};
use std::path::PathBuf;

use super::dataset::{AssembledLut, LutMetadata, VerticalLayers};
use crate::aerosol::{GranuMode, Species};
use crate::config::{Config, ConfigError};
use crate::error::LutError;
use crate::readers::{ReferenceData, STOKES_COMPONENTS, SolverOutput};
use crate::solver::{DeckWriter, OpticalSolver, SolverController};

/// Runs the humidity sweep for one species and saves the resulting LUT.
pub struct LutBuilder<'a, S> {
    writer: DeckWriter<'a>,
    controller: SolverController<S>,
    version: String,
    output_directory: PathBuf,
    provenance: String,
}

impl<'a, S: OpticalSolver> LutBuilder<'a, S> {
    pub fn new(reference: &'a ReferenceData, solver: S, config: &Config) -> Self {
        Self {
            writer: DeckWriter::from_config(reference, config),
            controller: SolverController::new(solver, config.poll_interval(), config.timeout()),
            version: config.cams_version().to_string(),
            output_directory: config.output_directory().to_path_buf(),
            provenance: config.provenance().to_string(),
        }
    }

    pub fn output_path(&self, species: Species) -> PathBuf {
        self.output_directory.join(format!("{}_sol.nc", species.key()))
    }

    /// Runs the solver once per humidity, then writes the LUT. Nothing is saved if any
    /// humidity fails.
    pub fn build(
        &self,
        species: Species,
        mode: GranuMode,
        humidities: &[f64],
        wavelengths_nm: &[f64],
        n_theta: usize,
    ) -> Result<AssembledLut, LutError> {
        let lut = self.sweep(species, mode, humidities, wavelengths_nm, n_theta)?;
        lut.write_netcdf(&self.output_path(species))?;
        Ok(lut)
    }

    fn sweep(
        &self,
        species: Species,
        mode: GranuMode,
        humidities: &[f64],
        wavelengths_nm: &[f64],
        n_theta: usize,
    ) -> Result<AssembledLut, LutError> {
        if humidities.is_empty() {
            return Err(ConfigError::EmptyGrid { name: "humidities" }.into());
        }
        if wavelengths_nm.is_empty() {
            return Err(ConfigError::EmptyGrid { name: "wavelengths_nm" }.into());
        }

        let n_hum = humidities.len();
        let n_wav = wavelengths_nm.len();

        // Accumulated as [wav][stk][theta][hum], permuted once the sweep is done
        let mut phase = Array4::<f64>::zeros((n_wav, STOKES_COMPONENTS, n_theta, n_hum));
        let mut ext = Array2::<f64>::zeros((n_wav, n_hum));
        let mut ssa = Array2::<f64>::zeros((n_wav, n_hum));
        let mut theta: Option<Vec<f64>> = None;

        for (idx, &rh) in humidities.iter().enumerate() {
            info!("{} {}: RH = {}% ({}/{})", species, mode, rh, idx + 1, n_hum);

            let deck = self
                .writer
                .write_deck(species, mode, rh, wavelengths_nm, n_theta, &self.version)?;
            let output_path = self.controller.invoke(&deck)?;

            let output = SolverOutput::read(&output_path)?;
            output.check_shape(n_wav, n_theta)?;

            // The angle axis of later runs is assumed identical to the first one
            if theta.is_none() {
                theta = Some(output.theta.clone());
            }

            phase.slice_mut(s![.., .., .., idx]).assign(&output.phase);
            ext.slice_mut(s![.., idx]).assign(&aview1(&output.ext));
            ssa.slice_mut(s![.., idx]).assign(&aview1(&output.ssa));
            debug!("Collected solver output {}", output_path.display());
        }

        let phase = phase
            .permuted_axes([3, 0, 1, 2])
            .as_standard_layout()
            .into_owned();

        Ok(AssembledLut {
            species,
            humidities: humidities.to_vec(),
            wavelengths_nm: wavelengths_nm.to_vec(),
            theta: theta.unwrap_or_default(),
            phase,
            ext: ext.reversed_axes().as_standard_layout().into_owned(),
            ssa: ssa.reversed_axes().as_standard_layout().into_owned(),
            metadata: LutMetadata {
                name: species.key().to_string(),
                layers: VerticalLayers::default(),
                date: Local::now().date_naive(),
                source: self.provenance.clone(),
            },
        })
    }
}

//! Input decks for the MOPSMAP optical solver.
//!
//! A deck looks like:
//!
//! ```text
//! scatlib '/opt/mopsmap/optical_dataset'
//! water_refrac_file '/opt/mopsmap/data/refr_water_segelstein'
//! mode 1 size log_normal 0.0788 1.8221188003905089 1.0 0.001 40.0
//! mode 1 refrac file './tmp/refr_fine.txt'
//! mode 1 shape sphere
//! mode 2 size log_normal ...
//! mode 2 refrac file './tmp/refr_coarse.txt'
//! mode 2 shape sphere
//! output num_theta 2000
//! wavelength list 0.25 0.3 0.35
//! output netcdf './tmp/results.nc'
//! ```

use log::debug;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use super::refrac;
use crate::aerosol::{GranuMode, LogNormal, Species};
use crate::config::{Config, ScratchLayout};
use crate::error::LutError;
use crate::readers::ReferenceData;
use crate::utils::write_atomically;

/// Size distribution weight and radius bounds [um] of every mode.
const MODE_WEIGHT: f64 = 1.0;
const MIN_RADIUS: f64 = 0.001;
const MAX_RADIUS: f64 = 40.0;

/// Data libraries shipped with the solver.
#[derive(Debug, Clone)]
pub struct SolverLibraries {
    pub scatlib: String,
    pub water_refrac_file: String,
}

/// Scratch files of one solver invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchPaths {
    pub deck: PathBuf,
    pub output: PathBuf,
    pub refrac_fine: PathBuf,
    pub refrac_coarse: PathBuf,
}

impl ScratchPaths {
    pub fn new(directory: &Path, layout: ScratchLayout, rh: f64) -> Self {
        let name = |stem: &str, extension: &str| match layout {
            ScratchLayout::Fixed => directory.join(format!("{}.{}", stem, extension)),
            ScratchLayout::PerHumidity => {
                directory.join(format!("{}_rh{}.{}", stem, rh, extension))
            }
        };

        Self {
            deck: name("launcher", "txt"),
            output: name("results", "nc"),
            refrac_fine: name("refr_fine", "txt"),
            refrac_coarse: name("refr_coarse", "txt"),
        }
    }
}

/// One `mode` block of the deck.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckMode {
    pub size: LogNormal,
    pub refrac_file: PathBuf,
}

/// A deck written to disk, with the output file it requests.
#[derive(Debug, Clone)]
pub struct SolverDeck {
    pub deck_path: PathBuf,
    pub output_path: PathBuf,
    pub modes: [DeckMode; 2],
    pub wavelengths_um: Vec<f64>,
    pub n_theta: usize,
}

impl SolverDeck {
    pub fn render(&self, libraries: &SolverLibraries) -> String {
        let mut text = String::new();

        // Writing to a String cannot fail
        let _ = writeln!(text, "scatlib '{}'", libraries.scatlib);
        let _ = writeln!(text, "water_refrac_file '{}'", libraries.water_refrac_file);

        // Floats always keep a decimal point (`40.0`, not `40`)
        for (i, mode) in self.modes.iter().enumerate() {
            let n = i + 1;
            let _ = writeln!(
                text,
                "mode {} size log_normal {:?} {:?} {:?} {:?} {:?}",
                n,
                mode.size.rm,
                mode.size.sigma.exp(),
                MODE_WEIGHT,
                MIN_RADIUS,
                MAX_RADIUS
            );
            let _ = writeln!(text, "mode {} refrac file '{}'", n, mode.refrac_file.display());
            let _ = writeln!(text, "mode {} shape sphere", n);
        }

        let _ = writeln!(text, "output num_theta {}", self.n_theta);
        let wavelengths: Vec<String> = self
            .wavelengths_um
            .iter()
            .map(|wl| format!("{:?}", wl))
            .collect();
        let _ = writeln!(text, "wavelength list {}", wavelengths.join(" "));
        let _ = write!(text, "output netcdf '{}'", self.output_path.display());

        text
    }
}

#[derive(Debug)]
pub struct DeckWriter<'a> {
    reference: &'a ReferenceData,
    libraries: SolverLibraries,
    scratch_directory: PathBuf,
    layout: ScratchLayout,
}

impl<'a> DeckWriter<'a> {
    pub fn new(
        reference: &'a ReferenceData,
        libraries: SolverLibraries,
        scratch_directory: impl Into<PathBuf>,
        layout: ScratchLayout,
    ) -> Self {
        Self {
            reference,
            libraries,
            scratch_directory: scratch_directory.into(),
            layout,
        }
    }

    pub fn from_config(reference: &'a ReferenceData, config: &Config) -> Self {
        Self::new(
            reference,
            SolverLibraries {
                scatlib: config.scatlib().to_string(),
                water_refrac_file: config.water_refrac_file().to_string(),
            },
            config.scratch_directory(),
            config.scratch_layout(),
        )
    }

    /// Writes the refractive index files and the deck for one humidity.
    ///
    /// In mono-modal mode a single refractive index file serves both mode slots.
    pub fn write_deck(
        &self,
        species: Species,
        mode: GranuMode,
        rh: f64,
        wavelengths_nm: &[f64],
        n_theta: usize,
        version: &str,
    ) -> Result<SolverDeck, LutError> {
        let (size_fine, size_coarse) = self.reference.granulometry(species, mode, rh, version)?;
        let (table_fine, table_coarse) =
            self.reference
                .refractive_index(species, mode, rh, version, wavelengths_nm)?;

        let paths = ScratchPaths::new(&self.scratch_directory, self.layout, rh);

        refrac::write_table(&paths.refrac_fine, &table_fine)?;
        let coarse_file = match mode {
            GranuMode::MonoModal => paths.refrac_fine.clone(),
            GranuMode::BiModal => {
                refrac::write_table(&paths.refrac_coarse, &table_coarse)?;
                paths.refrac_coarse.clone()
            }
        };

        let deck = SolverDeck {
            deck_path: paths.deck,
            output_path: paths.output,
            modes: [
                DeckMode {
                    size: size_fine,
                    refrac_file: paths.refrac_fine,
                },
                DeckMode {
                    size: size_coarse,
                    refrac_file: coarse_file,
                },
            ],
            wavelengths_um: table_fine.wavelengths_um,
            n_theta,
        };

        write_atomically(&deck.deck_path, &deck.render(&self.libraries))?;
        debug!("Wrote solver deck {}", deck.deck_path.display());

        Ok(deck)
    }
}

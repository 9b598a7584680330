//! Access to the CAMS aerosol optical properties dataset.
//!
//! The dataset is a NetCDF file with coordinates `aerosols_species`, `cams_versions`,
//! `relative_humidity` and `wavelength` [nm], and the fields
//!
//! - `rmodal_f`, `rmodal_c`: modal radius of the fine and coarse modes,
//! - `lnvar_f`, `lnvar_c`: log of the geometric standard deviation,
//! - `mr_f`, `mr_c`, `mi_f`, `mi_c`: real and imaginary refractive index.
//!
//! Size parameters are interpolated along humidity, refractive indices jointly along
//! humidity and wavelength.

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::nc::{self, NamedArray};
use crate::aerosol::{GranuMode, LogNormal, RefractiveIndexTable, Species};
use crate::config::Extrapolation;
use crate::error::LutError;
use crate::interp;

pub const SPECIES_DIM: &str = "aerosols_species";
pub const VERSION_DIM: &str = "cams_versions";
pub const HUMIDITY_DIM: &str = "relative_humidity";
pub const WAVELENGTH_DIM: &str = "wavelength";

const FIELDS: [&str; 8] = [
    "rmodal_f", "rmodal_c", "lnvar_f", "lnvar_c", "mr_f", "mr_c", "mi_f", "mi_c",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fraction {
    Fine,
    Coarse,
}

impl Fraction {
    fn field(&self, prefix: &str) -> String {
        match self {
            Fraction::Fine => format!("{}_f", prefix),
            Fraction::Coarse => format!("{}_c", prefix),
        }
    }
}

#[derive(Debug)]
pub struct ReferenceData {
    path: PathBuf,
    species: Vec<String>,
    versions: Vec<String>,
    humidities: Vec<f64>,
    wavelengths_nm: Vec<f64>,
    fields: HashMap<String, NamedArray>,
    extrapolation: Extrapolation,
}

fn check_increasing(name: &str, axis: &[f64]) -> Result<(), LutError> {
    if axis.is_empty() || axis.windows(2).any(|w| w[0] >= w[1]) {
        return Err(LutError::Layout {
            variable: name.to_string(),
            reason: "coordinate must be non-empty and strictly increasing".to_string(),
        });
    }
    Ok(())
}

impl ReferenceData {
    /// Loads the whole dataset in memory.
    pub fn open(path: &Path, extrapolation: Extrapolation) -> Result<Self, LutError> {
        let file = nc::open(path)?;

        let species = nc::read_labels(&file, SPECIES_DIM)?;
        let versions = nc::read_labels(&file, VERSION_DIM)?;
        let humidities = nc::read_coordinate(&file, HUMIDITY_DIM)?;
        let wavelengths_nm = nc::read_coordinate(&file, WAVELENGTH_DIM)?;

        check_increasing(HUMIDITY_DIM, &humidities)?;
        check_increasing(WAVELENGTH_DIM, &wavelengths_nm)?;

        let mut fields = HashMap::with_capacity(FIELDS.len());
        for name in FIELDS {
            fields.insert(name.to_string(), NamedArray::read(&file, name)?);
        }

        debug!(
            "Loaded {} ({} species, versions {:?}, {} humidities, {} wavelengths)",
            path.display(),
            species.len(),
            versions,
            humidities.len(),
            wavelengths_nm.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            species,
            versions,
            humidities,
            wavelengths_nm,
            fields,
            extrapolation,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn humidities(&self) -> &[f64] {
        &self.humidities
    }

    pub fn wavelengths_nm(&self) -> &[f64] {
        &self.wavelengths_nm
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    /// Slice of `field` for one species and dataset version.
    fn selection(
        &self,
        field: &str,
        species: Species,
        version: &str,
    ) -> Result<NamedArray, LutError> {
        let species_idx = self
            .species
            .iter()
            .position(|s| s == species.key())
            .ok_or_else(|| LutError::KeyLookup {
                kind: "aerosol species",
                key: species.key().to_string(),
            })?;

        let version_idx = self
            .versions
            .iter()
            .position(|v| v == version)
            .ok_or_else(|| LutError::KeyLookup {
                kind: "CAMS version",
                key: version.to_string(),
            })?;

        let array = self.fields.get(field).ok_or_else(|| LutError::KeyLookup {
            kind: "variable",
            key: field.to_string(),
        })?;

        array
            .select(SPECIES_DIM, species_idx)?
            .select(VERSION_DIM, version_idx)
    }

    fn size_distribution(
        &self,
        fraction: Fraction,
        species: Species,
        rh: f64,
        version: &str,
    ) -> Result<LogNormal, LutError> {
        let along_humidity = |prefix: &str| -> Result<f64, LutError> {
            let values: Vec<f64> = self
                .selection(&fraction.field(prefix), species, version)?
                .into_ordered(&[HUMIDITY_DIM])?
                .iter()
                .copied()
                .collect();
            interp::interp1(HUMIDITY_DIM, &self.humidities, &values, rh, self.extrapolation)
        };

        Ok(LogNormal {
            rm: along_humidity("rmodal")?,
            sigma: along_humidity("lnvar")?,
        })
    }

    /// Log-normal parameters of the fine and coarse modes at relative humidity `rh` [%].
    ///
    /// In mono-modal mode the fine mode is returned twice.
    pub fn granulometry(
        &self,
        species: Species,
        mode: GranuMode,
        rh: f64,
        version: &str,
    ) -> Result<(LogNormal, LogNormal), LutError> {
        let fine = self.size_distribution(Fraction::Fine, species, rh, version)?;
        match mode {
            GranuMode::MonoModal => Ok((fine, fine)),
            GranuMode::BiModal => {
                let coarse = self.size_distribution(Fraction::Coarse, species, rh, version)?;
                Ok((fine, coarse))
            }
        }
    }

    fn refractive_table(
        &self,
        fraction: Fraction,
        species: Species,
        rh: f64,
        version: &str,
        wavelengths_nm: &[f64],
    ) -> Result<RefractiveIndexTable, LutError> {
        let grid = |prefix: &str| -> Result<Vec<f64>, LutError> {
            Ok(self
                .selection(&fraction.field(prefix), species, version)?
                .into_ordered(&[HUMIDITY_DIM, WAVELENGTH_DIM])?
                .iter()
                .copied()
                .collect())
        };
        let mr = grid("mr")?;
        let mi = grid("mi")?;

        let mut table = RefractiveIndexTable {
            wavelengths_um: Vec::with_capacity(wavelengths_nm.len()),
            real: Vec::with_capacity(wavelengths_nm.len()),
            imag: Vec::with_capacity(wavelengths_nm.len()),
        };

        for &wl in wavelengths_nm {
            let at = |values: &[f64]| {
                interp::interp2(
                    (HUMIDITY_DIM, &self.humidities),
                    (WAVELENGTH_DIM, &self.wavelengths_nm),
                    values,
                    (rh, wl),
                    self.extrapolation,
                )
            };
            table.wavelengths_um.push(wl / 1e3);
            table.real.push(at(&mr)?);
            table.imag.push(at(&mi)?);
        }

        Ok(table)
    }

    /// Refractive index tables of the fine and coarse modes over `wavelengths_nm`.
    ///
    /// Wavelengths in the returned tables are in micrometers. In mono-modal mode the fine
    /// table is returned twice.
    pub fn refractive_index(
        &self,
        species: Species,
        mode: GranuMode,
        rh: f64,
        version: &str,
        wavelengths_nm: &[f64],
    ) -> Result<(RefractiveIndexTable, RefractiveIndexTable), LutError> {
        let fine = self.refractive_table(Fraction::Fine, species, rh, version, wavelengths_nm)?;
        match mode {
            GranuMode::MonoModal => Ok((fine.clone(), fine)),
            GranuMode::BiModal => {
                let coarse =
                    self.refractive_table(Fraction::Coarse, species, rh, version, wavelengths_nm)?;
                Ok((fine, coarse))
            }
        }
    }
}

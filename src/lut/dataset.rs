use chrono::NaiveDate;
use log::info;
use ndarray::{Array2, Array4};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aerosol::Species;
use crate::error::LutError;

/// Vertical extent [km] of the layers the species is mixed into, with their scale heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalLayers {
    pub h_mix_min: i64,
    pub h_mix_max: i64,
    pub h_free_min: i64,
    pub h_free_max: i64,
    pub h_stra_min: i64,
    pub h_stra_max: i64,
    pub z_mix: f64,
    pub z_free: f64,
    pub z_stra: f64,
}

impl Default for VerticalLayers {
    fn default() -> Self {
        Self {
            h_mix_min: 0,
            h_mix_max: 99,
            h_free_min: 0,
            h_free_max: 0,
            h_stra_min: 0,
            h_stra_max: 0,
            z_mix: 2.0,
            z_free: 0.0,
            z_stra: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LutMetadata {
    pub name: String,
    pub layers: VerticalLayers,
    pub date: NaiveDate,
    pub source: String,
}

/// Optical properties of one species over the humidity and wavelength grids.
#[derive(Debug, Clone)]
pub struct AssembledLut {
    pub species: Species,
    pub humidities: Vec<f64>,
    pub wavelengths_nm: Vec<f64>,
    pub theta: Vec<f64>,
    pub phase: Array4<f64>, // [hum][wav][stk][theta]
    pub ext: Array2<f64>,   // [hum][wav]
    pub ssa: Array2<f64>,   // [hum][wav]
    pub metadata: LutMetadata,
}

impl AssembledLut {
    /// Writes the LUT to `path`. The file is built next to its destination and renamed
    /// into place once complete.
    pub fn write_netcdf(&self, path: &Path) -> Result<(), LutError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let partial = PathBuf::from(format!("{}.part", path.display()));
        if let Err(e) = self.write_to(&partial) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, path)?;

        info!("Saved {} LUT to {}", self.species, path.display());
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<(), LutError> {
        let (n_hum, n_wav, n_stk, n_theta) = self.phase.dim();
        let mut file = netcdf::create(path)?;

        file.add_dimension("hum", n_hum)?;
        file.add_dimension("wav", n_wav)?;
        file.add_dimension("stk", n_stk)?;
        file.add_dimension("theta", n_theta)?;

        let mut var = file.add_variable::<f64>("hum", &["hum"])?;
        var.put_values(&self.humidities, ..)?;
        var.put_attribute("units", "%")?;

        let mut var = file.add_variable::<f64>("wav", &["wav"])?;
        var.put_values(&self.wavelengths_nm, ..)?;
        var.put_attribute("units", "nm")?;

        let mut var = file.add_variable::<f64>("theta", &["theta"])?;
        var.put_values(&self.theta, ..)?;
        var.put_attribute("units", "degree")?;

        let phase: Vec<f64> = self.phase.iter().copied().collect();
        let mut var = file.add_variable::<f64>("phase", &["hum", "wav", "stk", "theta"])?;
        var.put_values(&phase, ..)?;

        for (name, field) in [("ext", &self.ext), ("ssa", &self.ssa)] {
            let values: Vec<f64> = field.iter().copied().collect();
            let mut var = file.add_variable::<f64>(name, &["hum", "wav"])?;
            var.put_values(&values, ..)?;
        }

        let meta = &self.metadata;
        let layers = &meta.layers;
        file.add_attribute("name", meta.name.as_str())?;
        for (name, value) in [
            ("H_mix_min", layers.h_mix_min),
            ("H_mix_max", layers.h_mix_max),
            ("H_stra_min", layers.h_stra_min),
            ("H_stra_max", layers.h_stra_max),
            ("H_free_min", layers.h_free_min),
            ("H_free_max", layers.h_free_max),
        ] {
            file.add_attribute(name, value)?;
        }
        for (name, value) in [
            ("Z_mix", layers.z_mix),
            ("Z_free", layers.z_free),
            ("Z_stra", layers.z_stra),
        ] {
            file.add_attribute(name, value)?;
        }
        file.add_attribute("date", meta.date.format("%Y-%m-%d").to_string())?;
        file.add_attribute("source", meta.source.as_str())?;

        Ok(())
    }
}

impl fmt::Display for AssembledLut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (n_hum, n_wav, n_stk, n_theta) = self.phase.dim();
        writeln!(f, "{} ({})", self.species, self.metadata.name)?;
        writeln!(
            f,
            "  dims: hum={} wav={} stk={} theta={}",
            n_hum, n_wav, n_stk, n_theta
        )?;
        writeln!(f, "  date: {}", self.metadata.date.format("%Y-%m-%d"))?;
        write!(f, "  source: {}", self.metadata.source)
    }
}

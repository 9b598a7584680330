//! Parsing of the NetCDF file written by the optical solver.

use ndarray::{Array3, Ix3};
use std::path::Path;

use super::nc::{self, NamedArray};
use crate::error::LutError;

pub const WAVELENGTH_DIM: &str = "nlam";
pub const STOKES_DIM: &str = "nphamat";
pub const SIZE_DIM: &str = "nreff";

/// Number of phase matrix elements written by the solver.
pub const STOKES_COMPONENTS: usize = 6;

/// Optical properties for one humidity, on the first (and only) size mode.
#[derive(Debug, Clone)]
pub struct SolverOutput {
    pub theta: Vec<f64>,
    pub phase: Array3<f64>, // [wavelength][stokes][theta]
    pub ext: Vec<f64>,
    pub ssa: Vec<f64>,
}

fn along_wavelength(file: &netcdf::File, name: &str) -> Result<Vec<f64>, LutError> {
    Ok(NamedArray::read(file, name)?
        .select_if_present(SIZE_DIM, 0)?
        .into_ordered(&[WAVELENGTH_DIM])?
        .iter()
        .copied()
        .collect())
}

impl SolverOutput {
    pub fn read(path: &Path) -> Result<Self, LutError> {
        let file = nc::open(path)?;

        let phase = NamedArray::read(&file, "phase")?.select_if_present(SIZE_DIM, 0)?;
        let theta_dim = phase
            .dims()
            .iter()
            .find(|d| *d != WAVELENGTH_DIM && *d != STOKES_DIM)
            .cloned()
            .ok_or_else(|| LutError::Layout {
                variable: "phase".to_string(),
                reason: format!("no angle dimension in {:?}", phase.dims()),
            })?;
        let phase = phase
            .into_ordered(&[WAVELENGTH_DIM, STOKES_DIM, theta_dim.as_str()])?
            .into_dimensionality::<Ix3>()
            .map_err(|e| LutError::Layout {
                variable: "phase".to_string(),
                reason: e.to_string(),
            })?;

        let theta: Vec<f64> = NamedArray::read(&file, "theta")?
            .select_if_present(SIZE_DIM, 0)?
            .select_if_present(STOKES_DIM, 0)?
            .select_if_present(WAVELENGTH_DIM, 0)?
            .into_ordered(&[theta_dim.as_str()])?
            .iter()
            .copied()
            .collect();

        Ok(Self {
            theta,
            phase,
            ext: along_wavelength(&file, "ext")?,
            ssa: along_wavelength(&file, "ssa")?,
        })
    }

    /// Checks the output against the requested wavelength and angle counts.
    pub fn check_shape(&self, n_wavelengths: usize, n_theta: usize) -> Result<(), LutError> {
        let checks = [
            ("phase wavelengths", n_wavelengths, self.phase.dim().0),
            ("phase Stokes components", STOKES_COMPONENTS, self.phase.dim().1),
            ("phase angles", n_theta, self.phase.dim().2),
            ("theta", n_theta, self.theta.len()),
            ("ext", n_wavelengths, self.ext.len()),
            ("ssa", n_wavelengths, self.ssa.len()),
        ];

        for (what, expected, found) in checks {
            if expected != found {
                return Err(LutError::ShapeMismatch {
                    what: format!("solver output {}", what),
                    expected,
                    found,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use tempfile::tempdir;

    #[test]
    fn test_read_solver_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.nc");
        let theta = testing::theta_axis(10, 0.0);
        testing::write_solver_output(&path, 2, 3, 6, &theta);

        let output = SolverOutput::read(&path).unwrap();
        assert_eq!(output.theta, theta);
        assert_eq!(output.phase.dim(), (3, 6, 10));
        assert_eq!(output.phase[[1, 4, 7]], testing::phase_value(2, 1, 4, 7));
        let ext: Vec<f64> = (0..3).map(|w| testing::ext_value(2, w)).collect();
        assert_eq!(output.ext, ext);
        assert_eq!(output.ssa[2], testing::ssa_value(2, 2));
        assert!(output.check_shape(3, 10).is_ok());
    }

    #[test]
    fn test_check_shape_rejects_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.nc");
        testing::write_solver_output(&path, 0, 3, 4, &testing::theta_axis(10, 0.0));

        let output = SolverOutput::read(&path).unwrap();
        let err = output.check_shape(3, 10).unwrap_err();
        assert!(matches!(err, LutError::ShapeMismatch { expected: 6, found: 4, .. }));

        assert!(matches!(
            output.check_shape(4, 10),
            Err(LutError::ShapeMismatch { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_missing_output() {
        let dir = tempdir().unwrap();
        let err = SolverOutput::read(&dir.path().join("results.nc")).unwrap_err();
        assert!(matches!(err, LutError::DataNotFound { .. }));
    }
}

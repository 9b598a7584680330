//! Refractive index files read by the solver `mode N refrac file` directive.
//!
//! One line per wavelength: wavelength [um], real part, imaginary part. The solver expects
//! the opposite sign to the reference dataset for the imaginary part, so it is negated on
//! write.

use std::path::Path;

use crate::aerosol::RefractiveIndexTable;
use crate::error::LutError;
use crate::utils::{format_exp, format_fixed, write_atomically};

/// Writes one refractive index file. Column lengths are checked before anything touches
/// the disk.
pub fn write_refractive_index_file(
    path: &Path,
    wavelengths_um: &[f64],
    real: &[f64],
    imag: &[f64],
) -> Result<(), LutError> {
    let length = wavelengths_um.len();
    for (what, found) in [
        ("real refractive index", real.len()),
        ("imaginary refractive index", imag.len()),
    ] {
        if found != length {
            return Err(LutError::ShapeMismatch {
                what: format!("{} vs wavelength list", what),
                expected: length,
                found,
            });
        }
    }

    let contents: String = wavelengths_um
        .iter()
        .zip(real)
        .zip(imag)
        .map(|((wl, mr), mi)| {
            format!(
                "{} {} {}\n",
                format_exp(*wl, 3, 5),
                format_fixed(*mr, 7, 9),
                format_fixed(-mi, 7, 9)
            )
        })
        .collect();

    write_atomically(path, &contents)
}

pub fn write_table(path: &Path, table: &RefractiveIndexTable) -> Result<(), LutError> {
    write_refractive_index_file(path, &table.wavelengths_um, &table.real, &table.imag)
}

/// Reads a refractive index file back. The imaginary column is returned as written, i.e.
/// in the solver sign convention.
#[cfg(test)]
pub fn read_refractive_index_file(path: &Path) -> Result<RefractiveIndexTable, LutError> {
    let text = std::fs::read_to_string(path)?;

    let mut table = RefractiveIndexTable {
        wavelengths_um: Vec::new(),
        real: Vec::new(),
        imag: Vec::new(),
    };

    for (number, line) in text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        let columns: Vec<f64> = line
            .split_whitespace()
            .map(str::parse::<f64>)
            .collect::<Result<_, _>>()
            .map_err(|e| LutError::Layout {
                variable: path.display().to_string(),
                reason: format!("line {}: {}", number + 1, e),
            })?;

        let [wl, mr, mi] = columns[..] else {
            return Err(LutError::Layout {
                variable: path.display().to_string(),
                reason: format!("line {}: expected 3 columns, found {}", number + 1, columns.len()),
            });
        };

        table.wavelengths_um.push(wl);
        table.real.push(mr);
        table.imag.push(mi);
    }

    Ok(table)
}

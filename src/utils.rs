use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::LutError;

/// Writes `contents` to `path` through a temporary file in the same directory, so the
/// file appears complete or not at all. An existing file is replaced.
pub fn write_atomically(path: &Path, contents: &str) -> Result<(), LutError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| LutError::Io(e.error))?;

    Ok(())
}

fn sign(value: f64) -> &'static str {
    if value.is_sign_negative() { "-" } else { " " }
}

/// Scientific notation with a space for positive values and a signed two-digit exponent,
/// e.g. `format_exp(0.25, 3, 5)` gives `" 2.500e-01"`.
pub fn format_exp(value: f64, precision: usize, width: usize) -> String {
    let body = if value.is_finite() {
        let formatted = format!("{:.*e}", precision, value.abs());
        match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let exponent: i32 = exponent.parse().unwrap_or(0);
                format!(
                    "{}e{}{:02}",
                    mantissa,
                    if exponent < 0 { '-' } else { '+' },
                    exponent.abs()
                )
            }
            None => formatted,
        }
    } else {
        format!("{}", value.abs())
    };

    format!("{:>width$}", format!("{}{}", sign(value), body), width = width)
}

/// Fixed-point notation with a space for positive values, e.g. `" 1.5300000"`.
pub fn format_fixed(value: f64, precision: usize, width: usize) -> String {
    format!(
        "{:>width$}",
        format!("{}{:.*}", sign(value), precision, value.abs()),
        width = width
    )
}

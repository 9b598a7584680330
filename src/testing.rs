//! Fixtures shared by the unit tests: a small synthetic CAMS dataset and a stub solver.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LutError;
use crate::solver::runner::OpticalSolver;

pub const SPECIES: [&str; 2] = ["dust", "sulphate"];
pub const VERSIONS: [&str; 2] = ["48r1", "49r1"];
pub const HUMIDITIES: [f64; 3] = [0.0, 50.0, 90.0];
pub const WAVELENGTHS_NM: [f64; 4] = [400.0, 550.0, 700.0, 1000.0];

#[derive(Debug, Clone, Copy)]
pub enum FixtureField {
    RmodalFine,
    RmodalCoarse,
    LnvarFine,
    LnvarCoarse,
    MrFine,
    MrCoarse,
    MiFine,
    MiCoarse,
}

impl FixtureField {
    fn name(&self) -> &'static str {
        match self {
            FixtureField::RmodalFine => "rmodal_f",
            FixtureField::RmodalCoarse => "rmodal_c",
            FixtureField::LnvarFine => "lnvar_f",
            FixtureField::LnvarCoarse => "lnvar_c",
            FixtureField::MrFine => "mr_f",
            FixtureField::MrCoarse => "mr_c",
            FixtureField::MiFine => "mi_f",
            FixtureField::MiCoarse => "mi_c",
        }
    }
}

/// Fixture fields, linear in humidity and wavelength so bilinear interpolation is exact.
pub fn field_formula(field: FixtureField, species: usize, version: usize, rh: f64, wl: f64) -> f64 {
    let s = species as f64;
    let v = version as f64;
    match field {
        FixtureField::RmodalFine => 0.05 + 0.02 * s + 0.001 * v + 0.0005 * rh,
        FixtureField::RmodalCoarse => 0.8 + 0.3 * s + 0.01 * v + 0.004 * rh,
        FixtureField::LnvarFine => 0.6 + 0.05 * s + 0.002 * v + 0.001 * rh,
        FixtureField::LnvarCoarse => 0.7 + 0.04 * s + 0.003 * v + 0.0005 * rh,
        FixtureField::MrFine => 1.53 - 0.02 * s + 0.001 * v - 0.0015 * rh - 0.00005 * wl,
        FixtureField::MrCoarse => 1.56 - 0.03 * s + 0.002 * v - 0.001 * rh - 0.00004 * wl,
        FixtureField::MiFine => 0.008 + 0.002 * s + 0.0001 * v - 0.00005 * rh - 0.000002 * wl,
        FixtureField::MiCoarse => 0.004 + 0.001 * s + 0.0002 * v - 0.00002 * rh - 0.000001 * wl,
    }
}

/// Value stored in the fixture dataset at the given grid indices.
pub fn value(field: FixtureField, species: usize, version: usize, rh: usize, wl: usize) -> f64 {
    field_formula(field, species, version, HUMIDITIES[rh], WAVELENGTHS_NM[wl])
}

/// Writes the synthetic reference dataset.
///
/// Size fields are laid out (species, version, humidity) and refractive fields
/// (version, species, wavelength, humidity), so readers must go through dimension names.
pub fn write_reference_dataset(path: &Path) {
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("aerosols_species", SPECIES.len()).unwrap();
    file.add_dimension("cams_versions", VERSIONS.len()).unwrap();
    file.add_dimension("relative_humidity", HUMIDITIES.len()).unwrap();
    file.add_dimension("wavelength", WAVELENGTHS_NM.len()).unwrap();

    let mut var = file
        .add_string_variable("aerosols_species", &["aerosols_species"])
        .unwrap();
    for (i, species) in SPECIES.iter().enumerate() {
        var.put_string(species, [i]).unwrap();
    }

    let mut var = file
        .add_string_variable("cams_versions", &["cams_versions"])
        .unwrap();
    for (i, version) in VERSIONS.iter().enumerate() {
        var.put_string(version, [i]).unwrap();
    }

    let mut var = file
        .add_variable::<f64>("relative_humidity", &["relative_humidity"])
        .unwrap();
    var.put_values(&HUMIDITIES, ..).unwrap();

    let mut var = file.add_variable::<f64>("wavelength", &["wavelength"]).unwrap();
    var.put_values(&WAVELENGTHS_NM, ..).unwrap();

    for field in [
        FixtureField::RmodalFine,
        FixtureField::RmodalCoarse,
        FixtureField::LnvarFine,
        FixtureField::LnvarCoarse,
    ] {
        let mut values = Vec::new();
        for s in 0..SPECIES.len() {
            for v in 0..VERSIONS.len() {
                for h in 0..HUMIDITIES.len() {
                    values.push(value(field, s, v, h, 0));
                }
            }
        }
        let mut var = file
            .add_variable::<f64>(
                field.name(),
                &["aerosols_species", "cams_versions", "relative_humidity"],
            )
            .unwrap();
        var.put_values(&values, ..).unwrap();
    }

    for field in [
        FixtureField::MrFine,
        FixtureField::MrCoarse,
        FixtureField::MiFine,
        FixtureField::MiCoarse,
    ] {
        let mut values = Vec::new();
        for v in 0..VERSIONS.len() {
            for s in 0..SPECIES.len() {
                for w in 0..WAVELENGTHS_NM.len() {
                    for h in 0..HUMIDITIES.len() {
                        values.push(value(field, s, v, h, w));
                    }
                }
            }
        }
        let mut var = file
            .add_variable::<f64>(
                field.name(),
                &["cams_versions", "aerosols_species", "wavelength", "relative_humidity"],
            )
            .unwrap();
        var.put_values(&values, ..).unwrap();
    }
}

/// Synthetic phase function value, encoding the call, wavelength, Stokes and angle indices.
pub fn phase_value(call: usize, wl: usize, stokes: usize, theta: usize) -> f64 {
    1000.0 * call as f64 + 100.0 * wl as f64 + 10.0 * stokes as f64 + 0.01 * theta as f64
}

pub fn ext_value(call: usize, wl: usize) -> f64 {
    10.0 * (call + 1) as f64 + wl as f64
}

pub fn ssa_value(call: usize, wl: usize) -> f64 {
    0.99 - 0.01 * wl as f64 - 0.001 * call as f64
}

/// Angle axis produced by the stub solver; shifted by the call index when requested.
pub fn theta_axis(n_theta: usize, shift: f64) -> Vec<f64> {
    (0..n_theta)
        .map(|i| shift + 180.0 * i as f64 / (n_theta.max(2) - 1) as f64)
        .collect()
}

/// Writes a solver output file laid out (nreff, nlam, nphamat, ntheta).
pub fn write_solver_output(
    path: &Path,
    call: usize,
    n_wavelengths: usize,
    n_stokes: usize,
    theta: &[f64],
) {
    let n_theta = theta.len();
    let mut file = netcdf::create(path).unwrap();
    file.add_dimension("nreff", 1).unwrap();
    file.add_dimension("nlam", n_wavelengths).unwrap();
    file.add_dimension("nphamat", n_stokes).unwrap();
    file.add_dimension("ntheta", n_theta).unwrap();

    let mut phase = Vec::with_capacity(n_wavelengths * n_stokes * n_theta);
    let mut thetas = Vec::with_capacity(n_wavelengths * n_stokes * n_theta);
    for w in 0..n_wavelengths {
        for k in 0..n_stokes {
            for (t, angle) in theta.iter().enumerate() {
                phase.push(phase_value(call, w, k, t));
                thetas.push(*angle);
            }
        }
    }
    let ext: Vec<f64> = (0..n_wavelengths).map(|w| ext_value(call, w)).collect();
    let ssa: Vec<f64> = (0..n_wavelengths).map(|w| ssa_value(call, w)).collect();

    let dims4 = ["nreff", "nlam", "nphamat", "ntheta"];
    let mut var = file.add_variable::<f64>("theta", &dims4).unwrap();
    var.put_values(&thetas, ..).unwrap();
    let mut var = file.add_variable::<f64>("phase", &dims4).unwrap();
    var.put_values(&phase, ..).unwrap();
    let mut var = file.add_variable::<f64>("ext", &["nreff", "nlam"]).unwrap();
    var.put_values(&ext, ..).unwrap();
    let mut var = file.add_variable::<f64>("ssa", &["nreff", "nlam"]).unwrap();
    var.put_values(&ssa, ..).unwrap();
}

/// Directives of a deck that the stub solver needs.
#[derive(Debug, Clone)]
pub struct ParsedDeck {
    pub output: PathBuf,
    pub n_theta: usize,
    pub wavelengths_um: Vec<f64>,
    pub mode_lines: Vec<String>,
}

pub fn parse_deck(text: &str) -> ParsedDeck {
    let mut output = None;
    let mut n_theta = None;
    let mut wavelengths_um = Vec::new();
    let mut mode_lines = Vec::new();

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("output netcdf ") {
            output = Some(PathBuf::from(rest.trim_matches('\'')));
        } else if let Some(rest) = line.strip_prefix("output num_theta ") {
            n_theta = Some(rest.trim().parse().unwrap());
        } else if let Some(rest) = line.strip_prefix("wavelength list ") {
            wavelengths_um = rest.split_whitespace().map(|w| w.parse().unwrap()).collect();
        } else if line.starts_with("mode ") {
            mode_lines.push(line.to_string());
        }
    }

    ParsedDeck {
        output: output.expect("deck has no output directive"),
        n_theta: n_theta.expect("deck has no num_theta directive"),
        wavelengths_um,
        mode_lines,
    }
}

/// Solver stand-in that reads the deck and writes a synthetic output file.
#[derive(Debug, Default)]
pub struct StubSolver {
    pub calls: Cell<usize>,
    pub decks: RefCell<Vec<String>>,
    /// Shift the angle axis by the call index, to observe which axis ends up in the LUT.
    pub shift_theta: bool,
    /// Number of Stokes components written, 6 when left at 0.
    pub stokes: usize,
    /// Fail on this call index.
    pub fail_on: Option<usize>,
}

impl OpticalSolver for StubSolver {
    fn run(&self, deck: &Path) -> Result<(), LutError> {
        let call = self.calls.get();
        self.calls.set(call + 1);

        if self.fail_on == Some(call) {
            return Err(LutError::SolverExecution {
                command: format!("stub {}", deck.display()),
                code: Some(1),
                stdout: String::new(),
                stderr: "stub failure".to_string(),
            });
        }

        let text = fs::read_to_string(deck)?;
        let parsed = parse_deck(&text);
        self.decks.borrow_mut().push(text);

        let shift = if self.shift_theta { call as f64 * 0.5 } else { 0.0 };
        let stokes = if self.stokes == 0 { 6 } else { self.stokes };
        write_solver_output(
            &parsed.output,
            call,
            parsed.wavelengths_um.len(),
            stokes,
            &theta_axis(parsed.n_theta, shift),
        );

        Ok(())
    }
}

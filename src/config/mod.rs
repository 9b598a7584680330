use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod error;
pub use error::ConfigError;

pub mod extrapolation;
pub use extrapolation::Extrapolation;

pub mod scratch;
pub use scratch::ScratchLayout;

/// Environment variable holding the directory of the solver executable.
pub const SOLVER_PATH_ENV: &str = "MOPSMAP_PATH";
pub const SOLVER_EXECUTABLE: &str = "mopsmap";

pub const REFERENCE_DATASET: &str = "cams_optical_properties.nc";
pub const HYDROPHILICITY_FILE: &str = "aerosol_hydrophilicity.json";

/// Wavelength grid of the LUT [nm].
pub const DEFAULT_WAVELENGTHS_NM: [f64; 19] = [
    250.0, 300.0, 350.0, 400.0, 450.0, 500.0, 550.0, 600.0, 650.0, 700.0, 750.0, 800.0, 900.0,
    1000.0, 1250.0, 1500.0, 1750.0, 2000.0, 2250.0,
];

/// Relative humidity grid of the LUT [%].
pub const DEFAULT_HUMIDITIES: [f64; 12] = [
    0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 85.0, 90.0, 95.0,
];

#[derive(Debug, Clone)]
pub struct Config {
    data_directory: PathBuf,
    scratch_directory: PathBuf,
    output_directory: PathBuf,
    solver_directory: Option<PathBuf>,
    scatlib: String,
    water_refrac_file: String,
    cams_version: String,
    wavelengths_nm: Vec<f64>,
    humidities: Vec<f64>,
    n_theta: usize,
    poll_interval: Duration,
    timeout: Duration,
    extrapolation: Extrapolation,
    scratch_layout: ScratchLayout,
    provenance: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("./data"),
            scratch_directory: PathBuf::from("./tmp"),
            output_directory: PathBuf::from("./out"),
            solver_directory: None,
            scatlib: "/opt/mopsmap/optical_dataset".to_string(),
            water_refrac_file: "/opt/mopsmap/data/refr_water_segelstein".to_string(),
            cams_version: "49r1".to_string(),
            wavelengths_nm: DEFAULT_WAVELENGTHS_NM.to_vec(),
            humidities: DEFAULT_HUMIDITIES.to_vec(),
            n_theta: 2000,
            poll_interval: Duration::from_millis(100),
            timeout: Duration::from_secs(600),
            extrapolation: Extrapolation::Error,
            scratch_layout: ScratchLayout::Fixed,
            provenance: "Created using MOPSMAP v1.0.".to_string(),
        }
    }
}

// Deserializes a Config from a partial JSON document: missing keys take the default values and
// the grids and polling settings are validated.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ConfigHelper {
            data_directory: Option<PathBuf>,
            scratch_directory: Option<PathBuf>,
            output_directory: Option<PathBuf>,
            solver_directory: Option<PathBuf>,
            scatlib: Option<String>,
            water_refrac_file: Option<String>,
            cams_version: Option<String>,
            wavelengths_nm: Option<Vec<f64>>,
            humidities: Option<Vec<f64>>,
            n_theta: Option<usize>,
            poll_interval_ms: Option<u64>,
            timeout_s: Option<u64>,
            extrapolation: Option<Extrapolation>,
            scratch_layout: Option<ScratchLayout>,
            provenance: Option<String>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = Config::default();

        let poll_interval = match helper.poll_interval_ms {
            Some(0) => return Err(D::Error::custom(ConfigError::Polling)),
            Some(ms) => Duration::from_millis(ms),
            None => defaults.poll_interval,
        };

        let timeout = match helper.timeout_s {
            Some(0) => return Err(D::Error::custom(ConfigError::Polling)),
            Some(s) => Duration::from_secs(s),
            None => defaults.timeout,
        };

        let config = Config {
            data_directory: helper.data_directory.unwrap_or(defaults.data_directory),
            scratch_directory: helper
                .scratch_directory
                .unwrap_or(defaults.scratch_directory),
            output_directory: helper.output_directory.unwrap_or(defaults.output_directory),
            solver_directory: helper.solver_directory,
            scatlib: helper.scatlib.unwrap_or(defaults.scatlib),
            water_refrac_file: helper
                .water_refrac_file
                .unwrap_or(defaults.water_refrac_file),
            cams_version: helper.cams_version.unwrap_or(defaults.cams_version),
            wavelengths_nm: helper.wavelengths_nm.unwrap_or(defaults.wavelengths_nm),
            humidities: helper.humidities.unwrap_or(defaults.humidities),
            n_theta: helper.n_theta.unwrap_or(defaults.n_theta),
            poll_interval,
            timeout,
            extrapolation: helper.extrapolation.unwrap_or_default(),
            scratch_layout: helper.scratch_layout.unwrap_or_default(),
            provenance: helper.provenance.unwrap_or(defaults.provenance),
        };

        config.validate().map_err(D::Error::custom)?;

        Ok(config)
    }
}

fn validate_grid(name: &'static str, grid: &[f64], min: f64, max: f64) -> Result<(), ConfigError> {
    if grid.is_empty() {
        return Err(ConfigError::EmptyGrid { name });
    }

    if let Some(&value) = grid.iter().find(|v| !(min..=max).contains(*v)) {
        return Err(ConfigError::GridValue {
            name,
            value,
            min,
            max,
        });
    }

    if grid.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ConfigError::UnsortedGrid { name });
    }

    Ok(())
}

/// Picks the solver executable, giving the environment precedence over the configuration.
pub fn resolve_solver_executable(
    env_dir: Option<String>,
    config_dir: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    match (env_dir, config_dir) {
        (Some(dir), _) if !dir.is_empty() => Ok(PathBuf::from(dir).join(SOLVER_EXECUTABLE)),
        (_, Some(dir)) => Ok(dir.join(SOLVER_EXECUTABLE)),
        _ => Err(ConfigError::SolverPath),
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_grid("wavelengths_nm", &self.wavelengths_nm, f64::MIN_POSITIVE, f64::MAX)?;
        validate_grid("humidities", &self.humidities, 0.0, 100.0)?;

        if self.n_theta == 0 {
            return Err(ConfigError::ThetaCount);
        }

        if self.poll_interval.is_zero() || self.timeout.is_zero() {
            return Err(ConfigError::Polling);
        }

        Ok(())
    }

    #[cfg(test)]
    pub fn with_directories(
        mut self,
        data_directory: impl Into<PathBuf>,
        scratch_directory: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
    ) -> Self {
        self.data_directory = data_directory.into();
        self.scratch_directory = scratch_directory.into();
        self.output_directory = output_directory.into();
        self
    }

    #[cfg(test)]
    pub fn with_polling(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub fn with_scratch_layout(mut self, scratch_layout: ScratchLayout) -> Self {
        self.scratch_layout = scratch_layout;
        self
    }

    pub fn reference_dataset(&self) -> PathBuf {
        self.data_directory.join(REFERENCE_DATASET)
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    pub fn scratch_directory(&self) -> &Path {
        &self.scratch_directory
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn solver_executable(&self) -> Result<PathBuf, ConfigError> {
        resolve_solver_executable(env::var(SOLVER_PATH_ENV).ok(), self.solver_directory.as_deref())
    }

    pub fn scatlib(&self) -> &str {
        &self.scatlib
    }

    pub fn water_refrac_file(&self) -> &str {
        &self.water_refrac_file
    }

    pub fn cams_version(&self) -> &str {
        &self.cams_version
    }

    pub fn wavelengths_nm(&self) -> &[f64] {
        &self.wavelengths_nm
    }

    pub fn humidities(&self) -> &[f64] {
        &self.humidities
    }

    pub fn n_theta(&self) -> usize {
        self.n_theta
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    pub fn scratch_layout(&self) -> ScratchLayout {
        self.scratch_layout
    }

    pub fn provenance(&self) -> &str {
        &self.provenance
    }
}

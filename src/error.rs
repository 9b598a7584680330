use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum LutError {
    #[error("Unable to open file: {}", path.display())]
    DataNotFound { path: PathBuf },

    #[error("Unable to find {kind} for key: {key}")]
    KeyLookup { kind: &'static str, key: String },

    #[error("{what}: expected {expected} values, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("{axis} = {value} is outside the reference grid [{min}, {max}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unexpected layout for variable '{variable}': {reason}")]
    Layout { variable: String, reason: String },

    #[error("Failed to launch solver `{command}`: {source}")]
    SolverLaunch {
        command: String,
        source: std::io::Error,
    },

    #[error("Solver `{command}` failed ({})", exit_status(*code))]
    SolverExecution {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Timed out after {waited:?} waiting for {}", path.display())]
    Timeout { path: PathBuf, waited: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("NetCDF error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub(crate) fn exit_status(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name} grid must not be empty")]
    EmptyGrid { name: &'static str },
    #[error("{name} grid must be strictly increasing")]
    UnsortedGrid { name: &'static str },
    #[error("{name} value {value} is outside [{min}, {max}]")]
    GridValue {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("n_theta must be greater than 0")]
    ThetaCount,
    #[error("poll_interval_ms and timeout_s must be greater than 0")]
    Polling,
    #[error("Solver location unknown: set MOPSMAP_PATH or solver_directory")]
    SolverPath,
}

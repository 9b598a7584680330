use serde::Deserialize;
use std::fmt;

/// What to do when a query falls outside the reference dataset grid.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    #[default]
    #[serde(rename(deserialize = "error"))]
    Error,
    #[serde(rename(deserialize = "clamp"))]
    Clamp,
}

impl fmt::Display for Extrapolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Extrapolation::Error => write!(f, "error"),
            Extrapolation::Clamp => write!(f, "clamp"),
        }
    }
}

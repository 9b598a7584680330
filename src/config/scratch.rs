use serde::Deserialize;

/// Naming of the solver scratch files.
///
/// `Fixed` reuses the same names for every humidity, so only the last
/// iteration's files remain after a sweep. `PerHumidity` suffixes each file
/// with the humidity value and keeps all of them.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScratchLayout {
    #[default]
    #[serde(rename(deserialize = "fixed"))]
    Fixed,
    #[serde(rename(deserialize = "per_humidity"))]
    PerHumidity,
}

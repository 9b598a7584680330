use std::fmt::Display;
use std::str::FromStr;

/// Aerosol species available in the CAMS optical properties dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    ZeroDeux,
    Sulfate,
    SeaSalt,
    Dust,
    BlackCarbon,
    Nitrate,
    Ammonium,
    OrganicMatter,
}

impl Species {
    pub const ALL: [Species; 8] = [
        Species::ZeroDeux,
        Species::Sulfate,
        Species::SeaSalt,
        Species::Dust,
        Species::BlackCarbon,
        Species::Nitrate,
        Species::Ammonium,
        Species::OrganicMatter,
    ];

    /// Key used in the reference dataset, the hydrophilicity table and output file names.
    pub fn key(&self) -> &'static str {
        match self {
            Species::ZeroDeux => "zerodeux",
            Species::Sulfate => "sulphate",
            Species::SeaSalt => "sea_salt",
            Species::Dust => "dust",
            Species::BlackCarbon => "black_carbon",
            Species::Nitrate => "nitrate",
            Species::Ammonium => "ammonium",
            Species::OrganicMatter => "organic_matter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Species::ZeroDeux => "Zero-deux (reference)",
            Species::Sulfate => "Sulfate (CAMS)",
            Species::SeaSalt => "Sea salt (CAMS)",
            Species::Dust => "Dust (CAMS)",
            Species::BlackCarbon => "Black carbon (CAMS)",
            Species::Nitrate => "Nitrate (CAMS)",
            Species::Ammonium => "Ammonium (CAMS)",
            Species::OrganicMatter => "Organic matter (CAMS)",
        }
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpecies(pub String);

impl Display for UnknownSpecies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown aerosol species: {}", self.0)
    }
}

impl std::error::Error for UnknownSpecies {}

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .iter()
            .copied()
            .find(|species| species.key() == s)
            .ok_or_else(|| UnknownSpecies(s.to_string()))
    }
}

/// Granulometry type: one log-normal mode, or distinct fine and coarse modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranuMode {
    MonoModal,
    BiModal,
}

impl Display for GranuMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GranuMode::MonoModal => write!(f, "mono-modal"),
            GranuMode::BiModal => write!(f, "bi-modal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownGranuMode(pub String);

impl Display for UnknownGranuMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown granulometry mode: {} (expected mono or bi)", self.0)
    }
}

impl std::error::Error for UnknownGranuMode {}

impl FromStr for GranuMode {
    type Err = UnknownGranuMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mono" | "mono_modal" => Ok(GranuMode::MonoModal),
            "bi" | "bi_modal" => Ok(GranuMode::BiModal),
            _ => Err(UnknownGranuMode(s.to_string())),
        }
    }
}

/// Log-normal size distribution parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormal {
    pub rm: f64,    // Modal radius [um]
    pub sigma: f64, // ln of the geometric standard deviation
}

/// Refractive index of one mode over the wavelength grid.
///
/// The imaginary part follows the reference dataset convention (non-negative
/// absorption); it is negated only when written for the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct RefractiveIndexTable {
    pub wavelengths_um: Vec<f64>,
    pub real: Vec<f64>,
    pub imag: Vec<f64>,
}

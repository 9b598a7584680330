pub mod hydrophilicity;
pub mod nc;
pub mod reference;
pub mod solver_output;

pub use hydrophilicity::read_aerosol_hydrophilicity;
pub use reference::ReferenceData;
pub use solver_output::{STOKES_COMPONENTS, SolverOutput};

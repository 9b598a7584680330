pub mod deck;
pub mod refrac;
pub mod runner;

pub use deck::DeckWriter;
pub use runner::{Mopsmap, OpticalSolver, SolverController};

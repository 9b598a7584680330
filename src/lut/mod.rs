pub mod assembler;
pub mod dataset;

pub use assembler::LutBuilder;

pub mod fs;
pub mod generator;
pub mod precondition;

mod mixer;
mod modulator;

pub use mixer::*;
pub use modulator::*;

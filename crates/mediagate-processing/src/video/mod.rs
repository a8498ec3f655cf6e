//! Video probing module

pub mod processor;

pub use processor::FfprobeProbe;

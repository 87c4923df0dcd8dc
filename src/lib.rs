mod core;
pub mod config;
pub mod message;
pub mod protocols;
pub mod report;
mod sampler;

pub use crate::core::{
    Gate, Measurement, MeasurementResult, QuantumChannel, QuantumState, errors, utils,
};
pub use crate::sampler::{SampleSummary, Sampler};

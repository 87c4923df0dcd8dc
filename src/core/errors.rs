use num_complex::Complex64;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    #[error("Matrix is not Unitary (U†U != I)")]
    NonUnitary,

    #[error("Gate must be a 2x2 single-qubit matrix, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("Measurement must have at least one operator")]
    Empty,

    #[error("Measurement operators do not sum to Identity (Completeness relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions: operators must be 2x2")]
    InvalidDimensions,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Trace is not unity: {0}")]
    InvalidTrace(Complex64),

    #[error("Outcome {index} has zero probability")]
    ImpossibleOutcome { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChannelError {
    #[error("Channel must have at least one Kraus operator")]
    Empty,

    #[error("Kraus operators do not sum to Identity (Trace preserving relation failed)")]
    NotComplete,

    #[error("Invalid operator dimensions: Kraus operators must be 2x2")]
    InvalidDimensions,

    #[error("Invalid probability: {0}. Must be between 0.0 and 1.0")]
    InvalidProbability(f64),
}

/// Errors raised by the key agreement pipeline and the message cipher.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QkdError {
    #[error("Invalid length {len}: {reason}")]
    InvalidLength { len: usize, reason: &'static str },

    #[error("Length mismatch: expected {expected} entries, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Unsupported character {ch:?} at position {position}")]
    UnsupportedCharacter { ch: char, position: usize },

    #[error("Key too short: {key_len} key bits for {data_len} data bits")]
    KeyTooShort { key_len: usize, data_len: usize },

    #[error("Invalid symbol {0:?}")]
    InvalidSymbol(char),

    #[error("Invalid codec prefix {0:#05b}: must fit in 3 bits")]
    InvalidPrefix(u8),

    #[error("Quantum state error: {0}")]
    State(#[from] StateError),
}

impl QkdError {
    /// Checks that `got` has the `expected` length.
    pub(crate) fn check_len(expected: usize, got: usize) -> Result<(), QkdError> {
        if expected != got {
            return Err(QkdError::LengthMismatch { expected, got });
        }
        Ok(())
    }
}

//! Quantum Cryptography Protocols.
//!
//! Currently the BB84 key distribution protocol and its eavesdropper check.

pub mod qkd;
pub use qkd::bb84;

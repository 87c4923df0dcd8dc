//! BB84 Quantum Key Distribution.
//!
//! The protocol is split into its stages so each can be driven on its own:
//! - **generator**: random sender bits and bases for every party.
//! - **channel**: photon transmission, with or without an intercept-resend eavesdropper.
//! - **sifting**: basis reconciliation and key extraction.
//! - **detector**: eavesdropper detection from the agreement rate.
//! - **bb84**: the whole run end to end, plus the message exchange.

pub mod basis;
pub mod bb84;
pub mod channel;
pub mod detector;
pub mod generator;
pub mod sifting;

pub use basis::{Basis, format_bases, format_bits, parse_bases, parse_bits};
pub use bb84::{Bb84, Bb84Outcome, Exchange};
pub use channel::{OpticalLink, simulate_with_eve, simulate_without_eve};
pub use detector::{DetectionReport, Detector, Verdict, detect};
pub use generator::{EavesdropperBases, RoundSetup, generate, generate_with_eve};
pub use sifting::{Reconciliation, extract_key, reconcile};

//! Quantum channel between sender and receiver.
//!
//! Every round prepares a real single-qubit state and measures it, so the
//! collapse rule falls out of the qubit model:
//! - same basis on both ends: the outcome equals the prepared bit;
//! - different bases: the outcome is a fair coin.

use super::basis::Basis;
use crate::errors::QkdError;
use crate::{QuantumChannel, QuantumState};
use rand::Rng;
use tracing::debug;

/// Photon link, optionally disturbed by a noise channel.
#[derive(Debug, Clone, Default)]
pub struct OpticalLink {
    /// Noise applied to every photon in flight. `None` is a perfect link.
    pub noise: Option<QuantumChannel>,
}

impl OpticalLink {
    /// A perfect link.
    pub fn new() -> Self {
        Self { noise: None }
    }

    /// Adds noise to the link
    pub fn with_noise(mut self, channel: QuantumChannel) -> Self {
        self.noise = Some(channel);
        self
    }

    /// Sends one photon prepared as `bit` in `prepared` and reads it in `measured`.
    fn send_photon<R: Rng + ?Sized>(
        &self,
        bit: bool,
        prepared: Basis,
        measured: Basis,
        rng: &mut R,
    ) -> Result<bool, QkdError> {
        let mut photon: QuantumState = prepared.prepare(bit);

        if let Some(chan) = &self.noise {
            photon.apply_channel(chan);
        }

        let res = photon.measure(&measured.measurement(), rng)?;
        Ok(res.bit())
    }

    /// Sends every sender bit straight to the receiver and returns what the receiver reads.
    pub fn transmit<R: Rng + ?Sized>(
        &self,
        sender_basis: &[Basis],
        sender_bits: &[bool],
        receiver_basis: &[Basis],
        rng: &mut R,
    ) -> Result<Vec<bool>, QkdError> {
        let n = check_lengths(sender_bits, &[sender_basis, receiver_basis])?;

        let mut receiver_bits = Vec::with_capacity(n);
        for i in 0..n {
            receiver_bits.push(self.send_photon(
                sender_bits[i],
                sender_basis[i],
                receiver_basis[i],
                rng,
            )?);
        }

        debug!(rounds = n, noisy = self.noise.is_some(), "photons received");
        Ok(receiver_bits)
    }

    /// Intercept-resend attack.
    ///
    /// Eve reads each photon in `eve_incident`, then prepares a fresh photon
    /// with what she read in `eve_transmitted` and forwards it. The receiver
    /// reads the forwarded photon. Returns `(receiver_bits, eve_bits)`.
    pub fn transmit_intercepted<R: Rng + ?Sized>(
        &self,
        sender_basis: &[Basis],
        sender_bits: &[bool],
        receiver_basis: &[Basis],
        eve_incident: &[Basis],
        eve_transmitted: &[Basis],
        rng: &mut R,
    ) -> Result<(Vec<bool>, Vec<bool>), QkdError> {
        let n = check_lengths(
            sender_bits,
            &[sender_basis, receiver_basis, eve_incident, eve_transmitted],
        )?;

        let mut eve_bits = Vec::with_capacity(n);
        for i in 0..n {
            eve_bits.push(self.send_photon(sender_bits[i], sender_basis[i], eve_incident[i], rng)?);
        }

        let mut receiver_bits = Vec::with_capacity(n);
        for i in 0..n {
            receiver_bits.push(self.send_photon(
                eve_bits[i],
                eve_transmitted[i],
                receiver_basis[i],
                rng,
            )?);
        }

        debug!(rounds = n, noisy = self.noise.is_some(), "photons intercepted and resent");
        Ok((receiver_bits, eve_bits))
    }
}

/// All sequences must share the bit sequence's non-zero length.
fn check_lengths(bits: &[bool], bases: &[&[Basis]]) -> Result<usize, QkdError> {
    let n = bits.len();
    for seq in bases {
        QkdError::check_len(n, seq.len())?;
    }
    if n == 0 {
        return Err(QkdError::InvalidLength {
            len: 0,
            reason: "nothing to transmit",
        });
    }
    Ok(n)
}

/// Receiver bits over a perfect link with no eavesdropper.
pub fn simulate_without_eve<R: Rng + ?Sized>(
    sender_basis: &[Basis],
    sender_bits: &[bool],
    receiver_basis: &[Basis],
    rng: &mut R,
) -> Result<Vec<bool>, QkdError> {
    OpticalLink::new().transmit(sender_basis, sender_bits, receiver_basis, rng)
}

/// Receiver and eavesdropper bits over a perfect link with an intercept-resend eavesdropper.
pub fn simulate_with_eve<R: Rng + ?Sized>(
    sender_basis: &[Basis],
    sender_bits: &[bool],
    receiver_basis: &[Basis],
    eve_incident: &[Basis],
    eve_transmitted: &[Basis],
    rng: &mut R,
) -> Result<(Vec<bool>, Vec<bool>), QkdError> {
    OpticalLink::new().transmit_intercepted(
        sender_basis,
        sender_bits,
        receiver_basis,
        eve_incident,
        eve_transmitted,
        rng,
    )
}

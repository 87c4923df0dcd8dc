//! Full BB84 run: bases and bits, transmission, sifting, detection, and the
//! message exchange over the resulting key.

use super::channel::OpticalLink;
use super::detector::{DetectionReport, Detector};
use super::generator::{self, RoundSetup};
use super::sifting::{Reconciliation, extract_key, reconcile};
use crate::config::{ConfigError, QkdConfig};
use crate::errors::QkdError;
use crate::message::{MessageCodec, xor_decrypt, xor_encrypt};
use crate::report::{MessageStage, Reporter};
use rand::Rng;
use tracing::{debug, info};

/// BB84 results
#[derive(Debug, Clone)]
pub struct Bb84Outcome {
    pub setup: RoundSetup,
    pub receiver_bits: Vec<bool>,
    /// What the eavesdropper read, if there was one.
    pub eve_bits: Option<Vec<bool>>,
    pub reconciliation: Reconciliation,
    /// Sender bits at matched rounds.
    pub sender_key: Vec<bool>,
    /// Receiver bits at matched rounds. This is the key used for encryption.
    pub receiver_key: Vec<bool>,
    pub detection: DetectionReport,
}

impl Bb84Outcome {
    /// Whether both ends hold the same key.
    pub fn keys_match(&self) -> bool {
        self.sender_key == self.receiver_key
    }

    /// Quantum bit error rate over the matched rounds, in percent.
    pub fn qber(&self) -> f64 {
        let compared = self.reconciliation.total_compared();
        if compared > 0 {
            (self.reconciliation.disagree_count as f64 / compared as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Bits at every stage of a message exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub plain_bits: Vec<bool>,
    pub encrypted_bits: Vec<bool>,
    pub decrypted_bits: Vec<bool>,
    pub text: String,
}

/// Protocol driver holding the link, the detector and the codec.
#[derive(Debug, Clone, Default)]
pub struct Bb84 {
    pub link: OpticalLink,
    pub detector: Detector,
    pub codec: MessageCodec,
}

impl Bb84 {
    pub fn from_config(config: &QkdConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut link = OpticalLink::new();
        if let Some(noise) = &config.noise {
            link = link.with_noise(noise.channel()?);
        }

        Ok(Self {
            link,
            detector: Detector::new(config.band),
            codec: config.codec.build()?,
        })
    }

    /// Runs `rounds` photons through the link, with an intercept-resend
    /// eavesdropper if `eavesdropper` is set.
    pub fn run<R: Rng + ?Sized>(
        &self,
        rounds: usize,
        eavesdropper: bool,
        rng: &mut R,
        reporter: &mut dyn Reporter,
    ) -> Result<Bb84Outcome, QkdError> {
        let setup = if eavesdropper {
            generator::generate_with_eve(rounds, rng)?
        } else {
            generator::generate(rounds, rng)?
        };
        reporter.generated(&setup);

        let (receiver_bits, eve_bits) = match &setup.eve {
            Some(eve) => {
                let (bob, eve_bits) = self.link.transmit_intercepted(
                    &setup.sender_basis,
                    &setup.sender_bits,
                    &setup.receiver_basis,
                    &eve.incident,
                    &eve.transmitted,
                    rng,
                )?;
                (bob, Some(eve_bits))
            }
            None => {
                let bob = self.link.transmit(
                    &setup.sender_basis,
                    &setup.sender_bits,
                    &setup.receiver_basis,
                    rng,
                )?;
                (bob, None)
            }
        };

        self.evaluate(setup, receiver_bits, eve_bits, reporter)
    }

    /// Sifts and checks receiver bits that were obtained elsewhere, e.g. from
    /// a bench experiment using the same bases.
    pub fn evaluate(
        &self,
        setup: RoundSetup,
        receiver_bits: Vec<bool>,
        eve_bits: Option<Vec<bool>>,
        reporter: &mut dyn Reporter,
    ) -> Result<Bb84Outcome, QkdError> {
        reporter.transmitted(&receiver_bits, eve_bits.as_deref());

        let reconciliation = reconcile(
            &setup.sender_basis,
            &setup.sender_bits,
            &setup.receiver_basis,
            &receiver_bits,
        )?;
        let receiver_key = extract_key(&setup.sender_basis, &setup.receiver_basis, &receiver_bits)?;
        let sender_key = extract_key(
            &setup.sender_basis,
            &setup.receiver_basis,
            &setup.sender_bits,
        )?;
        reporter.reconciled(&reconciliation, &receiver_key);

        let detection = self.detector.classify(&reconciliation);
        reporter.detected(&detection);

        let outcome = Bb84Outcome {
            setup,
            receiver_bits,
            eve_bits,
            reconciliation,
            sender_key,
            receiver_key,
            detection,
        };

        info!(
            rounds = outcome.setup.rounds(),
            key_len = outcome.receiver_key.len(),
            keys_match = outcome.keys_match(),
            qber = outcome.qber(),
            "bb84 run complete"
        );
        Ok(outcome)
    }

    /// Sender side: encode `text` and encrypt it with `sender_key`.
    /// Returns `(plain_bits, encrypted_bits)`.
    pub fn send(
        &self,
        text: &str,
        sender_key: &[bool],
        reporter: &mut dyn Reporter,
    ) -> Result<(Vec<bool>, Vec<bool>), QkdError> {
        let plain_bits = self.codec.encode(text)?;
        reporter.message_stage(MessageStage::Plain, &plain_bits);

        let encrypted_bits = xor_encrypt(&plain_bits, sender_key)?;
        reporter.message_stage(MessageStage::Encrypted, &encrypted_bits);

        debug!(bits = encrypted_bits.len(), "message encrypted");
        Ok((plain_bits, encrypted_bits))
    }

    /// Receiver side: decrypt with `receiver_key` and decode.
    pub fn receive(
        &self,
        encrypted_bits: &[bool],
        receiver_key: &[bool],
        reporter: &mut dyn Reporter,
    ) -> Result<(Vec<bool>, String), QkdError> {
        let decrypted_bits = xor_decrypt(encrypted_bits, receiver_key)?;
        reporter.message_stage(MessageStage::Decrypted, &decrypted_bits);

        let text = self.codec.decode(&decrypted_bits)?;
        debug!(chars = text.chars().count(), "message decrypted");
        Ok((decrypted_bits, text))
    }

    /// Sends `text` from one key holder to the other.
    pub fn exchange(
        &self,
        text: &str,
        sender_key: &[bool],
        receiver_key: &[bool],
        reporter: &mut dyn Reporter,
    ) -> Result<Exchange, QkdError> {
        let (plain_bits, encrypted_bits) = self.send(text, sender_key, reporter)?;
        let (decrypted_bits, text) = self.receive(&encrypted_bits, receiver_key, reporter)?;

        Ok(Exchange {
            plain_bits,
            encrypted_bits,
            decrypted_bits,
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NoiseConfig, NoiseKind};
    use crate::report::{NoopReporter, Transcript};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn clean_run_agrees_on_key() {
        let mut rng = StdRng::seed_from_u64(21);
        let outcome = Bb84::default()
            .run(200, false, &mut rng, &mut NoopReporter)
            .unwrap();

        assert!(outcome.keys_match());
        assert_eq!(outcome.qber(), 0.0);
        assert_eq!(
            outcome.receiver_key.len(),
            outcome.reconciliation.total_compared()
        );
        assert!(outcome.eve_bits.is_none());
        assert!(outcome.detection.is_safe());
    }

    #[test]
    fn reporter_sees_every_stage_in_order() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut transcript = Transcript::default();
        let bb84 = Bb84::default();
        let outcome = bb84.run(60, false, &mut rng, &mut transcript).unwrap();
        bb84.exchange("HI", &outcome.sender_key, &outcome.receiver_key, &mut transcript)
            .unwrap();

        assert_eq!(
            transcript.stages,
            vec![
                "generated",
                "transmitted",
                "reconciled",
                "detected",
                "message",
                "message",
                "message"
            ]
        );
        let stages: Vec<MessageStage> = transcript.messages.iter().map(|(s, _)| *s).collect();
        assert_eq!(
            stages,
            vec![
                MessageStage::Plain,
                MessageStage::Encrypted,
                MessageStage::Decrypted
            ]
        );
    }

    #[test]
    fn exchange_recovers_text() {
        let mut rng = StdRng::seed_from_u64(23);
        let bb84 = Bb84::default();
        let outcome = bb84.run(400, false, &mut rng, &mut NoopReporter).unwrap();
        let exchange = bb84
            .exchange(
                "QUANTUM",
                &outcome.sender_key,
                &outcome.receiver_key,
                &mut NoopReporter,
            )
            .unwrap();
        assert_eq!(exchange.text, "QUANTUM");
        assert_eq!(exchange.plain_bits, exchange.decrypted_bits);
        assert_ne!(exchange.plain_bits, exchange.encrypted_bits);
    }

    #[test]
    fn short_key_fails_exchange() {
        let bb84 = Bb84::default();
        let key = vec![true; 4];
        assert!(matches!(
            bb84.exchange("EM", &key, &key, &mut NoopReporter),
            Err(QkdError::KeyTooShort {
                key_len: 4,
                data_len: 10
            })
        ));
    }

    #[test]
    fn intercepted_run_reports_eve_bits() {
        let mut rng = StdRng::seed_from_u64(24);
        let outcome = Bb84::default()
            .run(2000, true, &mut rng, &mut NoopReporter)
            .unwrap();
        assert_eq!(outcome.eve_bits.as_ref().map(Vec::len), Some(2000));
        assert!(!outcome.keys_match());
        assert!(outcome.qber() > 10.0);
        assert!(!outcome.detection.is_safe());
    }

    #[test]
    fn noisy_link_from_config() {
        let config = QkdConfig {
            noise: Some(NoiseConfig {
                kind: NoiseKind::BitFlip,
                probability: 1.0,
            }),
            ..QkdConfig::default()
        };
        let bb84 = Bb84::from_config(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(25);
        let outcome = bb84.run(300, false, &mut rng, &mut NoopReporter).unwrap();
        // Rectilinear rounds are always flipped, diagonal ones never.
        assert!(!outcome.keys_match());
        assert!(outcome.reconciliation.disagree_count > 0);
    }

    #[test]
    fn zero_rounds_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            Bb84::default().run(0, false, &mut rng, &mut NoopReporter),
            Err(QkdError::InvalidLength { .. })
        ));
    }
}

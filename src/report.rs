//! Hooks for observing a protocol run stage by stage.

use crate::protocols::qkd::{DetectionReport, Reconciliation, RoundSetup};

/// Points in the message pipeline where bits are exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStage {
    /// Encoded plaintext.
    Plain,
    /// After XOR with the sender's key.
    Encrypted,
    /// After XOR with the receiver's key.
    Decrypted,
}

/// Receives intermediate values of a run. Every hook defaults to a no-op.
pub trait Reporter {
    fn generated(&mut self, _setup: &RoundSetup) {}

    fn transmitted(&mut self, _receiver_bits: &[bool], _eve_bits: Option<&[bool]>) {}

    fn reconciled(&mut self, _reconciliation: &Reconciliation, _key: &[bool]) {}

    fn detected(&mut self, _report: &DetectionReport) {}

    fn message_stage(&mut self, _stage: MessageStage, _bits: &[bool]) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}

/// Stage names in the order they were reported, plus message bits per stage.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    pub stages: Vec<&'static str>,
    pub messages: Vec<(MessageStage, Vec<bool>)>,
}

impl Reporter for Transcript {
    fn generated(&mut self, _setup: &RoundSetup) {
        self.stages.push("generated");
    }

    fn transmitted(&mut self, _receiver_bits: &[bool], _eve_bits: Option<&[bool]>) {
        self.stages.push("transmitted");
    }

    fn reconciled(&mut self, _reconciliation: &Reconciliation, _key: &[bool]) {
        self.stages.push("reconciled");
    }

    fn detected(&mut self, _report: &DetectionReport) {
        self.stages.push("detected");
    }

    fn message_stage(&mut self, stage: MessageStage, bits: &[bool]) {
        self.stages.push("message");
        self.messages.push((stage, bits.to_vec()));
    }
}

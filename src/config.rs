//! Run configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! rounds = 18
//!
//! [band]
//! lower = 0.15
//! upper = 0.40
//!
//! [codec]
//! prefix = 2
//!
//! [noise]
//! kind = "depolarizing"
//! probability = 0.05
//! ```

use crate::QuantumChannel;
use crate::errors::ChannelError;
use crate::message::codec::{MessageCodec, UPPERCASE_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_ROUNDS: usize = 18;
pub const DEFAULT_LOWER_BOUND: f64 = 0.15;
pub const DEFAULT_UPPER_BOUND: f64 = 0.40;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid acceptance band [{lower}, {upper}]: bounds must satisfy 0 <= lower <= upper <= 1")]
    InvalidBand { lower: f64, upper: f64 },

    #[error("Invalid codec prefix {0:#05b}: must fit in 3 bits")]
    InvalidPrefix(u8),

    #[error("Round count must be at least 1")]
    InvalidRounds,

    #[error("Invalid noise: {0}")]
    Noise(#[from] ChannelError),

    #[error("Could not parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Could not read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Inclusive range of agreement rates that indicate an eavesdropper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceBand {
    pub lower: f64,
    pub upper: f64,
}

impl Default for AcceptanceBand {
    fn default() -> Self {
        Self {
            lower: DEFAULT_LOWER_BOUND,
            upper: DEFAULT_UPPER_BOUND,
        }
    }
}

impl AcceptanceBand {
    pub fn new(lower: f64, upper: f64) -> Result<Self, ConfigError> {
        let band = Self { lower, upper };
        band.validate()?;
        Ok(band)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = 0.0 <= self.lower && self.lower <= self.upper && self.upper <= 1.0;
        if !ordered {
            return Err(ConfigError::InvalidBand {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }

    /// `lower <= rate <= upper`
    pub fn contains(&self, rate: f64) -> bool {
        rate >= self.lower && rate <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Three high bits shared by every supported character.
    pub prefix: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            prefix: UPPERCASE_PREFIX,
        }
    }
}

impl CodecConfig {
    pub fn build(&self) -> Result<MessageCodec, ConfigError> {
        MessageCodec::new(self.prefix).map_err(|_| ConfigError::InvalidPrefix(self.prefix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseKind {
    BitFlip,
    PhaseFlip,
    Depolarizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseConfig {
    pub kind: NoiseKind,
    pub probability: f64,
}

impl NoiseConfig {
    pub fn channel(&self) -> Result<QuantumChannel, ChannelError> {
        match self.kind {
            NoiseKind::BitFlip => QuantumChannel::bit_flip(self.probability),
            NoiseKind::PhaseFlip => QuantumChannel::phase_flip(self.probability),
            NoiseKind::Depolarizing => QuantumChannel::depolarizing(self.probability),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QkdConfig {
    pub rounds: usize,
    pub band: AcceptanceBand,
    pub codec: CodecConfig,
    pub noise: Option<NoiseConfig>,
}

impl Default for QkdConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            band: AcceptanceBand::default(),
            codec: CodecConfig::default(),
            noise: None,
        }
    }
}

impl QkdConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: QkdConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rounds == 0 {
            return Err(ConfigError::InvalidRounds);
        }
        self.band.validate()?;
        self.codec.build()?;
        if let Some(noise) = &self.noise {
            noise.channel()?;
        }
        Ok(())
    }
}

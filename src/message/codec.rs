//! Five-bit letter codec.
//!
//! Every supported character has the same three high bits in its 8-bit code,
//! so only the low five bits travel. The prefix is reinserted on decode.

use crate::errors::QkdError;
use tracing::debug;

/// Bits sent per character.
pub const BITS_PER_CHAR: usize = 5;
/// `010xxxxx`: `@`, `A`..`Z`, `[`, `\`, `]`, `^`, `_`.
pub const UPPERCASE_PREFIX: u8 = 0b010;
/// `011xxxxx`: `` ` ``, `a`..`z`, `{`, `|`, `}`, `~`, DEL.
pub const LOWERCASE_PREFIX: u8 = 0b011;

const LOW_MASK: u8 = 0b1_1111;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCodec {
    prefix: u8,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self {
            prefix: UPPERCASE_PREFIX,
        }
    }
}

impl MessageCodec {
    /// Codec for characters whose code starts with the 3-bit `prefix`.
    pub fn new(prefix: u8) -> Result<Self, QkdError> {
        if prefix > 0b111 {
            return Err(QkdError::InvalidPrefix(prefix));
        }
        Ok(Self { prefix })
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Whether `ch` can be carried by this codec.
    pub fn supports(&self, ch: char) -> bool {
        u8::try_from(u32::from(ch)).is_ok_and(|code| code >> BITS_PER_CHAR == self.prefix)
    }

    /// Low five bits of every character, most significant bit first.
    pub fn encode(&self, text: &str) -> Result<Vec<bool>, QkdError> {
        let mut bits = Vec::with_capacity(text.len() * BITS_PER_CHAR);

        for (position, ch) in text.chars().enumerate() {
            if !self.supports(ch) {
                return Err(QkdError::UnsupportedCharacter { ch, position });
            }
            let code = u32::from(ch) as u8 & LOW_MASK;
            for shift in (0..BITS_PER_CHAR).rev() {
                bits.push((code >> shift) & 1 == 1);
            }
        }

        debug!(chars = text.chars().count(), bits = bits.len(), "encoded message");
        Ok(bits)
    }

    /// Groups of five bits back into characters.
    pub fn decode(&self, bits: &[bool]) -> Result<String, QkdError> {
        if bits.len() % BITS_PER_CHAR != 0 {
            return Err(QkdError::InvalidLength {
                len: bits.len(),
                reason: "message bits must be a multiple of 5",
            });
        }

        let text: String = bits
            .chunks_exact(BITS_PER_CHAR)
            .map(|group| {
                let low = group.iter().fold(0u8, |acc, &b| (acc << 1) | u8::from(b));
                char::from((self.prefix << BITS_PER_CHAR) | low)
            })
            .collect();

        debug!(bits = bits.len(), chars = text.chars().count(), "decoded message");
        Ok(text)
    }
}

/// Encodes with the uppercase prefix.
pub fn encode(text: &str) -> Result<Vec<bool>, QkdError> {
    MessageCodec::default().encode(text)
}

/// Decodes with the uppercase prefix.
pub fn decode(bits: &[bool]) -> Result<String, QkdError> {
    MessageCodec::default().decode(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::qkd::basis::{format_bits, parse_bits};

    #[test]
    fn em_encodes_to_two_groups() {
        let bits = encode("EM").unwrap();
        // E = 010_00101, M = 010_01101
        assert_eq!(format_bits(&bits), "0010101101");
        assert_eq!(decode(&bits).unwrap(), "EM");
    }

    #[test]
    fn empty_text() {
        assert!(encode("").unwrap().is_empty());
        assert_eq!(decode(&[]).unwrap(), "");
    }

    #[test]
    fn full_uppercase_alphabet() {
        let text = "@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_";
        let bits = encode(text).unwrap();
        assert_eq!(bits.len(), 32 * BITS_PER_CHAR);
        assert_eq!(decode(&bits).unwrap(), text);
    }

    #[test]
    fn rejects_characters_outside_prefix() {
        assert_eq!(
            encode("Ea").unwrap_err(),
            QkdError::UnsupportedCharacter { ch: 'a', position: 1 }
        );
        assert!(encode(" ").is_err());
        assert!(encode("É").is_err());
        assert!(encode("€").is_err());
    }

    #[test]
    fn lowercase_prefix() {
        let codec = MessageCodec::new(LOWERCASE_PREFIX).unwrap();
        let bits = codec.encode("em").unwrap();
        assert_eq!(bits, encode("EM").unwrap());
        assert_eq!(codec.decode(&bits).unwrap(), "em");
        assert!(!codec.supports('E'));
    }

    #[test]
    fn prefix_wider_than_three_bits_is_rejected() {
        assert_eq!(
            MessageCodec::new(0b1010).unwrap_err(),
            QkdError::InvalidPrefix(0b1010)
        );
        assert_eq!(MessageCodec::new(0b111).unwrap().prefix(), 0b111);
    }

    #[test]
    fn high_prefix_decodes_two_byte_characters() {
        // 110_00101 is U+00C5
        let codec = MessageCodec::new(0b110).unwrap();
        let text = codec.decode(&parse_bits("0010100101").unwrap()).unwrap();
        assert_eq!(text, "\u{c5}\u{c5}");
        assert_eq!(text.chars().count(), 2);
        assert_eq!(codec.encode(&text).unwrap().len(), 2 * BITS_PER_CHAR);
    }

    #[test]
    fn rejects_partial_group() {
        let bits = parse_bits("001010").unwrap();
        assert_eq!(
            decode(&bits).unwrap_err(),
            QkdError::InvalidLength {
                len: 6,
                reason: "message bits must be a multiple of 5"
            }
        );
    }
}

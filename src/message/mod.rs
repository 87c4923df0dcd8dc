//! Text message transport over a sifted key.
//!
//! - **codec**: text to 5-bit groups and back.
//! - **cipher**: XOR one-time pad over those bits.

pub mod cipher;
pub mod codec;

pub use cipher::{shorten_key, xor_decrypt, xor_encrypt};
pub use codec::{MessageCodec, decode, encode};

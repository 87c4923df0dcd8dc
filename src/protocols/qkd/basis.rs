//! Polarization bases and helpers to read/write basis and bit sequences.

use crate::errors::QkdError;
use crate::{Gate, Measurement, QuantumState};
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use std::fmt;
use std::str::FromStr;

/// Measurement/preparation basis of a polarized photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basis {
    /// `+`: 0° / 90° polarization (computational Z basis).
    Rectilinear,
    /// `x`: 45° / -45° polarization (Hadamard X basis).
    Diagonal,
}

impl Basis {
    pub fn symbol(self) -> char {
        match self {
            Basis::Rectilinear => '+',
            Basis::Diagonal => 'x',
        }
    }

    pub fn from_symbol(symbol: char) -> Result<Self, QkdError> {
        match symbol {
            '+' => Ok(Basis::Rectilinear),
            'x' | 'X' => Ok(Basis::Diagonal),
            other => Err(QkdError::InvalidSymbol(other)),
        }
    }

    /// Projective measurement reading a photon in this basis.
    pub fn measurement(self) -> Measurement {
        match self {
            Basis::Rectilinear => Measurement::z_basis(),
            Basis::Diagonal => Measurement::x_basis(),
        }
    }

    /// Prepares a photon encoding `bit` in this basis.
    pub fn prepare(self, bit: bool) -> QuantumState {
        let mut state = QuantumState::new();
        if bit {
            state.apply(&Gate::x());
        }
        if self == Basis::Diagonal {
            state.apply(&Gate::h());
        }
        state
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Basis {
    type Err = QkdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Basis::from_symbol(c),
            (Some(_), Some(extra)) => Err(QkdError::InvalidSymbol(extra)),
            (None, _) => Err(QkdError::InvalidLength {
                len: 0,
                reason: "empty basis symbol",
            }),
        }
    }
}

impl Distribution<Basis> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Basis {
        if rng.random_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }
}

/// Parses a basis sequence such as `"x+x++"`. Whitespace and commas are ignored.
pub fn parse_bases(s: &str) -> Result<Vec<Basis>, QkdError> {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(Basis::from_symbol)
        .collect()
}

/// Parses a bit sequence such as `"10011"`. Whitespace and commas are ignored.
pub fn parse_bits(s: &str) -> Result<Vec<bool>, QkdError> {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(QkdError::InvalidSymbol(other)),
        })
        .collect()
}

/// Renders bits as a compact `0`/`1` string.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Renders bases as a compact `+`/`x` string.
pub fn format_bases(bases: &[Basis]) -> String {
    bases.iter().map(|b| b.symbol()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn symbols_round_trip() {
        let bases = parse_bases("x, x, +, x").unwrap();
        assert_eq!(
            bases,
            vec![
                Basis::Diagonal,
                Basis::Diagonal,
                Basis::Rectilinear,
                Basis::Diagonal
            ]
        );
        assert_eq!(format_bases(&bases), "xx+x");
        assert_eq!("+".parse::<Basis>().unwrap(), Basis::Rectilinear);
    }

    #[test]
    fn rejects_unknown_symbols() {
        assert_eq!(parse_bases("+-").unwrap_err(), QkdError::InvalidSymbol('-'));
        assert_eq!(parse_bits("102").unwrap_err(), QkdError::InvalidSymbol('2'));
        assert!("++".parse::<Basis>().is_err());
    }

    #[test]
    fn bits_format() {
        let bits = parse_bits("1 0 0 1").unwrap();
        assert_eq!(bits, vec![true, false, false, true]);
        assert_eq!(format_bits(&bits), "1001");
    }

    #[test]
    fn prepared_photon_reads_back_in_its_basis() {
        let mut rng = StdRng::seed_from_u64(42);
        for basis in [Basis::Rectilinear, Basis::Diagonal] {
            for bit in [false, true] {
                let mut photon = basis.prepare(bit);
                let res = photon.measure(&basis.measurement(), &mut rng).unwrap();
                assert_eq!(res.bit(), bit);
            }
        }
    }

    #[test]
    fn both_bases_are_drawn() {
        let mut rng = StdRng::seed_from_u64(1);
        let draws: Vec<Basis> = (0..64).map(|_| rng.random()).collect();
        assert!(draws.contains(&Basis::Rectilinear));
        assert!(draws.contains(&Basis::Diagonal));
    }
}

//! Occupancy bitmap for one line.

use std::fmt;
use std::str::FromStr;

use super::arrival::Arrival;

const OCCUPIED: char = '*';
const EMPTY: char = '_';

/// Error returned when parsing a rendered position string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized character {ch:?} at index {index}")]
pub struct PositionParseError {
    pub index: usize,
    pub ch: char,
}

/// Which station slots and inter-station segments hold a train.
///
/// For a line of `n` stations the bitmap has `2n - 1` slots: even index `2i`
/// is station `i`, odd index `2i - 1` is the track between stations `i - 1`
/// and `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Position(Vec<bool>);

impl Position {
    /// An all-empty bitmap with `len` slots.
    pub fn empty(len: usize) -> Self {
        Self(vec![false; len])
    }

    /// Infer train positions from per-station countdowns in line order.
    ///
    /// - countdown 0: train at the platform
    /// - countdown 1: train between the previous station and this one
    /// - otherwise, a previous countdown at least as large as this one means
    ///   a train has just passed between them
    ///
    /// Unknown countdowns leave their slots untouched.
    pub fn infer(arrivals: &[Arrival]) -> Self {
        let mut pos = vec![false; (arrivals.len() * 2).saturating_sub(1)];

        for (i, arrival) in arrivals.iter().enumerate() {
            if !arrival.is_known() {
                continue;
            }

            if arrival.next == Arrival::ARRIVED {
                pos[i * 2] = true;
            } else if i == 0 {
                // nothing before the first station
            } else if arrival.next == 1 {
                pos[i * 2 - 1] = true;
            } else {
                let prev = &arrivals[i - 1];
                if prev.is_known() && prev.next >= arrival.next {
                    pos[i * 2 - 1] = true;
                }
            }
        }

        Self(pos)
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The same bitmap read from the other end of the line.
    pub fn reversed(&self) -> Self {
        Self(self.0.iter().rev().copied().collect())
    }

    /// The bitmap without its final slot.
    pub fn truncated(&self) -> &[bool] {
        let end = self.0.len().saturating_sub(1);
        &self.0[..end]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = self
            .0
            .iter()
            .map(|&occupied| if occupied { OCCUPIED } else { EMPTY })
            .collect();
        f.write_str(&s)
    }
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .map(|(index, ch)| match ch {
                OCCUPIED => Ok(true),
                EMPTY => Ok(false),
                _ => Err(PositionParseError { index, ch }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn countdown() -> impl Strategy<Value = i32> {
        prop_oneof![Just(-1), Just(0), Just(1), 2..20i32]
    }

    proptest! {
        /// Rendering then parsing returns the original bitmap
        #[test]
        fn render_parse_roundtrip(bits in proptest::collection::vec(any::<bool>(), 0..80)) {
            let pos = Position::from_bits(bits);
            let parsed: Position = pos.to_string().parse().unwrap();
            prop_assert_eq!(parsed, pos);
        }

        /// Reversing twice is the identity
        #[test]
        fn reverse_involution(bits in proptest::collection::vec(any::<bool>(), 0..80)) {
            let pos = Position::from_bits(bits);
            prop_assert_eq!(pos.reversed().reversed(), pos);
        }

        /// Inference always yields 2n - 1 slots
        #[test]
        fn inferred_length(codes in proptest::collection::vec(countdown(), 1..40)) {
            let arrivals: Vec<Arrival> = codes.iter().map(|&c| Arrival::new(c, "")).collect();
            prop_assert_eq!(Position::infer(&arrivals).len(), codes.len() * 2 - 1);
        }

        /// Every station with a zero countdown is marked occupied
        #[test]
        fn arrived_stations_are_occupied(codes in proptest::collection::vec(countdown(), 1..40)) {
            let arrivals: Vec<Arrival> = codes.iter().map(|&c| Arrival::new(c, "")).collect();
            let pos = Position::infer(&arrivals);
            for (i, &c) in codes.iter().enumerate() {
                prop_assert_eq!(pos.bits()[i * 2], c == 0);
            }
        }
    }
}

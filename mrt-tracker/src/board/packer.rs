//! Bit packing of occupancy bitmaps into chip buffers.

use std::collections::HashMap;
use std::fmt::Write;

use crate::model::Position;
use crate::network::LineId;

use super::wiring::{CHIPS, GRIDS, WiringTable};

/// Bytes per chip buffer: two per grid.
pub const BYTES_PER_CHIP: usize = GRIDS as usize * 2;

/// Errors from packing bitmaps against a wiring table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackError {
    /// The table wires a line that has no bitmap
    #[error("no position for wired line {0}")]
    MissingLine(LineId),

    /// A truncated bitmap does not match its wiring
    #[error("line {line} has {actual} packable bits but {expected} are wired")]
    LengthMismatch {
        line: LineId,
        expected: usize,
        actual: usize,
    },
}

/// One frame for the board: a 16-byte buffer per chip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedFrame([[u8; BYTES_PER_CHIP]; CHIPS]);

impl PackedFrame {
    pub fn chips(&self) -> &[[u8; BYTES_PER_CHIP]; CHIPS] {
        &self.0
    }

    /// Lowercase hex per chip, as the board firmware reads it.
    pub fn to_hex(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|chip| {
                chip.iter().fold(String::with_capacity(BYTES_PER_CHIP * 2), |mut s, b| {
                    let _ = write!(s, "{b:02x}");
                    s
                })
            })
            .collect()
    }
}

/// Pack every wired line's bitmap into a fresh frame.
///
/// Each bitmap loses its final slot before packing; the wiring tables are
/// drawn one bit short per line. Any missing or mis-sized line fails the
/// whole frame.
pub fn pack(
    positions: &HashMap<LineId, Position>,
    wiring: &WiringTable,
) -> Result<PackedFrame, PackError> {
    let mut frame = PackedFrame::default();

    for (line, descriptors) in wiring.entries() {
        let position = positions.get(&line).ok_or(PackError::MissingLine(line))?;
        let bits = position.truncated();

        if bits.len() != descriptors.len() {
            return Err(PackError::LengthMismatch {
                line,
                expected: descriptors.len(),
                actual: bits.len(),
            });
        }

        for (&occupied, d) in bits.iter().zip(descriptors) {
            if occupied {
                frame.0[d.chip()][d.byte_index()] |= d.bit_mask();
            }
        }
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::wiring::WiringDescriptor;
    use crate::network::Network;
    use proptest::prelude::*;

    fn single(line: LineId, chip: u8, grid: u8, seg: u8) -> WiringTable {
        WiringTable::new(
            "test",
            [(line, vec![WiringDescriptor::new(chip, grid, seg).unwrap()])],
        )
    }

    #[test]
    fn single_bit_lands_on_its_address() {
        let wiring = single(LineId::Cg1, 1, 3, 9);
        // Two slots; the trailing one is dropped before packing.
        let positions = HashMap::from([(LineId::Cg1, Position::from_bits(vec![true, true]))]);

        let frame = pack(&positions, &wiring).unwrap();

        for (chip, buf) in frame.chips().iter().enumerate() {
            for (byte, &value) in buf.iter().enumerate() {
                let expected = if chip == 1 && byte == 5 { 0b0000_0001 } else { 0 };
                assert_eq!(value, expected, "chip {chip} byte {byte}");
            }
        }
    }

    #[test]
    fn unset_bits_leave_frame_zeroed() {
        let wiring = single(LineId::Cg1, 1, 3, 9);
        let positions = HashMap::from([(LineId::Cg1, Position::from_bits(vec![false, true]))]);
        assert_eq!(pack(&positions, &wiring).unwrap(), PackedFrame::default());
    }

    #[test]
    fn missing_line_fails() {
        let wiring = single(LineId::Ew2, 0, 1, 1);
        let positions = HashMap::from([(LineId::Ew1, Position::empty(2))]);
        assert_eq!(
            pack(&positions, &wiring),
            Err(PackError::MissingLine(LineId::Ew2))
        );
    }

    #[test]
    fn untruncated_length_is_rejected() {
        let wiring = single(LineId::Cg1, 0, 1, 1);
        let positions = HashMap::from([(LineId::Cg1, Position::empty(1))]);
        assert_eq!(
            pack(&positions, &wiring),
            Err(PackError::LengthMismatch {
                line: LineId::Cg1,
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn unwired_lines_are_ignored() {
        let wiring = single(LineId::Cg1, 0, 1, 1);
        let positions = HashMap::from([
            (LineId::Cg1, Position::from_bits(vec![true, false])),
            (LineId::Ns1, Position::from_bits(vec![true; 53])),
        ]);
        let frame = pack(&positions, &wiring).unwrap();
        assert_eq!(frame.to_hex()[0], "01000000000000000000000000000000");
    }

    #[test]
    fn repeated_packing_does_not_accumulate() {
        let wiring = single(LineId::Cg1, 2, 8, 10);
        let lit = HashMap::from([(LineId::Cg1, Position::from_bits(vec![true, false]))]);
        let dark = HashMap::from([(LineId::Cg1, Position::from_bits(vec![false, false]))]);

        assert_ne!(pack(&lit, &wiring).unwrap(), PackedFrame::default());
        assert_eq!(pack(&dark, &wiring).unwrap(), PackedFrame::default());
    }

    #[test]
    fn hex_is_lowercase() {
        let wiring = single(LineId::Cg1, 2, 8, 4);
        let positions = HashMap::from([(LineId::Cg1, Position::from_bits(vec![true, false]))]);
        let hex = pack(&positions, &wiring).unwrap().to_hex();

        assert_eq!(hex.len(), 3);
        assert_eq!(hex[0], "0".repeat(32));
        assert_eq!(hex[2], "00000000000000000000000000000800");
    }

    #[test]
    fn dev_v1_all_lit() {
        let network = Network::singapore().unwrap();
        let wiring = WiringTable::dev_v1().unwrap();
        let positions: HashMap<_, _> = network
            .lines()
            .map(|(id, line)| (id, Position::from_bits(vec![true; line.position_len()])))
            .collect();

        let frame = pack(&positions, &wiring).unwrap();
        for hex in frame.to_hex() {
            // Segments 1-8 fill the first byte, 9-10 the low bits of the second.
            assert_eq!(hex, "ff03".repeat(8));
        }
    }

    proptest! {
        #[test]
        fn lit_lamps_match_set_bits(seed in proptest::collection::vec(any::<bool>(), 240)) {
            let network = Network::singapore().unwrap();
            let wiring = WiringTable::dev_v1().unwrap();

            let mut offset = 0;
            let mut positions = HashMap::new();
            for (id, line) in network.lines() {
                let packable = line.position_len() - 1;
                let mut bits = seed[offset..offset + packable].to_vec();
                bits.push(true);
                offset += packable;
                positions.insert(id, Position::from_bits(bits));
            }

            let frame = pack(&positions, &wiring).unwrap();
            let lit: u32 = frame.chips().iter().flatten().map(|b| b.count_ones()).sum();
            let set = seed.iter().filter(|&&b| b).count() as u32;
            prop_assert_eq!(lit, set);
        }
    }
}

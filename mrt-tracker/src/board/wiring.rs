//! Hardware addresses for occupancy bits.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::network::LineId;

/// Display driver chips on the board.
pub const CHIPS: usize = 3;
/// Grids per chip, numbered from 1.
pub const GRIDS: u8 = 8;
/// Segments per grid, numbered from 1.
pub const SEGMENTS: u8 = 10;
/// Lamps on the board.
pub const LAMPS: usize = CHIPS * GRIDS as usize * SEGMENTS as usize;

/// Errors from building or validating a wiring table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WiringError {
    #[error("chip {0} out of range 0..3")]
    ChipOutOfRange(u8),

    #[error("grid {0} out of range 1..=8")]
    GridOutOfRange(u8),

    #[error("segment {0} out of range 1..=10")]
    SegmentOutOfRange(u8),

    /// Two bits would light the same lamp
    #[error("lamp {0} is wired more than once")]
    Duplicate(WiringDescriptor),

    #[error("table wires {actual} lamps but the board has {expected}")]
    LampCount { expected: usize, actual: usize },
}

/// One lamp: a segment of a grid on a chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WiringDescriptor {
    chip: u8,
    grid: u8,
    segment: u8,
}

impl WiringDescriptor {
    pub fn new(chip: u8, grid: u8, segment: u8) -> Result<Self, WiringError> {
        if usize::from(chip) >= CHIPS {
            return Err(WiringError::ChipOutOfRange(chip));
        }
        if !(1..=GRIDS).contains(&grid) {
            return Err(WiringError::GridOutOfRange(grid));
        }
        if !(1..=SEGMENTS).contains(&segment) {
            return Err(WiringError::SegmentOutOfRange(segment));
        }
        Ok(Self {
            chip,
            grid,
            segment,
        })
    }

    pub fn chip(&self) -> usize {
        usize::from(self.chip)
    }

    /// Byte within the chip's buffer. Each grid takes two bytes.
    pub fn byte_index(&self) -> usize {
        usize::from(self.grid - 1) * 2 + usize::from(self.segment - 1) / 8
    }

    pub fn bit_mask(&self) -> u8 {
        1 << ((self.segment - 1) % 8)
    }
}

impl fmt::Display for WiringDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chip {} grid {} seg {}", self.chip, self.grid, self.segment)
    }
}

/// A contiguous block of lamps: every segment in `segments` of every grid
/// in `grids`, grid-major.
struct Run {
    chip: u8,
    grids: (u8, u8),
    segments: (u8, u8),
}

const fn run(chip: u8, grids: (u8, u8), segments: (u8, u8)) -> Run {
    Run {
        chip,
        grids,
        segments,
    }
}

const FULL: (u8, u8) = (1, SEGMENTS);

/// The `dev_v1` layout. Lines are laid out back to back across the three
/// chips, in table order, one lamp per packed bit.
const DEV_V1: &[(LineId, &[Run])] = &[
    (LineId::Ns1, &[run(0, (1, 5), FULL), run(0, (6, 6), (1, 2))]),
    (
        LineId::Ns2,
        &[
            run(0, (6, 6), (3, 10)),
            run(0, (7, 8), FULL),
            run(1, (1, 2), FULL),
            run(1, (3, 3), (1, 4)),
        ],
    ),
    (
        LineId::Ew1,
        &[
            run(1, (3, 3), (5, 10)),
            run(1, (4, 8), FULL),
            run(2, (1, 1), (1, 8)),
        ],
    ),
    (
        LineId::Ew2,
        &[
            run(2, (1, 1), (9, 10)),
            run(2, (2, 7), FULL),
            run(2, (8, 8), (1, 2)),
        ],
    ),
    (LineId::Cg1, &[run(2, (8, 8), (3, 6))]),
    (LineId::Cg2, &[run(2, (8, 8), (7, 10))]),
];

fn expand(runs: &[Run]) -> Result<Vec<WiringDescriptor>, WiringError> {
    let mut out = Vec::new();
    for r in runs {
        for grid in r.grids.0..=r.grids.1 {
            for segment in r.segments.0..=r.segments.1 {
                out.push(WiringDescriptor::new(r.chip, grid, segment)?);
            }
        }
    }
    Ok(out)
}

/// Maps each wired line to one descriptor per packed occupancy bit.
///
/// A line absent from the table is simply not drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiringTable {
    name: String,
    lines: BTreeMap<LineId, Vec<WiringDescriptor>>,
}

impl WiringTable {
    pub fn new(
        name: impl Into<String>,
        lines: impl IntoIterator<Item = (LineId, Vec<WiringDescriptor>)>,
    ) -> Self {
        Self {
            name: name.into(),
            lines: lines.into_iter().collect(),
        }
    }

    /// The `dev_v1` board.
    pub fn dev_v1() -> Result<Self, WiringError> {
        let mut lines = Vec::with_capacity(DEV_V1.len());
        for (id, runs) in DEV_V1 {
            lines.push((*id, expand(runs)?));
        }
        Ok(Self::new("dev_v1", lines))
    }

    /// Format key clients use to ask for this layout.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> impl Iterator<Item = (LineId, &[WiringDescriptor])> {
        self.lines.iter().map(|(id, d)| (*id, d.as_slice()))
    }

    pub fn line(&self, id: LineId) -> Option<&[WiringDescriptor]> {
        self.lines.get(&id).map(Vec::as_slice)
    }

    /// Check that every lamp is wired at most once and that exactly `lamps`
    /// are wired.
    pub fn validate(&self, lamps: usize) -> Result<(), WiringError> {
        let mut seen = HashSet::with_capacity(lamps);
        for (_, descriptors) in self.entries() {
            for d in descriptors {
                if !seen.insert(*d) {
                    return Err(WiringError::Duplicate(*d));
                }
            }
        }

        if seen.len() != lamps {
            return Err(WiringError::LampCount {
                expected: lamps,
                actual: seen.len(),
            });
        }
        Ok(())
    }
}

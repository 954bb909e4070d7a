//! The physical display board.
//!
//! The board is three multiplexed LED driver chips of 8 grids by 10
//! segments. Each lamp is one occupancy bit of one line; a [`WiringTable`]
//! says which, and [`pack`] turns a set of bitmaps into the per-chip bytes
//! the firmware expects.

mod packer;
mod wiring;

pub use packer::{BYTES_PER_CHIP, PackError, PackedFrame, pack};
pub use wiring::{CHIPS, GRIDS, LAMPS, SEGMENTS, WiringDescriptor, WiringError, WiringTable};

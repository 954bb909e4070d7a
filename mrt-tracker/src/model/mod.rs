//! Per-line arrival entries and the occupancy bitmap inferred from them.

mod arrival;
mod position;

pub use arrival::Arrival;
pub use position::{Position, PositionParseError};

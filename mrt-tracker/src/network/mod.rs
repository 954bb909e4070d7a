//! Fixed network topology.
//!
//! Lines and stations are immutable configuration: built once at startup
//! into a [`Network`] and handed to whatever needs them.

mod data;
mod error;
mod line;
mod station;

use std::collections::BTreeSet;

pub use error::NetworkError;
pub use line::{Line, LineId, LineTable};
pub use station::{PlatformId, Station};

/// Every tracked line, indexed by [`LineId`].
#[derive(Debug, Clone)]
pub struct Network {
    lines: LineTable<Line>,
}

impl Network {
    /// Build a network from explicit line tables.
    pub fn new(lines: LineTable<Line>) -> Result<Self, NetworkError> {
        for (id, line) in lines.iter() {
            if line.is_empty() {
                return Err(NetworkError::EmptyLine(id));
            }
        }
        Ok(Self { lines })
    }

    /// The North-South, East-West and Changi Airport branch lines.
    pub fn singapore() -> Result<Self, NetworkError> {
        Self::new(data::singapore_lines()?)
    }

    pub fn line(&self, id: LineId) -> &Line {
        &self.lines[id]
    }

    pub fn lines(&self) -> impl Iterator<Item = (LineId, &Line)> {
        self.lines.iter()
    }

    /// Deduplicated station names across all lines, for station-keyed fetches.
    pub fn station_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self
            .lines
            .iter()
            .flat_map(|(_, line)| line.stations().iter().map(|s| s.name.as_str()))
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Deduplicated platform identifiers across all lines, for platform-keyed fetches.
    pub fn platform_ids(&self) -> Vec<PlatformId> {
        let ids: BTreeSet<PlatformId> = self
            .lines
            .iter()
            .flat_map(|(_, line)| line.stations().iter().map(Station::platform_id))
            .collect();
        ids.into_iter().collect()
    }
}

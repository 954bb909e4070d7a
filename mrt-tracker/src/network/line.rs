//! Line identities and ordered station sequences.

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::Serialize;

use super::error::NetworkError;
use super::station::Station;

/// One tracked line direction.
///
/// The set is closed: each direction of each corridor gets its own identity
/// so the cache and the wiring table can be fixed-size tables indexed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineId {
    Ns1,
    Ns2,
    Ew1,
    Ew2,
    Cg1,
    Cg2,
}

impl LineId {
    pub const COUNT: usize = 6;

    /// All lines in table order.
    pub const ALL: [LineId; Self::COUNT] = [
        LineId::Ns1,
        LineId::Ns2,
        LineId::Ew1,
        LineId::Ew2,
        LineId::Cg1,
        LineId::Cg2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LineId::Ns1 => "ns1",
            LineId::Ns2 => "ns2",
            LineId::Ew1 => "ew1",
            LineId::Ew2 => "ew2",
            LineId::Cg1 => "cg1",
            LineId::Cg2 => "cg2",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineId {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| NetworkError::UnknownLine(s.to_string()))
    }
}

/// A fixed-size table holding one value per [`LineId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable<T>([T; LineId::COUNT]);

impl<T> LineTable<T> {
    pub fn from_fn(mut f: impl FnMut(LineId) -> T) -> Self {
        Self(std::array::from_fn(|i| f(LineId::ALL[i])))
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(LineId) -> Result<T, E>) -> Result<Self, E> {
        let mut values = Vec::with_capacity(LineId::COUNT);
        for id in LineId::ALL {
            values.push(f(id)?);
        }
        let Ok(values) = values.try_into() else {
            unreachable!("one value per line id");
        };
        Ok(Self(values))
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineId, &T)> {
        LineId::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<LineId> for LineTable<T> {
    type Output = T;

    fn index(&self, id: LineId) -> &T {
        &self.0[id.index()]
    }
}

impl<T> IndexMut<LineId> for LineTable<T> {
    fn index_mut(&mut self, id: LineId) -> &mut T {
        &mut self.0[id.index()]
    }
}

/// Stations in physical track order for one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    stations: Vec<Station>,
}

impl Line {
    /// Wrap stations that are already in track order.
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    /// Order stations by the numeric suffix of their line-scoped code.
    pub fn ordered_by_code(mut stations: Vec<Station>) -> Result<Self, NetworkError> {
        let mut keyed = Vec::with_capacity(stations.len());
        for station in stations.drain(..) {
            keyed.push((station.code_num()?, station));
        }
        keyed.sort_by_key(|(num, _)| *num);

        Ok(Self {
            stations: keyed.into_iter().map(|(_, s)| s).collect(),
        })
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Length of the occupancy bitmap for this line.
    pub fn position_len(&self) -> usize {
        (self.stations.len() * 2).saturating_sub(1)
    }
}

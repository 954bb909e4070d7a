//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{BoardSnapshot, LineSnapshot};
use crate::network::LineId;

/// Query parameters for the position endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PositionQuery {
    /// Board layout name; anything unrecognized gets the per-line listing
    pub format: Option<String>,
}

/// One line's positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineResult {
    pub line: String,

    /// One `*` or `_` per station or segment
    pub positions: String,

    /// Unix milliseconds; 0 if never refreshed
    pub last_updated: u64,
}

/// The packed board frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardResult {
    /// Lowercase hex per chip
    pub data: Vec<String>,

    /// Unix milliseconds; 0 if never refreshed
    pub last_updated: u64,
}

/// Response for the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub version: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

fn unix_millis(at: Option<DateTime<Utc>>) -> u64 {
    at.map(|t| u64::try_from(t.timestamp_millis()).unwrap_or(0))
        .unwrap_or(0)
}

impl LineResult {
    pub fn from_snapshot(line: LineId, snapshot: LineSnapshot) -> Self {
        Self {
            line: line.to_string(),
            positions: snapshot.positions,
            last_updated: unix_millis(snapshot.last_updated),
        }
    }
}

impl From<BoardSnapshot> for BoardResult {
    fn from(snapshot: BoardSnapshot) -> Self {
        Self {
            data: snapshot.data,
            last_updated: unix_millis(snapshot.last_updated),
        }
    }
}

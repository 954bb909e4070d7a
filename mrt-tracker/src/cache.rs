//! Latest published positions.
//!
//! One entry per line plus one for the packed board frame, each behind its
//! own lock. Writers swap in a finished snapshot; readers copy one out. No
//! lock is ever held across entries, so a slow line never stalls another.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::board::PackedFrame;
use crate::model::Position;
use crate::network::{LineId, LineTable, Network};

/// Rejected publication.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("position for {line} has {actual} slots, expected {expected}")]
    LengthMismatch {
        line: LineId,
        expected: usize,
        actual: usize,
    },
}

/// A copy of one line's entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    /// Rendered bitmap, one character per slot.
    pub positions: String,
    /// `None` until the first successful refresh.
    pub last_updated: Option<DateTime<Utc>>,
}

/// A copy of the board entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Lowercase hex, one string per chip.
    pub data: Vec<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct LineEntry {
    position: Position,
    last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct BoardEntry {
    frame: PackedFrame,
    last_updated: Option<DateTime<Utc>>,
}

/// Per-line and board entries, readable while a refresh writes.
#[derive(Debug)]
pub struct PositionCache {
    lines: LineTable<RwLock<LineEntry>>,
    board: RwLock<BoardEntry>,
}

impl PositionCache {
    /// Empty bitmaps of the right length for every line, and a dark board.
    pub fn new(network: &Network) -> Self {
        let lines = LineTable::from_fn(|id| {
            RwLock::new(LineEntry {
                position: Position::empty(network.line(id).position_len()),
                last_updated: None,
            })
        });

        Self {
            lines,
            board: RwLock::new(BoardEntry::default()),
        }
    }

    pub async fn read_line(&self, id: LineId) -> LineSnapshot {
        let entry = self.lines[id].read().await;
        LineSnapshot {
            positions: entry.position.to_string(),
            last_updated: entry.last_updated,
        }
    }

    pub async fn read_board(&self) -> BoardSnapshot {
        let entry = self.board.read().await;
        BoardSnapshot {
            data: entry.frame.to_hex(),
            last_updated: entry.last_updated,
        }
    }

    /// Replace one line's bitmap.
    ///
    /// The length is fixed by the network the cache was built from; a bitmap
    /// of any other length is refused and the entry is left as it was.
    pub async fn publish_line(
        &self,
        id: LineId,
        position: Position,
        at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let mut entry = self.lines[id].write().await;
        if position.len() != entry.position.len() {
            return Err(CacheError::LengthMismatch {
                line: id,
                expected: entry.position.len(),
                actual: position.len(),
            });
        }

        entry.position = position;
        entry.last_updated = Some(at);
        Ok(())
    }

    pub async fn publish_board(&self, frame: PackedFrame, at: DateTime<Utc>) {
        let mut entry = self.board.write().await;
        entry.frame = frame;
        entry.last_updated = Some(at);
    }
}

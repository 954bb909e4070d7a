//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::PositionCache;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Positions published by the tracker
    pub cache: Arc<PositionCache>,

    /// `format` value that selects the packed board frame
    pub board_format: Arc<str>,

    /// Build revision for the status endpoint
    pub version: Arc<str>,
}

impl AppState {
    pub fn new(cache: Arc<PositionCache>, board_format: &str, version: &str) -> Self {
        Self {
            cache,
            board_format: Arc::from(board_format),
            version: Arc::from(version),
        }
    }
}

//! HTTP relay over the position cache.
//!
//! Reads never touch the upstream; they return whatever the tracker last
//! published.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;

//! MRT train position tracker.
//!
//! Polls the SMRT arrival-time API, infers where every train on the
//! North-South, East-West and Changi Airport lines is, and serves the result
//! as text bitmaps or as packed frames for an LED display board.

pub mod board;
pub mod cache;
pub mod cancel;
pub mod config;
pub mod model;
pub mod network;
pub mod pool;
pub mod smrt;
pub mod tracker;
pub mod web;

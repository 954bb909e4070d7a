//! SMRT Connect arrival-time API client.
//!
//! The upstream serves next-train countdowns for the mobile app, either for
//! every platform at a station (keyed by display name) or for one platform
//! (keyed by `{code3}_{letter}`).
//!
//! Quirks worth knowing:
//! - Requests without the app's User-Agent are refused
//! - 404 is returned spuriously and succeeds on retry
//! - Unknown stations come back as a 200 with an empty `platform_ID`

mod batch;
mod client;
mod convert;
mod error;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use batch::{ArrivalSource, BatchConfig, Fetcher};
pub use client::{SmrtClient, SmrtConfig};
pub use convert::{parse_next_code, platform_arrivals, station_arrivals};
pub use error::FetchError;
pub use types::{ARRIVED_MARKER, PlatformResponse, RawArrival, StationResponse};

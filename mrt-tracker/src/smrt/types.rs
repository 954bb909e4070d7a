//! Upstream arrival-time DTOs.
//!
//! Fields map directly to the upstream JSON. Absent fields decode as empty
//! strings, matching how the upstream omits rather than nulls them.

use serde::{Deserialize, Serialize};

/// Literal countdown value meaning the train is at the platform.
pub const ARRIVED_MARKER: &str = "Arr";

/// One platform's next-train record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawArrival {
    /// Line-scoped station code(s), comma separated at interchanges.
    pub code: String,

    /// Station display name.
    pub mrt: String,

    /// Countdown: a number, [`ARRIVED_MARKER`], or "N/A".
    pub next_train_arr: String,

    /// Destination of the next train, or "Do not board".
    pub next_train_destination: String,

    /// Three-letter code and platform letter, e.g. "CTH_A".
    #[serde(rename = "platform_ID")]
    pub platform_id: String,

    /// Nearly always 1.
    pub status: i32,

    /// Countdown for the train after next.
    pub subseq_train_arr: String,

    /// Not always present.
    pub subseq_train_destination: String,
}

impl RawArrival {
    /// The upstream answers unknown stations with an empty platform id.
    pub fn is_valid(&self) -> bool {
        !self.platform_id.is_empty()
    }
}

/// Body of a station-keyed request.
#[derive(Debug, Clone, Deserialize)]
pub struct StationResponse {
    pub results: Vec<RawArrival>,
}

/// Body of a platform-keyed request.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformResponse {
    pub results: RawArrival,
}

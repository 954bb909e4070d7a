//! Conversion from upstream records to per-line arrival entries.

use std::collections::HashMap;

use crate::model::Arrival;
use crate::network::{Line, PlatformId};

use super::types::{ARRIVED_MARKER, RawArrival};

/// Parse a countdown: the arrived marker is 0, any integer is itself,
/// anything else ("N/A", empty) is unknown.
pub fn parse_next_code(raw: &str) -> i32 {
    if raw == ARRIVED_MARKER {
        return Arrival::ARRIVED;
    }
    raw.parse().unwrap_or(Arrival::UNKNOWN)
}

fn to_arrival(record: &RawArrival) -> Arrival {
    Arrival::new(
        parse_next_code(&record.next_train_arr),
        record.next_train_destination.clone(),
    )
}

/// Arrivals for `line` from station-keyed results.
///
/// Each station's record set is looked up by display name and scanned for
/// the record of this line's platform. Stations with no record set keep the
/// default entry.
pub fn station_arrivals(raw: &HashMap<String, Vec<RawArrival>>, line: &Line) -> Vec<Arrival> {
    line.stations()
        .iter()
        .map(|station| {
            let Some(records) = raw.get(&station.name) else {
                return Arrival::default();
            };

            let platform_id = station.platform_id();
            records
                .iter()
                .find(|r| r.platform_id == platform_id.as_str())
                .map(to_arrival)
                .unwrap_or_default()
        })
        .collect()
}

/// Arrivals for `line` from platform-keyed results.
pub fn platform_arrivals(raw: &HashMap<PlatformId, RawArrival>, line: &Line) -> Vec<Arrival> {
    line.stations()
        .iter()
        .map(|station| {
            raw.get(&station.platform_id())
                .map(to_arrival)
                .unwrap_or_default()
        })
        .collect()
}

//! Normalized arrival entry for one station on one line.

/// Next-train countdown at one station, in line order.
///
/// `next` keeps the upstream's integer encoding: [`Arrival::UNKNOWN`] when the
/// countdown is missing or unparseable, [`Arrival::ARRIVED`] when the train is
/// at the platform, otherwise minutes until arrival.
///
/// The default is `next = 0`, so a station the upstream said nothing about
/// looks exactly like one with a train at the platform. Kept for
/// compatibility with existing displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arrival {
    pub next: i32,
    pub destination: String,
}

impl Arrival {
    pub const UNKNOWN: i32 = -1;
    pub const ARRIVED: i32 = 0;

    pub fn new(next: i32, destination: impl Into<String>) -> Self {
        Self {
            next,
            destination: destination.into(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.next != Self::UNKNOWN
    }
}

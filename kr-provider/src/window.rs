use chrono::{
    DateTime,
    Duration,
    Utc,
};

/// How far back a remote query looks when no start time is given.
pub const DEFAULT_LOOKBACK_HOURS: i64 = 24;

/// An inclusive time range; either end may be open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        TimeWindow { start, end }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| start <= ts) && self.end.map_or(true, |end| ts <= end)
    }

    /// Close both ends for backends that require a bounded range: the end defaults to `now` and
    /// the start to a fixed lookback before the end.
    pub fn bounded(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let end = self.end.unwrap_or(now);
        let start = self.start.unwrap_or(end - Duration::hours(DEFAULT_LOOKBACK_HOURS));
        (start, end)
    }
}

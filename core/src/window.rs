//! Time windows that record timestamps are drawn from.

use crate::{
    error::{SandboxError, SandboxResult},
    rng::StreamRng,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// A closed interval `[start, end]` of UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> SandboxResult<Self> {
        if start > end {
            return Err(SandboxError::InvalidConfig(format!(
                "window starts ({start}) after it ends ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// From the first millisecond of `start` to the last millisecond
    /// of `end`, so both calendar days are fully covered.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> SandboxResult<Self> {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1)
            - Duration::milliseconds(1);
        Self::new(start_ts, end_ts)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Same end, start pulled back by `days`.
    pub fn extend_back(&self, days: i64) -> Self {
        Self {
            start: self.start - Duration::days(days),
            end: self.end,
        }
    }

    /// Draw an instant uniformly at millisecond resolution.
    pub fn sample(&self, rng: &mut StreamRng) -> DateTime<Utc> {
        let span_ms = (self.end - self.start).num_milliseconds().max(0) as u64;
        let offset = rng.next_u64_below(span_ms + 1);
        self.start + Duration::milliseconds(offset as i64)
    }
}

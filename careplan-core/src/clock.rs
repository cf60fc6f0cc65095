//! Clock capability threaded through the tracker.
//!
//! Entities never read the wall clock themselves; the tracker asks its clock
//! once per computation and passes the answer down.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

use crate::config::TrackerConfig;
use crate::error::TrackerResult;

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day used for pending/overdue classification.
    fn today(&self) -> NaiveDate;
}

/// Wall clock, with "today" taken in the clinic's local offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn from_config(config: &TrackerConfig) -> TrackerResult<Self> {
        Ok(Self::with_offset(config.utc_offset()?))
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::utc()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// A clock frozen at one instant. Used by tests and by replaying a chart "as of" a date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            offset: Utc.fix(),
        }
    }

    /// Midnight UTC at the start of `day`.
    pub fn on(day: NaiveDate) -> Self {
        Self::at(day.and_time(NaiveTime::MIN).and_utc())
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn advance(&mut self, by: chrono::Duration) {
        self.now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.now.with_timezone(&self.offset).date_naive()
    }
}

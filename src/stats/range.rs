//! Caller-supplied date range, normalized to whole UTC days.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use super::error::StatsError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-day range. A `None` bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parses optional `YYYY-MM-DD` bounds.
    ///
    /// Checks run in a fixed order: start, end, then ordering. An empty
    /// string counts as an absent bound.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, StatsError> {
        let start = parse_bound(start).map_err(|_| StatsError::InvalidStartDate)?;
        let end = parse_bound(end).map_err(|_| StatsError::InvalidEndDate)?;

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(StatsError::InvalidRange);
            }
        }

        Ok(Self { start, end })
    }

    /// Start bound as an instant: that day at 00:00:00.000 UTC.
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
        self.start
            .map(|d| Utc.from_utc_datetime(&d.and_time(midnight)))
    }

    /// End bound as an instant: that day at 23:59:59.999 UTC.
    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        let last_milli = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
        self.end
            .map(|d| Utc.from_utc_datetime(&d.and_time(last_milli)))
    }

    /// Whether a truncated UTC day falls inside the range.
    pub fn contains(&self, day: NaiveDate) -> bool {
        if matches!(self.start, Some(start) if day < start) {
            return false;
        }
        if matches!(self.end, Some(end) if day > end) {
            return false;
        }
        true
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).map(Some),
    }
}

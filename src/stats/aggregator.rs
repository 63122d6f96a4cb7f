//! Per-website aggregation of chat counters.
//!
//! Pipeline: validate range -> fetch -> check payload shape -> filter ->
//! accumulate -> sort. Either the whole call succeeds or it fails with a
//! [`StatsError`]; no partial aggregate is returned.

use std::collections::BTreeMap;

use serde_json::Value;

use super::error::StatsError;
use super::event::{parse_event, SkipReason};
use super::range::DateRange;
use super::source::EventSource;
use crate::models::AggregateRecord;

/// A raw event that failed validation, by position in the input array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEvent {
    pub index: usize,
    pub reason: SkipReason,
}

/// Aggregation result plus diagnostics about the records that did not count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateReport {
    /// Sorted ascending by `website_id`, byte-wise
    pub records: Vec<AggregateRecord>,
    pub skipped: Vec<SkippedEvent>,
    /// Valid events that fell outside the range
    pub excluded: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    chats: u64,
    missed_chats: u64,
}

/// Sums counters per website for every valid event inside `range`.
pub fn aggregate(raw_events: &[Value], range: &DateRange) -> AggregateReport {
    // BTreeMap<String, _> iterates in byte order, which is the output order
    let mut totals: BTreeMap<String, Totals> = BTreeMap::new();
    let mut skipped = Vec::new();
    let mut excluded = 0usize;

    for (index, raw) in raw_events.iter().enumerate() {
        let event = match parse_event(raw) {
            Ok(event) => event,
            Err(reason) => {
                skipped.push(SkippedEvent { index, reason });
                continue;
            }
        };

        if !range.contains(event.day) {
            excluded += 1;
            continue;
        }

        // An event whose counters would overflow the running total is skipped
        // whole; totals stay exact sums of the events that were counted.
        let entry = totals.entry(event.website_id).or_default();
        match (
            entry.chats.checked_add(event.chats),
            entry.missed_chats.checked_add(event.missed_chats),
        ) {
            (Some(chats), Some(missed_chats)) => {
                entry.chats = chats;
                entry.missed_chats = missed_chats;
            }
            _ => skipped.push(SkippedEvent {
                index,
                reason: SkipReason::CounterOverflow,
            }),
        }
    }

    let records = totals
        .into_iter()
        .map(|(website_id, t)| AggregateRecord {
            website_id,
            chats: t.chats,
            missed_chats: t.missed_chats,
        })
        .collect();

    AggregateReport {
        records,
        skipped,
        excluded,
    }
}

/// Parses the range bounds, then aggregates already-fetched events.
pub fn aggregate_events(
    raw_events: &[Value],
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<AggregateReport, StatsError> {
    let range = DateRange::parse(start_date, end_date)?;
    Ok(aggregate(raw_events, &range))
}

/// Full request pipeline against an event source.
///
/// The range is validated before the source is touched, so an invalid range
/// never costs a fetch. Any fetch or payload-shape failure is reported as
/// [`StatsError::SourceUnavailable`].
pub async fn process_statistics(
    source: &dyn EventSource,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<AggregateReport, StatsError> {
    let range = DateRange::parse(start_date, end_date)?;

    let payload = source
        .fetch_events()
        .await
        .map_err(StatsError::source_unavailable)?;

    let Value::Array(raw_events) = payload else {
        return Err(StatsError::source_unavailable(
            "Expected data to be an array",
        ));
    };

    Ok(aggregate(&raw_events, &range))
}

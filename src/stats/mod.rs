//! Chat statistics aggregation.

pub mod aggregator;
pub mod error;
pub mod event;
pub mod range;
pub mod source;

pub use aggregator::{
    aggregate, aggregate_events, process_statistics, AggregateReport, SkippedEvent,
};
pub use error::StatsError;
pub use event::{DatedEvent, SkipReason};
pub use range::DateRange;
pub use source::{
    CachedEventSource, EventSource, FileEventSource, HttpEventSource, DEFAULT_SOURCE_URL,
};

//! Wire types shared by the stats pipeline and the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One raw chat-activity record as delivered by the upstream feed.
///
/// Every field is kept as an untyped JSON value: the feed is untrusted and a
/// record with a wrong-typed field must be skipped, not fail the whole batch.
/// Validation lives in [`crate::stats::event`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chats: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missed_chats: Option<Value>,
}

/// Summed counters for one website over the requested range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    pub website_id: String,
    pub chats: u64,
    pub missed_chats: u64,
}

impl AggregateRecord {
    pub fn new(website_id: impl Into<String>, chats: u64, missed_chats: u64) -> Self {
        Self {
            website_id: website_id.into(),
            chats,
            missed_chats,
        }
    }
}

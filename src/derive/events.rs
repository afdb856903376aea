use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::helpers::{NOT_AVAILABLE, human_elapsed, parse_timestamp};
use crate::models::k8s::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    #[serde(rename = "type")]
    pub event_type: String,
    pub reason: String,
    pub object: String,
    pub message: String,
    pub count: i32,
    pub last_seen: String,
}

/// When the event was last observed. Newer API servers leave
/// `lastTimestamp` empty and only fill `eventTime`.
pub fn last_seen(event: &Event) -> Option<DateTime<Utc>> {
    parse_timestamp(event.last_timestamp.as_deref())
        .or_else(|| parse_timestamp(event.event_time.as_deref()))
}

/// Newest first; events without a timestamp go last, in their original order.
pub fn sort_newest_first(events: &mut [Event]) {
    events.sort_by_key(|e| std::cmp::Reverse(last_seen(e)));
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

pub fn event_row(event: &Event, now: DateTime<Utc>) -> EventRow {
    let object = if event.involved_object.name.is_empty() {
        "Unknown".to_string()
    } else {
        event.involved_object.name.clone()
    };

    EventRow {
        event_type: non_empty(&event.event_type)
            .map(capitalize)
            .unwrap_or_else(|| "Unknown".to_string()),
        reason: non_empty(&event.reason).unwrap_or("Unknown").to_string(),
        object,
        message: non_empty(&event.message).unwrap_or("No message").to_string(),
        count: event.count.filter(|c| *c > 0).unwrap_or(1),
        last_seen: last_seen(event)
            .map(|t| human_elapsed(t, now))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

/// Sorted, formatted rows for an event list.
pub fn event_rows(mut events: Vec<Event>, now: DateTime<Utc>) -> Vec<EventRow> {
    sort_newest_first(&mut events);
    events.iter().map(|e| event_row(e, now)).collect()
}

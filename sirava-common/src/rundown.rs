//! Rundown JSON decoding
//!
//! A rundown is the playout system's description of a broadcast day: one
//! top-level event whose `SubEvents` are the scheduled items. Every field is
//! optional on the wire; absent or `null` values decode to empty strings,
//! empty lists and no media. Keys match case-insensitively (`EventName`,
//! `eventName` and `EVENTNAME` are the same field); an exact spelling wins
//! over a differently cased duplicate.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;

/// Wire names of every rundown and media field
const FIELD_NAMES: &[&str] = &[
    "Duration",
    "EventName",
    "ScheduledTime",
    "StartTime",
    "Media",
    "SubEvents",
    "FileName",
    "MediaName",
];

/// One event or sub-event of a rundown
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RundownNode {
    /// Opaque duration string, not used by the transform
    #[serde(rename = "Duration", deserialize_with = "null_as_default")]
    pub duration: String,

    #[serde(rename = "EventName", deserialize_with = "null_as_default")]
    pub event_name: String,

    /// Planned start, `YYYY-MM-DDTHH:MM:SS`
    #[serde(rename = "ScheduledTime", deserialize_with = "null_as_default")]
    pub scheduled_time: String,

    /// Actual or alternate start, same format as `scheduled_time`
    #[serde(rename = "StartTime", deserialize_with = "null_as_default")]
    pub start_time: String,

    #[serde(rename = "Media")]
    pub media: Option<Media>,

    /// Sub-events in playout order
    #[serde(rename = "SubEvents", deserialize_with = "null_as_default")]
    pub children: Vec<RundownNode>,
}

/// Media clip attached to a sub-event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Media {
    #[serde(rename = "FileName", deserialize_with = "null_as_default")]
    pub file_name: String,

    /// Display title; overrides the event name when non-empty
    #[serde(rename = "MediaName", deserialize_with = "null_as_default")]
    pub media_name: String,

    #[serde(rename = "Duration", deserialize_with = "null_as_default")]
    pub duration: String,
}

impl RundownNode {
    /// Media name if present and non-empty
    pub fn media_name(&self) -> Option<&str> {
        self.media
            .as_ref()
            .map(|m| m.media_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a rundown from raw JSON bytes
///
/// Malformed input fails as a whole; there is no partial recovery.
pub fn parse(bytes: &[u8]) -> Result<RundownNode> {
    let mut value: Value = serde_json::from_slice(bytes)?;
    canonicalize_keys(&mut value);
    Ok(serde_json::from_value(value)?)
}

/// Rewrite differently cased field keys to their wire spelling, recursively
fn canonicalize_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let keys: Vec<String> = map.keys().cloned().collect();
            for key in keys {
                let Some(canonical) = FIELD_NAMES
                    .iter()
                    .find(|name| name.eq_ignore_ascii_case(&key))
                else {
                    continue;
                };
                if key == *canonical || map.contains_key(*canonical) {
                    continue;
                }
                if let Some(field) = map.remove(&key) {
                    map.insert(canonical.to_string(), field);
                }
            }
            map.values_mut().for_each(canonicalize_keys);
        }
        Value::Array(items) => items.iter_mut().for_each(canonicalize_keys),
        _ => {}
    }
}

/// Read and decode a rundown file
pub fn parse_file(path: &Path) -> Result<RundownNode> {
    let bytes = std::fs::read(path).map_err(Error::Io)?;
    parse(&bytes)
}

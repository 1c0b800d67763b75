//! Rundown → program entry transformation
//!
//! Field offsets below are byte offsets into `YYYY-MM-DDTHH:MM:SS`
//! timestamps. A slice that does not land on a character boundary is
//! handled like a too-short field.

use crate::rundown::{self, RundownNode};
use crate::schedule::ProgramEntry;
use crate::time::format_date;
use crate::Result;
use chrono::NaiveDate;
use tracing::debug;

/// Lower-case marker identifying jingles, which never reach the guide
pub const JINGLE_MARKER: &str = "jingel";

/// Result of converting one rundown: the schedule day and its entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// `YYYY-MM-DD`
    pub date: String,
    pub entries: Vec<ProgramEntry>,
}

/// Decode rundown bytes and transform them in one step
pub fn convert_rundown(bytes: &[u8], today: NaiveDate) -> Result<Conversion> {
    let root = rundown::parse(bytes)?;
    Ok(transform(&root, today))
}

/// Derive the schedule date and program entries from a rundown tree
///
/// The date comes from the root's `scheduled_time`, then its `start_time`,
/// then `today`. One entry is produced per **direct** child of the root, in
/// order; jingles are skipped. Grandchildren are never visited, even though
/// the parser keeps them.
pub fn transform(root: &RundownNode, today: NaiveDate) -> Conversion {
    let date = schedule_date(root, today);

    let entries: Vec<ProgramEntry> = root
        .children
        .iter()
        .filter_map(|child| program_entry(child, &date))
        .collect();

    debug!(
        "Rundown for {} produced {} of {} sub-events",
        date,
        entries.len(),
        root.children.len()
    );

    Conversion { date, entries }
}

fn schedule_date(root: &RundownNode, today: NaiveDate) -> String {
    root.scheduled_time
        .get(..10)
        .or_else(|| root.start_time.get(..10))
        .map(str::to_string)
        .unwrap_or_else(|| format_date(today))
}

fn program_entry(node: &RundownNode, date: &str) -> Option<ProgramEntry> {
    let title = node
        .media_name()
        .unwrap_or(&node.event_name)
        .replace('_', " ");

    if is_jingle(&title) {
        debug!("Skipping jingle '{}'", title);
        return None;
    }

    Some(ProgramEntry::new(
        entry_id(&node.scheduled_time, date),
        clock_time(&node.scheduled_time),
        clock_time(&node.start_time),
        title,
    ))
}

/// Case-insensitive check for the jingle marker
pub fn is_jingle(title: &str) -> bool {
    title.to_lowercase().contains(JINGLE_MARKER)
}

/// `HH:MM` of a timestamp as `HH.MM`, or empty when the field is too short
pub fn clock_time(timestamp: &str) -> String {
    timestamp
        .get(11..16)
        .map(|hm| hm.replace(':', "."))
        .unwrap_or_default()
}

/// `YYYYMMDDHHMMSS` from a full timestamp, or `<date>000000` as fallback
pub fn entry_id(timestamp: &str, date: &str) -> String {
    let parts = (
        timestamp.get(..10),
        timestamp.get(11..13),
        timestamp.get(14..16),
        timestamp.get(17..19),
    );

    match parts {
        (Some(day), Some(hh), Some(mm), Some(ss)) => {
            format!("{}{}{}{}", day.replace('-', ""), hh, mm, ss)
        }
        _ => format!("{}000000", date.replace('-', "")),
    }
}

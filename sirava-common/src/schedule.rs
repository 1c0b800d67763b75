//! Program guide document model and date-keyed merge
//!
//! A [`ScheduleDocument`] holds one [`ScheduleDay`] per calendar date, each
//! with its program entries in append order. Days and entries live in
//! vectors so serialization order is always insertion order.

/// Station name written to the `televize` attribute
pub const STATION_NAME: &str = "Širava";

/// Value of the always-affirmative broadcast flags
pub const FLAG_YES: &str = "Ano";

/// One row of the program guide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramEntry {
    /// `YYYYMMDDHHMMSS` key
    pub id: String,
    /// `HH.MM`, empty when unknown
    pub time_from: String,
    /// `HH.MM`, empty when unknown
    pub time_to: String,
    pub title: String,
    pub short_description: String,
    pub long_description: String,
    pub wide_screen: String,
    pub stereo: String,
}

impl ProgramEntry {
    /// Create an entry with empty descriptions and affirmative flags
    pub fn new(
        id: impl Into<String>,
        time_from: impl Into<String>,
        time_to: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            time_from: time_from.into(),
            time_to: time_to.into(),
            title: title.into(),
            short_description: String::new(),
            long_description: String::new(),
            wide_screen: FLAG_YES.to_string(),
            stereo: FLAG_YES.to_string(),
        }
    }
}

/// One calendar date of the guide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub entries: Vec<ProgramEntry>,
}

/// Multi-day program guide for one channel
///
/// Invariant: at most one day per distinct date string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDocument {
    /// Channel name; empty until the first merge or load
    pub channel: String,
    pub days: Vec<ScheduleDay>,
}

impl ScheduleDocument {
    /// Empty document, as used in reset mode
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the day for `date`
    pub fn day(&self, date: &str) -> Option<&ScheduleDay> {
        self.days.iter().find(|day| day.date == date)
    }

    /// Total number of entries across all days
    pub fn entry_count(&self) -> usize {
        self.days.iter().map(|day| day.entries.len()).sum()
    }

    /// Append `entries` to the day for `date`, creating the day if needed
    ///
    /// Pure append: entries already present are neither replaced nor
    /// deduplicated, so merging the same batch twice stores it twice.
    pub fn merge(&mut self, date: &str, entries: Vec<ProgramEntry>) {
        match self.days.iter_mut().find(|day| day.date == date) {
            Some(day) => day.entries.extend(entries),
            None => self.days.push(ScheduleDay {
                date: date.to_string(),
                entries,
            }),
        }

        if self.channel.is_empty() {
            self.channel = STATION_NAME.to_string();
        }
    }
}

/// Merge a converted batch into `doc` and return the updated document
///
/// Takes ownership of `doc`; callers keep only the returned value.
pub fn merge_into_document(
    mut doc: ScheduleDocument,
    date: &str,
    entries: Vec<ProgramEntry>,
) -> ScheduleDocument {
    doc.merge(date, entries);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, title: &str) -> ProgramEntry {
        ProgramEntry::new(id, "06.00", "06.30", title)
    }

    #[test]
    fn test_new_entry_has_fixed_flags() {
        let e = entry("20240601060000", "Spravy");
        assert_eq!(e.wide_screen, "Ano");
        assert_eq!(e.stereo, "Ano");
        assert!(e.short_description.is_empty());
        assert!(e.long_description.is_empty());
    }

    #[test]
    fn test_merge_into_empty_creates_day_and_sets_channel() {
        let doc = merge_into_document(
            ScheduleDocument::new(),
            "2024-06-01",
            vec![entry("1", "A")],
        );

        assert_eq!(doc.channel, STATION_NAME);
        assert_eq!(doc.days.len(), 1);
        assert_eq!(doc.days[0].date, "2024-06-01");
        assert_eq!(doc.days[0].entries, vec![entry("1", "A")]);
    }

    #[test]
    fn test_merge_existing_date_appends() {
        let doc = merge_into_document(ScheduleDocument::new(), "2024-06-01", vec![entry("1", "A")]);
        let doc = merge_into_document(doc, "2024-06-01", vec![entry("2", "B"), entry("3", "C")]);

        assert_eq!(doc.days.len(), 1);
        let ids: Vec<_> = doc.days[0].entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_merge_new_date_appends_day_in_order() {
        let doc = merge_into_document(ScheduleDocument::new(), "2024-06-02", vec![entry("1", "A")]);
        let doc = merge_into_document(doc, "2024-06-01", vec![entry("2", "B")]);

        let dates: Vec<_> = doc.days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-06-02", "2024-06-01"]);
    }

    #[test]
    fn test_merge_same_batch_twice_duplicates() {
        let batch = vec![entry("1", "A"), entry("2", "B")];
        let doc = merge_into_document(ScheduleDocument::new(), "2024-06-01", batch.clone());
        let doc = merge_into_document(doc, "2024-06-01", batch);

        assert_eq!(doc.days.len(), 1);
        assert_eq!(doc.entry_count(), 4);
        assert_eq!(doc.days[0].entries[0], doc.days[0].entries[2]);
    }

    #[test]
    fn test_merge_keeps_existing_channel() {
        let doc = ScheduleDocument {
            channel: "Iná".to_string(),
            days: Vec::new(),
        };
        let doc = merge_into_document(doc, "2024-06-01", Vec::new());
        assert_eq!(doc.channel, "Iná");
    }

    #[test]
    fn test_merge_empty_batch_still_records_day() {
        let doc = merge_into_document(ScheduleDocument::new(), "2024-06-01", Vec::new());
        assert!(doc.day("2024-06-01").is_some());
        assert_eq!(doc.entry_count(), 0);
    }
}

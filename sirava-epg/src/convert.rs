//! Command-line conversion of a rundown file into a program guide file

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sirava_common::xml::{render_conversion, to_xml};
use sirava_common::{merge_into_document, rundown, transform, FileScheduleStore, ScheduleStore};
use std::path::PathBuf;
use tracing::info;

/// Rundown read when no input is given
pub const DEFAULT_INPUT: &str = "sirava.rundown";

/// Options for one conversion run
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Merge into the existing output instead of replacing it
    pub append: bool,
}

/// What a conversion run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub date: String,
    pub entries: usize,
    pub output: PathBuf,
}

/// Convert `options.input` and write the guide to `options.output`
pub fn run_convert(options: &ConvertOptions, today: NaiveDate) -> Result<ConvertSummary> {
    let root = rundown::parse_file(&options.input)
        .with_context(|| format!("Failed to load rundown {}", options.input.display()))?;
    let conversion = transform(&root, today);
    let date = conversion.date.clone();
    let entries = conversion.entries.len();
    info!("Rundown {} → {} ({} entries)", options.input.display(), date, entries);

    let store = FileScheduleStore::new(&options.output);
    let xml = if options.append {
        let doc = merge_into_document(store.load(), &conversion.date, conversion.entries);
        to_xml(&doc).context("Failed to generate XML")?
    } else {
        render_conversion(conversion).context("Failed to generate XML")?
    };

    store
        .store(&xml)
        .with_context(|| format!("Failed to write {}", options.output.display()))?;

    Ok(ConvertSummary {
        date,
        entries,
        output: options.output.clone(),
    })
}

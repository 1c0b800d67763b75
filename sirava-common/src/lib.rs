//! # Širava Common Library
//!
//! Shared code for the Širava program guide tools including:
//! - Rundown JSON decoding (`rundown`)
//! - Rundown → program entry transformation (`transform`)
//! - Schedule document model and date-keyed merge (`schedule`)
//! - Program guide XML writing and reading (`xml`)
//! - Persisted document store (`store`)
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod error;
pub mod rundown;
pub mod schedule;
pub mod store;
pub mod time;
pub mod transform;
pub mod xml;

pub use error::{Error, Result};
pub use rundown::{Media, RundownNode};
pub use schedule::{merge_into_document, ProgramEntry, ScheduleDay, ScheduleDocument};
pub use store::{FileScheduleStore, ScheduleStore};
pub use transform::{convert_rundown, transform, Conversion};

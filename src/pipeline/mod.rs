//! Extraction pipeline for results-page harvesting
//!
//! This module contains the staged job logic, including:
//! - Scroll exhaustion of the virtualized result list
//! - Detail-page link harvesting from the settled document
//! - Per-listing field extraction behind a testable trait
//! - Bounded-concurrency batch scheduling
//! - Overall job coordination

mod batch;
mod coordinator;
mod extract;
mod harvest;
mod scroll;

pub use batch::extract_in_batches;
pub use coordinator::{run_job, JobOutcome};
pub use extract::{wait_for_ready, DetailExtractor, PlaceExtractor};
pub use harvest::{harvest_links, harvest_place_links, PLACE_URL_PREFIX};
pub use scroll::{run_scroll_loop, PageScrollSurface, ScrollOutcome, ScrollSurface};

//! Integration tests for the extraction pipeline
//!
//! These tests drive the scroll loop, batch extractor, and CSV output
//! together through fake surfaces and extractors, covering the stages that
//! do not require a live browser.

use mapharvest::config::{ExtractionConfig, ScrollConfig};
use mapharvest::output::records_to_csv;
use mapharvest::pipeline::{
    extract_in_batches, harvest_place_links, run_scroll_loop, DetailExtractor, ScrollSurface,
};
use mapharvest::{JobContext, ProgressStatus, Record, Result as HarvestResult};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Scroll surface whose end marker appears after a fixed number of scrolls
struct FakeSurface {
    scrolls: AtomicU32,
    marker_after: u32,
}

impl FakeSurface {
    fn new(marker_after: u32) -> Self {
        Self {
            scrolls: AtomicU32::new(0),
            marker_after,
        }
    }
}

impl ScrollSurface for FakeSurface {
    async fn scroll_by(&self, _delta_px: u32) -> HarvestResult<()> {
        self.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn marker_visible(&self, _marker: &str) -> HarvestResult<bool> {
        Ok(self.scrolls.load(Ordering::SeqCst) >= self.marker_after)
    }
}

/// Extractor that fabricates a record from the URL it is handed
struct FakeExtractor {
    calls: AtomicUsize,
}

impl FakeExtractor {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl DetailExtractor for FakeExtractor {
    async fn extract(&self, url: &str) -> HarvestResult<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(Record {
            name: url.rsplit('/').next().unwrap_or_default().to_string(),
            rating: "4.5".to_string(),
            url: url.to_string(),
            ..Record::default()
        })
    }
}

fn results_page_html(place_names: &[&str]) -> String {
    let anchors: String = place_names
        .iter()
        .map(|name| {
            format!(
                r#"<a href="https://www.google.com/maps/place/{}">{}</a>"#,
                name, name
            )
        })
        .collect();
    format!(
        r#"<html><body><div role="feed">{}</div>
        <a href="https://www.google.com/maps/contrib/123">reviewer</a>
        </body></html>"#,
        anchors
    )
}

fn fast_scroll_config(max_iterations: u32) -> ScrollConfig {
    ScrollConfig {
        max_iterations,
        pause_ms: 0,
        ..ScrollConfig::default()
    }
}

#[tokio::test]
async fn test_scroll_then_harvest_then_extract_then_serialize() {
    let ctx = JobContext::new();

    // Scroll until the fake marker shows up
    let surface = FakeSurface::new(4);
    let outcome = run_scroll_loop(&surface, &fast_scroll_config(200), &ctx)
        .await
        .unwrap();
    assert!(outcome.end_reached);

    // Harvest only detail-page links out of the settled document
    let html = results_page_html(&["Alpha", "Beta", "Gamma"]);
    let listings = harvest_place_links(&html);
    assert_eq!(listings.len(), 3);

    // Extract in batches and serialize
    let extractor = FakeExtractor::new();
    let batch_size = ExtractionConfig::default().batch_size;
    let records = extract_in_batches(&extractor, &listings, batch_size, &ctx)
        .await
        .unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].name, "Alpha");
    assert_eq!(records[2].name, "Gamma");

    let csv = records_to_csv(&records).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], Record::FIELD_NAMES.join(","));
    assert!(lines[1].starts_with("Alpha,4.5"));
}

#[tokio::test]
async fn test_progress_moves_through_scrolling_and_scraping() {
    let ctx = JobContext::new();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut rx = ctx.progress.subscribe();
    let seen_clone = seen.clone();
    let collector = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if let Some(event) = rx.borrow().clone() {
                seen_clone.lock().unwrap().push(event);
            }
        }
    });

    let surface = FakeSurface::new(3);
    run_scroll_loop(&surface, &fast_scroll_config(200), &ctx)
        .await
        .unwrap();

    let listings: Vec<String> = (0..7)
        .map(|i| format!("https://www.google.com/maps/place/{}", i))
        .collect();
    let extractor = FakeExtractor::new();
    extract_in_batches(&extractor, &listings, 5, &ctx)
        .await
        .unwrap();

    tokio::task::yield_now().await;
    collector.abort();

    let events = seen.lock().unwrap().clone();
    assert!(!events.is_empty());

    // Scrolling events never follow a scraping event
    let first_scraping = events
        .iter()
        .position(|e| e.status == ProgressStatus::Scraping)
        .expect("a scraping event was published");
    assert!(events[first_scraping..]
        .iter()
        .all(|e| e.status != ProgressStatus::Scrolling));

    // Scraping percentages are monotonic and finish at 100
    let percents: Vec<u32> = events
        .iter()
        .filter(|e| e.status == ProgressStatus::Scraping)
        .map(|e| e.progress)
        .collect();
    assert!(percents.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(*percents.last().unwrap(), 100);
}

#[tokio::test]
async fn test_cancelled_job_reports_stopped_and_skips_scrolling() {
    let ctx = JobContext::new();
    ctx.cancel.cancel();

    let surface = FakeSurface::new(3);
    let outcome = run_scroll_loop(&surface, &fast_scroll_config(200), &ctx)
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert_eq!(outcome.iterations, 0);
    assert_eq!(
        ctx.progress.current().unwrap().status,
        ProgressStatus::Stopped
    );
}

#[tokio::test]
async fn test_no_results_still_produces_header_only_csv() {
    let ctx = JobContext::new();

    let listings = harvest_place_links("<html><body><div role='feed'></div></body></html>");
    assert!(listings.is_empty());

    let extractor = FakeExtractor::new();
    let records = extract_in_batches(&extractor, &listings, 5, &ctx)
        .await
        .unwrap();
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);

    let csv = records_to_csv(&records).unwrap();
    assert_eq!(csv.lines().count(), 1);
    assert_eq!(csv.lines().next().unwrap(), Record::FIELD_NAMES.join(","));

    // Even with nothing to scrape the progress slot reaches 100
    let current = ctx.progress.current().unwrap();
    assert_eq!(current.status, ProgressStatus::Scraping);
    assert_eq!(current.progress, 100);
}

#[tokio::test]
async fn test_duplicate_listings_produce_duplicate_records() {
    let ctx = JobContext::new();

    let html = results_page_html(&["Twice", "Twice"]);
    let listings = harvest_place_links(&html);
    assert_eq!(listings.len(), 2);

    let extractor = FakeExtractor::new();
    let records = extract_in_batches(&extractor, &listings, 5, &ctx)
        .await
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0], records[1]);
}

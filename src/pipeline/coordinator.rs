//! Job orchestration - main pipeline logic
//!
//! This module contains the staged pipeline that runs one job end to end:
//! - Navigating to the results page and waiting for its scaffold
//! - Driving the scroll-exhaustion loop
//! - Harvesting detail-page links from the settled document
//! - Extracting every listing in bounded-concurrency batches
//! - Serializing the records as CSV
//!
//! Every stage error surfaces through the job's progress slot as a terminal
//! `error` event before propagating to the caller.

use crate::browser::BrowserSession;
use crate::config::ScraperConfig;
use crate::job::{JobContext, JobRequest};
use crate::output::records_to_csv;
use crate::pipeline::batch::extract_in_batches;
use crate::pipeline::extract::{wait_for_ready, PlaceExtractor};
use crate::pipeline::harvest::harvest_place_links;
use crate::pipeline::scroll::{run_scroll_loop, PageScrollSurface};
use crate::progress::ProgressEvent;
use crate::record::Record;
use crate::Result;
use std::time::Instant;
use tracing::{info, warn};

/// Everything a finished job produced
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// Records in listing order
    pub records: Vec<Record>,
    /// The records serialized as CSV, header row included
    pub csv: String,
    /// Detail-page links harvested from the results page
    pub listing_count: usize,
    /// Scroll iterations issued before the list settled
    pub scroll_iterations: u32,
}

/// Runs one job against a live browser session
///
/// On success the final published event is `completed`; on failure a
/// terminal `error` event carrying the failure message is published before
/// the error propagates. The session itself stays open; closing it is the
/// caller's responsibility.
pub async fn run_job(
    session: &BrowserSession,
    config: &ScraperConfig,
    request: &JobRequest,
    ctx: &JobContext,
) -> Result<JobOutcome> {
    match run_stages(session, config, request, ctx).await {
        Ok(outcome) => {
            ctx.progress.publish(ProgressEvent::completed());
            Ok(outcome)
        }
        Err(e) => {
            warn!("Job failed: {}", e);
            ctx.progress.publish(ProgressEvent::error(e.to_string()));
            Err(e)
        }
    }
}

async fn run_stages(
    session: &BrowserSession,
    config: &ScraperConfig,
    request: &JobRequest,
    ctx: &JobContext,
) -> Result<JobOutcome> {
    let started = Instant::now();

    request.validate()?;
    let target = request.normalized_url()?;
    info!("Starting job against {}", target);

    // Scope the search page so its tab closes before detail tabs open
    let (listings, scroll_iterations) = {
        let page = session.new_page("about:blank").await?;
        page.goto(target.as_str()).await?;
        page.wait_for_navigation().await?;

        wait_for_ready(
            &page,
            &config.scroll.container_selector,
            config.extraction.ready_timeout_secs,
            target.as_str(),
        )
        .await?;

        let surface = PageScrollSurface::locate(&page, &config.scroll.container_selector).await?;
        let outcome = run_scroll_loop(&surface, &config.scroll, ctx).await?;
        info!(
            iterations = outcome.iterations,
            end_reached = outcome.end_reached,
            cancelled = outcome.cancelled,
            "Scroll phase finished"
        );

        let html = page.content().await?;
        (harvest_place_links(&html), outcome.iterations)
    };

    info!("Harvested {} detail-page links", listings.len());

    let extractor = PlaceExtractor::new(session, &config.extraction);
    let records = extract_in_batches(
        &extractor,
        &listings,
        config.extraction.batch_size,
        ctx,
    )
    .await?;

    let csv = records_to_csv(&records)?;

    info!(
        "Job finished: {} records from {} listings in {:.1}s",
        records.len(),
        listings.len(),
        started.elapsed().as_secs_f64(),
    );

    Ok(JobOutcome {
        listing_count: listings.len(),
        scroll_iterations,
        records,
        csv,
    })
}

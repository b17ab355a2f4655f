//! Scroll exhaustion detection
//!
//! Drives the virtualized result list until the end-of-list marker appears,
//! the cancellation flag is raised, or a hard iteration cap is hit. Reaching
//! the cap is not an error; the pipeline proceeds with whatever has loaded.

use crate::config::ScrollConfig;
use crate::job::JobContext;
use crate::progress::ProgressEvent;
use crate::Result;
use chromiumoxide::Page;
use std::time::Duration;
use tracing::debug;

/// How a scroll run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOutcome {
    /// Scroll commands issued; reset to 0 when cancelled
    pub iterations: u32,
    /// The end-of-list marker was observed
    pub end_reached: bool,
    /// The cancellation flag interrupted the loop
    pub cancelled: bool,
}

/// The scrollable surface the exhaustion loop drives
///
/// Abstracted so the loop's termination logic is testable without a browser.
pub trait ScrollSurface {
    /// Issues one scroll-by-delta command on the surface
    fn scroll_by(&self, delta_px: u32) -> impl std::future::Future<Output = Result<()>>;

    /// Whether the page's visible text currently contains `marker`
    fn marker_visible(&self, marker: &str) -> impl std::future::Future<Output = Result<bool>>;
}

/// Runs the exhaustion loop over a scroll surface
///
/// Per iteration: check cancellation, scroll, re-check the marker, publish a
/// `scrolling` event carrying the iteration index. Cancellation resets the
/// iteration counter to 0 and publishes a `stopped` event before returning.
pub async fn run_scroll_loop<S: ScrollSurface>(
    surface: &S,
    config: &ScrollConfig,
    ctx: &JobContext,
) -> Result<ScrollOutcome> {
    let mut iterations: u32 = 0;

    while iterations < config.max_iterations {
        // Cancellation is only honored at iteration boundaries
        if ctx.cancel.is_cancelled() {
            debug!("scroll cancelled after {} iterations", iterations);
            ctx.progress.publish(ProgressEvent::stopped());
            return Ok(ScrollOutcome {
                iterations: 0,
                end_reached: false,
                cancelled: true,
            });
        }

        surface.scroll_by(config.scroll_delta_px).await?;
        let end_reached = surface.marker_visible(&config.end_marker).await?;

        ctx.progress.publish(ProgressEvent::scrolling(iterations));
        debug!(iteration = iterations, end_reached, "scroll");
        iterations += 1;

        if end_reached {
            return Ok(ScrollOutcome {
                iterations,
                end_reached: true,
                cancelled: false,
            });
        }

        if config.pause_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.pause_ms)).await;
        }
    }

    // Cap exhausted without seeing the marker; proceed with what loaded
    debug!(
        "scroll cap of {} reached without end marker",
        config.max_iterations
    );
    Ok(ScrollOutcome {
        iterations,
        end_reached: false,
        cancelled: false,
    })
}

/// A results-list container on a live page
pub struct PageScrollSurface<'a> {
    page: &'a Page,
    container_selector: &'a str,
}

impl<'a> PageScrollSurface<'a> {
    /// Binds to the scrollable container, failing immediately when the
    /// expected scaffolding is absent
    pub async fn locate(page: &'a Page, container_selector: &'a str) -> Result<Self> {
        if page.find_element(container_selector).await.is_err() {
            return Err(crate::HarvestError::ScrollSurfaceNotFound {
                selector: container_selector.to_string(),
            });
        }
        Ok(Self {
            page,
            container_selector,
        })
    }
}

impl ScrollSurface for PageScrollSurface<'_> {
    async fn scroll_by(&self, delta_px: u32) -> Result<()> {
        let js = format!(
            "(() => {{ const el = document.querySelector({selector:?}); \
             if (el) el.scrollBy(0, {delta}); }})()",
            selector = self.container_selector,
            delta = delta_px,
        );
        self.page.evaluate(js.as_str()).await?;
        Ok(())
    }

    async fn marker_visible(&self, marker: &str) -> Result<bool> {
        let js = format!("document.body.innerText.includes({:?})", marker);
        let result = self.page.evaluate(js.as_str()).await?;
        Ok(result.into_value::<bool>().unwrap_or(false))
    }
}

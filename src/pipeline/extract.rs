//! Detail-page field extraction
//!
//! The pipeline consumes field extraction through the [`DetailExtractor`]
//! trait so batching and ordering logic can be exercised with a fake. The
//! real implementation, [`PlaceExtractor`], opens one browser tab per
//! listing and resolves each field with a soft-fail lookup: an absent
//! element yields an empty string, never an error.

use crate::browser::BrowserSession;
use crate::config::ExtractionConfig;
use crate::record::{strip_review_parens, Record};
use crate::{HarvestError, Result};
use chromiumoxide::Page;
use std::time::{Duration, Instant};
use tracing::debug;

/// Selectors for the individual record fields on a detail page
mod selectors {
    pub const NAME: &str = "div[role='main'] h1";
    pub const RATING: &str = "div.F7nice span[aria-hidden='true']";
    pub const REVIEWS: &str = "div.F7nice span[aria-label*='review']";
    pub const CATEGORY: &str = "button[jsaction*='category']";
    pub const ADDRESS: &str = "button[data-tooltip='Copy address']";
    pub const WEBSITE: &str = "a[data-tooltip='Open website']";
    pub const MENU_LINK: &str = "a[data-tooltip='Open menu link']";
    pub const PHONE: &str = "button[data-tooltip='Copy phone number']";
}

/// Produces one [`Record`] per listing URL
pub trait DetailExtractor {
    /// Extracts the record behind a single detail-page URL
    ///
    /// A fault here aborts the whole job; only missing fields are recovered.
    fn extract(&self, url: &str) -> impl std::future::Future<Output = Result<Record>>;
}

/// Polls until `selector` is present, failing after the timeout
///
/// Navigation completion alone is not enough: the detail page renders its
/// scaffold through JavaScript after the HTTP response arrives.
pub async fn wait_for_ready(
    page: &Page,
    selector: &str,
    timeout_secs: u64,
    url: &str,
) -> Result<()> {
    let deadline = Duration::from_secs(timeout_secs);
    let poll_interval = Duration::from_millis(100);
    let start = Instant::now();

    loop {
        if page.find_element(selector).await.is_ok() {
            debug!(url, elapsed = ?start.elapsed(), "page ready");
            return Ok(());
        }

        if start.elapsed() >= deadline {
            return Err(HarvestError::PageNotReady {
                url: url.to_string(),
                selector: selector.to_string(),
                timeout_secs,
            });
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Inner text of the first element matching `selector`, or `""`
///
/// Missing elements and failed text reads both resolve to the empty string;
/// a partially populated record beats a dropped listing.
async fn text_field(page: &Page, selector: &str) -> String {
    match page.find_element(selector).await {
        Ok(element) => element
            .inner_text()
            .await
            .ok()
            .flatten()
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// An attribute of the first element matching `selector`, or `""`
async fn attr_field(page: &Page, selector: &str, attribute: &str) -> String {
    match page.find_element(selector).await {
        Ok(element) => element
            .attribute(attribute)
            .await
            .ok()
            .flatten()
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// Field extractor backed by a live browser session
pub struct PlaceExtractor<'a> {
    session: &'a BrowserSession,
    config: &'a ExtractionConfig,
}

impl<'a> PlaceExtractor<'a> {
    pub fn new(session: &'a BrowserSession, config: &'a ExtractionConfig) -> Self {
        Self { session, config }
    }

    async fn read_fields(&self, page: &Page, url: &str) -> Record {
        let name = text_field(page, selectors::NAME).await;
        let rating = text_field(page, selectors::RATING).await;
        let reviews = strip_review_parens(&text_field(page, selectors::REVIEWS).await);
        let category = text_field(page, selectors::CATEGORY).await;
        let address = text_field(page, selectors::ADDRESS).await;
        let phone = text_field(page, selectors::PHONE).await;

        // Restaurants expose a menu link where other listings expose a
        // website link
        let mut website = attr_field(page, selectors::WEBSITE, "href").await;
        if website.is_empty() {
            website = attr_field(page, selectors::MENU_LINK, "href").await;
        }

        Record {
            name,
            rating,
            reviews,
            category,
            address,
            website,
            phone,
            url: url.to_string(),
        }
    }
}

impl DetailExtractor for PlaceExtractor<'_> {
    async fn extract(&self, url: &str) -> Result<Record> {
        // Guard closes the tab on every exit path
        let page = self.session.new_page("about:blank").await?;
        page.goto(url).await?;
        page.wait_for_navigation().await?;
        wait_for_ready(
            &page,
            &self.config.ready_selector,
            self.config.ready_timeout_secs,
            url,
        )
        .await?;

        let record = self.read_fields(&page, url).await;
        debug!(url, name = %record.name, "extracted record");
        Ok(record)
    }
}

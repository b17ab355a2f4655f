//! Link harvesting from the loaded results page
//!
//! Once scrolling has stabilized, every hyperlink currently in the document
//! is enumerated and the subset pointing at detail pages is kept. The
//! harvester deliberately does not deduplicate; the record sequence mirrors
//! the listing sequence one-to-one.

use scraper::{Html, Selector};

/// URL prefix identifying a business detail page
pub const PLACE_URL_PREFIX: &str = "https://www.google.com/maps/place/";

/// Extracts detail-page links from page HTML, in document order
///
/// Returns an empty vector when nothing matches; downstream stages handle
/// the empty sequence without failing.
///
/// # Arguments
///
/// * `html` - Full HTML of the scrolled results page
/// * `prefix` - Detail-page URL prefix to keep
pub fn harvest_links(html: &str, prefix: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let anchor_selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&anchor_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| href.starts_with(prefix))
        .map(str::to_string)
        .collect()
}

/// Convenience wrapper using the fixed detail-page prefix
pub fn harvest_place_links(html: &str) -> Vec<String> {
    harvest_links(html, PLACE_URL_PREFIX)
}

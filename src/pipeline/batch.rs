//! Bounded-concurrency batch extraction
//!
//! Listings are processed in contiguous batches of a fixed size. Within a
//! batch every extraction runs concurrently and the batch's results are
//! appended in input order; batches themselves run strictly sequentially,
//! which bounds how many browser tabs exist at once.

use crate::job::JobContext;
use crate::pipeline::extract::DetailExtractor;
use crate::progress::ProgressEvent;
use crate::record::Record;
use crate::Result;
use futures::future::try_join_all;
use tracing::{debug, info};

/// Extracts every listing, preserving order across concurrent batches
///
/// Publishes a `scraping` progress event after each completed batch with the
/// rounded percentage of listings processed. A fault in any single extraction
/// aborts the whole run; there are no per-item retries and no partial
/// results.
pub async fn extract_in_batches<E: DetailExtractor>(
    extractor: &E,
    listings: &[String],
    batch_size: usize,
    ctx: &JobContext,
) -> Result<Vec<Record>> {
    let total = listings.len();
    let mut records: Vec<Record> = Vec::with_capacity(total);

    if total == 0 {
        // Nothing to scrape; progress still has to reach 100
        ctx.progress.publish(ProgressEvent::scraping(100));
        return Ok(records);
    }

    for (batch_index, batch) in listings.chunks(batch_size).enumerate() {
        let futures: Vec<_> = batch.iter().map(|url| extractor.extract(url)).collect();

        // try_join_all preserves input order regardless of completion order
        let batch_records = try_join_all(futures).await?;
        records.extend(batch_records);

        let percent = (records.len() as f64 / total as f64 * 100.0).round() as u32;
        ctx.progress.publish(ProgressEvent::scraping(percent));
        debug!(
            batch = batch_index + 1,
            processed = records.len(),
            total,
            percent,
            "batch completed"
        );
    }

    info!("extracted {} records from {} listings", records.len(), total);
    Ok(records)
}

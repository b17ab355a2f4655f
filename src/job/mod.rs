//! Job lifecycle: request validation, per-job context, admission control
//!
//! The progress slot and the cancellation flag are deliberately per-job state
//! carried in a [`JobContext`], not process globals, so two jobs can never
//! corrupt each other's progress. The browser is still a heavyweight shared
//! resource, so [`JobSlot`] admits at most one job at a time.

use crate::progress::ProgressPublisher;
use crate::{HarvestError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use url::Url;

/// Query parameter pinned on the target URL so field labels and the
/// end-of-list marker render in a known language
const LOCALE_PARAM: &str = "hl";
const LOCALE_VALUE: &str = "en";

/// A request to run one extraction job
///
/// Created per request, lives for the duration of one pipeline run, and is
/// never persisted.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Filename hint for the produced CSV
    pub output_name: String,
    /// Map-search results page to harvest
    pub target_url: String,
}

impl JobRequest {
    pub fn new(output_name: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            output_name: output_name.into(),
            target_url: target_url.into(),
        }
    }

    /// Validates that both required fields are present and the URL parses
    pub fn validate(&self) -> Result<()> {
        if self.output_name.trim().is_empty() {
            return Err(HarvestError::InvalidRequest(
                "output name is required".to_string(),
            ));
        }

        if self.target_url.trim().is_empty() {
            return Err(HarvestError::InvalidRequest(
                "target URL is required".to_string(),
            ));
        }

        let url = Url::parse(self.target_url.trim())
            .map_err(|e| HarvestError::InvalidRequest(format!("invalid target URL: {}", e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(HarvestError::InvalidRequest(format!(
                "target URL must be http(s), got '{}'",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// The target URL with the language parameter forced to a fixed value
    ///
    /// Any existing `hl` parameter is replaced; other query parameters are
    /// kept as-is.
    pub fn normalized_url(&self) -> Result<Url> {
        let mut url = Url::parse(self.target_url.trim())?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| key != LOCALE_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(LOCALE_PARAM, LOCALE_VALUE);

        Ok(url)
    }
}

/// Cooperative cancellation flag
///
/// Checked only at scroll-loop iteration boundaries; raising it mid-batch has
/// no effect on extraction already under way.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-job state threaded through every pipeline stage
#[derive(Debug, Clone, Default)]
pub struct JobContext {
    pub progress: ProgressPublisher,
    pub cancel: CancelToken,
}

impl JobContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Admission lock limiting the process to one active job
///
/// The browser session and its pages assume a single job in flight;
/// a second concurrent request is rejected rather than interleaved.
#[derive(Debug, Clone)]
pub struct JobSlot {
    inner: Arc<Mutex<()>>,
}

impl JobSlot {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(())),
        }
    }

    /// Acquires the slot, failing immediately if a job is already running
    pub fn try_acquire(&self) -> Result<OwnedMutexGuard<()>> {
        self.inner
            .clone()
            .try_lock_owned()
            .map_err(|_| HarvestError::JobInFlight)
    }
}

impl Default for JobSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_output_name_rejected() {
        let request = JobRequest::new("", "https://www.google.com/maps/search/cafes");
        assert!(matches!(
            request.validate(),
            Err(HarvestError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_missing_target_url_rejected() {
        let request = JobRequest::new("cafes.csv", "  ");
        assert!(matches!(
            request.validate(),
            Err(HarvestError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let request = JobRequest::new("out.csv", "ftp://example.com/maps");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_valid_request_accepted() {
        let request = JobRequest::new("cafes.csv", "https://www.google.com/maps/search/cafes");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_locale_parameter_is_appended() {
        let request = JobRequest::new("out.csv", "https://www.google.com/maps/search/cafes");
        let url = request.normalized_url().unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "hl" && v == "en"));
    }

    #[test]
    fn test_existing_locale_parameter_is_replaced() {
        let request = JobRequest::new(
            "out.csv",
            "https://www.google.com/maps/search/cafes?hl=de&foo=bar",
        );
        let url = request.normalized_url().unwrap();

        let locales: Vec<_> = url.query_pairs().filter(|(k, _)| k == "hl").collect();
        assert_eq!(locales.len(), 1);
        assert_eq!(locales[0].1, "en");
        // Unrelated parameters survive
        assert!(url.query_pairs().any(|(k, v)| k == "foo" && v == "bar"));
    }

    #[test]
    fn test_cancel_token_round_trip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_job_slot_admits_one_job() {
        let slot = JobSlot::new();
        let guard = slot.try_acquire().expect("first job should be admitted");
        assert!(matches!(
            slot.try_acquire(),
            Err(HarvestError::JobInFlight)
        ));
        drop(guard);
        assert!(slot.try_acquire().is_ok());
    }
}

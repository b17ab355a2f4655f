//! Job progress publishing
//!
//! A job has exactly one "current" progress event at a time. The publisher is
//! a single slot with last-write-wins semantics: writers overwrite freely, and
//! a consumer polling slower than the pipeline updates simply misses the
//! intermediate events. `tokio::sync::watch` implements exactly this contract.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Job lifecycle states surfaced to progress consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    /// Driving the result list toward exhaustion; progress is the scroll
    /// iteration index
    Scrolling,
    /// Extracting detail pages; progress is percent of listings processed
    Scraping,
    /// Terminal: CSV produced
    Completed,
    /// Scrolling was cancelled; the job continues with what loaded
    Stopped,
    /// Terminal: job failed
    Error,
}

/// A status/progress snapshot published during a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub status: ProgressStatus,
    /// Iteration index while scrolling (may exceed 100), percent 0-100
    /// while scraping
    pub progress: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn scrolling(iteration: u32) -> Self {
        Self {
            status: ProgressStatus::Scrolling,
            progress: iteration,
            message: None,
        }
    }

    pub fn scraping(percent: u32) -> Self {
        Self {
            status: ProgressStatus::Scraping,
            progress: percent,
            message: None,
        }
    }

    pub fn completed() -> Self {
        Self {
            status: ProgressStatus::Completed,
            progress: 100,
            message: None,
        }
    }

    pub fn stopped() -> Self {
        Self {
            status: ProgressStatus::Stopped,
            progress: 0,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ProgressStatus::Error,
            progress: 0,
            message: Some(message.into()),
        }
    }

    /// Terminal events end the progress stream for external consumers
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            ProgressStatus::Completed | ProgressStatus::Error
        )
    }
}

/// Single-slot, last-write-wins progress publisher
///
/// Unset (`None`) until the job publishes its first event; never cleared
/// after a terminal event - the next job's publisher is a fresh instance.
#[derive(Debug, Clone)]
pub struct ProgressPublisher {
    tx: Arc<watch::Sender<Option<ProgressEvent>>>,
}

impl ProgressPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Overwrites the current event. Succeeds even with no subscribers.
    pub fn publish(&self, event: ProgressEvent) {
        tracing::debug!(status = ?event.status, progress = event.progress, "progress");
        self.tx.send_replace(Some(event));
    }

    /// Subscribes to the slot; the receiver observes the latest value only
    pub fn subscribe(&self) -> watch::Receiver<Option<ProgressEvent>> {
        self.tx.subscribe()
    }

    /// Snapshot of the current event, if any has been published yet
    pub fn current(&self) -> Option<ProgressEvent> {
        self.tx.borrow().clone()
    }
}

impl Default for ProgressPublisher {
    fn default() -> Self {
        Self::new()
    }
}

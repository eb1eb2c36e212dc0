//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::SubmissionQueue;
use crate::sources::config::CompareSettings;
use crate::sources::PriceSource;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn PriceSource>,
    pub submissions: SubmissionQueue,
    pub compare: CompareSettings,
}

impl AppState {
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            submissions: SubmissionQueue::new(),
            compare: CompareSettings::default(),
        }
    }

    pub fn with_submissions(mut self, submissions: SubmissionQueue) -> Self {
        self.submissions = submissions;
        self
    }

    pub fn with_compare_settings(mut self, compare: CompareSettings) -> Self {
        self.compare = compare;
        self
    }
}

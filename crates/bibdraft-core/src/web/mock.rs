//! Mock web importer for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{ImportFuture, StatusEvent, StatusSink, WebContent, WebImporter};
use crate::{ExtractError, PaperDraft};

/// A configurable mock response for [`MockImporter`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    Found(PaperDraft),
    NotApplicable,
    /// A strategy-local failure, surfaced as [`ExtractError::Parse`].
    Error(String),
    ContractViolation,
}

/// A hand-rolled mock implementing [`WebImporter`] with call counting.
pub struct MockImporter {
    name: &'static str,
    response: MockResponse,
    call_count: AtomicUsize,
}

impl MockImporter {
    pub fn new(name: &'static str, response: MockResponse) -> Self {
        Self {
            name,
            response,
            call_count: AtomicUsize::new(0),
        }
    }

    /// How many times `parse()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl WebImporter for MockImporter {
    fn name(&self) -> &str {
        self.name
    }

    fn parse<'a>(
        &'a self,
        _content: &'a WebContent,
        _client: &'a reqwest::Client,
    ) -> ImportFuture<'a> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let response = self.response.clone();
        Box::pin(async move {
            match response {
                MockResponse::Found(draft) => Ok(Some(draft)),
                MockResponse::NotApplicable => Ok(None),
                MockResponse::Error(msg) => Err(ExtractError::Parse(msg)),
                MockResponse::ContractViolation => Err(ExtractError::GateDisabled {
                    scraper: self.name.to_string(),
                }),
            }
        })
    }
}

/// A status sink that keeps every event it receives.
pub fn recording_status() -> (StatusSink, Arc<Mutex<Vec<StatusEvent>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = Arc::clone(&events);
    let sink: StatusSink = Arc::new(move |event| sink_events.lock().unwrap().push(event));
    (sink, events)
}

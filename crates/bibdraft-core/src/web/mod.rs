//! Site-specific importers for already-fetched web content, and the chain
//! that tries them in order.

pub mod arxiv;
pub mod chain;
pub mod embed;
pub mod google_scholar;
pub mod ieee;
#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::{ExtractError, PaperDraft};

pub use chain::WebImporterChain;

/// A page the host application has already loaded.
#[derive(Debug, Clone, Default)]
pub struct WebContent {
    /// Origin URL of the page.
    pub url: String,
    /// Raw markup.
    pub document: String,
}

impl WebContent {
    pub fn new(url: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            document: document.into(),
        }
    }
}

/// Boxed future returned by [`WebImporter::parse`].
pub type ImportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<PaperDraft>, ExtractError>> + Send + 'a>>;

/// A web importer folds gate, fetch and parse into one attempt.
///
/// `Ok(None)` means the importer does not apply to this content. `Ok(Some)`
/// is a match and ends the chain. Any error other than a contract violation
/// is treated as local to this importer.
pub trait WebImporter: Send + Sync {
    /// The canonical name of this importer (e.g., "arxiv", "ieee").
    fn name(&self) -> &str;

    fn parse<'a>(&'a self, content: &'a WebContent, client: &'a reqwest::Client)
    -> ImportFuture<'a>;
}

/// Non-fatal failures published by the web chain. Matches are only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// An importer failed; the chain moved on.
    ImporterFailed { importer: String, message: String },
}

impl std::fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusEvent::ImporterFailed { importer, message } => {
                write!(f, "Web importer {} error: {}", importer, message)
            }
        }
    }
}

/// External status channel.
pub type StatusSink = Arc<dyn Fn(StatusEvent) + Send + Sync>;

/// A sink that discards every event.
pub fn silent_status() -> StatusSink {
    Arc::new(|_| {})
}

/// Collapse runs of whitespace (including line breaks) into single spaces.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract a four-digit year from free text.
pub(crate) fn find_year(s: &str) -> Option<String> {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(1[89]\d{2}|20\d{2})\b").unwrap());
    YEAR_RE.find(s).map(|m| m.as_str().to_string())
}

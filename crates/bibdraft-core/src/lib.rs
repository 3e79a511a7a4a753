use thiserror::Error;

pub mod config_file;
pub mod draft;
pub mod identifiers;
pub mod path;
pub mod pdf;
pub mod pipeline;
pub mod preference;
pub mod scraper;
pub mod web;

// Re-export for convenience
pub use draft::{Field, PaperDraft, PubType};
pub use identifiers::{extract_arxiv_id, extract_doi};
pub use pdf::{PdfBackend, PdfFirstPage, PdfMetadata, PdfScraper, TextRun};
pub use pipeline::{Extracted, Pipeline, Source};
pub use preference::{PreferenceValue, Preferences};
pub use scraper::{ScrapeRequest, Scraper, run_scraper};
pub use web::{StatusEvent, StatusSink, WebContent, WebImporter, WebImporterChain};

/// Errors raised by a [`PdfBackend`] while reading a document.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("document has no pages")]
    NoPages,
}

#[derive(Error, Debug)]
pub enum ExtractError {
    /// `fetch` was called on a request whose gate said no. This is a bug in
    /// the caller, never a property of the source.
    #[error("{scraper}: fetch invoked on a disabled request")]
    GateDisabled { scraper: String },
    #[error("PDF backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },
    #[error("malformed response: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ExtractError {
    /// Programmer errors must escape every chain; everything else is a
    /// failure of one strategy against one source.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, ExtractError::GateDisabled { .. })
    }
}

//! First-page PDF extraction: backend contract, layout heuristics and the
//! built-in PDF scraper.

use std::path::Path;

use crate::BackendError;

pub mod layout;
#[cfg(test)]
pub(crate) mod mock;
pub mod scraper;

pub use layout::{dominant_text, page_text};
pub use scraper::{PdfFileResponse, PdfScraper};

/// One run of text as laid out on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Rendered glyph height, in page units.
    pub height: f32,
    /// Vertical position of the run's baseline.
    pub baseline: f32,
}

impl TextRun {
    pub fn new(text: impl Into<String>, height: f32, baseline: f32) -> Self {
        Self {
            text: text.into(),
            height,
            baseline,
        }
    }
}

/// Document-level info dictionary fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// What a backend reads from a document: its metadata and the runs of its
/// first page, in content-stream order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfFirstPage {
    pub metadata: PdfMetadata,
    pub runs: Vec<TextRun>,
}

/// Trait for PDF structural parsers.
///
/// Implementors open the document and report the first page's text runs;
/// the title and identifier heuristics live in [`PdfScraper`]. Called from a
/// blocking worker thread.
pub trait PdfBackend: Send + Sync {
    /// Read metadata and first-page runs. A document without pages is
    /// [`BackendError::NoPages`].
    fn read_first_page(&self, path: &Path) -> Result<PdfFirstPage, BackendError>;
}

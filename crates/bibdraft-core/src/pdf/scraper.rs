use std::path::PathBuf;
use std::sync::Arc;

use reqwest::header::HeaderMap;

use super::{PdfBackend, PdfMetadata, dominant_text, page_text};
use crate::identifiers::{extract_arxiv_id, extract_doi};
use crate::path::{has_pdf_extension, resolve_locator};
use crate::scraper::{FetchFuture, ScrapeRequest, Scraper};
use crate::{ExtractError, Field, PaperDraft, Preferences};

/// What [`PdfScraper::fetch`] reads from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfFileResponse {
    pub metadata: PdfMetadata,
    pub first_page_text: String,
    pub dominant_text: String,
}

/// Built-in scraper for PDFs stored in the library.
pub struct PdfScraper {
    backend: Arc<dyn PdfBackend>,
    prefs: Arc<Preferences>,
}

impl PdfScraper {
    pub fn new(backend: Arc<dyn PdfBackend>, prefs: Arc<Preferences>) -> Self {
        Self { backend, prefs }
    }
}

impl Scraper for PdfScraper {
    type Response = PdfFileResponse;

    fn name(&self) -> &str {
        "pdf"
    }

    fn gate(&self, draft: &PaperDraft) -> ScrapeRequest {
        let main_url = draft.main_url.as_deref().unwrap_or("");
        let path = resolve_locator(main_url, &self.prefs.app_lib_folder);

        let enabled = !main_url.is_empty()
            && self.prefs.pdf_builtin_scraper
            && has_pdf_extension(&path)
            && path.is_file();

        ScrapeRequest {
            locator: path.to_string_lossy().into_owned(),
            headers: HeaderMap::new(),
            enabled,
        }
    }

    fn fetch<'a>(&'a self, request: &'a ScrapeRequest) -> FetchFuture<'a, PdfFileResponse> {
        Box::pin(async move {
            if !request.enabled {
                return Err(ExtractError::GateDisabled {
                    scraper: self.name().to_string(),
                });
            }

            // MuPDF is synchronous; keep it off the async workers
            let backend = Arc::clone(&self.backend);
            let path = PathBuf::from(&request.locator);
            let page = tokio::task::spawn_blocking(move || backend.read_first_page(&path)).await??;

            tracing::debug!(
                locator = %request.locator,
                runs = page.runs.len(),
                "read first page"
            );

            Ok(PdfFileResponse {
                first_page_text: page_text(&page.runs),
                dominant_text: dominant_text(&page.runs),
                metadata: page.metadata,
            })
        })
    }

    fn parse(&self, response: PdfFileResponse, mut draft: PaperDraft) -> PaperDraft {
        if let Some(title) = non_empty(response.metadata.title) {
            draft.set_value(Field::Title, title);
        }
        if let Some(author) = non_empty(response.metadata.author) {
            draft.set_value(Field::Authors, author);
        }

        let arxiv = extract_arxiv_id(&response.first_page_text);
        if let Some(ref id) = arxiv {
            draft.set_value(Field::Arxiv, id.clone());
        }

        let doi = extract_doi(&response.first_page_text);
        if let Some(ref doi) = doi {
            draft.set_value(Field::Doi, doi.clone());
        }

        // Without an identifier the metadata title is rarely trustworthy
        if arxiv.is_none() && doi.is_none() && !response.dominant_text.is_empty() {
            draft.set_value(Field::Title, response.dominant_text);
        }

        draft
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

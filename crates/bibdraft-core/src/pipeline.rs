//! Chain selection and dispatch for one extraction.

use std::sync::Arc;

use crate::pdf::{PdfBackend, PdfFileResponse, PdfScraper};
use crate::scraper::{Scraped, Scraper, run_scraper};
use crate::web::{StatusSink, WebContent, WebImporterChain};
use crate::{ExtractError, PaperDraft, Preferences};

/// Scrapers that read a PDF named by the draft.
pub type PdfScraperChain = Vec<Arc<dyn Scraper<Response = PdfFileResponse>>>;

/// What to extract from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A draft whose `main_url` names a file in the library.
    Pdf(PaperDraft),
    /// A page the host has already fetched.
    Web(WebContent),
}

impl Source {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Pdf(_) => "pdf",
            Source::Web(_) => "web",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Draft(PaperDraft),
    /// Every web importer declined or failed.
    NoMatch,
}

impl Extracted {
    pub fn into_draft(self) -> Option<PaperDraft> {
        match self {
            Extracted::Draft(d) => Some(d),
            Extracted::NoMatch => None,
        }
    }
}

/// Owns the strategy registry and the shared HTTP client.
///
/// Read-only after construction; share it behind an `Arc` to run
/// independent extractions concurrently.
pub struct Pipeline {
    pdf_scrapers: PdfScraperChain,
    web: WebImporterChain,
    client: reqwest::Client,
}

impl Pipeline {
    /// The built-in registry: the PDF scraper over `backend`, and the
    /// standard web importer chain.
    pub fn new(
        prefs: Arc<Preferences>,
        backend: Arc<dyn PdfBackend>,
        status: StatusSink,
    ) -> Result<Self, ExtractError> {
        let client = prefs.http_client()?;
        let pdf_scrapers: PdfScraperChain =
            vec![Arc::new(PdfScraper::new(backend, Arc::clone(&prefs)))];
        let web = WebImporterChain::standard(prefs, status);
        Ok(Self::with_chains(pdf_scrapers, web, client))
    }

    pub fn with_chains(
        pdf_scrapers: PdfScraperChain,
        web: WebImporterChain,
        client: reqwest::Client,
    ) -> Self {
        Self {
            pdf_scrapers,
            web,
            client,
        }
    }

    pub fn web_chain(&self) -> &WebImporterChain {
        &self.web
    }

    /// Run the chain for `source`'s kind.
    ///
    /// A PDF draft no scraper applies to comes back unchanged. Fetch errors
    /// and contract violations are returned; web importer failures are
    /// reported on the status channel and never returned.
    pub async fn extract(&self, source: Source) -> Result<Extracted, ExtractError> {
        tracing::debug!(kind = source.kind(), "extracting");
        match source {
            Source::Pdf(draft) => self.extract_pdf(draft).await.map(Extracted::Draft),
            Source::Web(content) => Ok(match self.web.parse(&content, &self.client).await? {
                Some(draft) => Extracted::Draft(draft),
                None => {
                    tracing::info!(url = %content.url, "no web importer matched");
                    Extracted::NoMatch
                }
            }),
        }
    }

    async fn extract_pdf(&self, mut draft: PaperDraft) -> Result<PaperDraft, ExtractError> {
        for scraper in &self.pdf_scrapers {
            match run_scraper(scraper.as_ref(), draft).await? {
                Scraped::Parsed(parsed) => return Ok(parsed),
                Scraped::Skipped(unchanged) => draft = unchanged,
            }
        }
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::mock::MockBackend;
    use crate::pdf::{PdfFirstPage, PdfMetadata, TextRun};
    use crate::web::WebImporter;
    use crate::web::mock::{MockImporter, MockResponse, recording_status};
    use crate::{BackendError, Field};

    fn page() -> PdfFirstPage {
        PdfFirstPage {
            metadata: PdfMetadata::default(),
            runs: vec![
                TextRun::new("Learning to Rank", 18.0, 100.0),
                TextRun::new("doi:10.1145/1273496.1273513", 9.0, 700.0),
            ],
        }
    }

    fn lib_with_pdf() -> (tempfile::TempDir, Arc<Preferences>) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("paper.pdf"), b"%PDF-1.4").unwrap();
        let prefs = Arc::new(Preferences {
            app_lib_folder: dir.path().to_path_buf(),
            ..Preferences::default()
        });
        (dir, prefs)
    }

    fn pipeline_with(
        backend: Arc<MockBackend>,
        prefs: Arc<Preferences>,
        importers: Vec<Arc<dyn WebImporter>>,
        status: StatusSink,
    ) -> Pipeline {
        let pdf: PdfScraperChain = vec![Arc::new(PdfScraper::new(backend, prefs))];
        Pipeline::with_chains(
            pdf,
            WebImporterChain::new(importers, status),
            reqwest::Client::new(),
        )
    }

    #[tokio::test]
    async fn pdf_source_is_scraped() {
        let (_dir, prefs) = lib_with_pdf();
        let backend = Arc::new(MockBackend::new(page()));
        let (status, _) = recording_status();
        let pipeline = pipeline_with(backend.clone(), prefs, vec![], status);

        let out = pipeline
            .extract(Source::Pdf(PaperDraft::with_main_url("paper.pdf")))
            .await
            .unwrap()
            .into_draft()
            .unwrap();
        assert_eq!(out.doi.as_deref(), Some("10.1145/1273496.1273513"));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn pdf_without_applicable_scraper_is_unchanged() {
        let (_dir, prefs) = lib_with_pdf();
        let backend = Arc::new(MockBackend::new(page()));
        let (status, _) = recording_status();
        let pipeline = pipeline_with(backend.clone(), prefs, vec![], status);

        let mut draft = PaperDraft::with_main_url("missing.pdf");
        draft.set_value(Field::Title, "Kept");
        let out = pipeline.extract(Source::Pdf(draft.clone())).await.unwrap();
        assert_eq!(out, Extracted::Draft(draft));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn pdf_backend_failure_escapes() {
        let (_dir, prefs) = lib_with_pdf();
        let (status, events) = recording_status();
        let pipeline = pipeline_with(Arc::new(MockBackend::failing()), prefs, vec![], status);

        let err = pipeline
            .extract(Source::Pdf(PaperDraft::with_main_url("paper.pdf")))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Backend(BackendError::OpenError(_))));
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn web_source_runs_importer_chain() {
        let (_dir, prefs) = lib_with_pdf();
        let mut found = PaperDraft::new();
        found.set_value(Field::Title, "From embed");
        let first = Arc::new(MockImporter::new("arxiv", MockResponse::NotApplicable));
        let second = Arc::new(MockImporter::new("embed", MockResponse::Found(found.clone())));
        let importers: Vec<Arc<dyn WebImporter>> = vec![first.clone(), second.clone()];
        let (status, events) = recording_status();
        let pipeline = pipeline_with(Arc::new(MockBackend::new(page())), prefs, importers, status);

        let out = pipeline
            .extract(Source::Web(WebContent::new("https://example.org", "<html></html>")))
            .await
            .unwrap();
        assert_eq!(out, Extracted::Draft(found));
        assert_eq!(first.call_count(), 1);
        assert_eq!(second.call_count(), 1);
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn web_source_without_match_is_no_match() {
        let (_dir, prefs) = lib_with_pdf();
        let importers: Vec<Arc<dyn WebImporter>> = vec![Arc::new(MockImporter::new(
            "ieee",
            MockResponse::Error("boom".into()),
        ))];
        let (status, events) = recording_status();
        let pipeline = pipeline_with(Arc::new(MockBackend::new(page())), prefs, importers, status);

        let out = pipeline
            .extract(Source::Web(WebContent::new("https://example.org", "")))
            .await
            .unwrap();
        assert_eq!(out, Extracted::NoMatch);
        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    fn standard_registry_order() {
        let (_dir, prefs) = lib_with_pdf();
        let (status, _) = recording_status();
        let pipeline =
            Pipeline::new(prefs, Arc::new(MockBackend::new(page())), status).unwrap();
        assert_eq!(
            pipeline.web_chain().names(),
            vec!["arxiv", "googlescholar", "ieee", "embed"]
        );
    }
}

//! The gate → fetch → parse contract shared by locator-based strategies.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::HeaderMap;

use crate::{ExtractError, PaperDraft};

/// Boxed future returned by [`Scraper::fetch`].
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ExtractError>> + Send + 'a>>;

/// What a scraper's gate decided for one draft.
#[derive(Debug, Clone, Default)]
pub struct ScrapeRequest {
    /// Where `fetch` reads from: a resolved file path or a URL.
    pub locator: String,
    pub headers: HeaderMap,
    pub enabled: bool,
}

impl ScrapeRequest {
    pub fn disabled(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            headers: HeaderMap::new(),
            enabled: false,
        }
    }
}

/// A strategy that reads a source named by the draft and refines the draft.
///
/// The three phases always run in order for a given draft. Only `fetch`
/// performs I/O; `gate` may at most check that a file exists.
pub trait Scraper: Send + Sync {
    type Response: Send;

    /// Canonical strategy name used in logs and errors.
    fn name(&self) -> &str;

    /// Decide whether this scraper applies to `draft` and where to read from.
    fn gate(&self, draft: &PaperDraft) -> ScrapeRequest;

    /// Read the source. Must fail with [`ExtractError::GateDisabled`] when
    /// called on a disabled request.
    fn fetch<'a>(&'a self, request: &'a ScrapeRequest) -> FetchFuture<'a, Self::Response>;

    /// Fold `response` into `draft`. No I/O.
    fn parse(&self, response: Self::Response, draft: PaperDraft) -> PaperDraft;
}

/// Outcome of driving one scraper over a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scraped {
    /// The gate said no; the draft is untouched.
    Skipped(PaperDraft),
    Parsed(PaperDraft),
}

impl Scraped {
    pub fn into_draft(self) -> PaperDraft {
        match self {
            Scraped::Skipped(d) | Scraped::Parsed(d) => d,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Scraped::Parsed(_))
    }
}

/// Run gate, then fetch and parse if the gate allows it.
///
/// Fetch errors are returned unchanged.
pub async fn run_scraper<S>(scraper: &S, draft: PaperDraft) -> Result<Scraped, ExtractError>
where
    S: Scraper + ?Sized,
{
    let request = scraper.gate(&draft);
    if !request.enabled {
        tracing::debug!(
            scraper = scraper.name(),
            locator = %request.locator,
            "gate closed, skipping"
        );
        return Ok(Scraped::Skipped(draft));
    }

    tracing::debug!(scraper = scraper.name(), locator = %request.locator, "fetching");
    let response = scraper.fetch(&request).await?;
    Ok(Scraped::Parsed(scraper.parse(response, draft)))
}

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{ImportFuture, WebContent, WebImporter, collapse_whitespace};
use crate::{ExtractError, Field, PaperDraft, Preferences, PubType};

static IEEE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://ieeexplore\.ieee\.org/(?:abstract/)?document/\d+").unwrap()
});

const METADATA_MARKER: &str = "xplGlobal.document.metadata";

/// Importer for IEEE Xplore document pages.
///
/// Xplore pages carry the full record as a JSON object assigned to
/// `xplGlobal.document.metadata` in an inline script.
pub struct IeeeImporter {
    prefs: Arc<Preferences>,
}

impl IeeeImporter {
    pub fn new(prefs: Arc<Preferences>) -> Self {
        Self { prefs }
    }

    fn gate(&self, content: &WebContent) -> bool {
        self.prefs.importer_enabled(self.name()) && IEEE_URL_RE.is_match(&content.url)
    }
}

impl WebImporter for IeeeImporter {
    fn name(&self) -> &str {
        "ieee"
    }

    fn parse<'a>(
        &'a self,
        content: &'a WebContent,
        _client: &'a reqwest::Client,
    ) -> ImportFuture<'a> {
        Box::pin(async move {
            if !self.gate(content) {
                return Ok(None);
            }
            let metadata = parse_document_metadata(&content.document)?;
            Ok(Some(metadata.into_draft(&content.url)?))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IeeeMetadata {
    pub title: Option<String>,
    #[serde(default)]
    pub authors: Vec<IeeeAuthor>,
    pub doi: Option<String>,
    pub publication_title: Option<String>,
    pub display_publication_title: Option<String>,
    /// Sometimes a string, sometimes a number.
    pub publication_year: Option<serde_json::Value>,
    pub content_type: Option<String>,
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IeeeAuthor {
    pub name: Option<String>,
}

impl IeeeMetadata {
    fn into_draft(self, source_url: &str) -> Result<PaperDraft, ExtractError> {
        let title = self
            .title
            .map(|t| collapse_whitespace(&t))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExtractError::Parse("IEEE metadata has no title".into()))?;

        let mut draft = PaperDraft::new();
        draft.set_value(Field::Title, title);
        draft.set_value(Field::SourceUrl, source_url);

        let authors: Vec<String> = self
            .authors
            .into_iter()
            .filter_map(|a| a.name)
            .map(|n| collapse_whitespace(&n))
            .filter(|n| !n.is_empty())
            .collect();
        if !authors.is_empty() {
            draft.set_value(Field::Authors, authors.join(", "));
        }

        if let Some(doi) = self.doi.filter(|d| !d.is_empty()) {
            draft.set_value(Field::Doi, doi);
        }
        if let Some(venue) = self
            .display_publication_title
            .or(self.publication_title)
            .filter(|v| !v.is_empty())
        {
            draft.set_value(Field::Publication, collapse_whitespace(&venue));
        }

        let year = match self.publication_year {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        if let Some(year) = year {
            draft.set_value(Field::PubTime, year);
        }

        if let Some(kind) = self.content_type {
            draft.set_pub_type(pub_type_for(&kind));
        }

        if let Some(pdf) = self.pdf_url.filter(|p| !p.is_empty()) {
            let pdf = if pdf.starts_with('/') {
                format!("https://ieeexplore.ieee.org{}", pdf)
            } else {
                pdf
            };
            draft.set_value(Field::MainUrl, pdf);
        }

        Ok(draft)
    }
}

fn pub_type_for(content_type: &str) -> PubType {
    let kind = content_type.to_ascii_lowercase();
    if kind.contains("conference") {
        PubType::Conference
    } else if kind.contains("journal")
        || kind.contains("magazine")
        || kind.contains("early access")
    {
        PubType::Journal
    } else if kind.contains("book") {
        PubType::Book
    } else {
        PubType::Other
    }
}

/// Find and decode the `xplGlobal.document.metadata` object in a page.
pub fn parse_document_metadata(html: &str) -> Result<IeeeMetadata, ExtractError> {
    let start = html
        .find(METADATA_MARKER)
        .ok_or_else(|| ExtractError::Parse("IEEE page has no embedded metadata".into()))?;
    let rest = &html[start + METADATA_MARKER.len()..];
    let rest = rest.trim_start().strip_prefix('=').unwrap_or(rest).trim_start();

    // The object is followed by `;` and more script; decode only the first value
    let mut values = serde_json::Deserializer::from_str(rest).into_iter::<IeeeMetadata>();
    match values.next() {
        Some(Ok(metadata)) => Ok(metadata),
        Some(Err(e)) => Err(ExtractError::Parse(format!("IEEE metadata: {}", e))),
        None => Err(ExtractError::Parse("IEEE metadata is empty".into())),
    }
}

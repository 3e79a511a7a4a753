use std::sync::Arc;

use super::{ImportFuture, WebContent, WebImporter, collapse_whitespace, find_year};
use crate::identifiers::{bare_arxiv_id, extract_doi};
use crate::{Field, PaperDraft, Preferences, PubType};

/// Fallback importer reading bibliographic `<meta>` tags embedded in a page.
///
/// Understands the Highwire `citation_*` tags most publishers emit for
/// Google Scholar indexing, and Dublin Core `dc.*` tags.
pub struct EmbedImporter {
    prefs: Arc<Preferences>,
}

impl EmbedImporter {
    pub fn new(prefs: Arc<Preferences>) -> Self {
        Self { prefs }
    }
}

impl WebImporter for EmbedImporter {
    fn name(&self) -> &str {
        "embed"
    }

    fn parse<'a>(
        &'a self,
        content: &'a WebContent,
        _client: &'a reqwest::Client,
    ) -> ImportFuture<'a> {
        Box::pin(async move {
            if !self.prefs.importer_enabled(self.name()) {
                return Ok(None);
            }
            Ok(parse_meta_tags(&content.document, &content.url))
        })
    }
}

/// `(name, content)` of every `<meta>` tag, names lowercased.
fn meta_tags(html: &str) -> Vec<(String, String)> {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("meta[content]").unwrap();

    document
        .select(&selector)
        .filter_map(|el| {
            let value = el.value();
            let name = value.attr("name").or_else(|| value.attr("property"))?;
            let content = value.attr("content")?;
            Some((name.trim().to_ascii_lowercase(), content.trim().to_string()))
        })
        .collect()
}

/// `Vaswani, Ashish` → `Ashish Vaswani`. Names without exactly one comma are
/// left alone.
fn normalize_author(name: &str) -> String {
    let name = collapse_whitespace(name);
    match name.split_once(',') {
        Some((last, first)) if !first.contains(',') && !first.trim().is_empty() => {
            format!("{} {}", first.trim(), last.trim())
        }
        _ => name,
    }
}

/// Build a draft from a page's embedded metadata. `None` without a title.
pub fn parse_meta_tags(html: &str, source_url: &str) -> Option<PaperDraft> {
    let tags = meta_tags(html);
    let first = |names: &[&str]| -> Option<String> {
        names.iter().find_map(|n| {
            tags.iter()
                .find(|(name, value)| name == n && !value.is_empty())
                .map(|(_, value)| value.clone())
        })
    };
    let all = |name: &str| -> Vec<String> {
        tags.iter()
            .filter(|(n, v)| n == name && !v.is_empty())
            .map(|(_, v)| normalize_author(v))
            .collect()
    };

    let title = first(&["citation_title", "dc.title"]).map(|t| collapse_whitespace(&t))?;

    let mut draft = PaperDraft::new();
    draft.set_value(Field::Title, title);
    draft.set_value(Field::SourceUrl, source_url);

    let mut authors = all("citation_author");
    if authors.is_empty() {
        authors = all("dc.creator");
    }
    if !authors.is_empty() {
        draft.set_value(Field::Authors, authors.join(", "));
    }

    if let Some(doi) = first(&["citation_doi", "dc.identifier"]).and_then(|d| extract_doi(&d)) {
        draft.set_value(Field::Doi, doi);
    }
    if let Some(arxiv) = first(&["citation_arxiv_id"]) {
        draft.set_value(Field::Arxiv, format!("arXiv:{}", bare_arxiv_id(&arxiv)));
    }

    if let Some(year) = first(&[
        "citation_publication_date",
        "citation_date",
        "citation_online_date",
        "dc.date",
    ])
    .and_then(|d| find_year(&d))
    {
        draft.set_value(Field::PubTime, year);
    }

    if let Some(conference) = first(&["citation_conference_title"]) {
        draft.set_value(Field::Publication, conference);
        draft.set_pub_type(PubType::Conference);
    } else if let Some(journal) = first(&["citation_journal_title"]) {
        draft.set_value(Field::Publication, journal);
        draft.set_pub_type(PubType::Journal);
    } else if draft.arxiv.is_some() {
        draft.set_value(Field::Publication, "arXiv");
        draft.set_pub_type(PubType::Preprint);
    }

    if let Some(pdf) = first(&["citation_pdf_url"]) {
        draft.set_value(Field::MainUrl, pdf);
    }

    Some(draft)
}

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ImportFuture, WebContent, WebImporter, collapse_whitespace, find_year};
use crate::{Field, PaperDraft, Preferences};

static SCHOLAR_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://scholar\.google\.[a-z.]+/scholar").unwrap());

/// Leading `[PDF]`, `[HTML]`, `[CITATION]` tags of a result title.
static TITLE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\[[A-Z]+\]\s*)+").unwrap());

/// Importer for Google Scholar result pages. Takes the first result.
pub struct GoogleScholarImporter {
    prefs: Arc<Preferences>,
}

impl GoogleScholarImporter {
    pub fn new(prefs: Arc<Preferences>) -> Self {
        Self { prefs }
    }

    fn gate(&self, content: &WebContent) -> bool {
        self.prefs.importer_enabled(self.name()) && SCHOLAR_URL_RE.is_match(&content.url)
    }
}

impl WebImporter for GoogleScholarImporter {
    fn name(&self) -> &str {
        "googlescholar"
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

            let Some(hit) = parse_first_result(&content.document) else {
                return Ok(None);
            };

            let mut draft = PaperDraft::new();
            draft.set_value(Field::Title, hit.title);
            draft.set_value(Field::SourceUrl, content.url.as_str());
            if !hit.authors.is_empty() {
                draft.set_value(Field::Authors, hit.authors.join(", "));
            }
            if let Some(venue) = hit.venue {
                draft.set_value(Field::Publication, venue);
            }
            if let Some(year) = hit.year {
                draft.set_value(Field::PubTime, year);
            }
            if let Some(link) = hit.link {
                draft.set_value(Field::MainUrl, link);
            }
            Ok(Some(draft))
        })
    }
}

/// One Google Scholar search result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScholarHit {
    pub title: String,
    pub authors: Vec<String>,
    pub venue: Option<String>,
    pub year: Option<String>,
    pub link: Option<String>,
}

/// Parse the first `.gs_ri` result of a results page.
pub fn parse_first_result(html: &str) -> Option<ScholarHit> {
    let document = scraper::Html::parse_document(html);
    let result_sel = scraper::Selector::parse("div.gs_ri").unwrap();
    let title_sel = scraper::Selector::parse("h3.gs_rt").unwrap();
    let link_sel = scraper::Selector::parse("a").unwrap();
    let byline_sel = scraper::Selector::parse("div.gs_a").unwrap();

    let result = document.select(&result_sel).next()?;
    let heading = result.select(&title_sel).next()?;

    let link = heading.select(&link_sel).next();
    let raw_title = match link {
        Some(a) => a.text().collect::<String>(),
        None => heading.text().collect::<String>(),
    };
    let title = collapse_whitespace(&TITLE_TAG_RE.replace(raw_title.trim(), ""));
    if title.is_empty() {
        return None;
    }

    let mut hit = ScholarHit {
        title,
        link: link
            .and_then(|a| a.value().attr("href"))
            .filter(|href| href.starts_with("http"))
            .map(String::from),
        ..Default::default()
    };

    if let Some(byline) = result.select(&byline_sel).next() {
        let text = byline.text().collect::<String>().replace('\u{a0}', " ");
        let mut parts = text.split(" - ");

        if let Some(authors) = parts.next() {
            hit.authors = authors
                .split(',')
                .map(|a| a.trim().trim_end_matches('…').trim())
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(venue_year) = parts.next() {
            hit.year = find_year(venue_year);
            let venue = match &hit.year {
                Some(year) => venue_year.rsplit_once(year.as_str()).map_or(venue_year, |(v, _)| v),
                None => venue_year,
            };
            let venue = venue.trim().trim_end_matches(',').trim().trim_end_matches('…').trim();
            if !venue.is_empty() {
                hit.venue = Some(venue.to_string());
            }
        }
    }

    Some(hit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"<html><body><div id="gs_res_ccl_mid">
  <div class="gs_r gs_or gs_scl">
    <div class="gs_ri">
      <h3 class="gs_rt"><span class="gs_ctg2">[PDF]</span>
        <a href="https://proceedings.neurips.cc/paper/2017/file/3f5ee243.pdf">Attention is all you need</a></h3>
      <div class="gs_a">A Vaswani, N Shazeer, N Parmar…&nbsp;- Advances in neural …, 2017&nbsp;- proceedings.neurips.cc</div>
    </div>
  </div>
  <div class="gs_r gs_or gs_scl">
    <div class="gs_ri">
      <h3 class="gs_rt"><a href="https://example.org/b">Second result</a></h3>
    </div>
  </div>
</div></body></html>"#;

    #[test]
    fn parses_first_result() {
        let hit = parse_first_result(RESULTS).unwrap();
        assert_eq!(hit.title, "Attention is all you need");
        assert_eq!(hit.authors, vec!["A Vaswani", "N Shazeer", "N Parmar"]);
        assert_eq!(hit.venue.as_deref(), Some("Advances in neural"));
        assert_eq!(hit.year.as_deref(), Some("2017"));
        assert_eq!(
            hit.link.as_deref(),
            Some("https://proceedings.neurips.cc/paper/2017/file/3f5ee243.pdf")
        );
    }

    #[test]
    fn citation_only_result_strips_tag() {
        let html = r#"<div class="gs_ri"><h3 class="gs_rt"><span>[CITATION]</span><span>[C]</span> Pattern recognition and machine learning</h3>
<div class="gs_a">CM Bishop - 2006 - Springer</div></div>"#;
        let hit = parse_first_result(html).unwrap();
        assert_eq!(hit.title, "Pattern recognition and machine learning");
        assert_eq!(hit.authors, vec!["CM Bishop"]);
        assert_eq!(hit.year.as_deref(), Some("2006"));
        assert_eq!(hit.venue, None);
        assert_eq!(hit.link, None);
    }

    #[test]
    fn no_results_is_none() {
        assert_eq!(parse_first_result("<html><body>No results</body></html>"), None);
    }

    #[tokio::test]
    async fn draft_from_results_page() {
        let importer = GoogleScholarImporter::new(Arc::new(Preferences::default()));
        let content = WebContent::new(
            "https://scholar.google.com/scholar?q=attention+is+all+you+need",
            RESULTS,
        );
        let draft = importer
            .parse(&content, &reqwest::Client::new())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(draft.title.as_deref(), Some("Attention is all you need"));
        assert_eq!(
            draft.authors.as_deref(),
            Some("A Vaswani, N Shazeer, N Parmar")
        );
        assert_eq!(draft.pub_time.as_deref(), Some("2017"));
    }

    #[tokio::test]
    async fn gate_closed_for_other_pages() {
        let importer = GoogleScholarImporter::new(Arc::new(Preferences::default()));
        let content = WebContent::new("https://scholar.google.com/citations?user=x", RESULTS);
        assert!(
            importer
                .parse(&content, &reqwest::Client::new())
                .await
                .unwrap()
                .is_none()
        );
    }
}

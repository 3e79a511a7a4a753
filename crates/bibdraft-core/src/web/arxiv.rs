use std::sync::Arc;

use super::{ImportFuture, WebContent, WebImporter, collapse_whitespace};
use crate::identifiers::arxiv_id_from_url;
use crate::{ExtractError, Field, PaperDraft, Preferences, PubType};

/// Importer for `arxiv.org/abs/<id>` and `arxiv.org/pdf/<id>` pages.
///
/// The page markup is not parsed; the paper is looked up through the arXiv
/// export API instead.
pub struct ArxivImporter {
    prefs: Arc<Preferences>,
}

impl ArxivImporter {
    pub fn new(prefs: Arc<Preferences>) -> Self {
        Self { prefs }
    }

    fn gate(&self, content: &WebContent) -> Option<String> {
        if !self.prefs.importer_enabled(self.name()) {
            return None;
        }
        arxiv_id_from_url(&content.url)
    }
}

impl WebImporter for ArxivImporter {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn parse<'a>(
        &'a self,
        content: &'a WebContent,
        client: &'a reqwest::Client,
    ) -> ImportFuture<'a> {
        Box::pin(async move {
            let Some(id) = self.gate(content) else {
                return Ok(None);
            };

            let url = format!(
                "https://export.arxiv.org/api/query?id_list={}&max_results=1",
                id
            );
            let resp = client
                .get(&url)
                .timeout(self.prefs.request_timeout())
                .send()
                .await?;

            if !resp.status().is_success() {
                return Err(ExtractError::HttpStatus {
                    status: resp.status().as_u16(),
                    url,
                });
            }

            let body = resp.text().await?;
            let entry = parse_arxiv_feed(&body)?
                .ok_or_else(|| ExtractError::Parse(format!("arXiv has no entry for {}", id)))?;

            Ok(Some(entry.into_draft(&id, &content.url)))
        })
    }
}

/// The fields of one Atom `<entry>` the importer uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArxivEntry {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub published: String,
    pub doi: Option<String>,
    pub journal_ref: Option<String>,
    pub pdf_url: Option<String>,
}

impl ArxivEntry {
    fn into_draft(self, arxiv_id: &str, source_url: &str) -> PaperDraft {
        let mut draft = PaperDraft::new();
        if !self.title.is_empty() {
            draft.set_value(Field::Title, self.title);
        }
        if !self.authors.is_empty() {
            draft.set_value(Field::Authors, self.authors.join(", "));
        }
        draft.set_value(Field::Arxiv, format!("arXiv:{}", arxiv_id));
        draft.set_value(Field::SourceUrl, source_url);

        if let Some(year) = self.published.get(..4) {
            draft.set_value(Field::PubTime, year);
        }
        if let Some(doi) = self.doi {
            draft.set_value(Field::Doi, doi);
        }
        match self.journal_ref {
            Some(journal) => {
                draft.set_value(Field::Publication, journal);
                draft.set_pub_type(PubType::Journal);
            }
            None => {
                draft.set_value(Field::Publication, "arXiv");
                draft.set_pub_type(PubType::Preprint);
            }
        }
        let pdf_url = self
            .pdf_url
            .unwrap_or_else(|| format!("https://arxiv.org/pdf/{}", arxiv_id));
        draft.set_value(Field::MainUrl, pdf_url);

        draft
    }
}

/// Parse an arXiv API Atom feed and return its first entry.
///
/// A feed whose entry is an API error report is an error.
pub fn parse_arxiv_feed(xml: &str) -> Result<Option<ArxivEntry>, ExtractError> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    #[derive(PartialEq)]
    enum InField {
        None,
        Id,
        Title,
        Summary,
        Name,
        Published,
        Doi,
        JournalRef,
    }

    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut in_entry = false;
    let mut in_author = false;
    let mut field = InField::None;

    let mut entry = ArxivEntry::default();
    let mut summary = String::new();
    let mut name = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"entry" => in_entry = true,
                b"author" if in_entry => {
                    in_author = true;
                    name.clear();
                }
                b"name" if in_author => field = InField::Name,
                b"id" if in_entry && !in_author => field = InField::Id,
                b"title" if in_entry => field = InField::Title,
                b"summary" if in_entry => field = InField::Summary,
                b"published" if in_entry => field = InField::Published,
                b"doi" if in_entry => field = InField::Doi,
                b"journal_ref" if in_entry => field = InField::JournalRef,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if in_entry && e.local_name().as_ref() == b"link" {
                    let mut href = None;
                    let mut is_pdf = false;
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"href" => {
                                href = Some(String::from_utf8_lossy(&attr.value).to_string())
                            }
                            b"title" => is_pdf = attr.value.as_ref() == b"pdf",
                            _ => {}
                        }
                    }
                    if is_pdf {
                        entry.pdf_url = href;
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                match field {
                    InField::Id => entry.id.push_str(&text),
                    InField::Title => entry.title.push_str(&text),
                    InField::Summary => summary.push_str(&text),
                    InField::Name => name.push_str(&text),
                    InField::Published => entry.published.push_str(&text),
                    InField::Doi => entry.doi.get_or_insert_with(String::new).push_str(&text),
                    InField::JournalRef => entry
                        .journal_ref
                        .get_or_insert_with(String::new)
                        .push_str(&text),
                    InField::None => {}
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"entry" if in_entry => break,
                b"author" => {
                    let trimmed = name.trim();
                    if !trimmed.is_empty() {
                        entry.authors.push(trimmed.to_string());
                    }
                    in_author = false;
                }
                _ => field = InField::None,
            },
            Ok(Event::Eof) => {
                if !in_entry {
                    return Ok(None);
                }
                break;
            }
            Err(e) => return Err(ExtractError::Parse(format!("arXiv XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    if entry.id.contains("/api/errors") {
        return Err(ExtractError::Parse(format!(
            "arXiv API error: {}",
            collapse_whitespace(&summary)
        )));
    }

    entry.id = entry.id.trim().to_string();
    entry.title = collapse_whitespace(&entry.title);
    entry.published = entry.published.trim().to_string();
    entry.doi = entry.doi.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
    entry.journal_ref = entry
        .journal_ref
        .map(|j| collapse_whitespace(&j))
        .filter(|j| !j.is_empty());

    Ok(Some(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <title type="html">ArXiv Query: id_list=1706.03762</title>
  <id>http://arxiv.org/api/abc</id>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>The dominant sequence transduction models...</summary>
    <author>
      <name>Ashish Vaswani</name>
    </author>
    <author>
      <name>Noam Shazeer</name>
    </author>
    <arxiv:doi>10.48550/arXiv.1706.03762</arxiv:doi>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_first_entry() {
        let entry = parse_arxiv_feed(FEED).unwrap().unwrap();
        assert_eq!(entry.id, "http://arxiv.org/abs/1706.03762v7");
        assert_eq!(entry.title, "Attention Is All You Need");
        assert_eq!(entry.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(entry.published, "2017-06-12T17:57:34Z");
        assert_eq!(entry.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));
        assert_eq!(entry.journal_ref, None);
        assert_eq!(
            entry.pdf_url.as_deref(),
            Some("http://arxiv.org/pdf/1706.03762v7")
        );
    }

    #[test]
    fn feed_title_is_not_entry_title() {
        let entry = parse_arxiv_feed(FEED).unwrap().unwrap();
        assert!(!entry.title.contains("ArXiv Query"));
    }

    #[test]
    fn empty_feed_has_no_entry() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>ArXiv Query</title></feed>"#;
        assert_eq!(parse_arxiv_feed(xml).unwrap(), None);
    }

    #[test]
    fn api_error_entry_is_an_error() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
    <title>Error</title>
    <summary>incorrect id format for 1234</summary>
  </entry>
</feed>"#;
        let err = parse_arxiv_feed(xml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed response: arXiv API error: incorrect id format for 1234"
        );
    }

    #[test]
    fn preprint_draft() {
        let entry = parse_arxiv_feed(FEED).unwrap().unwrap();
        let draft = entry.into_draft("1706.03762v7", "https://arxiv.org/abs/1706.03762v7");
        assert_eq!(draft.title.as_deref(), Some("Attention Is All You Need"));
        assert_eq!(draft.authors.as_deref(), Some("Ashish Vaswani, Noam Shazeer"));
        assert_eq!(draft.arxiv.as_deref(), Some("arXiv:1706.03762v7"));
        assert_eq!(draft.pub_time.as_deref(), Some("2017"));
        assert_eq!(draft.pub_type, Some(PubType::Preprint));
        assert_eq!(draft.publication.as_deref(), Some("arXiv"));
        assert_eq!(
            draft.main_url.as_deref(),
            Some("http://arxiv.org/pdf/1706.03762v7")
        );
        assert_eq!(
            draft.source_url.as_deref(),
            Some("https://arxiv.org/abs/1706.03762v7")
        );
    }

    #[test]
    fn journal_ref_marks_journal() {
        let entry = ArxivEntry {
            title: "T".into(),
            journal_ref: Some("Phys. Rev. D 60, 044005".into()),
            ..Default::default()
        };
        let draft = entry.into_draft("hep-th/9901001", "https://arxiv.org/abs/hep-th/9901001");
        assert_eq!(draft.pub_type, Some(PubType::Journal));
        assert_eq!(draft.publication.as_deref(), Some("Phys. Rev. D 60, 044005"));
        assert_eq!(
            draft.main_url.as_deref(),
            Some("https://arxiv.org/pdf/hep-th/9901001")
        );
        assert_eq!(draft.pub_time, None);
        assert_eq!(draft.authors, None);
    }

    #[tokio::test]
    async fn gate_closed_for_other_hosts() {
        let importer = ArxivImporter::new(Arc::new(Preferences::default()));
        let content = WebContent::new("https://example.org/abs/1706.03762", "");
        let result = importer
            .parse(&content, &reqwest::Client::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn gate_closed_when_disabled() {
        let prefs = Preferences {
            disabled_importers: vec!["arxiv".into()],
            ..Preferences::default()
        };
        let importer = ArxivImporter::new(Arc::new(prefs));
        let content = WebContent::new("https://arxiv.org/abs/1706.03762", "");
        let result = importer
            .parse(&content, &reqwest::Client::new())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}

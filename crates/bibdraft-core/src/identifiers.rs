use once_cell::sync::Lazy;
use regex::Regex;

static ARXIV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"arXiv:\s*(\d{4}\.\d{4,5}|[a-z\-]+(\.[A-Z]{2})?/\d{7})(v\d+)?").unwrap()
});

static DOI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"10[.][0-9]{4,}(?:[.][0-9]+)*/[^%"#?\s]+"##).unwrap());

static ARXIV_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)arxiv\.org/(?:abs|pdf)/",
        r"(\d{4}\.\d{4,5}(?:v\d+)?|[a-z\-]+(?:\.[A-Z]{2})?/\d{7}(?:v\d+)?)",
    ))
    .unwrap()
});

/// Drop every whitespace character.
pub fn remove_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Strip trailing punctuation and unbalanced closing brackets from a DOI.
fn clean_doi(doi: &str) -> String {
    let mut doi = doi.trim_end_matches(['.', ',', ';', ':']);

    for (open, close) in [('(', ')'), ('[', ']'), ('{', '}')] {
        while doi.ends_with(close) && doi.matches(close).count() > doi.matches(open).count() {
            doi = &doi[..doi.len() - 1];
            doi = doi.trim_end_matches(['.', ',', ';', ':']);
        }
    }

    doi.to_string()
}

/// First arXiv identifier in `text`, in its `arXiv:<id>` form with
/// whitespace removed.
///
/// Matches the new scheme (`arXiv:2301.12345v2`) and the old
/// category scheme (`arXiv:hep-th/9901001`, `arXiv:math.GT/0309136`).
pub fn extract_arxiv_id(text: &str) -> Option<String> {
    ARXIV_RE.find(text).map(|m| remove_whitespace(m.as_str()))
}

/// First DOI in `text`, whitespace removed and trailing punctuation trimmed.
pub fn extract_doi(text: &str) -> Option<String> {
    DOI_RE
        .find(text)
        .map(|m| clean_doi(&remove_whitespace(m.as_str())))
        .filter(|doi| !doi.is_empty())
}

/// The bare identifier of an `arxiv.org/abs/...` or `arxiv.org/pdf/...` URL.
pub fn arxiv_id_from_url(url: &str) -> Option<String> {
    ARXIV_URL_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// `2301.12345` for `arXiv:2301.12345`; other input is returned unchanged.
pub fn bare_arxiv_id(id: &str) -> &str {
    id.strip_prefix("arXiv:").unwrap_or(id)
}

use serde::{Deserialize, Serialize};

/// A named field of a [`PaperDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Authors,
    Publication,
    PubTime,
    Arxiv,
    Doi,
    MainUrl,
    SourceUrl,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Title,
        Field::Authors,
        Field::Publication,
        Field::PubTime,
        Field::Arxiv,
        Field::Doi,
        Field::MainUrl,
        Field::SourceUrl,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Authors => "authors",
            Field::Publication => "publication",
            Field::PubTime => "pubTime",
            Field::Arxiv => "arxiv",
            Field::Doi => "doi",
            Field::MainUrl => "mainURL",
            Field::SourceUrl => "sourceURL",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of publication a draft describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PubType {
    Journal,
    Conference,
    Preprint,
    Book,
    Other,
}

/// Bibliographic fields accumulated for one paper.
///
/// Every field starts unset. Strategies mutate the draft in sequence; the
/// draft itself enforces nothing, so a strategy that must not downgrade
/// stronger evidence checks before calling [`set_value`](Self::set_value).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Comma-separated author list, as it appears at the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_type: Option<PubType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arxiv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    /// Locator of the paper's main file: a path (relative to the library
    /// root or absolute) or a download URL.
    #[serde(rename = "mainURL", skip_serializing_if = "Option::is_none")]
    pub main_url: Option<String>,
    #[serde(rename = "sourceURL", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

impl PaperDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft whose only field is the main file locator.
    pub fn with_main_url(main_url: impl Into<String>) -> Self {
        Self {
            main_url: Some(main_url.into()),
            ..Self::default()
        }
    }

    /// Overwrite `field` with `value`.
    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        *self.slot_mut(field) = Some(value.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::Title => &self.title,
            Field::Authors => &self.authors,
            Field::Publication => &self.publication,
            Field::PubTime => &self.pub_time,
            Field::Arxiv => &self.arxiv,
            Field::Doi => &self.doi,
            Field::MainUrl => &self.main_url,
            Field::SourceUrl => &self.source_url,
        };
        slot.as_deref()
    }

    pub fn set_pub_type(&mut self, pub_type: PubType) {
        self.pub_type = Some(pub_type);
    }

    /// `true` if no field has been set.
    pub fn is_empty(&self) -> bool {
        self.pub_type.is_none() && Field::ALL.iter().all(|f| self.get(*f).is_none())
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Authors => &mut self.authors,
            Field::Publication => &mut self.publication,
            Field::PubTime => &mut self.pub_time,
            Field::Arxiv => &mut self.arxiv,
            Field::Doi => &mut self.doi,
            Field::MainUrl => &mut self.main_url,
            Field::SourceUrl => &mut self.source_url,
        }
    }
}

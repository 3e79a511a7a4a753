use std::path::PathBuf;
use std::time::Duration;

use crate::ExtractError;

/// Names of the web importers, in chain order.
pub const IMPORTER_NAMES: [&str; 4] = ["arxiv", "googlescholar", "ieee", "embed"];

pub const DEFAULT_USER_AGENT: &str = concat!("bibdraft/", env!("CARGO_PKG_VERSION"));

/// Read-only settings consulted by the extraction strategies.
#[derive(Debug, Clone)]
pub struct Preferences {
    /// Root that relative file locators are resolved against.
    pub app_lib_folder: PathBuf,
    /// Whether the built-in PDF scraper runs at all.
    pub pdf_builtin_scraper: bool,
    /// Web importers switched off by name (case-insensitive).
    pub disabled_importers: Vec<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

/// A preference looked up by its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceValue {
    Bool(bool),
    Path(PathBuf),
    Text(String),
    Number(u64),
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            app_lib_folder: default_lib_folder(),
            pdf_builtin_scraper: true,
            disabled_importers: vec![],
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// `<documents>/bibdraft`, or `./bibdraft` when the platform has no
/// documents directory.
pub fn default_lib_folder() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bibdraft")
}

impl Preferences {
    pub fn importer_enabled(&self, name: &str) -> bool {
        !self
            .disabled_importers
            .iter()
            .any(|d| d.eq_ignore_ascii_case(name))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Key/value view of the settings, using the host application's key names.
    ///
    /// Importer switches are `<name>Importer`, e.g. `ieeeImporter`.
    pub fn get(&self, key: &str) -> Option<PreferenceValue> {
        match key {
            "appLibFolder" => Some(PreferenceValue::Path(self.app_lib_folder.clone())),
            "pdfBuiltinScraper" => Some(PreferenceValue::Bool(self.pdf_builtin_scraper)),
            "requestTimeoutSecs" => Some(PreferenceValue::Number(self.request_timeout_secs)),
            "userAgent" => Some(PreferenceValue::Text(self.user_agent.clone())),
            _ => {
                let name = key.strip_suffix("Importer")?;
                IMPORTER_NAMES
                    .iter()
                    .find(|n| n.eq_ignore_ascii_case(name))
                    .map(|n| PreferenceValue::Bool(self.importer_enabled(n)))
            }
        }
    }

    /// HTTP client shared by every web importer of a pipeline.
    pub fn http_client(&self) -> Result<reqwest::Client, ExtractError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.request_timeout())
            .build()?;
        Ok(client)
    }
}

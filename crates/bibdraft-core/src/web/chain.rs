use std::sync::Arc;

use super::arxiv::ArxivImporter;
use super::embed::EmbedImporter;
use super::google_scholar::GoogleScholarImporter;
use super::ieee::IeeeImporter;
use super::{StatusEvent, StatusSink, WebContent, WebImporter};
use crate::{ExtractError, PaperDraft, Preferences};

/// Ordered list of web importers tried with first-match-wins fallback.
pub struct WebImporterChain {
    importers: Vec<Arc<dyn WebImporter>>,
    status: StatusSink,
}

impl WebImporterChain {
    pub fn new(importers: Vec<Arc<dyn WebImporter>>, status: StatusSink) -> Self {
        Self { importers, status }
    }

    /// arXiv, Google Scholar, IEEE Xplore, then embedded page metadata.
    pub fn standard(prefs: Arc<Preferences>, status: StatusSink) -> Self {
        let importers: Vec<Arc<dyn WebImporter>> = vec![
            Arc::new(ArxivImporter::new(Arc::clone(&prefs))),
            Arc::new(GoogleScholarImporter::new(Arc::clone(&prefs))),
            Arc::new(IeeeImporter::new(Arc::clone(&prefs))),
            Arc::new(EmbedImporter::new(prefs)),
        ];
        Self::new(importers, status)
    }

    pub fn names(&self) -> Vec<&str> {
        self.importers.iter().map(|i| i.name()).collect()
    }

    /// Try each importer in order and return the first match.
    ///
    /// Importer failures are published on the status channel and do not
    /// stop the chain. `Ok(None)` means no importer matched.
    pub async fn parse(
        &self,
        content: &WebContent,
        client: &reqwest::Client,
    ) -> Result<Option<PaperDraft>, ExtractError> {
        for importer in &self.importers {
            let name = importer.name();
            match importer.parse(content, client).await {
                Ok(Some(draft)) => {
                    tracing::info!(importer = name, url = %content.url, "web importer matched");
                    return Ok(Some(draft));
                }
                Ok(None) => {
                    tracing::debug!(
                        importer = name,
                        url = %content.url,
                        "web importer not applicable"
                    );
                }
                Err(e) if e.is_contract_violation() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        importer = name,
                        url = %content.url,
                        error = %e,
                        "web importer failed"
                    );
                    (self.status)(StatusEvent::ImporterFailed {
                        importer: name.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(None)
    }
}

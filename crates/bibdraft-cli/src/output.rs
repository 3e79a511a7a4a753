use std::io::Write;
use std::path::Path;

use bibdraft_core::{PaperDraft, StatusEvent};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print one failure from the web importer chain as a warning.
pub fn print_status(
    w: &mut dyn Write,
    event: &StatusEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {}", "WARNING:".yellow(), event)
    } else {
        writeln!(w, "WARNING: {}", event)
    }
}

/// Print a draft as pretty JSON.
pub fn print_draft(w: &mut dyn Write, draft: &PaperDraft) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, draft)?;
    writeln!(w)?;
    Ok(())
}

/// Print a one-line notice, dimmed when color is on.
pub fn print_notice(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", message.dimmed())
    } else {
        writeln!(w, "{}", message)
    }
}

/// Notice for a PDF run that left the draft as it was. Covers both a closed
/// gate and a page with nothing usable on it.
pub fn unchanged_pdf_notice(path: &str, lib_folder: &Path) -> String {
    format!(
        "No fields extracted from {} (library root {}). The file may be missing, \
         not a .pdf, the built-in scraper may be off, or the first page had \
         nothing usable.",
        path,
        lib_folder.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibdraft_core::Field;

    fn render(event: StatusEvent) -> String {
        let mut buf = Vec::new();
        print_status(&mut buf, &event, ColorMode(false)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn failure_is_a_warning() {
        let out = render(StatusEvent::ImporterFailed {
            importer: "arxiv".into(),
            message: "HTTP 503 from https://export.arxiv.org/api/query".into(),
        });
        assert_eq!(
            out,
            "WARNING: Web importer arxiv error: HTTP 503 from https://export.arxiv.org/api/query\n"
        );
    }

    #[test]
    fn unchanged_pdf_notice_does_not_blame_the_scraper() {
        let notice = unchanged_pdf_notice("papers/blank.pdf", Path::new("/library"));
        assert!(notice.starts_with("No fields extracted from papers/blank.pdf"));
        assert!(notice.contains("library root /library"));
        assert!(notice.contains("nothing usable"));
        assert!(!notice.contains("No PDF scraper applied"));
    }

    #[test]
    fn draft_json_uses_camel_case_keys() {
        let mut draft = PaperDraft::with_main_url("papers/a.pdf");
        draft.set_value(Field::PubTime, "2020");
        let mut buf = Vec::new();
        print_draft(&mut buf, &draft).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["mainURL"], "papers/a.pdf");
        assert_eq!(json["pubTime"], "2020");
        assert!(json.get("title").is_none());
    }
}

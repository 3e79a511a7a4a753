use std::path::Path;

use mupdf::{Document, MetadataName, TextPageFlags};

use bibdraft_core::{BackendError, PdfBackend, PdfFirstPage, PdfMetadata, TextRun};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island. It isolates the mupdf dependency
/// (which is AGPL-3.0) so that the rest of the pipeline does not
/// transitively depend on it.
///
/// Only the first page is laid out. Each line is split into runs wherever
/// the font size changes, so a title set in larger type forms its own run.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn read_first_page(&self, path: &Path) -> Result<PdfFirstPage, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let page_count = document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        if page_count < 1 {
            return Err(BackendError::NoPages);
        }

        let metadata = PdfMetadata {
            title: info_field(&document, MetadataName::Title),
            author: info_field(&document, MetadataName::Author),
        };

        let page = document
            .load_page(0)
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let mut runs = Vec::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let glyphs = line.chars().map(|c| Glyph {
                    ch: c.char().unwrap_or('\u{FFFD}'),
                    size: c.size(),
                    baseline: c.origin().y,
                });
                runs.extend(split_runs(glyphs));
            }
        }

        Ok(PdfFirstPage { metadata, runs })
    }
}

/// A missing or unreadable info entry is treated as absent.
fn info_field(document: &Document, name: MetadataName) -> Option<String> {
    document
        .metadata(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy)]
struct Glyph {
    ch: char,
    size: f32,
    baseline: f32,
}

/// Sizes are compared at 1/100 pt so glyphs from one font land in one run.
fn quantize(size: f32) -> f32 {
    (size * 100.0).round() / 100.0
}

/// Split one line's glyphs into runs of equal size. Whitespace never starts
/// a new run, and whitespace-only runs are dropped.
fn split_runs(glyphs: impl IntoIterator<Item = Glyph>) -> Vec<TextRun> {
    let mut runs: Vec<TextRun> = Vec::new();
    let mut current: Option<TextRun> = None;

    for glyph in glyphs {
        let size = quantize(glyph.size);
        match current.as_mut() {
            Some(run) if run.height == size || glyph.ch.is_whitespace() => run.text.push(glyph.ch),
            _ => {
                if let Some(done) = current.take() {
                    runs.push(done);
                }
                current = Some(TextRun::new(glyph.ch.to_string(), size, glyph.baseline));
            }
        }
    }
    runs.extend(current);

    runs.retain(|r| !r.text.trim().is_empty());
    runs
}

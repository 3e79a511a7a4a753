//! In-memory PDF backend for testing.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{PdfBackend, PdfFirstPage};
use crate::BackendError;

/// Returns a fixed first page (or a fixed failure) for every path.
pub struct MockBackend {
    page: Option<PdfFirstPage>,
    calls: AtomicUsize,
    last_path: Mutex<Option<PathBuf>>,
}

impl MockBackend {
    pub fn new(page: PdfFirstPage) -> Self {
        Self {
            page: Some(page),
            calls: AtomicUsize::new(0),
            last_path: Mutex::new(None),
        }
    }

    /// A backend that fails to open every document.
    pub fn failing() -> Self {
        Self {
            page: None,
            calls: AtomicUsize::new(0),
            last_path: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_path(&self) -> Option<PathBuf> {
        self.last_path.lock().unwrap().clone()
    }
}

impl PdfBackend for MockBackend {
    fn read_first_page(&self, path: &Path) -> Result<PdfFirstPage, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_path.lock().unwrap() = Some(path.to_path_buf());
        self.page
            .clone()
            .ok_or_else(|| BackendError::OpenError("mock: not a PDF".into()))
    }
}

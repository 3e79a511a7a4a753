use std::path::{Path, PathBuf};

/// Resolve a draft's file locator to a filesystem path.
///
/// A `file://` prefix is stripped. Relative locators are joined onto
/// `lib_folder`; absolute ones are returned as-is.
pub fn resolve_locator(locator: &str, lib_folder: &Path) -> PathBuf {
    let stripped = locator.strip_prefix("file://").unwrap_or(locator);
    let path = Path::new(stripped);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        lib_folder.join(path)
    }
}

/// `true` if `path` has a `.pdf` extension (any case).
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

//! Artifact path convention
//!
//! The backend stores one directory per language code with one subdirectory
//! per processor. Only the tokenizer file for the chosen treebank is checked;
//! its presence stands in for the whole model set being installed.

use std::path::{Path, PathBuf};

pub const MODEL_EXTENSION: &str = "pt";

const MARKER_PROCESSOR: &str = "tokenize";

/// `<resources_dir>/<backend_code>/tokenize/<treebank>.pt`
pub fn artifact_path(resources_dir: &Path, backend_code: &str, treebank: &str) -> PathBuf {
    resources_dir
        .join(backend_code)
        .join(MARKER_PROCESSOR)
        .join(format!("{treebank}.{MODEL_EXTENSION}"))
}

/// Plain existence check; directories do not count.
pub fn is_present(path: &Path) -> bool {
    path.is_file()
}

/// Treebanks whose marker file exists for a backend code, sorted.
pub fn installed_treebanks(resources_dir: &Path, backend_code: &str) -> Vec<String> {
    let dir = resources_dir.join(backend_code).join(MARKER_PROCESSOR);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };

    let mut found: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext == MODEL_EXTENSION)
                .unwrap_or(false)
        })
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
        .collect();
    found.sort();
    found
}

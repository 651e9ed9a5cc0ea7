//! Model download through the backend's own downloader

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::catalog::ResolvedModel;
use crate::error::{Error, Result};
use crate::model::artifact::{artifact_path, is_present};
use crate::pipeline::{DownloadRequest, NlpBackend};

const BANNER_WIDTH: usize = 80;

/// Message shown before the backend starts its (possibly interactive) download.
pub fn download_notice(backend_name: &str) -> String {
    let lines = [
        String::new(),
        String::new(),
        "Α".repeat(BANNER_WIDTH),
        String::new(),
        format!(
            "palaeo message: The part of palaeo that you are using depends upon the {backend_name} NLP library. \
             What follows are several question prompts coming from it. Answer with defaults."
        ),
        String::new(),
        "Ω".repeat(BANNER_WIDTH),
        String::new(),
        String::new(),
    ];
    lines.join("\n")
}

/// Makes sure the model for a resolved language is on disk.
pub struct ModelDownloader {
    backend: Arc<dyn NlpBackend>,
    resources_dir: PathBuf,
    show_notice: bool,
    show_progress: bool,
}

impl ModelDownloader {
    pub fn new(backend: Arc<dyn NlpBackend>, resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            resources_dir: resources_dir.into(),
            show_notice: true,
            show_progress: true,
        }
    }

    /// Print the notice banner before downloading (on by default)
    pub fn with_notice(mut self, show: bool) -> Self {
        self.show_notice = show;
        self
    }

    /// Show a spinner while the backend downloads (on by default)
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    /// Get the local marker path for a resolved model
    pub fn model_path(&self, resolved: &ResolvedModel) -> PathBuf {
        artifact_path(&self.resources_dir, &resolved.backend_code, &resolved.treebank)
    }

    /// Check if a model is already downloaded
    pub fn is_downloaded(&self, resolved: &ResolvedModel) -> bool {
        is_present(&self.model_path(resolved))
    }

    /// Return the marker path, downloading once if it is missing.
    pub fn ensure_present(&self, resolved: &ResolvedModel) -> Result<PathBuf> {
        let path = self.model_path(resolved);
        if is_present(&path) {
            debug!("Model for {} present at {:?}", resolved, path);
            return Ok(path);
        }
        self.download(resolved)
    }

    /// Run the backend downloader exactly once and verify the result.
    pub fn download(&self, resolved: &ResolvedModel) -> Result<PathBuf> {
        let path = self.model_path(resolved);

        if self.show_notice {
            println!("{}", download_notice(self.backend.name()));
        }

        std::fs::create_dir_all(&self.resources_dir)?;
        info!("Downloading {} into {:?}", resolved, self.resources_dir);

        let pb = self.spinner(resolved);
        let request = DownloadRequest::new(resolved, &self.resources_dir);
        let outcome = self.backend.download(&request);

        match &outcome {
            Ok(()) => pb.finish_with_message(format!("Downloaded {}", resolved)),
            Err(e) => pb.abandon_with_message(format!("Download of {} failed: {}", resolved, e)),
        }
        outcome?;

        if !is_present(&path) {
            return Err(Error::ModelMissing(path));
        }

        info!("Model downloaded to {:?}", path);
        Ok(path)
    }

    fn spinner(&self, resolved: &ResolvedModel) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Downloading {}", resolved));
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

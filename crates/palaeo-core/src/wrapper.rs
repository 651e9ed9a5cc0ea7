//! One language's ready-to-run pipeline.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::catalog::{Catalog, ResolvedModel};
use crate::config::PalaeoConfig;
use crate::error::Result;
use crate::model::ModelDownloader;
use crate::pipeline::{
    BackendLogLevel, Document, NlpBackend, Pipeline, PipelineOptions, ProcessorSet,
};
use crate::quiet::SuppressStdout;

/// A validated language/treebank pair with its model on disk and its
/// pipeline built.
///
/// Construction either finishes every step or returns the first error; there
/// is no half-built wrapper.
pub struct StanzaWrapper {
    resolved: ResolvedModel,
    model_path: PathBuf,
    processors: ProcessorSet,
    log_level: BackendLogLevel,
    pipeline: Box<dyn Pipeline>,
}

impl StanzaWrapper {
    /// Build a wrapper using the catalog described by `config`.
    pub fn new(
        backend: Arc<dyn NlpBackend>,
        config: &PalaeoConfig,
        language: &str,
        treebank: Option<&str>,
        log_level: Option<BackendLogLevel>,
    ) -> Result<Self> {
        let catalog = config.catalog()?;
        Self::with_catalog(backend, &catalog, config, language, treebank, log_level)
    }

    /// Build a wrapper against an already validated catalog.
    pub fn with_catalog(
        backend: Arc<dyn NlpBackend>,
        catalog: &Catalog,
        config: &PalaeoConfig,
        language: &str,
        treebank: Option<&str>,
        log_level: Option<BackendLogLevel>,
    ) -> Result<Self> {
        let resolved = catalog.resolve(language, treebank)?;

        let model_path = ModelDownloader::new(backend.clone(), &config.resources_dir)
            .ensure_present(&resolved)?;

        let processors = ProcessorSet::for_language(&resolved.language);
        let log_level = log_level.unwrap_or(config.log_level);
        let options = PipelineOptions::new(
            &resolved,
            &config.resources_dir,
            &processors,
            log_level,
            config.use_gpu,
        );

        let pipeline = {
            let _quiet = SuppressStdout::acquire();
            backend.load_pipeline(&options)?
        };

        info!("Pipeline ready for {} [{}]", resolved, processors);
        Ok(Self {
            resolved,
            model_path,
            processors,
            log_level,
            pipeline,
        })
    }

    /// Annotate `text`. The backend's document is returned as is.
    pub fn parse(&self, text: &str) -> Result<Document> {
        self.pipeline.parse(text)
    }

    pub fn language(&self) -> &str {
        &self.resolved.language
    }

    pub fn treebank(&self) -> &str {
        &self.resolved.treebank
    }

    pub fn backend_code(&self) -> &str {
        &self.resolved.backend_code
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn processors(&self) -> &ProcessorSet {
        &self.processors
    }

    pub fn log_level(&self) -> BackendLogLevel {
        self.log_level
    }

    pub fn resolved(&self) -> &ResolvedModel {
        &self.resolved
    }
}

impl fmt::Debug for StanzaWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StanzaWrapper")
            .field("resolved", &self.resolved)
            .field("model_path", &self.model_path)
            .field("processors", &self.processors.to_string())
            .field("log_level", &self.log_level)
            .finish_non_exhaustive()
    }
}

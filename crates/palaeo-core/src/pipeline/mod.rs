//! Backend seam: the downloader and pipeline constructor the wrapper drives.

mod document;
mod options;

pub use document::{Document, Sentence, Token, Word};
pub use options::{
    BackendLogLevel, DownloadRequest, PipelineOptions, Processor, ProcessorSet,
};

use crate::error::Result;

/// A constructed, ready-to-run annotation pipeline.
pub trait Pipeline: Send + Sync {
    /// Run every configured processor over `text`.
    fn parse(&self, text: &str) -> Result<Document>;
}

/// An NLP library able to fetch models and build pipelines from them.
pub trait NlpBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the model package for a language into `request.dir`.
    fn download(&self, request: &DownloadRequest) -> Result<()>;

    /// Build a pipeline. Expensive; callers are expected to cache the result.
    fn load_pipeline(&self, options: &PipelineOptions) -> Result<Box<dyn Pipeline>>;
}

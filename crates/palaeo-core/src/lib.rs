//! Palaeo Core - Stanza pipelines for historical languages
//!
//! This crate maps a toolkit language code (`grc`, `lat`, `chu`, `fro`,
//! `got`) onto a Stanza model package, makes sure the model is on disk, builds
//! the pipeline once and keeps it around for `parse` calls.
//!
//! # Architecture
//!
//! - [`catalog`]: validated language, backend code and treebank tables
//! - [`model`]: artifact paths and the one-shot downloader
//! - [`pipeline`]: the backend seam and the annotated document types
//! - [`bridge`]: the production backend, a Python worker running `stanza`
//! - [`wrapper`]: one built pipeline per language/treebank
//! - [`registry`]: caller-owned cache of wrappers
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use palaeo_core::{PalaeoConfig, StanzaBridge, WrapperRegistry};
//!
//! let config = PalaeoConfig::load()?.with_env_overrides();
//! let backend = Arc::new(StanzaBridge::from_config(&config));
//! let registry = WrapperRegistry::new(backend, config)?;
//!
//! let latin = registry.get_or_create("lat", None)?;
//! let doc = latin.parse("Gallia est omnis divisa in partes tres.")?;
//! println!("{}", doc.to_conllu());
//! ```

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod quiet;
pub mod registry;
pub mod wrapper;

#[cfg(test)]
mod testing;

pub use bridge::StanzaBridge;
pub use catalog::{Catalog, CatalogTables, LanguageInfo, ResolvedModel};
pub use config::PalaeoConfig;
pub use error::{Error, Result};
pub use model::{artifact_path, is_present, ModelDownloader};
pub use pipeline::{
    BackendLogLevel, Document, DownloadRequest, NlpBackend, Pipeline, PipelineOptions,
    ProcessorSet, Sentence, Token, Word,
};
pub use quiet::SuppressStdout;
pub use registry::{WrapperKey, WrapperRegistry};
pub use wrapper::StanzaWrapper;

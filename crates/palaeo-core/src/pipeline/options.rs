//! Pipeline construction options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::catalog::ResolvedModel;
use crate::error::Error;

/// Languages whose models lack the multi-word token expander and parser.
const REDUCED_PIPELINE_LANGUAGES: &[&str] = &["fro"];

/// One processing step of the backend pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Processor {
    Tokenize,
    /// Multi-word token expansion
    Mwt,
    Pos,
    Lemma,
    Depparse,
}

impl Processor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tokenize => "tokenize",
            Self::Mwt => "mwt",
            Self::Pos => "pos",
            Self::Lemma => "lemma",
            Self::Depparse => "depparse",
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered processor list plus the lemmatizer mode that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSet {
    processors: Vec<Processor>,
    lemma_use_identity: bool,
}

impl ProcessorSet {
    /// tokenize -> mwt -> pos -> lemma -> depparse
    pub fn full() -> Self {
        Self {
            processors: vec![
                Processor::Tokenize,
                Processor::Mwt,
                Processor::Pos,
                Processor::Lemma,
                Processor::Depparse,
            ],
            lemma_use_identity: false,
        }
    }

    /// tokenize -> pos -> lemma, with the lemmatizer echoing surface forms
    pub fn reduced() -> Self {
        Self {
            processors: vec![Processor::Tokenize, Processor::Pos, Processor::Lemma],
            lemma_use_identity: true,
        }
    }

    /// Pick the set for a toolkit language code.
    pub fn for_language(language: &str) -> Self {
        if REDUCED_PIPELINE_LANGUAGES.contains(&language) {
            Self::reduced()
        } else {
            Self::full()
        }
    }

    pub fn processors(&self) -> &[Processor] {
        &self.processors
    }

    pub fn contains(&self, processor: Processor) -> bool {
        self.processors.contains(&processor)
    }

    pub fn lemma_use_identity(&self) -> bool {
        self.lemma_use_identity
    }
}

impl fmt::Display for ProcessorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.processors.iter().map(Processor::as_str).collect();
        f.write_str(&joined.join(","))
    }
}

/// Backend logging verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BackendLogLevel {
    Debug,
    Info,
    Warning,
    #[default]
    Error,
    Critical,
}

impl BackendLogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for BackendLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendLogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(Error::InvalidInput(format!("unknown log level '{s}'"))),
        }
    }
}

impl TryFrom<String> for BackendLogLevel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Error> {
        value.parse()
    }
}

impl From<BackendLogLevel> for String {
    fn from(level: BackendLogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// Everything the backend needs to build one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOptions {
    /// Backend language code
    pub lang: String,
    /// Model store root
    pub dir: PathBuf,
    /// Treebank / package name
    pub package: String,
    /// Comma-separated processor list
    pub processors: String,
    pub logging_level: BackendLogLevel,
    pub use_gpu: bool,
    pub lemma_use_identity: bool,
}

impl PipelineOptions {
    pub fn new(
        resolved: &ResolvedModel,
        dir: impl Into<PathBuf>,
        processors: &ProcessorSet,
        logging_level: BackendLogLevel,
        use_gpu: bool,
    ) -> Self {
        Self {
            lang: resolved.backend_code.clone(),
            dir: dir.into(),
            package: resolved.treebank.clone(),
            processors: processors.to_string(),
            logging_level,
            use_gpu,
            lemma_use_identity: processors.lemma_use_identity(),
        }
    }
}

/// Arguments for the backend's model downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    /// Backend language code
    pub lang: String,
    pub package: String,
    pub dir: PathBuf,
}

impl DownloadRequest {
    pub fn new(resolved: &ResolvedModel, dir: impl Into<PathBuf>) -> Self {
        Self {
            lang: resolved.backend_code.clone(),
            package: resolved.treebank.clone(),
            dir: dir.into(),
        }
    }
}

//! In-process backend double used by the unit tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::catalog::ResolvedModel;
use crate::error::{Error, Result};
use crate::model::artifact_path;
use crate::pipeline::{
    Document, DownloadRequest, NlpBackend, Pipeline, PipelineOptions, Sentence, Token, Word,
};
use crate::quiet;

pub(crate) struct FakeBackend {
    downloads: Mutex<Vec<DownloadRequest>>,
    loads: Mutex<Vec<PipelineOptions>>,
    quiet_loads: Mutex<Vec<bool>>,
    write_models: bool,
    fail_downloads: bool,
    fail_loads: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            downloads: Mutex::new(Vec::new()),
            loads: Mutex::new(Vec::new()),
            quiet_loads: Mutex::new(Vec::new()),
            write_models: true,
            fail_downloads: false,
            fail_loads: AtomicUsize::new(0),
        }
    }

    /// Downloads succeed but leave nothing on disk.
    pub fn without_writing_models(mut self) -> Self {
        self.write_models = false;
        self
    }

    pub fn failing_downloads(mut self) -> Self {
        self.fail_downloads = true;
        self
    }

    /// The next `n` pipeline loads fail.
    pub fn failing_loads(self, n: usize) -> Self {
        self.fail_loads.store(n, Ordering::SeqCst);
        self
    }

    pub fn install(&self, dir: &Path, resolved: &ResolvedModel) {
        write_marker(dir, &resolved.backend_code, &resolved.treebank);
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }

    pub fn downloads(&self) -> Vec<DownloadRequest> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().unwrap().len()
    }

    pub fn loads(&self) -> Vec<PipelineOptions> {
        self.loads.lock().unwrap().clone()
    }

    /// For each load, whether stdout was suppressed while it ran.
    pub fn quiet_loads(&self) -> Vec<bool> {
        self.quiet_loads.lock().unwrap().clone()
    }
}

impl NlpBackend for FakeBackend {
    fn name(&self) -> &str {
        "Fake"
    }

    fn download(&self, request: &DownloadRequest) -> Result<()> {
        self.downloads.lock().unwrap().push(request.clone());
        if self.fail_downloads {
            return Err(Error::DownloadError("network unreachable".to_string()));
        }
        if self.write_models {
            write_marker(&request.dir, &request.lang, &request.package);
        }
        Ok(())
    }

    fn load_pipeline(&self, options: &PipelineOptions) -> Result<Box<dyn Pipeline>> {
        self.loads.lock().unwrap().push(options.clone());
        self.quiet_loads.lock().unwrap().push(quiet::is_suppressed());
        let remaining = self.fail_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::PipelineError("model files are corrupt".to_string()));
        }
        Ok(Box::new(FakePipeline {
            options: options.clone(),
        }))
    }
}

/// Splits on whitespace and tags every word `X`.
pub(crate) struct FakePipeline {
    options: PipelineOptions,
}

impl Pipeline for FakePipeline {
    fn parse(&self, text: &str) -> Result<Document> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        for (idx, piece) in text.split_whitespace().enumerate() {
            let start = text[offset..].find(piece).map(|p| p + offset).unwrap_or(offset);
            let end = start + piece.len();
            offset = end;
            let lemma = if self.options.lemma_use_identity {
                piece.to_string()
            } else {
                piece.to_lowercase()
            };
            tokens.push(Token {
                id: vec![idx + 1],
                text: piece.to_string(),
                start_char: Some(start),
                end_char: Some(end),
                misc: None,
                words: vec![Word {
                    id: idx + 1,
                    text: piece.to_string(),
                    lemma: Some(lemma),
                    upos: Some("X".to_string()),
                    head: self.options.processors.contains("depparse").then_some(0),
                    ..Default::default()
                }],
            });
        }

        let sentences = if tokens.is_empty() {
            Vec::new()
        } else {
            vec![Sentence {
                text: Some(text.trim().to_string()),
                tokens,
            }]
        };

        Ok(Document {
            text: text.to_string(),
            sentences,
        })
    }
}

fn write_marker(dir: &Path, code: &str, treebank: &str) {
    let path = artifact_path(dir, code, treebank);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"fake weights").unwrap();
}

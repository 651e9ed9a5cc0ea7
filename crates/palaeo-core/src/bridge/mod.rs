//! Python bridge for the Stanza library
//!
//! Every pipeline gets its own long-lived worker process. Requests and
//! responses travel over the worker's stdin/stdout as length-prefixed JSON.

pub mod protocol;

use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::PalaeoConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Document, DownloadRequest, NlpBackend, Pipeline, PipelineOptions};

use protocol::{read_frame, write_frame, WorkerRequest, WorkerResponse};

/// Worker source compiled into the binary, used when no script path is configured.
const WORKER_SOURCE: &str = include_str!("../../scripts/stanza_worker.py");

/// `NlpBackend` backed by the Python `stanza` package.
pub struct StanzaBridge {
    python_cmd: String,
    worker_script: Option<PathBuf>,
}

impl StanzaBridge {
    pub fn new() -> Self {
        Self {
            python_cmd: "python3".to_string(),
            worker_script: None,
        }
    }

    pub fn from_config(config: &PalaeoConfig) -> Self {
        Self {
            python_cmd: config.python_cmd.clone(),
            worker_script: config.worker_script.clone(),
        }
    }

    pub fn with_python(mut self, python_cmd: impl Into<String>) -> Self {
        self.python_cmd = python_cmd.into();
        self
    }

    /// Check that the interpreter starts and can import stanza.
    /// Returns the library version.
    pub fn check_dependencies(&self) -> Result<String> {
        let mut worker = self.spawn()?;
        let response = worker
            .call(&WorkerRequest::check())?
            .into_result(Error::PipelineError)?;
        let version = response.version.unwrap_or_else(|| "unknown".to_string());
        info!("stanza {} available via {}", version, self.python_cmd);
        Ok(version)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.python_cmd);
        cmd.arg("-u");
        match &self.worker_script {
            Some(script) => {
                cmd.arg(script);
            }
            None => {
                cmd.arg("-c").arg(WORKER_SOURCE);
            }
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }

    fn spawn(&self) -> Result<Worker> {
        let mut child = self.command().spawn().map_err(|e| {
            Error::PipelineError(format!(
                "Failed to start Python worker with '{}': {}",
                self.python_cmd, e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::PipelineError("worker stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::PipelineError("worker stdout unavailable".to_string()))?;

        debug!("Spawned Python worker pid {}", child.id());
        Ok(Worker {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
            closed: false,
        })
    }
}

impl Default for StanzaBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl NlpBackend for StanzaBridge {
    fn name(&self) -> &str {
        "Stanza"
    }

    fn download(&self, request: &DownloadRequest) -> Result<()> {
        info!(
            "Requesting stanza download of {}/{} into {:?}",
            request.lang, request.package, request.dir
        );
        let mut worker = self.spawn()?;
        worker
            .call(&WorkerRequest::download(request.clone()))?
            .into_result(Error::DownloadError)?;
        worker.shutdown();
        Ok(())
    }

    fn load_pipeline(&self, options: &PipelineOptions) -> Result<Box<dyn Pipeline>> {
        info!(
            "Building stanza pipeline lang={} package={} processors={}",
            options.lang, options.package, options.processors
        );
        let mut worker = self.spawn()?;
        worker
            .call(&WorkerRequest::load(options.clone()))?
            .into_result(Error::PipelineError)?;

        Ok(Box::new(StanzaPipeline {
            worker: Mutex::new(worker),
        }))
    }
}

/// A pipeline living inside a worker process.
pub struct StanzaPipeline {
    worker: Mutex<Worker>,
}

impl Pipeline for StanzaPipeline {
    fn parse(&self, text: &str) -> Result<Document> {
        let mut worker = self
            .worker
            .lock()
            .map_err(|_| Error::PipelineError("worker lock poisoned".to_string()))?;

        let response = worker
            .call(&WorkerRequest::parse(text))?
            .into_result(Error::PipelineError)?;

        response
            .document
            .ok_or_else(|| Error::PipelineError("No document in response".to_string()))
    }
}

struct Worker {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl Worker {
    fn call(&mut self, request: &WorkerRequest) -> Result<WorkerResponse> {
        if self.closed {
            return Err(Error::PipelineError("worker already shut down".to_string()));
        }
        write_frame(&mut self.stdin, request).map_err(|e| {
            Error::PipelineError(format!("Failed to send '{}' to worker: {}", request.command, e))
        })?;
        read_frame(&mut self.stdout)
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if write_frame(&mut self.stdin, &WorkerRequest::shutdown()).is_ok() {
            let _ = read_frame::<_, WorkerResponse>(&mut self.stdout);
        }
        match self.child.wait() {
            Ok(status) if !status.success() => warn!("Python worker exited with {}", status),
            Ok(_) => debug!("Python worker {} exited", self.child.id()),
            Err(e) => warn!("Failed to reap Python worker: {}", e),
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

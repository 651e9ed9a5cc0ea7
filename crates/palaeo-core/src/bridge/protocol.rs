//! Wire format shared with the Python worker

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::pipeline::{Document, DownloadRequest, PipelineOptions};

/// Frames above this size are treated as a corrupted stream.
const MAX_FRAME_LEN: usize = 256 * 1024 * 1024;

/// Request to the worker
#[derive(Debug, Default, Serialize)]
pub struct WorkerRequest {
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<PipelineOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download: Option<DownloadRequest>,
}

impl WorkerRequest {
    pub fn check() -> Self {
        Self::command("check")
    }

    pub fn load(options: PipelineOptions) -> Self {
        Self {
            options: Some(options),
            ..Self::command("load")
        }
    }

    pub fn parse(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::command("parse")
        }
    }

    pub fn download(request: DownloadRequest) -> Self {
        Self {
            download: Some(request),
            ..Self::command("download")
        }
    }

    pub fn shutdown() -> Self {
        Self::command("shutdown")
    }

    fn command(name: &str) -> Self {
        Self {
            command: name.to_string(),
            ..Default::default()
        }
    }
}

/// Response from the worker
#[derive(Debug, Default, Deserialize)]
pub struct WorkerResponse {
    pub status: Option<String>,
    pub error: Option<String>,
    pub version: Option<String>,
    pub document: Option<Document>,
}

impl WorkerResponse {
    /// Turn an `error` field into an `Err`, wrapping it with `wrap`.
    pub fn into_result(self, wrap: impl FnOnce(String) -> Error) -> Result<Self> {
        match self.error {
            Some(err) => Err(wrap(err)),
            None => Ok(self),
        }
    }
}

/// Write a length-prefixed JSON frame.
pub fn write_frame<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<()> {
    let body = serde_json::to_vec(message)?;
    let length = u32::try_from(body.len())
        .map_err(|_| Error::InvalidInput(format!("frame of {} bytes is too large", body.len())))?;

    writer.write_all(&length.to_be_bytes())?;
    writer.write_all(&body)?;
    writer.flush()?;
    Ok(())
}

/// Read a length-prefixed JSON frame.
pub fn read_frame<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    let mut length_buf = [0u8; 4];
    reader.read_exact(&mut length_buf).map_err(|e| {
        Error::PipelineError(format!("Failed to read response length: {}", e))
    })?;
    let length = u32::from_be_bytes(length_buf) as usize;
    if length > MAX_FRAME_LEN {
        return Err(Error::PipelineError(format!(
            "Response frame of {} bytes exceeds limit",
            length
        )));
    }

    let mut body = vec![0u8; length];
    reader
        .read_exact(&mut body)
        .map_err(|e| Error::PipelineError(format!("Failed to read response body: {}", e)))?;

    serde_json::from_slice(&body).map_err(|e| {
        Error::PipelineError(format!(
            "Failed to parse response: {} - {}",
            e,
            String::from_utf8_lossy(&body)
        ))
    })
}

//! Local model artifacts: where they live and how they get there.

pub mod artifact;
pub mod download;

pub use artifact::{artifact_path, installed_treebanks, is_present, MODEL_EXTENSION};
pub use download::{download_notice, ModelDownloader};

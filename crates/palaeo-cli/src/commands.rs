use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use palaeo_core::model::{download_notice, installed_treebanks};
use palaeo_core::{
    BackendLogLevel, Document, ModelDownloader, NlpBackend, PalaeoConfig, StanzaBridge,
    StanzaWrapper,
};

use crate::DocumentFormat;

/// `--config` wins over the search order; env and `--resources-dir` go on top.
pub fn load_config(path: Option<&Path>, resources_dir: Option<PathBuf>) -> Result<PalaeoConfig> {
    let config = match path {
        Some(path) => PalaeoConfig::from_file(path)?,
        None => PalaeoConfig::load()?,
    };
    let config = config.with_env_overrides();

    let config = match resources_dir {
        Some(dir) => config.with_resources_dir(dir),
        None => config,
    };
    debug!("Using Stanza resources at {:?}", config.resources_dir);
    Ok(config)
}

pub fn languages(config: &PalaeoConfig, json: bool) -> Result<()> {
    let catalog = config.catalog()?;
    let languages = catalog.languages();

    if json {
        println!("{}", serde_json::to_string_pretty(&languages)?);
        return Ok(());
    }

    println!(
        "{:<6} {:<22} {:<8} {:<10} {:<24} INSTALLED",
        "CODE", "NAME", "STANZA", "DEFAULT", "TREEBANKS"
    );
    for info in languages {
        let installed = installed_treebanks(&config.resources_dir, &info.backend_code);
        println!(
            "{:<6} {:<22} {:<8} {:<10} {:<24} {}",
            info.code,
            info.name,
            info.backend_code,
            info.default_treebank,
            info.treebanks.join(","),
            if installed.is_empty() {
                "-".to_string()
            } else {
                installed.join(",")
            }
        );
    }
    Ok(())
}

pub fn pull(
    config: &PalaeoConfig,
    language: &str,
    treebank: Option<&str>,
    force: bool,
) -> Result<()> {
    let resolved = config.catalog()?.resolve(language, treebank)?;
    let downloader = ModelDownloader::new(
        Arc::new(StanzaBridge::from_config(config)),
        &config.resources_dir,
    );

    let path = if force {
        downloader.download(&resolved)?
    } else {
        downloader.ensure_present(&resolved)?
    };
    println!("{}", path.display());
    Ok(())
}

pub fn path(config: &PalaeoConfig, language: &str, treebank: Option<&str>) -> Result<()> {
    let resolved = config.catalog()?.resolve(language, treebank)?;
    let path = palaeo_core::artifact_path(
        &config.resources_dir,
        &resolved.backend_code,
        &resolved.treebank,
    );
    let state = if palaeo_core::is_present(&path) {
        "present"
    } else {
        "missing"
    };
    println!("{}\t{}", path.display(), state);
    Ok(())
}

pub fn parse(
    config: &PalaeoConfig,
    language: &str,
    treebank: Option<&str>,
    log_level: Option<BackendLogLevel>,
    text: &str,
    format: DocumentFormat,
) -> Result<()> {
    let text = read_text(text)?;
    let backend: Arc<dyn NlpBackend> = Arc::new(StanzaBridge::from_config(config));

    // stdout carries the document, so a first-run download announces itself on stderr
    fetch_model(backend.clone(), config, language, treebank, &mut std::io::stderr())?;
    let wrapper = StanzaWrapper::new(backend, config, language, treebank, log_level)?;

    let doc = wrapper
        .parse(&text)
        .with_context(|| format!("Failed to annotate text with {}", wrapper.resolved()))?;
    print!("{}", render(&doc, format)?);
    Ok(())
}

/// Make sure the model is on disk, writing the download notice to `notice`.
fn fetch_model(
    backend: Arc<dyn NlpBackend>,
    config: &PalaeoConfig,
    language: &str,
    treebank: Option<&str>,
    notice: &mut dyn Write,
) -> Result<PathBuf> {
    let resolved = config.catalog()?.resolve(language, treebank)?;
    let downloader =
        ModelDownloader::new(backend.clone(), &config.resources_dir).with_notice(false);
    if !downloader.is_downloaded(&resolved) {
        writeln!(notice, "{}", download_notice(backend.name()))?;
    }
    Ok(downloader.ensure_present(&resolved)?)
}

fn read_text(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

fn render(doc: &Document, format: DocumentFormat) -> Result<String> {
    let out = match format {
        DocumentFormat::Json => format!("{}\n", serde_json::to_string_pretty(doc)?),
        DocumentFormat::Conllu => doc.to_conllu(),
        DocumentFormat::Text => {
            let mut out = String::new();
            for sentence in &doc.sentences {
                for token in &sentence.tokens {
                    out.push_str(&token.pretty());
                    out.push('\n');
                }
                out.push('\n');
            }
            out
        }
    };
    Ok(out)
}

//! Palaeo CLI - annotate historical-language text with Stanza
//!
//! Thin front end over `palaeo-core`: list the supported languages, fetch
//! models, and run a pipeline over text from the command line or stdin.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use palaeo_core::BackendLogLevel;

mod commands;

/// Palaeo - Stanza pipelines for historical languages
///
/// Examples:
///   palaeo languages                  # Supported languages and installed treebanks
///   palaeo pull lat                   # Download the default Latin model
///   palaeo path grc --treebank perseus
///   palaeo parse lat "Gallia est omnis divisa in partes tres."
///   echo "μῆνιν ἄειδε θεά" | palaeo parse grc - --format conllu
#[derive(Parser)]
#[command(
    name = "palaeo",
    about = "Stanza pipelines for historical languages",
    version = env!("CARGO_PKG_VERSION"),
    arg_required_else_help = true,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Stanza model store (overrides config and PALAEO_STANZA_RESOURCES)
    #[arg(long, global = true, value_name = "DIR")]
    pub resources_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List supported languages and their treebanks
    #[command(name = "languages", alias = "ls")]
    Languages {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Download the model for a language
    ///
    /// Does nothing when the model is already on disk unless --force is given.
    #[command(name = "pull", alias = "download")]
    Pull {
        /// Language code (grc, lat, chu, fro, got)
        language: String,

        /// Treebank (defaults to the language's default)
        #[arg(short, long)]
        treebank: Option<String>,

        /// Download even if the model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Print where the model for a language is expected on disk
    #[command(name = "path")]
    Path {
        /// Language code
        language: String,

        /// Treebank (defaults to the language's default)
        #[arg(short, long)]
        treebank: Option<String>,
    },

    /// Annotate text
    #[command(name = "parse")]
    Parse {
        /// Language code
        language: String,

        /// Text to annotate (or "-" to read from stdin)
        text: String,

        /// Treebank (defaults to the language's default)
        #[arg(short, long)]
        treebank: Option<String>,

        /// Stanza log level while the pipeline is built
        #[arg(long, value_name = "LEVEL")]
        log_level: Option<BackendLogLevel>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: DocumentFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DocumentFormat {
    /// One token per line
    Text,
    /// CoNLL-U
    Conllu,
    /// The document as JSON
    Json,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "palaeo=debug,palaeo_core=debug"
    } else {
        "palaeo=info,palaeo_core=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = commands::load_config(cli.config.as_deref(), cli.resources_dir)?;

    match cli.command {
        Commands::Languages { json } => commands::languages(&config, json)?,
        Commands::Pull {
            language,
            treebank,
            force,
        } => commands::pull(&config, &language, treebank.as_deref(), force)?,
        Commands::Path { language, treebank } => {
            commands::path(&config, &language, treebank.as_deref())?
        }
        Commands::Parse {
            language,
            text,
            treebank,
            log_level,
            format,
        } => commands::parse(
            &config,
            &language,
            treebank.as_deref(),
            log_level,
            &text,
            format,
        )?,
    }

    Ok(())
}

//! CLI driver: annotate every `.txt` essay in a directory
//!
//! ```bash
//! essay-annotator essays/ --mode rewrite
//! essay-annotator essays/ --mode tag --properties neural-english.properties
//! ```
//!
//! Environment variables (and a .env file) supply defaults; flags
//! override them. Progress goes to stdout, diagnostics to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use essay_annotator::driver::annotate_directory;
use essay_annotator::{AnnotationMode, AnnotatorConfig, CoreNlpClient, Error, JoinStyle};

#[derive(Parser)]
#[command(
    name = "essay-annotator",
    version,
    about = "Annotate essay corpora with POS, NER, and coreference tags"
)]
struct Cli {
    /// Directory of .txt essays to annotate
    input_dir: PathBuf,

    /// Output mode: rewrite mentions (.coref) or tag them (.tagged)
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Java-style properties file with pipeline settings
    #[arg(long)]
    properties: Option<PathBuf>,

    /// CoreNLP server URL (overrides CORENLP_SERVER_URL)
    #[arg(long)]
    server_url: Option<String>,

    /// Concatenate rewritten tokens without spaces (historical behavior)
    #[arg(long)]
    concatenate_rewrites: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Replace non-representative mentions with the head phrase
    Rewrite,
    /// Tag mention tokens with chain membership
    Tag,
}

impl From<Mode> for AnnotationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Rewrite => Self::Rewrite,
            Mode::Tag => Self::Tag,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> essay_annotator::Result<()> {
    essay_annotator::init()?;

    let mut config = AnnotatorConfig::from_env()?;
    if let Some(mode) = cli.mode {
        config = config.with_mode(mode.into());
    }
    if cli.concatenate_rewrites {
        config = config.with_join_style(JoinStyle::Concatenated);
    }

    let mut pipeline_config = config.pipeline.clone();
    if let Some(path) = &cli.properties {
        pipeline_config = pipeline_config.with_properties_file(path)?;
    }
    if let Some(url) = cli.server_url {
        pipeline_config = pipeline_config.with_server_url(url);
    }
    config = config.with_pipeline(pipeline_config);

    let pipeline = CoreNlpClient::new(config.pipeline.clone())?;
    let report = annotate_directory(&cli.input_dir, &pipeline, &config).await?;

    if report.processed == 0 && report.failed > 0 {
        return Err(Error::Pipeline(format!(
            "all {} files failed",
            report.failed
        )));
    }
    Ok(())
}

//! # Essay Annotator
//!
//! Annotates plain-text student essays with part-of-speech, named-entity,
//! and coreference tags, writing a parallel tagged representation next to
//! each input file. The NLP pipeline itself stays external: the crate
//! talks to a Stanford CoreNLP server and consumes its JSON output.
//!
//! ## Modes
//!
//! - **Rewrite** (`.coref` output): non-representative coref mentions are
//!   replaced in place by the chain's representative phrase, with the
//!   original and rewritten token streams kept aligned per sentence.
//! - **Tag** (`.tagged` output): every mention token is tagged with its
//!   chain id, its reference to the chain head, and the head phrase,
//!   without any text substitution.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use essay_annotator::driver::annotate_directory;
//! use essay_annotator::{AnnotatorConfig, CoreNlpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load from environment / .env file
//!     let config = AnnotatorConfig::from_env()?;
//!
//!     let pipeline = CoreNlpClient::new(config.pipeline.clone())?;
//!     let report = annotate_directory(Path::new("essays"), &pipeline, &config).await?;
//!
//!     println!("{} essays annotated", report.processed);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use std::env;

pub mod annotation;
pub mod coref;
pub mod document;
pub mod driver;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod serializer;

pub use annotation::Annotation;
pub use coref::{AffectedSpans, CorefChain, Mention, Rewrite};
pub use document::{Document, Sentence, Token};
pub use error::{Error, Result};
pub use pipeline::{CoreNlpClient, PipelineConfig};
pub use serializer::JoinStyle;

/// Initialize the library by loading a .env file
///
/// Call this at the start of your application to load environment
/// variables from a .env file in the current directory or its parents.
///
/// # Errors
///
/// Returns an error if the .env file exists but cannot be read or parsed
pub fn init() -> Result<()> {
    dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
    Ok(())
}

/// Which output the coref overlay produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationMode {
    /// Substitute non-representative mentions with the head phrase
    #[default]
    Rewrite,

    /// Tag mention tokens with chain membership, no substitution
    Tag,
}

impl AnnotationMode {
    /// Output file suffix appended to the input path
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Rewrite => "coref",
            Self::Tag => "tagged",
        }
    }
}

/// Configuration for a directory annotation run
#[derive(Debug, Clone, Default)]
pub struct AnnotatorConfig {
    /// Output mode
    pub mode: AnnotationMode,

    /// How the rewritten token stream of a `.coref` line is joined
    pub join_style: JoinStyle,

    /// CoreNLP server connection settings
    pub pipeline: PipelineConfig,
}

impl AnnotatorConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Automatically loads a .env file if present. Supported variables:
    /// - `ANNOTATOR_MODE`: `rewrite` or `tag` (default: `rewrite`)
    /// - `ANNOTATOR_JOIN_STYLE`: `space` or `concatenated`
    /// - plus the `CORENLP_*` variables of [`PipelineConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline configuration cannot be loaded
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mode = env::var("ANNOTATOR_MODE")
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "rewrite" => Some(AnnotationMode::Rewrite),
                "tag" | "tagged" => Some(AnnotationMode::Tag),
                _ => None,
            })
            .unwrap_or_default();

        let join_style = env::var("ANNOTATOR_JOIN_STYLE")
            .ok()
            .and_then(|v| match v.to_lowercase().as_str() {
                "space" => Some(JoinStyle::Space),
                "concatenated" | "concat" => Some(JoinStyle::Concatenated),
                _ => None,
            })
            .unwrap_or_default();

        Ok(Self {
            mode,
            join_style,
            pipeline: PipelineConfig::from_env()?,
        })
    }

    /// Set the output mode
    #[must_use]
    pub const fn with_mode(mut self, mode: AnnotationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the rewritten-stream join style
    #[must_use]
    pub const fn with_join_style(mut self, join_style: JoinStyle) -> Self {
        self.join_style = join_style;
        self
    }

    /// Set the pipeline configuration
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = pipeline;
        self
    }
}

/// The external NLP pipeline seam
///
/// Given raw document text, yields the full annotation: sentences and
/// tokens carrying POS and NER labels, plus the coreference chains.
/// Implemented by [`CoreNlpClient`] for a live server and by deterministic
/// mocks in tests.
#[async_trait]
pub trait NlpPipeline: Send + Sync {
    /// Annotate one raw document text
    ///
    /// # Errors
    ///
    /// Returns an error if the pipeline is unreachable or its response
    /// cannot be decoded
    async fn annotate(&self, text: &str) -> Result<Annotation>;
}

//! HTTP client for a Stanford CoreNLP server
//!
//! The annotator performs no NLP itself: it POSTs raw essay text to a
//! CoreNLP server and decodes the JSON annotation the server returns.
//! Pipeline properties (the annotator list, the coref algorithm) travel in
//! the `properties` query parameter as a JSON object, which is the
//! server's protocol.
//!
//! The client is constructed once per process and reused across all
//! documents; it holds no per-document state.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::annotation::Annotation;
use crate::error::{Error, Result};
use crate::NlpPipeline;

/// Configuration for the CoreNLP server connection
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL of the CoreNLP server
    pub server_url: String,

    /// Comma-separated annotator list
    ///
    /// Coreference resolution needs the full chain of upstream annotators,
    /// so the default requests all of them.
    pub annotators: String,

    /// Coreference algorithm (`neural`, `statistical`, ...)
    pub coref_algorithm: String,

    /// Request timeout in seconds; coref over a long essay is slow
    pub timeout_secs: u64,

    /// Extra pipeline properties merged into every request
    pub extra_properties: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9000".to_string(),
            annotators: "tokenize,ssplit,pos,lemma,ner,depparse,coref".to_string(),
            coref_algorithm: "neural".to_string(),
            timeout_secs: 300,
            extra_properties: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Automatically loads a .env file if present. Supported variables:
    /// - `CORENLP_SERVER_URL`: base URL (default: `http://localhost:9000`)
    /// - `CORENLP_ANNOTATORS`: comma-separated annotator list
    /// - `CORENLP_COREF_ALGORITHM`: coref algorithm (default: `neural`)
    /// - `CORENLP_TIMEOUT_SECS`: request timeout in seconds
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` for parity with the other
    /// loaders.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let server_url =
            std::env::var("CORENLP_SERVER_URL").unwrap_or(defaults.server_url);
        let annotators =
            std::env::var("CORENLP_ANNOTATORS").unwrap_or(defaults.annotators);
        let coref_algorithm =
            std::env::var("CORENLP_COREF_ALGORITHM").unwrap_or(defaults.coref_algorithm);
        let timeout_secs = std::env::var("CORENLP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs);

        Ok(Self {
            server_url,
            annotators,
            coref_algorithm,
            timeout_secs,
            extra_properties: BTreeMap::new(),
        })
    }

    /// Merge settings from a Java-style `.properties` file
    ///
    /// Lines are `key = value`; `#` and `!` start comments. The
    /// `annotators` and `coref.algorithm` keys override the corresponding
    /// fields; every other key becomes an extra pipeline property.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn with_properties_file(mut self, path: &Path) -> Result<Self> {
        for (key, value) in parse_properties(&fs::read_to_string(path)?) {
            match key.as_str() {
                "annotators" => self.annotators = value,
                "coref.algorithm" => self.coref_algorithm = value,
                _ => {
                    self.extra_properties.insert(key, value);
                }
            }
        }
        Ok(self)
    }

    /// Set the server URL
    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Set the annotator list
    #[must_use]
    pub fn with_annotators(mut self, annotators: impl Into<String>) -> Self {
        self.annotators = annotators.into();
        self
    }

    /// Set the coref algorithm
    #[must_use]
    pub fn with_coref_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.coref_algorithm = algorithm.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Render the `properties` query parameter the server expects
    fn properties_json(&self) -> Result<String> {
        let mut properties = self.extra_properties.clone();
        properties.insert("annotators".to_string(), self.annotators.clone());
        properties.insert("coref.algorithm".to_string(), self.coref_algorithm.clone());
        properties.insert("outputFormat".to_string(), "json".to_string());
        Ok(serde_json::to_string(&properties)?)
    }
}

fn parse_properties(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// CoreNLP server client
pub struct CoreNlpClient {
    config: PipelineConfig,
    client: Client,
}

impl CoreNlpClient {
    /// Create a client for the given server configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pipeline`] if the HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Pipeline(e.to_string()))?;
        Ok(Self { config, client })
    }
}

impl std::fmt::Debug for CoreNlpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreNlpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NlpPipeline for CoreNlpClient {
    async fn annotate(&self, text: &str) -> Result<Annotation> {
        let url = Url::parse_with_params(
            &self.config.server_url,
            &[("properties", self.config.properties_json()?)],
        )
        .map_err(|e| Error::Config(format!("invalid server URL: {e}")))?;

        let response = self
            .client
            .post(url)
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| Error::Pipeline(format!("CoreNLP request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Pipeline(format!(
                "CoreNLP server returned {}",
                response.status()
            )));
        }

        response
            .json::<Annotation>()
            .await
            .map_err(|e| Error::Pipeline(format!("invalid annotation response: {e}")))
    }
}

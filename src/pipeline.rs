//! The fetch → extract → summarise → export pipeline shared by both front ends.

use crate::agent::{AgentError, Summarizer};
use crate::config::{Config, ConfigError};
use crate::export::{ExportError, ExportMetadata, Exporter};
use crate::extract::{self, ExtractError, ExtractedText};
use crate::scraper::{self, Fetcher, ScraperError};
use crate::summary::{SummaryRequest, SummaryResult, SummaryStyle};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid URL. Please enter a valid http/https URL.")]
    InvalidUrl(String),
    #[error(transparent)]
    Fetch(#[from] ScraperError),
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    Summarization(AgentError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl From<AgentError> for PipelineError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::ConfigError(e) => PipelineError::Configuration(e),
            other => PipelineError::Summarization(other),
        }
    }
}

/// One summarisation run as requested by a front end
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub url: String,
    pub style: SummaryStyle,
    /// Model identifier; `None` or blank uses the configured default
    pub model: Option<String>,
    /// Write a document after a successful summary
    pub export: bool,
}

impl RunRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            style: SummaryStyle::Default,
            model: None,
            export: false,
        }
    }

    pub fn style(mut self, style: SummaryStyle) -> Self {
        self.style = style;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }
}

/// What a successful run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: SummaryResult,
    pub model: String,
    /// File name of the exported document, when export was requested
    pub document: Option<String>,
}

/// Components built once from [`Config`] and reused for every request
#[derive(Debug, Clone)]
pub struct Pipeline {
    fetcher: Fetcher,
    summarizer: Summarizer,
    exporter: Exporter,
    default_model: String,
}

impl Pipeline {
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        Ok(Self {
            fetcher: Fetcher::new(&config.fetch)?,
            summarizer: Summarizer::new(&config.agent, &config.api)?,
            exporter: Exporter::new(&config.export),
            default_model: config.agent.model.clone(),
        })
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Validate, fetch and extract without calling the completion API
    pub async fn extract_only(&self, url: &str) -> Result<ExtractedText, PipelineError> {
        let url = url.trim();
        if !scraper::is_valid_url(url) {
            warn!(url = %url, "Invalid URL entered");
            return Err(PipelineError::InvalidUrl(url.to_string()));
        }

        let page = self.fetcher.fetch(url).await?;
        Ok(extract::extract_text(&page.body)?)
    }

    /// Run the whole pipeline. Nothing is exported unless summarisation succeeds.
    pub async fn run(&self, request: &RunRequest) -> Result<RunReport, PipelineError> {
        let url = request.url.trim();
        let text = self.extract_only(url).await?;

        let model = request
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.default_model.as_str())
            .to_string();

        let summary_request = SummaryRequest::new(text.into_inner(), request.style, model.clone());
        let summary = self.summarizer.summarize(&summary_request).await?;

        info!(
            model = %model,
            style = %request.style,
            seconds = summary.elapsed_seconds(),
            "Summary generated successfully"
        );

        let document = if request.export {
            let metadata = ExportMetadata::new(url, model.as_str(), request.style);
            Some(self.exporter.export(&summary.text, &metadata)?)
        } else {
            None
        };

        Ok(RunReport {
            summary,
            model,
            document,
        })
    }
}

//! Acquisition of the two input tables (local file or HTTP).

use std::path::PathBuf;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::domain::TableSources;
use crate::error::AppError;

/// Left-handedness rates by age, digitized from Gilbert & Wysocki (1992), surveyed in 1986.
pub const DEFAULT_SURVEY_URL: &str = "https://gist.githubusercontent.com/mbonsma/8da0990b71ba9a09f7de395574e54df1/raw/aec88b30af87fad8d45da7e774223f91dad09e88/lh_data.csv";

/// US deaths by age for 1999 (CDC vital statistics, table 310).
pub const DEFAULT_DEATHS_URL: &str = "https://gist.githubusercontent.com/mbonsma/2f4076aab6820ca1807f4e29f75f18ec/raw/62f3ec07514c7e31f5979beeca86f19991540796/cdc_vs00199_table310.tsv";

pub const SURVEY_URL_ENV: &str = "HANDAGE_SURVEY_URL";
pub const DEATHS_URL_ENV: &str = "HANDAGE_DEATHS_URL";

/// Where one table is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSource {
    Path(PathBuf),
    Url(String),
}

impl TableSource {
    /// `http://` / `https://` prefixes are URLs; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            TableSource::Url(trimmed.to_string())
        } else {
            TableSource::Path(PathBuf::from(trimmed))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            TableSource::Path(path) => path.display().to_string(),
            TableSource::Url(url) => url.clone(),
        }
    }
}

/// Resolved sources for both tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSources {
    pub survey: TableSource,
    pub deaths: TableSource,
}

/// Resolve each table: explicit value, else environment (`.env` honored), else default URL.
pub fn resolve_sources(sources: &TableSources) -> ResolvedSources {
    dotenvy::dotenv().ok();
    ResolvedSources {
        survey: resolve_one(sources.survey.as_deref(), SURVEY_URL_ENV, DEFAULT_SURVEY_URL),
        deaths: resolve_one(sources.deaths.as_deref(), DEATHS_URL_ENV, DEFAULT_DEATHS_URL),
    }
}

fn resolve_one(explicit: Option<&str>, env_key: &str, default: &str) -> TableSource {
    if let Some(raw) = explicit.filter(|s| !s.trim().is_empty()) {
        return TableSource::parse(raw);
    }
    match std::env::var(env_key) {
        Ok(raw) if !raw.trim().is_empty() => TableSource::parse(&raw),
        _ => TableSource::Url(default.to_string()),
    }
}

/// Reads table text from files or over HTTP.
pub struct TableFetcher {
    client: Client,
}

impl TableFetcher {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    pub fn fetch_text(&self, source: &TableSource) -> Result<String, AppError> {
        match source {
            TableSource::Path(path) => {
                debug!(path = %path.display(), "reading table file");
                std::fs::read_to_string(path).map_err(|e| {
                    AppError::new(2, format!("Failed to read table '{}': {e}", path.display()))
                })
            }
            TableSource::Url(url) => self.fetch_url(url),
        }
    }

    fn fetch_url(&self, url: &str) -> Result<String, AppError> {
        info!(url, "downloading table");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("Request for '{url}' failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Request for '{url}' failed with status {}.", resp.status()),
            ));
        }

        resp.text()
            .map_err(|e| AppError::new(4, format!("Failed to read response body from '{url}': {e}")))
    }
}

impl Default for TableFetcher {
    fn default() -> Self {
        Self::new()
    }
}

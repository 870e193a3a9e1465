//! Remote CSV sources fetched over HTTP.

use reqwest::blocking::Client;
use tracing::info;

use crate::error::{AppError, EXIT_INPUT, LoadError};

/// Environment variable holding a comma-separated list of source URLs.
pub const REMOTE_URLS_ENV: &str = "SALESBOARD_REMOTE_URLS";

pub struct RemoteClient {
    client: Client,
}

impl RemoteClient {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Read the configured URL list from the environment (`.env` honored).
    pub fn urls_from_env() -> Result<Vec<String>, AppError> {
        dotenvy::dotenv().ok();
        let raw = std::env::var(REMOTE_URLS_ENV).map_err(|_| {
            AppError::new(
                EXIT_INPUT,
                format!("Missing {REMOTE_URLS_ENV} in environment (.env)."),
            )
        })?;
        let urls = split_url_list(&raw);
        if urls.is_empty() {
            return Err(AppError::new(EXIT_INPUT, format!("{REMOTE_URLS_ENV} is empty.")));
        }
        Ok(urls)
    }

    /// Fetch one source body as text.
    ///
    /// Transport failures and non-success statuses both count as "not found":
    /// from the loader's point of view the source is simply unavailable.
    pub fn fetch_text(&self, url: &str) -> Result<String, LoadError> {
        let not_found = || LoadError::SourceNotFound {
            attempted: vec![url.to_string()],
        };

        info!(url, "fetching remote source");
        let resp = self.client.get(url).send().map_err(|e| {
            tracing::warn!(url, error = %e, "remote request failed");
            not_found()
        })?;

        if !resp.status().is_success() {
            tracing::warn!(url, status = %resp.status(), "remote source returned an error status");
            return Err(not_found());
        }

        resp.text().map_err(|e| LoadError::MalformedSource {
            source_name: url.to_string(),
            reason: format!("failed to read response body: {e}"),
        })
    }
}

impl Default for RemoteClient {
    fn default() -> Self {
        Self::new()
    }
}

fn split_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_list_splits_and_trims() {
        let urls = split_url_list(" https://a.example/p1.csv ,, https://a.example/p2.csv,");
        assert_eq!(
            urls,
            vec![
                "https://a.example/p1.csv".to_string(),
                "https://a.example/p2.csv".to_string()
            ]
        );
    }
}

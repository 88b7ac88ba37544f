use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::Url;

use crate::{
    config::{
        dexscreener::{SEARCH_PATH, SEARCH_QUERY_PARAM},
        time::TIMEOUT,
    },
    models::dexscreener::SearchResult,
};

#[derive(Error, Debug)]
pub enum DexScreenerError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(StatusCode),

    #[error("Response parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Anything that can answer a pair search. The orchestrator is generic over
/// this so tests can swap the network out.
pub trait PairSearch: Send + Sync + 'static {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<SearchResult, DexScreenerError>> + Send;
}

pub struct DexScreener {
    client: Client,
    search_url: Url,
    timeout: Duration,
}

impl DexScreener {
    pub fn new(base_url: &str) -> Result<Self, DexScreenerError> {
        Self::with_timeout(base_url, TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, DexScreenerError> {
        let client = Client::builder().timeout(timeout).build()?;
        // `join` replaces the last segment unless the base ends with a slash.
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        let search_url = base.join(SEARCH_PATH)?;

        Ok(DexScreener {
            client,
            search_url,
            timeout,
        })
    }

    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();

        url.query_pairs_mut().append_pair(SEARCH_QUERY_PARAM, query);

        url
    }

    fn map_timeout(&self, err: reqwest::Error) -> DexScreenerError {
        if err.is_timeout() {
            DexScreenerError::Timeout(self.timeout)
        } else {
            DexScreenerError::Request(err)
        }
    }
}

impl PairSearch for DexScreener {
    async fn search(&self, query: &str) -> Result<SearchResult, DexScreenerError> {
        let url = self.search_url(query);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_timeout(e))?;

        if !response.status().is_success() {
            return Err(DexScreenerError::Status(response.status()));
        }

        let body = response.text().await.map_err(|e| self.map_timeout(e))?;
        let result: SearchResult = serde_json::from_str(&body)?;

        Ok(result)
    }
}

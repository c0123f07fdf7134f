use crate::core::error::{FeedError, Result};
use crate::core::source::TransactionSource;
use crate::core::transaction::FeedResponse;
use anyhow::Context;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

/// Retrieves the feed from the finance service's REST API.
pub struct ApiTransactionSource {
    base_url: String,
    client: reqwest::Client,
}

impl ApiTransactionSource {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("finfeed/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl TransactionSource for ApiTransactionSource {
    async fn fetch_transactions(&self) -> Result<FeedResponse> {
        let url = format!("{}/transactions", self.base_url);
        debug!("Requesting transactions from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Network(format!(
                "{url} responded with status {status}"
            )));
        }

        let response_text = response.text().await?;

        let feed: FeedResponse = match serde_json::from_str(&response_text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse transactions response"
                );
                return Err(FeedError::Validation(format!(
                    "malformed transactions response: {e}"
                )));
            }
        };

        debug!(
            count = feed.transactions.len(),
            "Successfully fetched transactions"
        );
        Ok(feed)
    }
}

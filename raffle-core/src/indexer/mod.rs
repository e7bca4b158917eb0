pub mod query;

use crate::error::{RaffleError, Result};
use crate::types::RoundRecord;
use async_trait::async_trait;
use query::{GamesData, GraphResponse, LATEST_ROUND_QUERY};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Off-chain history of rounds.
#[async_trait]
pub trait RoundIndexer: Send + Sync {
    /// Most recent round, or `None` if no round was ever created.
    async fn latest_round(&self) -> Result<Option<RoundRecord>>;
}

pub struct SubgraphClient {
    http: Client,
    url: String,
}

impl SubgraphClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POSTs a GraphQL query and returns its `data` payload.
    pub async fn query<T: DeserializeOwned>(&self, query: &str) -> Result<T> {
        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "query": query }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Subgraph request failed");
            return Err(RaffleError::indexer(format!("HTTP {}: {}", status, body)));
        }

        let text = response.text().await?;
        let body: GraphResponse<T> = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Subgraph returned a malformed body: {}", e);
            e
        })?;
        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            tracing::error!(errors = ?messages, "Subgraph returned errors");
            return Err(RaffleError::IndexerQuery(messages));
        }

        body.data
            .ok_or_else(|| RaffleError::indexer("Response carried neither data nor errors"))
    }
}

#[async_trait]
impl RoundIndexer for SubgraphClient {
    async fn latest_round(&self) -> Result<Option<RoundRecord>> {
        let data: GamesData = self.query(LATEST_ROUND_QUERY).await?;
        Ok(data.games.into_iter().next().map(RoundRecord::from))
    }
}

//! Client seam for the metadata graph API.
//!
//! Actions talk to the graph through the [`GraphClient`] trait so that the
//! transport can be swapped out (or mocked) without touching propagation
//! logic. [`RestGraphClient`] is the production implementation, speaking
//! GraphQL-over-HTTP.

use crate::config::GraphConfig;
use crate::error::{Result, RippleError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Default connection timeout for graph requests.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout for graph requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A GraphQL query or mutation document plus its variables.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub variables: Value,
}

impl GraphQuery {
    /// Create a query without variables.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Value::Null,
        }
    }

    /// Attach variables.
    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = variables;
        self
    }
}

/// Executes GraphQL documents against the metadata graph.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Execute a query or mutation and return the response data.
    async fn graphql(&self, query: &GraphQuery) -> Result<Value>;
}

/// GraphQL-over-HTTP client for the metadata graph service.
#[derive(Clone)]
pub struct RestGraphClient {
    base_url: String,
    token: Option<String>,
    client: Client,
}

impl RestGraphClient {
    /// Create a new client with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeouts(
            endpoint,
            None,
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Create a client from configuration.
    pub fn from_config(config: &GraphConfig) -> Self {
        Self::with_timeouts(
            config.endpoint.clone(),
            config.token.clone(),
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_REQUEST_TIMEOUT,
        )
    }

    /// Create a new client with custom timeouts.
    pub fn with_timeouts(
        endpoint: impl Into<String>,
        token: Option<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            base_url: endpoint.into(),
            token,
            client,
        }
    }
}

#[async_trait]
impl GraphClient for RestGraphClient {
    async fn graphql(&self, query: &GraphQuery) -> Result<Value> {
        let url = format!("{}/api/graphql", self.base_url);

        let mut request = self.client.post(&url).json(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RippleError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RippleError::Transport(format!(
                "graph request failed with status {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RippleError::Deserialization(e.to_string()))?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                warn!("graph response carried errors: {:?}", errors);
                return Err(RippleError::Transport(format!(
                    "graph response carried {} errors",
                    errors.len()
                )));
            }
        }

        match body.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(RippleError::Transport(
                "graph response missing data".to_string(),
            )),
        }
    }
}

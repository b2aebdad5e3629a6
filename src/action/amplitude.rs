//! Analytics taxonomy sync.
//!
//! Mirrors a field description change into the Amplitude taxonomy API. The
//! extract transformer stashes the relevant fields on the envelope metadata;
//! this action reads them back and issues an HTTP PUT. Transport failures
//! are logged and swallowed, never retried.

use crate::config::AmplitudeConfig;
use crate::error::{Result, RippleError};
use crate::event::EventEnvelope;
use crate::transform::extract::{AmplitudeMeta, AMPLITUDE_META_KEY};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::Action;

/// Default taxonomy endpoint.
const TAXONOMY_ENDPOINT: &str = "https://amplitude.com/api/2/taxonomy/event-property";

/// Default connection timeout for taxonomy requests.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout for taxonomy requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Basic-auth client for the taxonomy API.
///
/// Failures surface as typed [`RippleError`] values; whether to swallow them
/// is the caller's decision.
pub struct TaxonomyClient {
    base_url: String,
    api_key: String,
    secret_key: String,
    client: Client,
}

impl TaxonomyClient {
    /// Create a new client. Both keys are required.
    pub fn new(config: &AmplitudeConfig) -> Result<Self> {
        Self::with_base_url(config, TAXONOMY_ENDPOINT)
    }

    /// Create a client against a non-default endpoint.
    pub fn with_base_url(config: &AmplitudeConfig, base_url: impl Into<String>) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            base_url: base_url.into(),
            api_key: config.api_key.trim().to_string(),
            secret_key: config.secret_key.trim().to_string(),
            client,
        })
    }

    /// Update the description of one event property in the taxonomy.
    pub async fn update_event_property(
        &self,
        event_property: &str,
        event_type: &str,
        description: &str,
    ) -> Result<()> {
        let url = format!("{}/{}", self.base_url, event_property);
        let form = [("event_type", event_type), ("description", description)];

        let response = self
            .client
            .put(&url)
            .form(&form)
            .basic_auth(&self.api_key, Some(&self.secret_key))
            .send()
            .await
            .map_err(|e| RippleError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RippleError::Transport(format!(
                "taxonomy update failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Pushes transformed description changes to the analytics taxonomy.
pub struct AmplitudeAction {
    client: TaxonomyClient,
}

impl AmplitudeAction {
    /// Create the action, validating its configuration.
    pub fn new(config: &AmplitudeConfig) -> Result<Self> {
        Ok(Self {
            client: TaxonomyClient::new(config)?,
        })
    }

    /// Create the action against a non-default endpoint.
    pub fn with_base_url(config: &AmplitudeConfig, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: TaxonomyClient::with_base_url(config, base_url)?,
        })
    }
}

#[async_trait]
impl Action for AmplitudeAction {
    fn name(&self) -> &str {
        "amplitude_event_property"
    }

    async fn act(&self, envelope: &EventEnvelope) -> Result<()> {
        let Some(meta) = envelope.meta.get(AMPLITUDE_META_KEY) else {
            // Nothing to sync; the transformer filters out unsuitable events.
            debug!(envelope = %envelope.id, "No amplitude metadata on event, skipping");
            return Ok(());
        };
        let meta: AmplitudeMeta = serde_json::from_value(meta.clone())?;

        if let Err(error) = self
            .client
            .update_event_property(&meta.event_property, &meta.amp_event, &meta.description)
            .await
        {
            debug!("Error: {}", error);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{ChangeEvent, EventKind};
    use serde_json::json;

    fn amplitude_config() -> AmplitudeConfig {
        AmplitudeConfig {
            api_key: "key".to_string(),
            secret_key: "secret".to_string(),
        }
    }

    #[test]
    fn test_client_requires_keys() {
        let config = AmplitudeConfig {
            api_key: " ".to_string(),
            secret_key: "secret".to_string(),
        };
        assert!(TaxonomyClient::new(&config).is_err());
        assert!(TaxonomyClient::new(&amplitude_config()).is_ok());
    }

    #[tokio::test]
    async fn test_envelope_without_meta_is_skipped() {
        let action = AmplitudeAction::new(&amplitude_config()).unwrap();
        let envelope = EventEnvelope::new(
            EventKind::MetadataChangeLog,
            ChangeEvent::new("dataset", "urn", "aspect", "actor"),
        );

        // No metadata means no request is attempted, so this completes
        // without touching the network.
        assert!(action.act(&envelope).await.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_meta_is_an_error() {
        let action = AmplitudeAction::new(&amplitude_config()).unwrap();
        let envelope = EventEnvelope::new(
            EventKind::MetadataChangeLog,
            ChangeEvent::new("dataset", "urn", "aspect", "actor"),
        )
        .with_meta(AMPLITUDE_META_KEY, json!({"unexpected": "shape"}));

        assert!(action.act(&envelope).await.is_err());
    }
}

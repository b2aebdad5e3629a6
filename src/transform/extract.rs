//! Extracts analytics taxonomy updates from schema metadata changes.
//!
//! Compares the previous and new per-field snapshots of an editable-schema
//! change, and stashes the changed field plus its new description on the
//! envelope metadata for the taxonomy sync action. Descriptions with
//! formatting the taxonomy API cannot represent (markdown markers, images,
//! tables) are rejected; clickable links are reduced to their text.

use crate::error::{Result, RippleError};
use crate::event::{EditableSchemaFieldInfo, EditableSchemaMetadata, EventEnvelope};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::Transformer;

/// Envelope metadata key under which the extracted update is stashed.
pub const AMPLITUDE_META_KEY: &str = "amplitude";

/// The extracted taxonomy update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmplitudeMeta {
    /// The changed field path, used as the taxonomy event property.
    pub event_property: String,
    /// The new description.
    pub description: String,
    /// The taxonomy event name, derived from the entity urn.
    pub amp_event: String,
}

/// Annotates outgoing events with the data the taxonomy sync action needs.
pub struct ExtractTransformer;

impl ExtractTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Users can change the formatting of a description, bold, italic, etc.
    /// and add images or links. Formats that won't survive a taxonomy API
    /// update are rejected.
    fn is_suspicious(description: &str) -> bool {
        // bold, italic, strikethrough, code block
        if matches(r"[*~_`]", description) {
            return true;
        }
        // bullet point, numbered list
        if matches(r"1\.", description) {
            return true;
        }
        // image
        if matches(r"!\[", description) {
            return true;
        }
        // table
        if matches("<br>", description) {
            return true;
        }
        false
    }

    /// If the description is a clickable link, extract the text so it can be
    /// written back to the taxonomy.
    fn link_text(description: &str) -> String {
        let captured = Regex::new(r"\[.*?\]")
            .ok()
            .and_then(|re| re.find(description).map(|m| m.as_str().to_string()));
        match captured {
            Some(text) => text.trim_matches(|c| c == '[' || c == ']').to_string(),
            None => description.to_string(),
        }
    }

    /// Derive the taxonomy event name from the entity urn's parenthesized
    /// tuple.
    fn amp_event_from_urn(entity_urn: &str) -> Option<String> {
        let re = Regex::new(r"\((.*?)\)").ok()?;
        let captured = re.captures(entity_urn)?.get(1)?.as_str();
        let name = captured.split(',').nth(1)?;
        Some(name.to_string())
    }

    /// Pairwise-compare the two snapshots by field path; the last differing
    /// pair that carries a description wins.
    fn diff_snapshots(
        previous: &[EditableSchemaFieldInfo],
        current: &[EditableSchemaFieldInfo],
    ) -> Option<(String, String)> {
        let mut found = None;
        for field in current {
            for previous_field in previous {
                if field.field_path == previous_field.field_path && field != previous_field {
                    if let Some(description) = &field.description {
                        found = Some((field.field_path.clone(), description.trim().to_string()));
                    }
                }
            }
        }
        found
    }
}

impl Default for ExtractTransformer {
    fn default() -> Self {
        Self::new()
    }
}

fn matches(pattern: &str, text: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

#[async_trait]
impl Transformer for ExtractTransformer {
    fn name(&self) -> &str {
        "amplitude_extract"
    }

    async fn transform(&self, mut envelope: EventEnvelope) -> Result<Option<EventEnvelope>> {
        info!("Preparing to extract event {}", envelope.id);

        let current = envelope
            .event
            .aspect_json()?
            .ok_or_else(|| RippleError::MalformedEvent("event carries no aspect".to_string()))?;
        let previous = envelope.event.previous_aspect_json()?.ok_or_else(|| {
            RippleError::MalformedEvent("event carries no previous aspect".to_string())
        })?;
        let current = EditableSchemaMetadata::from_value(&current)?;
        let previous = EditableSchemaMetadata::from_value(&previous)?;

        let diff = Self::diff_snapshots(
            &previous.editable_schema_field_info,
            &current.editable_schema_field_info,
        );
        let Some((field_path, description)) = diff else {
            debug!("No field description change to extract");
            return Ok(Some(envelope));
        };
        let Some(amp_event) = Self::amp_event_from_urn(&envelope.event.entity_urn) else {
            debug!(urn = %envelope.event.entity_urn, "Could not derive event name from urn");
            return Ok(Some(envelope));
        };

        // Make sure users are not adding any funky formatting.
        if Self::is_suspicious(&description) {
            error!("Update contains a format not valid with the taxonomy API");
            return Ok(Some(envelope));
        }

        let meta = AmplitudeMeta {
            event_property: field_path,
            description: Self::link_text(&description),
            amp_event,
        };
        envelope
            .meta
            .insert(AMPLITUDE_META_KEY.to_string(), serde_json::to_value(meta)?);
        Ok(Some(envelope))
    }
}

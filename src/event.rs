//! Inbound event contract for ripple actions and transformers.
//!
//! The surrounding pipeline delivers metadata-change events wrapped in an
//! [`EventEnvelope`]. Aspect payloads arrive as JSON strings and are parsed
//! once at this boundary; handlers downstream work with typed values instead
//! of repeated map-key lookups.

use crate::error::{Result, RippleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Aspect name carrying editable per-field schema metadata.
pub const EDITABLE_SCHEMA_METADATA_ASPECT: &str = "editableSchemaMetadata";

/// Entity type whose description changes are propagated.
pub const DATASET_ENTITY_TYPE: &str = "dataset";

/// The catalog's own internal actor. Changes authored by it are never
/// propagated, to avoid propagation loops.
pub const SYSTEM_ACTOR: &str = "urn:li:corpuser:datahub";

/// Kind of event carried by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A metadata change log entry (aspect-level change).
    MetadataChangeLog,
    /// A higher-level entity change notification.
    EntityChange,
}

/// Who made a change, and when (epoch millis).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStamp {
    /// Change time in epoch milliseconds.
    pub time: i64,
    /// URN of the actor that authored the change.
    pub actor: String,
}

/// A raw aspect payload: the aspect value serialized as a JSON string,
/// exactly as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AspectPayload {
    pub value: String,
}

/// A single metadata change event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Entity type, e.g. "dataset".
    pub entity_type: String,
    /// URN of the changed entity.
    pub entity_urn: String,
    /// Name of the changed aspect.
    pub aspect_name: String,
    /// Who made the change.
    pub created: AuditStamp,
    /// New aspect payload.
    pub aspect: Option<AspectPayload>,
    /// Previous aspect payload. Absent when the aspect is written for the
    /// first time.
    pub previous_aspect_value: Option<AspectPayload>,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(
        entity_type: impl Into<String>,
        entity_urn: impl Into<String>,
        aspect_name: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_urn: entity_urn.into(),
            aspect_name: aspect_name.into(),
            created: AuditStamp {
                time: Utc::now().timestamp_millis(),
                actor: actor.into(),
            },
            aspect: None,
            previous_aspect_value: None,
        }
    }

    /// Set the new aspect payload.
    pub fn with_aspect(mut self, value: &Value) -> Self {
        self.aspect = Some(AspectPayload {
            value: value.to_string(),
        });
        self
    }

    /// Set the previous aspect payload.
    pub fn with_previous_aspect(mut self, value: &Value) -> Self {
        self.previous_aspect_value = Some(AspectPayload {
            value: value.to_string(),
        });
        self
    }

    /// Parse the new aspect payload. Returns `Ok(None)` when the event
    /// carries no aspect; malformed JSON is a hard failure for this event.
    pub fn aspect_json(&self) -> Result<Option<Value>> {
        match &self.aspect {
            Some(payload) => Ok(Some(serde_json::from_str(&payload.value)?)),
            None => Ok(None),
        }
    }

    /// Parse the previous aspect payload. Returns `Ok(None)` when absent;
    /// malformed JSON is a hard failure for this event.
    pub fn previous_aspect_json(&self) -> Result<Option<Value>> {
        match &self.previous_aspect_value {
            Some(payload) => Ok(Some(serde_json::from_str(&payload.value)?)),
            None => Ok(None),
        }
    }
}

/// Envelope wrapping a single event on its way through the pipeline.
///
/// Transformers may attach metadata for downstream actions via `meta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique envelope ID.
    pub id: String,
    /// Kind of the wrapped event.
    pub kind: EventKind,
    /// The wrapped event.
    pub event: ChangeEvent,
    /// Metadata attached by transformers.
    pub meta: HashMap<String, Value>,
    /// When the envelope was received.
    pub received_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// Create a new envelope.
    pub fn new(kind: EventKind, event: ChangeEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            event,
            meta: HashMap::new(),
            received_at: Utc::now(),
        }
    }

    /// Attach metadata.
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta.insert(key.into(), value);
        self
    }

    /// Serialize the envelope to JSON.
    pub fn as_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize an envelope from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Typed view of the editable schema metadata aspect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableSchemaMetadata {
    #[serde(default)]
    pub editable_schema_field_info: Vec<EditableSchemaFieldInfo>,
}

impl EditableSchemaMetadata {
    /// Parse the typed view out of a raw aspect value.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| RippleError::MalformedEvent(format!("invalid schema metadata: {}", e)))
    }
}

/// Per-field editable metadata. Unknown keys (tags, glossary terms) are kept
/// so that structural comparison sees non-description edits too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableSchemaFieldInfo {
    pub field_path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

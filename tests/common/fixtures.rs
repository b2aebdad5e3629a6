//! Fixtures: envelope builders, canned lineage responses, and a recording
//! graph client.

use async_trait::async_trait;
use ripple::config::{AllowDenyPattern, Direction, PropagationConfig};
use ripple::event::{ChangeEvent, EventEnvelope, EventKind, EDITABLE_SCHEMA_METADATA_ASPECT};
use ripple::graph::{GraphClient, GraphQuery};
use ripple::{Result, RippleError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const PARENT_URN: &str = "urn:li:dataset:(urn:li:dataPlatform:hive,db.parent,PROD)";

/// Graph client double: records every query and replays queued responses.
pub struct RecordingGraphClient {
    queries: Mutex<Vec<GraphQuery>>,
    responses: Mutex<VecDeque<std::result::Result<Value, RippleError>>>,
}

impl RecordingGraphClient {
    pub fn new() -> Self {
        Self {
            queries: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a successful response.
    pub fn respond_with(self, response: Value) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failure.
    pub fn fail_with(self, error: RippleError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Every query seen so far, in order.
    pub fn queries(&self) -> Vec<GraphQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl Default for RecordingGraphClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphClient for RecordingGraphClient {
    async fn graphql(&self, query: &GraphQuery) -> Result<Value> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

/// A propagation config that allows everything downstream at degree 1.
pub fn propagation_config() -> PropagationConfig {
    PropagationConfig {
        enabled: true,
        parent_pattern: AllowDenyPattern::allow_all(),
        child_pattern: None,
        entity_types: vec!["dataset".to_string()],
        direction: Direction::Downstream,
        dependency_levels: vec!["1".to_string()],
        exclude_fields: None,
        platform_propagate: false,
    }
}

/// An envelope describing a description edit on `field_path` of the parent
/// dataset, from `old` to `new`.
pub fn description_change(actor: &str, field_path: &str, old: &str, new: &str) -> EventEnvelope {
    let event = ChangeEvent::new(
        "dataset",
        PARENT_URN,
        EDITABLE_SCHEMA_METADATA_ASPECT,
        actor,
    )
    .with_previous_aspect(&json!({
        "editableSchemaFieldInfo": [{"fieldPath": field_path, "description": old}]
    }))
    .with_aspect(&json!({
        "editableSchemaFieldInfo": [{"fieldPath": field_path, "description": new}]
    }));
    EventEnvelope::new(EventKind::MetadataChangeLog, event)
}

/// A lineage child entity with a schema.
pub fn child_entity(platform: &str, name: &str, entity_type: &str, fields: &[&str]) -> Value {
    let fields: Vec<Value> = fields
        .iter()
        .map(|path| json!({"fieldPath": path, "type": "STRING", "nativeDataType": "varchar"}))
        .collect();
    json!({
        "degree": 1,
        "entity": {
            "urn": format!("urn:li:dataset:(urn:li:dataPlatform:{},{},PROD)", platform, name),
            "type": entity_type,
            "schemaMetadata": {"fields": fields}
        }
    })
}

/// A full lineage response for the parent dataset.
pub fn lineage_response(children: Vec<Value>) -> Value {
    json!({
        "entity": {"urn": PARENT_URN},
        "searchAcrossLineage": {"searchResults": children}
    })
}

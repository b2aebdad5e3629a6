//! Field description propagation.
//!
//! Given a change event describing an edited field description on a parent
//! dataset, resolve the dataset's lineage, filter the related entities by
//! platform, deny pattern, and entity type, and issue one mutation copying
//! the new description onto every matching child field.
//!
//! Every invocation runs the same gate chain and ends in a terminal
//! [`Outcome`]; a gate that stops propagation is a logged skip, not an
//! error. Only malformed aspect payloads fail the invocation.

use crate::config::PropagationConfig;
use crate::diff::{extract_field_diff, FieldDiff};
use crate::error::Result;
use crate::event::{
    EventEnvelope, EventKind, DATASET_ENTITY_TYPE, EDITABLE_SCHEMA_METADATA_ASPECT, SYSTEM_ACTOR,
};
use crate::graph::GraphClient;
use crate::lineage::{
    collect_field_updates, mutation_query, retain_allowed, retain_entity_types, retain_platform,
    search_lineage_query, LineageResponse,
};
use crate::urn::parse_entity_urn;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::Action;

/// Why an invocation stopped before querying lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Propagation is disabled in configuration.
    Disabled,
    /// The event is not an editable-schema-metadata change.
    AspectMismatch,
    /// The changed entity is not a dataset.
    EntityTypeMismatch,
    /// The change was authored by the catalog itself.
    SystemActor,
    /// The parent dataset is not covered by the parent pattern (or its urn
    /// could not be parsed).
    ParentNotAllowed,
    /// The aspect change carries no field-info diff.
    NoDiff,
    /// The diff is not a description change (e.g. a tag edit).
    NonDescriptionChange,
    /// The changed field is on the exclusion list.
    ExcludedField(String),
}

/// Terminal state of one propagation invocation.
#[derive(Debug)]
pub enum Outcome {
    /// The envelope was not a metadata change log event.
    Rejected(String),
    /// A business-rule gate stopped propagation.
    Skipped(SkipReason),
    /// The lineage response was missing or unusable (transport failure).
    LineageUnavailable,
    /// The parent has no lineage in the configured direction.
    ParentOnly,
    /// Lineage survived filtering but no child schema carries the field.
    NoMatchingFields,
    /// A mutation was issued for `updates` child fields. `response` is
    /// `None` when the mutation call itself failed (non-fatal).
    Propagated {
        updates: usize,
        response: Option<Value>,
    },
}

/// Propagates edited field descriptions across dataset lineage.
pub struct PropagationAction {
    config: PropagationConfig,
    graph: Arc<dyn GraphClient>,
}

impl PropagationAction {
    /// Create the action, validating its configuration.
    pub fn new(config: PropagationConfig, graph: Arc<dyn GraphClient>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, graph })
    }

    /// Run the full gate chain for one envelope and return the terminal
    /// outcome.
    pub async fn propagate(&self, envelope: &EventEnvelope) -> Result<Outcome> {
        if envelope.kind != EventKind::MetadataChangeLog {
            info!("Not a MetadataChangeLogEvent, skipping");
            return Ok(Outcome::Rejected(
                "not a metadata change log event".to_string(),
            ));
        }
        let event = &envelope.event;

        if !self.config.enabled {
            info!("Propagation is disabled, skipping");
            return Ok(Outcome::Skipped(SkipReason::Disabled));
        }
        if event.aspect_name != EDITABLE_SCHEMA_METADATA_ASPECT {
            return Ok(Outcome::Skipped(SkipReason::AspectMismatch));
        }
        if event.entity_type != DATASET_ENTITY_TYPE {
            return Ok(Outcome::Skipped(SkipReason::EntityTypeMismatch));
        }
        if event.created.actor == SYSTEM_ACTOR {
            debug!(urn = %event.entity_urn, "Self-authored change, not propagating");
            return Ok(Outcome::Skipped(SkipReason::SystemActor));
        }

        // Is the dataset a parent from which to propagate?
        let parent = parse_entity_urn(&event.entity_urn);
        let allowed = parent
            .as_ref()
            .map(|p| self.config.parent_pattern.allowed(&p.pattern_key()))
            .unwrap_or(false);
        let Some(parent) = parent.filter(|_| allowed) else {
            info!("Field update is not on a parent urn: {}", event.entity_urn);
            return Ok(Outcome::Skipped(SkipReason::ParentNotAllowed));
        };

        info!("Starting propagation for dataset: {}", event.entity_urn);

        let Some(record) = extract_field_diff(event)? else {
            info!("Tag update, skipping...");
            return Ok(Outcome::Skipped(SkipReason::NoDiff));
        };

        if let Some(field_path) = record.get("fieldPath").and_then(Value::as_str) {
            if let Some(excluded) = &self.config.exclude_fields {
                if excluded.iter().any(|field| field == field_path) {
                    info!("Field: {} is excluded from propagation", field_path);
                    return Ok(Outcome::Skipped(SkipReason::ExcludedField(
                        field_path.to_string(),
                    )));
                }
            }
        }

        let Some(diff) = FieldDiff::from_record(&record) else {
            info!("Tag update, skipping...");
            return Ok(Outcome::Skipped(SkipReason::NonDescriptionChange));
        };

        // We have a field update; get the lineage of the parent dataset.
        let query = search_lineage_query(
            &event.entity_urn,
            self.config.direction,
            &self.config.dependency_levels,
        );
        let response = match self.graph.graphql(&query).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Parent dataset lineage request failed: {}", e);
                return Ok(Outcome::LineageUnavailable);
            }
        };
        let lineage = match LineageResponse::from_value(&response) {
            Ok(lineage) => lineage,
            Err(e) => {
                warn!("Unexpected lineage response shape: {}", e);
                return Ok(Outcome::LineageUnavailable);
            }
        };
        let Some(search) = lineage.search_across_lineage else {
            warn!("Get parent dataset lineage request has returned an empty response for searchAcrossLineage");
            return Ok(Outcome::LineageUnavailable);
        };
        if search.search_results.is_empty() {
            info!(
                "Parent dataset has no {} lineage, updating parent only",
                self.config.direction.as_str().to_lowercase()
            );
            return Ok(Outcome::ParentOnly);
        }

        let mut results = search.search_results;
        if !self.config.platform_propagate {
            results = retain_platform(results, &parent);
        }
        if let Some(child_pattern) = &self.config.child_pattern {
            results = retain_allowed(results, child_pattern);
        }
        results = retain_entity_types(results, &self.config.entity_types);

        let updates = collect_field_updates(&results, &diff);
        if updates.is_empty() {
            info!(
                "No lineage fields match {}, nothing to propagate",
                diff.field_path
            );
            return Ok(Outcome::NoMatchingFields);
        }

        let mutation = mutation_query(&updates);
        match self.graph.graphql(&mutation).await {
            Ok(response) => {
                info!(
                    "Dataset: {} was updated by {} and successfully propagated to: {}",
                    event.entity_urn, event.created.actor, response
                );
                Ok(Outcome::Propagated {
                    updates: updates.len(),
                    response: Some(response),
                })
            }
            Err(e) => {
                debug!("Propagation mutation failed: {}", e);
                Ok(Outcome::Propagated {
                    updates: updates.len(),
                    response: None,
                })
            }
        }
    }
}

#[async_trait]
impl Action for PropagationAction {
    fn name(&self) -> &str {
        "field_description_propagation"
    }

    async fn act(&self, envelope: &EventEnvelope) -> Result<()> {
        self.propagate(envelope).await.map(|_| ())
    }
}

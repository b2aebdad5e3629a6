//! Filter stages over a lineage result set.
//!
//! Each stage is a pure function from a result vector to a result vector:
//! stages only remove elements, preserve the order of survivors, and are
//! idempotent, so a chain can be composed in any configuration without
//! aliasing surprises.

use crate::config::AllowDenyPattern;
use crate::diff::FieldDiff;
use crate::lineage::query::FieldUpdate;
use crate::lineage::SearchResult;
use crate::urn::{parse_entity_urn, DatasetRef};
use tracing::debug;

/// Keep only entities on the same platform as the root dataset.
///
/// Entities whose URN cannot be parsed are removed; they cannot be shown to
/// match the root's platform.
pub fn retain_platform(results: Vec<SearchResult>, root: &DatasetRef) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| match parse_entity_urn(&result.entity.urn) {
            Some(child) => child.platform == root.platform,
            None => false,
        })
        .collect()
}

/// Keep only entities whose `PLATFORM.DATASET` probe string passes the
/// allow/deny pattern. Unparseable URNs are removed.
pub fn retain_allowed(results: Vec<SearchResult>, pattern: &AllowDenyPattern) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| match parse_entity_urn(&result.entity.urn) {
            Some(child) => pattern.allowed(&child.pattern_key()),
            None => false,
        })
        .collect()
}

/// Keep only entities whose type (case-folded) is in the allow set.
pub fn retain_entity_types(results: Vec<SearchResult>, allow: &[String]) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| {
            let entity_type = result.entity.entity_type.to_lowercase();
            allow.iter().any(|allowed| *allowed == entity_type)
        })
        .collect()
}

/// Map the diff's field path onto matching schema fields of the surviving
/// entities, producing one [`FieldUpdate`] per exact match.
pub fn collect_field_updates(results: &[SearchResult], diff: &FieldDiff) -> Vec<FieldUpdate> {
    let mut updates = Vec::new();
    for result in results {
        let Some(schema) = &result.entity.schema_metadata else {
            debug!(urn = %result.entity.urn, "entity has no schema metadata, skipping");
            continue;
        };
        for field in &schema.fields {
            if field.field_path == diff.field_path {
                updates.push(FieldUpdate {
                    urn: result.entity.urn.clone(),
                    field_path: field.field_path.clone(),
                    description: diff.description.clone(),
                });
            }
        }
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::{LineageEntity, SchemaField, SchemaMetadata};

    fn dataset_result(platform: &str, name: &str, entity_type: &str) -> SearchResult {
        SearchResult {
            degree: Some(1),
            entity: LineageEntity {
                urn: format!(
                    "urn:li:dataset:(urn:li:dataPlatform:{},{},PROD)",
                    platform, name
                ),
                entity_type: entity_type.to_string(),
                schema_metadata: Some(SchemaMetadata {
                    fields: vec![SchemaField {
                        field_path: "f1".to_string(),
                        field_type: None,
                        native_data_type: None,
                    }],
                }),
            },
        }
    }

    fn root() -> DatasetRef {
        DatasetRef {
            platform: "hive".to_string(),
            dataset: "db.parent".to_string(),
        }
    }

    #[test]
    fn test_platform_filter_removes_other_platforms() {
        let results = vec![
            dataset_result("hive", "db.a", "DATASET"),
            dataset_result("snowflake", "db.b", "DATASET"),
        ];

        let filtered = retain_platform(results, &root());
        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].entity.urn.contains("hive"));
    }

    #[test]
    fn test_platform_filter_removes_unparseable_urns() {
        let mut results = vec![dataset_result("hive", "db.a", "DATASET")];
        results.push(SearchResult {
            degree: None,
            entity: LineageEntity {
                urn: "garbage".to_string(),
                entity_type: "DATASET".to_string(),
                schema_metadata: None,
            },
        });

        let filtered = retain_platform(results, &root());
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_deny_filter_retains_iff_allowed() {
        let pattern = AllowDenyPattern {
            allow: vec![".*".to_string()],
            deny: vec!["HIVE\\.DB\\.B".to_string()],
        };
        let results = vec![
            dataset_result("hive", "db.a", "DATASET"),
            dataset_result("hive", "db.b", "DATASET"),
        ];

        let filtered = retain_allowed(results, &pattern);
        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].entity.urn.contains("db.a"));
    }

    #[test]
    fn test_entity_type_filter_case_folds() {
        let allow = vec!["dataset".to_string()];
        let results = vec![
            dataset_result("hive", "db.a", "DATASET"),
            dataset_result("hive", "db.b", "CHART"),
        ];

        let filtered = retain_entity_types(results, &allow);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_entity_type_filter_is_idempotent() {
        let allow = vec!["dataset".to_string()];
        let results = vec![
            dataset_result("hive", "db.a", "DATASET"),
            dataset_result("hive", "db.b", "CHART"),
        ];

        let once = retain_entity_types(results, &allow);
        let urns_once: Vec<String> = once.iter().map(|r| r.entity.urn.clone()).collect();
        let twice = retain_entity_types(once, &allow);
        let urns_twice: Vec<String> = twice.iter().map(|r| r.entity.urn.clone()).collect();

        assert_eq!(urns_once, urns_twice);
    }

    #[test]
    fn test_filters_preserve_order() {
        let results = vec![
            dataset_result("hive", "db.a", "DATASET"),
            dataset_result("snowflake", "db.b", "DATASET"),
            dataset_result("hive", "db.c", "DATASET"),
        ];

        let filtered = retain_platform(results, &root());
        assert!(filtered[0].entity.urn.contains("db.a"));
        assert!(filtered[1].entity.urn.contains("db.c"));
    }

    #[test]
    fn test_collect_field_updates_matches_exact_paths() {
        let diff = FieldDiff {
            field_path: "f1".to_string(),
            description: "new desc".to_string(),
        };
        let mut results = vec![dataset_result("hive", "db.a", "DATASET")];
        // second entity whose schema has no matching field
        results.push(SearchResult {
            degree: Some(1),
            entity: LineageEntity {
                urn: "urn:li:dataset:(urn:li:dataPlatform:hive,db.b,PROD)".to_string(),
                entity_type: "DATASET".to_string(),
                schema_metadata: Some(SchemaMetadata {
                    fields: vec![SchemaField {
                        field_path: "other".to_string(),
                        field_type: None,
                        native_data_type: None,
                    }],
                }),
            },
        });

        let updates = collect_field_updates(&results, &diff);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].field_path, "f1");
        assert_eq!(updates[0].description, "new desc");
        assert!(updates[0].urn.contains("db.a"));
    }
}

//! Lineage query results, query building, and filtering.
//!
//! - Typed model of the graph's `searchAcrossLineage` response, validated
//!   once at the boundary
//! - Builders for the lineage search query and the description-update
//!   mutation
//! - Pure, order-preserving filter stages over the result set

pub mod filter;
pub mod query;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use filter::{
    collect_field_updates, retain_allowed, retain_entity_types, retain_platform,
};
pub use query::{mutation_query, search_lineage_query, FieldUpdate};

/// Response to a lineage search query.
///
/// A response without `searchAcrossLineage` is a transport/API failure, not
/// a dataset with no lineage; callers must treat the two differently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageResponse {
    /// The root entity, including its own schema.
    #[serde(default)]
    pub entity: Option<RootEntity>,
    /// Lineage-connected entities.
    #[serde(default)]
    pub search_across_lineage: Option<SearchAcrossLineage>,
}

impl LineageResponse {
    /// Parse a raw graph response.
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// The queried root entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RootEntity {
    pub urn: String,
    #[serde(default)]
    pub schema_metadata: Option<SchemaMetadata>,
}

/// The lineage search result collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAcrossLineage {
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
}

/// One lineage-connected entity with its graph distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Graph distance from the root.
    #[serde(default)]
    pub degree: Option<u32>,
    pub entity: LineageEntity,
}

/// A related entity in the lineage result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineageEntity {
    pub urn: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub schema_metadata: Option<SchemaMetadata>,
}

/// Schema of a dataset entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMetadata {
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

/// One schema field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub field_path: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub native_data_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_parsing() {
        let value = json!({
            "entity": {"urn": "urn:li:dataset:(urn:li:dataPlatform:hive,db.parent,PROD)"},
            "searchAcrossLineage": {
                "searchResults": [
                    {
                        "degree": 1,
                        "entity": {
                            "urn": "urn:li:dataset:(urn:li:dataPlatform:hive,db.child,PROD)",
                            "type": "DATASET",
                            "schemaMetadata": {
                                "fields": [{"fieldPath": "f1", "type": "STRING", "nativeDataType": "varchar"}]
                            }
                        }
                    }
                ]
            }
        });

        let response = LineageResponse::from_value(&value).unwrap();
        let search = response.search_across_lineage.unwrap();
        assert_eq!(search.search_results.len(), 1);

        let result = &search.search_results[0];
        assert_eq!(result.degree, Some(1));
        assert_eq!(result.entity.entity_type, "DATASET");
        let fields = &result.entity.schema_metadata.as_ref().unwrap().fields;
        assert_eq!(fields[0].field_path, "f1");
    }

    #[test]
    fn test_missing_lineage_key_is_none() {
        let response = LineageResponse::from_value(&json!({"entity": {"urn": "u"}})).unwrap();
        assert!(response.search_across_lineage.is_none());
    }

    #[test]
    fn test_non_object_response_is_an_error() {
        assert!(LineageResponse::from_value(&Value::Null).is_err());
    }
}

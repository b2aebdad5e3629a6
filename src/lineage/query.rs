//! Builders for lineage search queries and description-update mutations.

use crate::config::Direction;
use crate::graph::GraphQuery;
use crate::urn::parse_entity_urn;
use serde_json::json;
use tracing::error;

/// GraphQL document requesting a dataset's schema and its lineage-connected
/// entities at the given degrees, up to 1000 results.
const SEARCH_LINEAGE_QUERY: &str = r#"
    query searchLineage($urn: String!, $direction: LineageDirection!, $dependency_level: [String!]) {
      entity(urn: $urn) {
        urn
        ... on Dataset {
          schemaMetadata(version: 0) {
            ...schemaMetadataFields
          }
        }
      }
    searchAcrossLineage(
      input: {query: "*", urn: $urn, start: 0, count: 1000, direction: $direction, orFilters: [{and: [{condition: EQUAL, negated: false, field: "degree", values: $dependency_level}]}]}
    ) {
    searchResults {
      degree
      entity {
        urn
        type
        ... on Dataset {
          schemaMetadata {
            fields {
              fieldPath
                type
                nativeDataType
            }
          }
        }
      }
    }
  }
}

fragment schemaMetadataFields on SchemaMetadata {
  fields {
    ...schemaFieldFields
  }
}

fragment schemaFieldFields on SchemaField {
  fieldPath
  type
  nativeDataType
}
"#;

/// Build the lineage search query for a root dataset.
pub fn search_lineage_query(
    urn: &str,
    direction: Direction,
    dependency_levels: &[String],
) -> GraphQuery {
    GraphQuery::new(SEARCH_LINEAGE_QUERY).with_variables(json!({
        "urn": urn,
        "direction": direction.as_str(),
        "dependency_level": dependency_levels,
    }))
}

/// One description write targeting a single field of a single entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldUpdate {
    pub urn: String,
    pub field_path: String,
    pub description: String,
}

/// Build a single mutation document writing every field update, one aliased
/// `updateDescription` block per update.
///
/// Literal newlines in descriptions are escaped so the document stays
/// well-formed. An update whose URN cannot be parsed for an alias is skipped
/// and logged; it never aborts the remaining updates.
pub fn mutation_query(updates: &[FieldUpdate]) -> GraphQuery {
    let mut body = String::new();
    for update in updates {
        let Some(parsed) = parse_entity_urn(&update.urn) else {
            error!(urn = %update.urn, "Skipping field update with unparseable urn");
            continue;
        };
        let description = update.description.replace('\n', "\\n");
        body.push_str(&alias_block(
            &parsed.mutation_alias(),
            &update.urn,
            &update.field_path,
            &description,
        ));
    }
    GraphQuery::new(format!("mutation {{ {} }}", body))
}

fn alias_block(alias: &str, urn: &str, field_path: &str, description: &str) -> String {
    format!(
        "{}: updateDescription( input: {{description: \"{}\", resourceUrn: \"{}\", subResource: \"{}\", subResourceType:DATASET_FIELD}})",
        alias, description, urn, field_path
    )
}

//! Entity URN parsing.
//!
//! Catalog URNs come in two layouts: "indexed" entities (datasets, data jobs)
//! nest a platform sub-URN, while flat entities (charts, dashboards, data
//! flows) embed a parenthesized `(platform,name)` tuple directly. The
//! [`UrnGrammar`] enum is the single source of truth for that distinction.

use crate::error::{Result, RippleError};
use tracing::error;

/// URN layout per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrnGrammar {
    /// `urn:li:dataset:(urn:li:dataPlatform:<platform>,<name>,<env>)`;
    /// platform and name sit in the seventh `:`-separated segment.
    Indexed,
    /// `urn:li:chart:(<platform>,<name>)`; platform and name sit in the
    /// fourth `:`-separated segment.
    Flat,
}

impl UrnGrammar {
    /// Classify an entity type, or `None` for unsupported types.
    pub fn of(entity_type: &str) -> Option<UrnGrammar> {
        match entity_type {
            "chart" | "dashboard" | "dataFlow" => Some(UrnGrammar::Flat),
            "dataJob" | "dataset" => Some(UrnGrammar::Indexed),
            _ => None,
        }
    }
}

/// Platform and dataset name extracted from an entity URN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub platform: String,
    pub dataset: String,
}

impl DatasetRef {
    /// The probe string matched against allow/deny patterns,
    /// `PLATFORM.DATASET` upper-cased.
    pub fn pattern_key(&self) -> String {
        format!("{}.{}", self.platform, self.dataset).to_uppercase()
    }

    /// GraphQL alias for a mutation block targeting this dataset. Dots are
    /// not valid in aliases.
    pub fn mutation_alias(&self) -> String {
        self.dataset.replace('.', "_")
    }
}

/// Parse the platform and dataset name out of an entity URN.
///
/// Failures are logged and yield `None` so that one malformed URN never
/// aborts a batch of lineage results.
pub fn parse_entity_urn(entity_urn: &str) -> Option<DatasetRef> {
    match try_parse(entity_urn) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            error!(urn = %entity_urn, "Error parsing urn for pattern match: {}", e);
            None
        }
    }
}

fn try_parse(entity_urn: &str) -> Result<DatasetRef> {
    let segments: Vec<&str> = entity_urn.split(':').collect();
    let entity_type = segments
        .get(2)
        .ok_or_else(|| RippleError::UrnParse(format!("too few segments in {}", entity_urn)))?;
    let grammar = UrnGrammar::of(entity_type)
        .ok_or_else(|| RippleError::UrnParse(format!("unsupported entity type {}", entity_type)))?;

    let tuple_segment = match grammar {
        UrnGrammar::Flat => segments.get(3),
        UrnGrammar::Indexed => segments.get(6),
    }
    .ok_or_else(|| RippleError::UrnParse(format!("missing tuple segment in {}", entity_urn)))?;

    let mut parts = tuple_segment.split(',');
    let platform = parts
        .next()
        .ok_or_else(|| RippleError::UrnParse(format!("missing platform in {}", entity_urn)))?;
    let dataset = parts
        .next()
        .ok_or_else(|| RippleError::UrnParse(format!("missing dataset name in {}", entity_urn)))?;

    Ok(DatasetRef {
        platform: strip_parens(platform),
        dataset: strip_parens(dataset),
    })
}

fn strip_parens(token: &str) -> String {
    token.trim_matches(|c| c == '(' || c == ')').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexed_urn_round_trip() {
        let platform = "hive";
        let dataset = "db.table";
        let urn = format!(
            "urn:li:dataset:(urn:li:dataPlatform:{},{},PROD)",
            platform, dataset
        );

        let parsed = parse_entity_urn(&urn).unwrap();
        assert_eq!(parsed.platform, platform);
        assert_eq!(parsed.dataset, dataset);
        assert_eq!(
            format!("{},{}", parsed.platform, parsed.dataset),
            format!("{},{}", platform, dataset)
        );
    }

    #[test]
    fn test_flat_urn_round_trip() {
        let platform = "looker";
        let dataset = "dashboards.revenue";
        let urn = format!("urn:li:chart:({},{})", platform, dataset);

        let parsed = parse_entity_urn(&urn).unwrap();
        assert_eq!(parsed.platform, platform);
        assert_eq!(parsed.dataset, dataset);
    }

    #[test]
    fn test_data_job_urn() {
        let urn = "urn:li:dataJob:(urn:li:dataFlow:(airflow,daily_load,prod),load_task)";
        let parsed = parse_entity_urn(urn).unwrap();
        assert_eq!(parsed.platform, "airflow");
        assert_eq!(parsed.dataset, "daily_load");
    }

    #[test]
    fn test_unknown_entity_type_fails_per_item() {
        assert!(parse_entity_urn("urn:li:corpuser:alice").is_none());
    }

    #[test]
    fn test_malformed_urn_fails_per_item() {
        assert!(parse_entity_urn("not a urn").is_none());
        assert!(parse_entity_urn("urn:li:dataset:short").is_none());
    }

    #[test]
    fn test_pattern_key_and_alias() {
        let parsed = DatasetRef {
            platform: "hive".to_string(),
            dataset: "db.table".to_string(),
        };
        assert_eq!(parsed.pattern_key(), "HIVE.DB.TABLE");
        assert_eq!(parsed.mutation_alias(), "db_table");
    }
}

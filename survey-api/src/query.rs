//! SQL rendering for record listings.
//!
//! Turns a [`FilterSet`] and [`SortOrder`] into a parameterized WHERE /
//! ORDER BY pair for the Postgres store. Text comparisons use the same
//! trim + upper-case normalization as the in-memory filter.

use serde_json::Value as JsonValue;
use survey_core::{FilterClause, FilterSet, SortDirection, SortField, SortOrder};

// ============================================================================
// SQL PARAMETER TYPE
// ============================================================================

/// Type-erased SQL parameter.
#[derive(Debug, Clone)]
pub enum SqlParam {
    Uuid(uuid::Uuid),
    OptUuid(Option<uuid::Uuid>),
    String(String),
    OptString(Option<String>),
    Long(i64),
    Json(JsonValue),
    Timestamp(chrono::DateTime<chrono::Utc>),
}

impl SqlParam {
    /// Borrow as a `tokio_postgres` parameter.
    pub fn as_to_sql(&self) -> &(dyn tokio_postgres::types::ToSql + Sync) {
        match self {
            SqlParam::Uuid(v) => v,
            SqlParam::OptUuid(v) => v,
            SqlParam::String(v) => v,
            SqlParam::OptString(v) => v,
            SqlParam::Long(v) => v,
            SqlParam::Json(v) => v,
            SqlParam::Timestamp(v) => v,
        }
    }
}

/// Borrow a parameter list for `query`/`execute`.
pub fn sql_params(params: &[SqlParam]) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
    params.iter().map(SqlParam::as_to_sql).collect()
}

// ============================================================================
// LIST FILTER TRAIT
// ============================================================================

/// SQL WHERE clause generation for list queries.
pub trait ListFilter {
    /// Conditions without the `WHERE` keyword, plus their parameters.
    /// Returns `None` when nothing needs filtering.
    fn build_where(&self) -> (Option<String>, Vec<SqlParam>);
}

impl ListFilter for FilterSet {
    fn build_where(&self) -> (Option<String>, Vec<SqlParam>) {
        let mut conditions = vec!["kind = $1".to_string()];
        let mut params = vec![SqlParam::String(self.kind().as_str().to_string())];

        for clause in self.clauses() {
            let idx = params.len() + 1;
            match clause {
                FilterClause::TextEquals { field, key } => {
                    conditions.push(format!(
                        "COALESCE(UPPER(TRIM({})), '') = ${}",
                        field.column(),
                        idx
                    ));
                    params.push(SqlParam::String(key.clone()));
                }
                FilterClause::RefEquals { field, id } => {
                    conditions.push(format!("{} = ${}", field.attribute(), idx));
                    params.push(SqlParam::Uuid(*id));
                }
                FilterClause::UpdatedBefore(bound) => {
                    conditions.push(format!("updated_at < ${}", idx));
                    params.push(SqlParam::Timestamp(*bound));
                }
                FilterClause::UpdatedAfter(bound) => {
                    conditions.push(format!("updated_at > ${}", idx));
                    params.push(SqlParam::Timestamp(*bound));
                }
            }
        }

        (Some(conditions.join(" AND ")), params)
    }
}

/// ORDER BY expression; insertion sequence always breaks ties ascending.
pub fn order_by(order: &SortOrder) -> String {
    let column = match order.field {
        SortField::UpdatedAt => "updated_at",
        SortField::CreatedAt => "created_at",
        SortField::System => "COALESCE(UPPER(TRIM(system)), '')",
        SortField::Body => "COALESCE(UPPER(TRIM(body)), '')",
    };
    let direction = match order.direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    };
    format!("{} {}, seq ASC", column, direction)
}

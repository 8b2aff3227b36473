//! Listing parameters and paged responses.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use survey_core::{FilterSet, RecordKind, SortOrder};

use super::RecordResponse;
use crate::config::ApiConfig;

/// A page of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ListResponse {
    pub items: Vec<RecordResponse>,
    /// Matching records across all pages
    pub total: usize,
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
}

/// Query string of a list request, split into filters, ordering and paging.
///
/// Unknown parameters are ignored, as are filters whose values do not parse.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filter: FilterSet,
    pub order: SortOrder,
    pub page: usize,
    pub per_page: usize,
}

impl ListQuery {
    pub fn from_params(
        kind: RecordKind,
        params: &HashMap<String, String>,
        config: &ApiConfig,
    ) -> Self {
        let page = params
            .get("page")
            .and_then(|p| p.trim().parse::<usize>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let per_page = config.per_page(
            params
                .get("per_page")
                .and_then(|p| p.trim().parse::<usize>().ok()),
        );

        Self {
            filter: FilterSet::from_params(
                kind,
                params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            ),
            order: SortOrder::parse(params.get("sort").map(String::as_str)),
            page,
            per_page,
        }
    }

    /// Cut one page out of the full, ordered result.
    pub fn paginate(&self, items: Vec<RecordResponse>) -> ListResponse {
        let total = items.len();
        let skip = (self.page - 1).saturating_mul(self.per_page);
        let items = items.into_iter().skip(skip).take(self.per_page).collect();
        ListResponse {
            items,
            total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use survey_core::{Record, SortField};

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let query = ListQuery::from_params(RecordKind::Star, &params(&[]), &ApiConfig::default());
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 100);
        assert!(query.filter.is_empty());
        assert_eq!(query.order, SortOrder::default());
    }

    #[test]
    fn test_paging_and_sort_are_not_filters() {
        let query = ListQuery::from_params(
            RecordKind::Star,
            &params(&[("page", "2"), ("per_page", "5000"), ("sort", "-system"), ("system", "Sol")]),
            &ApiConfig::default(),
        );
        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 1000);
        assert_eq!(query.order.field, SortField::System);
        assert_eq!(query.filter.clauses().len(), 1);
    }

    #[test]
    fn test_bad_page_falls_back() {
        let query = ListQuery::from_params(
            RecordKind::World,
            &params(&[("page", "0"), ("per_page", "x")]),
            &ApiConfig::default(),
        );
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 100);
    }

    #[test]
    fn test_paginate() {
        let query = ListQuery::from_params(
            RecordKind::Star,
            &params(&[("page", "2"), ("per_page", "2")]),
            &ApiConfig::default(),
        );
        let items: Vec<RecordResponse> = (0..5)
            .map(|_| RecordResponse::from(Record::new(RecordKind::Star, Utc::now())))
            .collect();
        let page = query.paginate(items);
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);

        let beyond = ListQuery { page: 9, ..query }.paginate(Vec::new());
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 0);
    }
}

use serde::{Deserialize, Serialize};

use super::predicate::Predicate;

/// Server-ready search request: presets already flattened to plain predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub query: String,
    pub sort: String,
    pub page: u32,
    pub page_size: u32,
    pub filters: Vec<Predicate>,
    /// `filters` in token form, for APIs that take a single query parameter.
    pub filter_token: String,
}

impl SearchQuery {
    /// Query-string pairs in a stable order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if !self.query.is_empty() {
            params.push(("q", self.query.clone()));
        }
        params.push(("sort", self.sort.clone()));
        params.push(("page", self.page.to_string()));
        params.push(("pageSize", self.page_size.to_string()));
        if !self.filter_token.is_empty() {
            params.push(("filters", self.filter_token.clone()));
        }
        params
    }
}

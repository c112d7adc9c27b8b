//! OData system query options

use crate::{GenerateResult, ODataGenerator};
use serde::{Deserialize, Serialize};
use sieve_core::DataQuery;

/// `$filter`, `$top`, `$skip`, `$orderby`, `$expand`, `$select` and `$count`
/// for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
}

impl ODataParams {
    /// Options compiled from `query`, requesting the total count.
    pub fn from_query(generator: &ODataGenerator, query: &DataQuery) -> GenerateResult<Self> {
        let filter = generator.generate_filter(query)?;
        let order_by = generator.generate_order_by(query);
        Ok(Self {
            filter: non_empty(filter),
            top: query.top,
            skip: query.skip,
            order_by: non_empty(order_by),
            expand: None,
            select: None,
            count: Some(true),
        })
    }

    pub fn with_expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = non_empty(expand.into());
        self
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = non_empty(select.into());
        self
    }

    /// Percent-encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("$filter", filter.clone()));
        }
        if let Some(top) = self.top {
            pairs.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("$skip", skip.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            pairs.push(("$orderby", order_by.clone()));
        }
        if let Some(expand) = &self.expand {
            pairs.push(("$expand", expand.clone()));
        }
        if let Some(select) = &self.select {
            pairs.push(("$select", select.clone()));
        }
        if let Some(count) = self.count {
            pairs.push(("$count", count.to_string()));
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// `url` with the options appended.
    pub fn append_to(&self, url: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            return url.to_string();
        }
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", url, separator, query)
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

// =============================================================================
// TESTS
// =============================================================================

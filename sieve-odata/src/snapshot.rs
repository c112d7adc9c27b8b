//! Compact query snapshots
//!
//! A [`QuerySnapshot`] is the serializable form of a [`DataQuery`]: fields are
//! referenced by OData path so the snapshot can travel in a URL and be
//! restored against the search fields of the same view model later.
//! The encoded form is JSON, zlib-compressed, then base64.

use crate::error::{GenerateError, GenerateResult};
use crate::flatten::SearchFields;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use sieve_core::{
    Conjunction, DataQuery, DataQueryFilter, FilterGroup, FilterNode, FilterOperator, FilterValue,
    SortSpec,
};
use std::io::{Read, Write};

/// Largest decompressed snapshot [`QuerySnapshot::decode`] accepts.
pub const MAX_SNAPSHOT_BYTES: u64 = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<FilterOperator>,
    #[serde(default)]
    pub value: FilterValue,
    #[serde(default = "default_ignore_case")]
    pub ignore_case: bool,
}

fn default_ignore_case() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeSnapshot {
    Filter(FilterSnapshot),
    Group(GroupSnapshot),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupSnapshot {
    #[serde(default)]
    pub conjunction: Conjunction,
    #[serde(default)]
    pub filters: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSnapshot {
    pub path: String,
    #[serde(default)]
    pub descending: bool,
}

/// Serializable form of a [`DataQuery`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuerySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default)]
    pub filter: GroupSnapshot,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<SortSnapshot>,
}

impl QuerySnapshot {
    pub fn from_query(query: &DataQuery) -> Self {
        Self {
            skip: query.skip,
            top: query.top,
            search_text: query.search_text.clone(),
            filter: GroupSnapshot::from_group(&query.filter),
            sorts: query
                .sorts
                .iter()
                .map(|sort| SortSnapshot {
                    path: sort.field.odata_path().to_string(),
                    descending: sort.descending,
                })
                .collect(),
        }
    }

    /// Rebuild the query, resolving every path against `fields`.
    pub fn to_query(&self, fields: &SearchFields) -> GenerateResult<DataQuery> {
        let mut sorts = Vec::with_capacity(self.sorts.len());
        for sort in &self.sorts {
            sorts.push(SortSpec {
                field: fields.require(&sort.path)?.clone(),
                descending: sort.descending,
            });
        }
        Ok(DataQuery {
            skip: self.skip,
            top: self.top,
            search_text: self.search_text.clone(),
            filter: self.filter.to_group(fields)?,
            sorts,
        })
    }

    /// URL-safe text form.
    pub fn encode(&self) -> GenerateResult<String> {
        let json = serde_json::to_vec(self).map_err(snapshot_error)?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json).map_err(snapshot_error)?;
        let compressed = encoder.finish().map_err(snapshot_error)?;
        Ok(URL_SAFE_NO_PAD.encode(compressed))
    }

    /// Parse the text form; fails when it inflates past [`MAX_SNAPSHOT_BYTES`].
    pub fn decode(encoded: &str) -> GenerateResult<Self> {
        let compressed = URL_SAFE_NO_PAD.decode(encoded.trim()).map_err(snapshot_error)?;
        let mut json = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .take(MAX_SNAPSHOT_BYTES + 1)
            .read_to_end(&mut json)
            .map_err(snapshot_error)?;
        if json.len() as u64 > MAX_SNAPSHOT_BYTES {
            return Err(snapshot_error(format!(
                "snapshot exceeds {} bytes once decompressed",
                MAX_SNAPSHOT_BYTES
            )));
        }
        serde_json::from_slice(&json).map_err(snapshot_error)
    }
}

impl GroupSnapshot {
    pub fn from_group(group: &FilterGroup) -> Self {
        Self {
            conjunction: group.conjunction,
            filters: group
                .filters
                .iter()
                .map(|node| match node {
                    FilterNode::Filter(filter) => NodeSnapshot::Filter(FilterSnapshot {
                        path: filter.field.odata_path().to_string(),
                        operator: filter.operator,
                        value: filter.value.clone(),
                        ignore_case: filter.ignore_case,
                    }),
                    FilterNode::Group(group) => NodeSnapshot::Group(GroupSnapshot::from_group(group)),
                })
                .collect(),
        }
    }

    pub fn to_group(&self, fields: &SearchFields) -> GenerateResult<FilterGroup> {
        let mut group = FilterGroup::new(self.conjunction);
        for node in &self.filters {
            match node {
                NodeSnapshot::Filter(filter) => group.push(DataQueryFilter {
                    field: fields.require(&filter.path)?.clone(),
                    operator: filter.operator,
                    value: filter.value.clone(),
                    ignore_case: filter.ignore_case,
                }),
                NodeSnapshot::Group(child) => group.push(child.to_group(fields)?),
            }
        }
        Ok(group)
    }
}

/// Encode `query` for use in a URL.
pub fn encode_query(query: &DataQuery) -> GenerateResult<String> {
    QuerySnapshot::from_query(query).encode()
}

/// Restore a query encoded by [`encode_query`].
pub fn decode_query(encoded: &str, fields: &SearchFields) -> GenerateResult<DataQuery> {
    QuerySnapshot::decode(encoded)?.to_query(fields)
}

fn snapshot_error(err: impl std::fmt::Display) -> GenerateError {
    GenerateError::Snapshot {
        reason: err.to_string(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

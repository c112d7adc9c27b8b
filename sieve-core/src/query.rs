//! Data queries: paging, free-text search, a filter tree and sorts

use crate::{Conjunction, FieldPath, FilterGroup, FilterNode};

/// Sort on a single field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: FieldPath,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(field: FieldPath) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn descending(field: FieldPath) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// A request for one page of filtered, sorted data.
///
/// Equality is structural over every field. Cloning deep-copies the filter
/// tree and the sort list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataQuery {
    pub skip: Option<u32>,
    pub top: Option<u32>,
    /// General search text that may match any supported property
    pub search_text: Option<String>,
    pub filter: FilterGroup,
    pub sorts: Vec<SortSpec>,
}

impl DataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, node: impl Into<FilterNode>) -> Self {
        self.filter.push(node);
        self
    }

    pub fn with_conjunction(mut self, conjunction: Conjunction) -> Self {
        self.filter.conjunction = conjunction;
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_page(mut self, skip: u32, top: u32) -> Self {
        self.skip = Some(skip);
        self.top = Some(top);
        self
    }

    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    /// Top-level filters of the root group.
    pub fn filters(&self) -> &[FilterNode] {
        &self.filter.filters
    }

    /// Conjunction of the root group.
    pub fn conjunction(&self) -> Conjunction {
        self.filter.conjunction
    }

    /// Same filters and sorts, positioned at another page.
    pub fn page(&self, skip: u32, top: u32) -> Self {
        Self {
            skip: Some(skip),
            top: Some(top),
            search_text: self.search_text.clone(),
            filter: self.filter.clone(),
            sorts: self.sorts.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! Filter tree: leaf comparisons combined by and/or groups
//!
//! A [`FilterNode`] is either a [`DataQueryFilter`] (field + operator + value)
//! or a [`FilterGroup`] of further nodes. Children are owned, so a group can
//! never contain itself.

use crate::{Conjunction, DateFilter, FieldPath, FilterOperator};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// FILTER VALUES
// ============================================================================

/// Value a leaf filter compares against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum FilterValue {
    /// No value entered yet
    #[default]
    Null,
    String(String),
    Bool(bool),
    Integer(i64),
    Decimal(f64),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
    DateFilter(DateFilter),
    /// Enum variant name
    Enum(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    pub fn enumeration(variant: impl Into<String>) -> Self {
        FilterValue::Enum(variant.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FilterValue::Null)
    }

    /// True for an empty string only.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, FilterValue::String(s) if s.is_empty())
    }

    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FilterValue::Null => "null",
            FilterValue::String(_) => "String",
            FilterValue::Bool(_) => "Bool",
            FilterValue::Integer(_) => "Integer",
            FilterValue::Decimal(_) => "Decimal",
            FilterValue::Guid(_) => "Guid",
            FilterValue::DateTime(_) => "DateTime",
            FilterValue::DateTimeOffset(_) => "DateTimeOffset",
            FilterValue::DateFilter(_) => "DateFilter",
            FilterValue::Enum(_) => "Enum",
            FilterValue::List(_) => "List",
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(i64::from(value))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Decimal(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Guid(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for FilterValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FilterValue::DateTimeOffset(value)
    }
}

impl From<DateFilter> for FilterValue {
    fn from(value: DateFilter) -> Self {
        FilterValue::DateFilter(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FilterValue::Null)
    }
}

// ============================================================================
// LEAF FILTERS
// ============================================================================

/// A single `field operator value` comparison.
///
/// Equality compares the field's OData path, operator, value and case flag.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQueryFilter {
    pub field: FieldPath,
    /// `None` until the user picks an operator
    pub operator: Option<FilterOperator>,
    pub value: FilterValue,
    pub ignore_case: bool,
}

impl DataQueryFilter {
    pub fn new(field: FieldPath, operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            field,
            operator: Some(operator),
            value: value.into(),
            ignore_case: true,
        }
    }

    /// A filter with no operator or value chosen yet.
    pub fn unset(field: FieldPath) -> Self {
        Self {
            field,
            operator: None,
            value: FilterValue::Null,
            ignore_case: true,
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }

    /// Operator used when compiling; an unset operator compiles as `Equals`.
    pub fn effective_operator(&self) -> FilterOperator {
        self.operator.unwrap_or(FilterOperator::Equals)
    }
}

// ============================================================================
// GROUPS
// ============================================================================

/// Filters combined with a single conjunction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterGroup {
    pub filters: Vec<FilterNode>,
    pub conjunction: Conjunction,
}

impl FilterGroup {
    pub fn new(conjunction: Conjunction) -> Self {
        Self {
            filters: Vec::new(),
            conjunction,
        }
    }

    pub fn and(filters: impl IntoIterator<Item = impl Into<FilterNode>>) -> Self {
        Self {
            filters: filters.into_iter().map(Into::into).collect(),
            conjunction: Conjunction::And,
        }
    }

    pub fn or(filters: impl IntoIterator<Item = impl Into<FilterNode>>) -> Self {
        Self {
            filters: filters.into_iter().map(Into::into).collect(),
            conjunction: Conjunction::Or,
        }
    }

    pub fn push(&mut self, node: impl Into<FilterNode>) {
        self.filters.push(node.into());
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Every leaf filter in the tree, depth-first.
    pub fn leaves(&self) -> Vec<&DataQueryFilter> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// Nesting depth; an empty group has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .filters
            .iter()
            .map(|node| match node {
                FilterNode::Filter(_) => 0,
                FilterNode::Group(group) => group.depth(),
            })
            .max()
            .unwrap_or(0)
    }
}

fn collect_leaves<'a>(group: &'a FilterGroup, out: &mut Vec<&'a DataQueryFilter>) {
    for node in &group.filters {
        match node {
            FilterNode::Filter(filter) => out.push(filter),
            FilterNode::Group(child) => collect_leaves(child, out),
        }
    }
}

// ============================================================================
// NODES
// ============================================================================

/// Node of a filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Filter(DataQueryFilter),
    Group(FilterGroup),
}

impl From<DataQueryFilter> for FilterNode {
    fn from(filter: DataQueryFilter) -> Self {
        FilterNode::Filter(filter)
    }
}

impl From<FilterGroup> for FilterNode {
    fn from(group: FilterGroup) -> Self {
        FilterNode::Group(group)
    }
}

// =============================================================================
// TESTS
// =============================================================================

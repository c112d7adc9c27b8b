//! Enum types for the query model

use crate::{CoreError, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// FILTER OPERATORS
// ============================================================================

/// Comparison applied by a leaf filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FilterOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
    StartsWith,
    EndsWith,
    Contains,
    DoesNotContain,
    IsNull,
    IsEmpty,
    IsNotNull,
    IsNotEmpty,
    In,
    NotIn,
    /// Handled by caller-supplied expression builders; emits nothing by default
    Custom,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 17] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::LessThan,
        FilterOperator::LessThanOrEquals,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterThanOrEquals,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::Contains,
        FilterOperator::DoesNotContain,
        FilterOperator::IsNull,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotNull,
        FilterOperator::IsNotEmpty,
        FilterOperator::In,
        FilterOperator::NotIn,
        FilterOperator::Custom,
    ];

    /// Canonical name, also used for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "Equals",
            FilterOperator::NotEquals => "NotEquals",
            FilterOperator::LessThan => "LessThan",
            FilterOperator::LessThanOrEquals => "LessThanOrEquals",
            FilterOperator::GreaterThan => "GreaterThan",
            FilterOperator::GreaterThanOrEquals => "GreaterThanOrEquals",
            FilterOperator::StartsWith => "StartsWith",
            FilterOperator::EndsWith => "EndsWith",
            FilterOperator::Contains => "Contains",
            FilterOperator::DoesNotContain => "DoesNotContain",
            FilterOperator::IsNull => "IsNull",
            FilterOperator::IsEmpty => "IsEmpty",
            FilterOperator::IsNotNull => "IsNotNull",
            FilterOperator::IsNotEmpty => "IsNotEmpty",
            FilterOperator::In => "In",
            FilterOperator::NotIn => "NotIn",
            FilterOperator::Custom => "Custom",
        }
    }

    /// OData token for the operator.
    ///
    /// `DoesNotContain` and `Custom` have no token: every builder that supports
    /// them emits a hand-built fragment instead.
    pub fn odata_token(&self) -> Option<&'static str> {
        match self {
            FilterOperator::Equals | FilterOperator::IsNull | FilterOperator::IsEmpty => Some("eq"),
            FilterOperator::NotEquals | FilterOperator::IsNotNull | FilterOperator::IsNotEmpty => {
                Some("ne")
            }
            FilterOperator::LessThan => Some("lt"),
            FilterOperator::LessThanOrEquals => Some("le"),
            FilterOperator::GreaterThan => Some("gt"),
            FilterOperator::GreaterThanOrEquals => Some("ge"),
            FilterOperator::StartsWith => Some("startswith"),
            FilterOperator::EndsWith => Some("endswith"),
            FilterOperator::Contains => Some("contains"),
            FilterOperator::In | FilterOperator::NotIn => Some("in"),
            FilterOperator::DoesNotContain | FilterOperator::Custom => None,
        }
    }

    /// Null checks: the filter value is ignored.
    pub fn is_null_check(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    /// Empty checks: the filter value is ignored.
    pub fn is_empty_check(&self) -> bool {
        matches!(self, FilterOperator::IsEmpty | FilterOperator::IsNotEmpty)
    }

    /// Operators rewritten as "all items differ" when applied inside a collection.
    pub fn is_negated_membership(&self) -> bool {
        matches!(self, FilterOperator::NotEquals | FilterOperator::DoesNotContain)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_token(s);
        FilterOperator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| CoreError::InvalidOperator {
                value: s.to_string(),
            })
    }
}

// ============================================================================
// CONJUNCTIONS
// ============================================================================

/// How the children of a filter group are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    /// OData keyword joining the group's fragments.
    pub fn keyword(&self) -> &'static str {
        match self {
            Conjunction::And => "and",
            Conjunction::Or => "or",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl FromStr for Conjunction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_token(s).as_str() {
            "and" => Ok(Conjunction::And),
            "or" => Ok(Conjunction::Or),
            _ => Err(CoreError::InvalidConjunction {
                value: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// FIELD KINDS
// ============================================================================

/// Editor taxonomy a view model declares for each field.
///
/// The kind drives which filter operators are offered; the value type drives
/// how a filter on the field is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum FieldKind {
    #[default]
    Hidden,
    /// User-entered text
    Text,
    /// User-entered text with suggested values
    Combobox,
    Checkbox,
    SingleSelect,
    SingleSelectDropdown,
    SingleSelectDataSourceDropdown,
    MultiSelect,
    MultiSelectDropdown,
    MultiSelectDataSourceDropdown,
    Date,
    Time,
    DateTime,
    Color,
    Integer,
    Decimal,
    List,
    /// List of items presented as a table
    Table,
    /// List of items presented as sequential sub-editors
    SectionList,
    ReorderableSectionList,
    /// Another field wrapped with a null toggle
    Nullable,
    Guid,
    /// Logical grouping with no value of its own
    Section,
    Custom,
}

impl FieldKind {
    /// Default kind for a property of the given type.
    pub fn for_value_type(value_type: &ValueType) -> Self {
        match value_type {
            ValueType::String => FieldKind::Text,
            ValueType::Bool => FieldKind::Checkbox,
            ValueType::DateTime | ValueType::DateTimeOffset => FieldKind::DateTime,
            ValueType::Decimal => FieldKind::Decimal,
            ValueType::Integer => FieldKind::Integer,
            ValueType::Guid => FieldKind::Guid,
            ValueType::Object { .. } => FieldKind::Section,
            ValueType::Enum { .. } | ValueType::List(_) => FieldKind::Hidden,
        }
    }

    /// Kinds whose value is a list of items.
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            FieldKind::List
                | FieldKind::Table
                | FieldKind::SectionList
                | FieldKind::ReorderableSectionList
        )
    }
}

// ============================================================================
// DATE DISPLAY
// ============================================================================

/// Time zone a date field is displayed (and therefore matched) in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DateDisplayMode {
    /// No conversion
    #[default]
    Raw,
    /// Displayed in UTC; equivalent to `Raw` for UTC-stored values
    Utc,
    UserLocal,
    ServerLocal,
}

fn normalize_token(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

//! Operator catalog
//!
//! Which comparisons a search form offers for a field, keyed on the field's
//! editor kind. The first entry of each set is the default operator.

use sieve_core::{FieldKind, FieldPath, FilterOperator};

use FilterOperator::*;

const TEXT: &[FilterOperator] = &[Contains, DoesNotContain, StartsWith, EndsWith, Equals, NotEquals];
const EQUALITY: &[FilterOperator] = &[Equals, NotEquals];
const MULTI_SELECT_COLLECTION: &[FilterOperator] = &[Contains, DoesNotContain, Equals, NotEquals];
const MULTI_SELECT_SCALAR: &[FilterOperator] = &[In, NotIn, Equals, NotEquals];
const ORDERED: &[FilterOperator] = &[
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEquals,
    GreaterThan,
    GreaterThanOrEquals,
];
const PRIMITIVE_LIST: &[FilterOperator] = &[
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    Equals,
    NotEquals,
    IsNull,
    IsEmpty,
];
const NONE: &[FilterOperator] = &[];

/// Operators offered for `field`, in display order.
///
/// Lists of view models offer nothing: their item fields are flattened into
/// the search form instead.
pub fn supported_operators(field: &FieldPath) -> &'static [FilterOperator] {
    let definition = field.definition();
    match definition.kind {
        FieldKind::Text => TEXT,
        FieldKind::SingleSelectDropdown => EQUALITY,
        FieldKind::MultiSelectDropdown if definition.is_collection() => MULTI_SELECT_COLLECTION,
        FieldKind::MultiSelectDropdown => MULTI_SELECT_SCALAR,
        FieldKind::DateTime
        | FieldKind::Date
        | FieldKind::Time
        | FieldKind::Integer
        | FieldKind::Decimal => ORDERED,
        kind if kind.is_list() => match &definition.item {
            Some(item) if item.is_view_model() => NONE,
            _ => PRIMITIVE_LIST,
        },
        FieldKind::Hidden | FieldKind::Section => NONE,
        _ => EQUALITY,
    }
}

/// First supported operator, if any.
pub fn default_operator(field: &FieldPath) -> Option<FilterOperator> {
    supported_operators(field).first().copied()
}

// =============================================================================
// TESTS
// =============================================================================

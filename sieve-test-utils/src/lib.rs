//! SIEVE Test Utilities
//!
//! Centralized test infrastructure for the SIEVE workspace:
//! - Proptest generators for values, filters and queries
//! - Mock page sources and a fixed clock
//! - Fixture view models with nested lists
//! - Custom assertions for compiled expressions

// Re-export core types for convenience
pub use sieve_core::{
    Clock, Conjunction, CoreError, CoreResult, DataQuery, DataQueryFilter, DateDisplayMode,
    DateFilter, DateFilterOption, FieldDefinition, FieldKind, FieldPath, FilterGroup, FilterNode,
    FilterOperator, FilterValue, GeneratorConfig, OffsetDateTimeConverter, Page, PageSource, SortSpec, ValueType,
    ViewModel,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

// ============================================================================
// MOCKS
// ============================================================================

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        let instant = Utc
            .with_ymd_and_hms(year, month, day, hour, 0, 0)
            .single()
            .unwrap_or_default();
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Page source serving a fixed list in pages of `page_size`.
///
/// Continuation tokens are offsets into the list.
#[derive(Debug, Clone)]
pub struct MockPageSource<T> {
    items: Vec<T>,
    page_size: usize,
    fail_at: Option<usize>,
}

impl<T> MockPageSource<T> {
    pub fn new(items: Vec<T>, page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            fail_at: None,
        }
    }

    /// Fail when asked for the page starting at `offset`.
    pub fn failing_at(mut self, offset: usize) -> Self {
        self.fail_at = Some(offset);
        self
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PageSource<T, usize> for MockPageSource<T> {
    async fn next_page(&mut self, continuation: Option<usize>) -> CoreResult<Option<Page<T, usize>>> {
        let start = continuation.unwrap_or(0);
        if self.fail_at == Some(start) {
            return Err(CoreError::PageSource {
                reason: format!("mock failure at offset {}", start),
            });
        }
        if start > self.items.len() {
            return Err(CoreError::PageExhausted);
        }

        let end = (start + self.page_size).min(self.items.len());
        let data = self.items[start..end].to_vec();
        let next = (end < self.items.len()).then_some(end);
        Ok(Some(Page::new(data, next)))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! View models exercising every value type and two levels of nested lists.

    use super::*;

    pub struct Line;

    impl ViewModel for Line {
        fn search_fields() -> Vec<FieldDefinition> {
            vec![
                FieldDefinition::new("Sku", ValueType::String),
                FieldDefinition::new("Quantity", ValueType::Integer),
            ]
        }
    }

    pub struct Order;

    impl ViewModel for Order {
        fn search_fields() -> Vec<FieldDefinition> {
            vec![
                FieldDefinition::new("Number", ValueType::String).filter_property("OrderNumber"),
                FieldDefinition::new("Placed", ValueType::DateTime),
                FieldDefinition::view_model_list::<Line>("Lines", "Line"),
            ]
        }
    }

    pub struct Person;

    impl ViewModel for Person {
        fn search_fields() -> Vec<FieldDefinition> {
            vec![
                FieldDefinition::new("Id", ValueType::Guid),
                FieldDefinition::new("Name", ValueType::String),
                FieldDefinition::new("Age", ValueType::Integer),
                FieldDefinition::new("Balance", ValueType::Decimal),
                FieldDefinition::new("IsActive", ValueType::Bool),
                FieldDefinition::new("Birthday", ValueType::DateTime).display_mode(DateDisplayMode::UserLocal),
                FieldDefinition::with_kind(
                    "Status",
                    FieldKind::SingleSelectDropdown,
                    ValueType::enumeration("Status"),
                ),
                FieldDefinition::with_kind("Tags", FieldKind::List, ValueType::list_of(ValueType::String)),
                FieldDefinition::new("Notes", ValueType::String).not_filterable(),
                FieldDefinition::view_model_list::<Order>("Orders", "Order"),
            ]
        }
    }

    pub const STATUSES: [&str; 3] = ["Active", "Suspended", "Closed"];

    fn definition(fields: Vec<FieldDefinition>, name: &str) -> FieldDefinition {
        fields
            .into_iter()
            .find(|f| f.property_name == name)
            .unwrap_or_else(|| FieldDefinition::new(name, ValueType::String))
    }

    /// Top-level field of [`Person`].
    pub fn person_field(name: &str) -> FieldPath {
        FieldPath::root(definition(Person::search_fields(), name))
    }

    pub fn orders() -> FieldPath {
        person_field("Orders")
    }

    /// Field of an order inside `Orders`.
    pub fn order_field(name: &str) -> FieldPath {
        FieldPath::child(&orders(), definition(Order::search_fields(), name))
    }

    /// Field of a line inside `Orders/Lines`.
    pub fn line_field(name: &str) -> FieldPath {
        FieldPath::child(&order_field("Lines"), definition(Line::search_fields(), name))
    }

    /// Every filterable leaf of [`Person`], nested ones included.
    pub fn person_leaves() -> Vec<FieldPath> {
        vec![
            person_field("Id"),
            person_field("Name"),
            person_field("Age"),
            person_field("Balance"),
            person_field("IsActive"),
            person_field("Birthday"),
            person_field("Status"),
            person_field("Tags"),
            order_field("Number"),
            order_field("Placed"),
            line_field("Sku"),
            line_field("Quantity"),
        ]
    }

    /// User five hours west of UTC, server one hour east.
    pub fn offset_converter() -> OffsetDateTimeConverter {
        OffsetDateTimeConverter::new(
            chrono::FixedOffset::west_opt(5 * 3600),
            chrono::FixedOffset::east_opt(3600),
        )
    }

    pub fn instant(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .single()
            .unwrap_or_default()
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating SIEVE query model values.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_date_time() -> impl Strategy<Value = DateTime<Utc>> {
        (0i64..4_102_444_800).prop_map(|secs| DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    pub fn arb_filter_operator() -> impl Strategy<Value = FilterOperator> {
        prop::sample::select(FilterOperator::ALL.to_vec())
    }

    pub fn arb_conjunction() -> impl Strategy<Value = Conjunction> {
        prop_oneof![Just(Conjunction::And), Just(Conjunction::Or)]
    }

    /// Non-empty text, quotes included.
    pub fn arb_text() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9' ]{1,12}"
    }

    /// A value shaped like `value_type`.
    pub fn arb_value_for(value_type: &ValueType) -> BoxedStrategy<FilterValue> {
        match value_type {
            ValueType::String => arb_text().prop_map(FilterValue::from).boxed(),
            ValueType::Bool => any::<bool>().prop_map(FilterValue::from).boxed(),
            ValueType::Integer => any::<i32>().prop_map(FilterValue::from).boxed(),
            ValueType::Decimal => (-1.0e6f64..1.0e6).prop_map(FilterValue::from).boxed(),
            ValueType::DateTime | ValueType::DateTimeOffset => {
                arb_date_time().prop_map(FilterValue::from).boxed()
            }
            ValueType::Guid => arb_uuid().prop_map(FilterValue::from).boxed(),
            ValueType::Enum { .. } => prop::sample::select(fixtures::STATUSES.to_vec())
                .prop_map(FilterValue::enumeration)
                .boxed(),
            ValueType::List(element) => prop::collection::vec(arb_value_for(element), 1..4)
                .prop_map(FilterValue::List)
                .boxed(),
            ValueType::Object { .. } => Just(FilterValue::Null).boxed(),
        }
    }

    /// A leaf on one of the [`fixtures::Person`] fields.
    pub fn arb_leaf_filter() -> impl Strategy<Value = DataQueryFilter> {
        prop::sample::select(fixtures::person_leaves()).prop_flat_map(|field| {
            let value = arb_value_for(field.definition().effective_filter_type());
            (
                Just(field),
                prop::option::weighted(0.9, arb_filter_operator()),
                prop_oneof![4 => value, 1 => Just(FilterValue::Null)],
                any::<bool>(),
            )
                .prop_map(|(field, operator, value, ignore_case)| DataQueryFilter {
                    field,
                    operator,
                    value,
                    ignore_case,
                })
        })
    }

    pub fn arb_filter_group() -> impl Strategy<Value = FilterGroup> {
        let leaf = arb_leaf_filter().prop_map(FilterNode::from);
        let node = leaf.prop_recursive(3, 24, 4, |inner| {
            (prop::collection::vec(inner, 0..4), arb_conjunction())
                .prop_map(|(filters, conjunction)| FilterNode::Group(FilterGroup { filters, conjunction }))
        });
        (prop::collection::vec(node, 0..5), arb_conjunction())
            .prop_map(|(filters, conjunction)| FilterGroup { filters, conjunction })
    }

    pub fn arb_sort() -> impl Strategy<Value = SortSpec> {
        (prop::sample::select(fixtures::person_leaves()), any::<bool>())
            .prop_map(|(field, descending)| SortSpec { field, descending })
    }

    pub fn arb_data_query() -> impl Strategy<Value = DataQuery> {
        (
            prop::option::of(0u32..1000),
            prop::option::of(1u32..500),
            prop::option::of("[a-z ]{0,10}"),
            arb_filter_group(),
            prop::collection::vec(arb_sort(), 0..3),
        )
            .prop_map(|(skip, top, search_text, filter, sorts)| DataQuery {
                skip,
                top,
                search_text,
                filter,
                sorts,
            })
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion helpers for results and compiled expressions.

    use super::*;
    use std::fmt::Debug;

    #[track_caller]
    pub fn assert_ok<T: Debug, E: Debug>(result: &Result<T, E>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    #[track_caller]
    pub fn assert_err<T: Debug, E: Debug>(result: &Result<T, E>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    /// Assert that a CoreResult is an UnknownField error for `path`.
    #[track_caller]
    pub fn assert_unknown_field<T: Debug>(result: &CoreResult<T>, path: &str) {
        match result {
            Err(CoreError::UnknownField { path: p }) => assert_eq!(p, path, "Wrong unknown path"),
            other => panic!("Expected UnknownField({}), got: {:?}", path, other),
        }
    }

    /// Assert that an expression has balanced parentheses and quotes and no
    /// dangling conjunctions.
    #[track_caller]
    pub fn assert_well_formed(expression: &str) {
        let mut open = 0i32;
        let mut in_literal = false;
        // expression text outside string literals
        let mut skeleton = String::with_capacity(expression.len());
        for c in expression.chars() {
            if c == '\'' {
                in_literal = !in_literal;
                continue;
            }
            if in_literal {
                continue;
            }
            match c {
                '(' => open += 1,
                ')' => {
                    open -= 1;
                    assert!(open >= 0, "Unbalanced ')' in: {}", expression);
                }
                _ => {}
            }
            skeleton.push(c);
        }
        assert_eq!(open, 0, "Unclosed '(' in: {}", expression);
        assert!(!in_literal, "Unterminated literal in: {}", expression);
        assert_eq!(expression.trim(), expression, "Untrimmed expression: {:?}", expression);

        for keyword in ["and", "or"] {
            assert!(
                !skeleton.starts_with(&format!("{} ", keyword)),
                "Leading '{}' in: {}",
                keyword,
                expression
            );
            assert!(
                !skeleton.ends_with(&format!(" {}", keyword)),
                "Trailing '{}' in: {}",
                keyword,
                expression
            );
            assert!(
                !skeleton.contains(&format!(" {} {} ", keyword, keyword)),
                "Repeated '{}' in: {}",
                keyword,
                expression
            );
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! OData expression generator
//!
//! Compiles a [`DataQuery`] into an OData v4 `$filter` expression and an
//! `$orderby` list. Each leaf filter becomes one fragment chosen by the
//! field's effective filter type; leaves inside collections are wrapped in
//! `any`/`all` lambdas, one per enclosing list. A leaf that cannot be
//! expressed yet (no value entered, operator without a form for the type)
//! compiles to an empty fragment, and empty fragments are dropped when a
//! group is joined.

use crate::error::{GenerateError, GenerateResult};
use crate::flatten::SearchFields;
use crate::literal::{format_utc, item_literal, list_literal, quote, raw_value, string_literal};
use crate::operators;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use sieve_core::{
    Clock, DataQuery, DataQueryFilter, DateDisplayMode, DateTimeConverter, FieldPath, FilterGroup,
    FilterNode, FilterOperator, FilterValue, GeneratorConfig, OffsetDateTimeConverter, SortSpec,
    SystemClock, ValueType, ViewModel,
};
use std::sync::Arc;

/// Compiles data queries into OData filter and order-by strings.
///
/// Stateless apart from its collaborators; a single generator can be shared
/// across threads.
#[derive(Clone)]
pub struct ODataGenerator {
    converter: Arc<dyn DateTimeConverter>,
    clock: Arc<dyn Clock>,
    config: GeneratorConfig,
}

impl std::fmt::Debug for ODataGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ODataGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for ODataGenerator {
    fn default() -> Self {
        Self::new(OffsetDateTimeConverter::default())
    }
}

impl ODataGenerator {
    /// Generator using `converter` for date ranges, the system clock and default settings.
    pub fn new(converter: impl DateTimeConverter + 'static) -> Self {
        Self {
            converter: Arc::new(converter),
            clock: Arc::new(SystemClock),
            config: GeneratorConfig::default(),
        }
    }

    /// Generator whose date conversion follows the configured offsets.
    pub fn from_config(config: GeneratorConfig) -> GenerateResult<Self> {
        config.validate()?;
        let converter = config.date_time_converter()?;
        Ok(Self::new(converter).with_config(config))
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Filterable fields of `T`, nested lists expanded up to `max_flatten_depth`.
    pub fn search_fields<T: ViewModel>(&self) -> SearchFields {
        SearchFields::for_view_model::<T>(self.config.max_flatten_depth)
    }

    /// Operators offered for `field`; the first one is the default.
    pub fn supported_operators(&self, field: &FieldPath) -> &'static [FilterOperator] {
        operators::supported_operators(field)
    }

    // ========================================================================
    // FILTERS
    // ========================================================================

    /// `$filter` expression of the query's root group.
    pub fn generate_filter(&self, query: &DataQuery) -> GenerateResult<String> {
        let filter = self.generate_group(&query.filter)?;
        tracing::debug!(filter = %filter, leaves = query.filter.leaves().len(), "generated OData filter");
        Ok(filter)
    }

    /// Non-empty child fragments joined with the group's conjunction.
    pub fn generate_group(&self, group: &FilterGroup) -> GenerateResult<String> {
        Ok(self.group_fragments(group)?.join(&format!(" {} ", group.conjunction.keyword())))
    }

    fn group_fragments(&self, group: &FilterGroup) -> GenerateResult<Vec<String>> {
        let mut fragments = Vec::with_capacity(group.filters.len());
        for node in &group.filters {
            let fragment = self.generate_filter_expression(node)?;
            if !fragment.is_empty() {
                fragments.push(fragment);
            }
        }
        Ok(fragments)
    }

    /// Fragment of a single node.
    ///
    /// A nested group joining several fragments is parenthesised so it binds
    /// as a unit inside its parent.
    pub fn generate_filter_expression(&self, node: &FilterNode) -> GenerateResult<String> {
        match node {
            FilterNode::Group(group) => {
                let fragments = self.group_fragments(group)?;
                let joined = fragments.join(&format!(" {} ", group.conjunction.keyword()));
                if fragments.len() > 1 {
                    Ok(format!("({})", joined))
                } else {
                    Ok(joined)
                }
            }
            FilterNode::Filter(filter) if filter.field.is_in_collection() => {
                self.generate_collection_item_expression(filter)
            }
            FilterNode::Filter(filter) => {
                let definition = filter.field.definition();
                self.generate_expression(
                    &filter.field.filter_path(),
                    filter.effective_operator(),
                    definition.effective_filter_type(),
                    &filter.value,
                    filter.ignore_case,
                    definition.display_mode,
                )
            }
        }
    }

    /// Fragment comparing `property` against `value`.
    ///
    /// `value_type` selects the encoding. Null and empty-string values
    /// compile to nothing unless the operator ignores the value.
    pub fn generate_expression(
        &self,
        property: &str,
        operator: FilterOperator,
        value_type: &ValueType,
        value: &FilterValue,
        ignore_case: bool,
        display_mode: DateDisplayMode,
    ) -> GenerateResult<String> {
        if self.is_missing_value(operator, value) {
            tracing::trace!(property, %operator, "no value entered; fragment dropped");
            return Ok(String::new());
        }

        match value_type {
            ValueType::Enum { .. } => Ok(enum_expression(property, operator, value)),
            ValueType::String => Ok(string_expression(property, operator, value, ignore_case)),
            ValueType::List(element) => {
                self.enumerable_expression(property, operator, element, value, ignore_case, display_mode)
            }
            ValueType::Integer | ValueType::Decimal => Ok(numeric_expression(property, operator, value)),
            ValueType::Bool => Ok(bool_expression(property, operator, value)),
            ValueType::DateTime | ValueType::DateTimeOffset => {
                self.date_expression(property, operator, value, display_mode)
            }
            ValueType::Guid => guid_expression(property, operator, value),
            ValueType::Object { .. } => Ok(String::new()),
        }
    }

    fn is_missing_value(&self, operator: FilterOperator, value: &FilterValue) -> bool {
        if self.config.legacy_value_guards {
            return value.is_null() || value.is_empty_string();
        }
        (value.is_null() && !operator.is_null_check()) || (value.is_empty_string() && !operator.is_empty_check())
    }

    /// Wrap a leaf inside nested lists in one lambda per enclosing list.
    ///
    /// `Orders/Lines/Sku eq 'A'` becomes
    /// `Orders/any(x1: x1/Lines/any(x0: x0/Sku eq 'A'))`. Operators that
    /// negate membership quantify with `all` instead of `any`.
    fn generate_collection_item_expression(&self, filter: &DataQueryFilter) -> GenerateResult<String> {
        let operator = filter.effective_operator();
        let quantifier = if operator.is_negated_membership() { "all" } else { "any" };
        let definition = filter.field.definition();

        let mut expression = self.generate_expression(
            &format!("x0/{}", definition.filter_name()),
            operator,
            definition.effective_filter_type(),
            &filter.value,
            filter.ignore_case,
            definition.display_mode,
        )?;
        if expression.is_empty() {
            return Ok(expression);
        }

        let path = filter.field.path();
        let Some((root, rest)) = path.split_first() else {
            return Ok(expression);
        };
        let intermediate = rest.split_last().map(|(_, parents)| parents).unwrap_or_default();

        let mut depth = 0;
        for parent in intermediate.iter().rev() {
            expression = format!(
                "x{}/{}/{}(x{}: {})",
                depth + 1,
                parent.filter_name(),
                quantifier,
                depth,
                expression
            );
            depth += 1;
        }

        Ok(format!("{}/{}(x{}: {})", root.filter_name(), quantifier, depth, expression))
    }

    // ========================================================================
    // TYPE BUILDERS
    // ========================================================================

    fn enumerable_expression(
        &self,
        property: &str,
        operator: FilterOperator,
        element: &ValueType,
        value: &FilterValue,
        ignore_case: bool,
        display_mode: DateDisplayMode,
    ) -> GenerateResult<String> {
        let FilterValue::List(items) = value else {
            // A single value matches lists holding at least one equal element
            let inner = self.generate_expression("i", operator, element, value, ignore_case, display_mode)?;
            if inner.is_empty() {
                return Ok(inner);
            }
            return Ok(format!("{}/any(i: {})", property, inner));
        };

        let Some(literals) = list_literal(items, item_literal) else {
            return Ok(String::new());
        };
        let each_equal = || {
            items
                .iter()
                .filter_map(item_literal)
                .map(|literal| format!("{}/any(i: i eq {})", property, literal))
                .collect::<Vec<_>>()
                .join(" and ")
        };
        let any_equal = || {
            items
                .iter()
                .filter_map(item_literal)
                .map(|literal| format!("i eq {}", literal))
                .collect::<Vec<_>>()
                .join(" or ")
        };

        let expression = match operator {
            FilterOperator::Contains => format!("{} in {}", property, literals),
            FilterOperator::DoesNotContain => format!("not({} in {})", property, literals),
            FilterOperator::In => format!("{}/any(i:{})", property, any_equal()),
            FilterOperator::NotIn => format!("not({}/any(i: {}))", property, any_equal()),
            FilterOperator::Equals => format!("({})", each_equal()),
            FilterOperator::NotEquals => format!("not ({})", each_equal()),
            _ => String::new(),
        };
        Ok(expression)
    }

    fn date_expression(
        &self,
        property: &str,
        operator: FilterOperator,
        value: &FilterValue,
        display_mode: DateDisplayMode,
    ) -> GenerateResult<String> {
        if let Some(expression) = value_free_expression(property, operator) {
            return Ok(expression);
        }

        let instant = match value {
            FilterValue::DateTime(instant) => *instant,
            FilterValue::DateTimeOffset(instant) => instant.with_timezone(&Utc),
            FilterValue::DateFilter(filter) => match filter.resolve(self.clock.now()) {
                Some(instant) => instant,
                None => {
                    tracing::trace!(property, "exact date filter without a date; fragment dropped");
                    return Ok(String::new());
                }
            },
            other => {
                return Err(GenerateError::UnexpectedValueType {
                    property: property.to_string(),
                    expected: "DateTime or DateTimeOffset".to_string(),
                    actual: other.type_name().to_string(),
                })
            }
        };

        if operator == FilterOperator::Equals {
            return Ok(self.day_range_expression(property, instant, display_mode));
        }

        Ok(match operator.odata_token() {
            Some(token) => format!("{} {} {}", property, token, format_utc(instant)),
            None => String::new(),
        })
    }

    /// `(P ge start and P lt end)` spanning the displayed calendar day of `instant`.
    ///
    /// Empty when the day's bounds fall outside the representable range.
    fn day_range_expression(&self, property: &str, instant: DateTime<Utc>, display_mode: DateDisplayMode) -> String {
        let Some((start, end)) = self.display_day_bounds(instant, display_mode) else {
            tracing::trace!(property, %instant, "displayed day out of range; fragment dropped");
            return String::new();
        };

        format!(
            "({} ge {} and {} lt {})",
            property,
            format_utc(start),
            property,
            format_utc(end)
        )
    }

    fn display_day_bounds(
        &self,
        instant: DateTime<Utc>,
        display_mode: DateDisplayMode,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start_local = self
            .converter
            .utc_to_display(instant, display_mode)?
            .date()
            .and_time(NaiveTime::MIN);
        let end_local = start_local.checked_add_signed(Duration::days(1))?;
        Some((
            self.converter.display_to_utc(start_local, display_mode)?,
            self.converter.display_to_utc(end_local, display_mode)?,
        ))
    }

    // ========================================================================
    // ORDER BY
    // ========================================================================

    /// `$orderby` list of the query's sorts.
    pub fn generate_order_by(&self, query: &DataQuery) -> String {
        let order_by = query
            .sorts
            .iter()
            .map(|sort| self.generate_order_by_expression(sort))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        tracing::debug!(order_by = %order_by, "generated OData order by");
        order_by
    }

    pub fn generate_order_by_expression(&self, sort: &SortSpec) -> String {
        let direction = if sort.descending { "desc" } else { "asc" };
        format!("{} {}", sort.field.odata_path(), direction)
    }
}

/// `P eq null`, `P ne ''` and friends, for operators that ignore the value.
fn value_free_expression(property: &str, operator: FilterOperator) -> Option<String> {
    let token = operator.odata_token()?;
    if operator.is_null_check() {
        Some(format!("{} {} null", property, token))
    } else if operator.is_empty_check() {
        Some(format!("{} {} ''", property, token))
    } else {
        None
    }
}

/// `P in (a,b)`, or `P in (a,b) eq false` for `NotIn`.
fn membership_expression(property: &str, operator: FilterOperator, literals: &str) -> Option<String> {
    match operator {
        FilterOperator::In => Some(format!("{} in {}", property, literals)),
        FilterOperator::NotIn => Some(format!("{} in {} eq false", property, literals)),
        _ => None,
    }
}

fn enum_expression(property: &str, operator: FilterOperator, value: &FilterValue) -> String {
    if let Some(expression) = value_free_expression(property, operator) {
        return expression;
    }
    if let FilterValue::List(items) = value {
        return list_literal(items, item_literal)
            .and_then(|literals| membership_expression(property, operator, &literals))
            .unwrap_or_default();
    }
    match (operator.odata_token(), raw_value(value)) {
        (Some(token), Some(name)) => format!("{} {} {}", property, token, quote(&name)),
        _ => String::new(),
    }
}

fn string_expression(property: &str, operator: FilterOperator, value: &FilterValue, ignore_case: bool) -> String {
    let property = if ignore_case {
        format!("tolower({})", property)
    } else {
        property.to_string()
    };

    match value {
        FilterValue::List(items) => list_literal(items, |item| string_literal(item, ignore_case))
            .and_then(|literals| membership_expression(&property, operator, &literals))
            .unwrap_or_default(),
        FilterValue::String(text) => {
            if let Some(expression) = value_free_expression(&property, operator) {
                return expression;
            }
            let literal = if ignore_case {
                quote(&text.to_lowercase())
            } else {
                quote(text)
            };
            match operator {
                FilterOperator::Contains => format!("contains({}, {})", property, literal),
                FilterOperator::DoesNotContain => format!("indexof({}, {}) eq -1", property, literal),
                FilterOperator::StartsWith => format!("startswith({}, {})", property, literal),
                FilterOperator::EndsWith => format!("endswith({}, {})", property, literal),
                FilterOperator::Equals => format!("{} eq {}", property, literal),
                FilterOperator::NotEquals => format!("{} ne {}", property, literal),
                _ => String::new(),
            }
        }
        FilterValue::Null => value_free_expression(&property, operator).unwrap_or_default(),
        _ => String::new(),
    }
}

fn numeric_expression(property: &str, operator: FilterOperator, value: &FilterValue) -> String {
    if let Some(expression) = value_free_expression(property, operator) {
        return expression;
    }
    if let FilterValue::List(items) = value {
        return list_literal(items, raw_value)
            .and_then(|literals| membership_expression(property, operator, &literals))
            .unwrap_or_default();
    }
    match (operator.odata_token(), raw_value(value)) {
        (Some(token), Some(number)) => format!("{} {} {}", property, token, number),
        _ => String::new(),
    }
}

fn bool_expression(property: &str, operator: FilterOperator, value: &FilterValue) -> String {
    if let Some(expression) = value_free_expression(property, operator) {
        return expression;
    }
    match raw_value(value) {
        Some(flag) if !flag.is_empty() => format!("{} eq {}", property, flag.to_lowercase()),
        _ => String::new(),
    }
}

fn guid_expression(property: &str, operator: FilterOperator, value: &FilterValue) -> GenerateResult<String> {
    if let Some(expression) = value_free_expression(property, operator) {
        return Ok(expression);
    }
    if let FilterValue::List(items) = value {
        let Some(literals) = list_literal(items, raw_value) else {
            return Ok(String::new());
        };
        return membership_expression(property, operator, &literals).ok_or_else(|| {
            GenerateError::UnsupportedOperator {
                operator,
                value_type: ValueType::list_of(ValueType::Guid).to_string(),
            }
        });
    }
    Ok(match (operator.odata_token(), raw_value(value)) {
        (Some(token), Some(id)) => format!("{} {} {}", property, token, id),
        _ => String::new(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sieve_core::{Conjunction, DateFilter, DateFilterOption, FieldDefinition};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn generator() -> ODataGenerator {
        ODataGenerator::default()
    }

    fn expr(value_type: ValueType, operator: FilterOperator, value: impl Into<FilterValue>, ignore_case: bool) -> String {
        generator()
            .generate_expression("P", operator, &value_type, &value.into(), ignore_case, DateDisplayMode::Raw)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap()
    }

    #[test]
    fn test_string_operators() {
        use FilterOperator::*;
        assert_eq!(expr(ValueType::String, Contains, "Ab", true), "contains(tolower(P), 'ab')");
        assert_eq!(expr(ValueType::String, DoesNotContain, "Ab", false), "indexof(P, 'Ab') eq -1");
        assert_eq!(expr(ValueType::String, StartsWith, "a", false), "startswith(P, 'a')");
        assert_eq!(expr(ValueType::String, EndsWith, "a", false), "endswith(P, 'a')");
        assert_eq!(expr(ValueType::String, NotEquals, "a", false), "P ne 'a'");
        assert_eq!(expr(ValueType::String, IsNotNull, "a", false), "P ne null");
        assert_eq!(expr(ValueType::String, IsEmpty, "a", false), "P eq ''");
        assert_eq!(expr(ValueType::String, LessThan, "a", false), "");
    }

    #[test]
    fn test_string_membership() {
        assert_eq!(
            expr(ValueType::String, FilterOperator::In, vec!["A", "b"], true),
            "tolower(P) in ('a','b')"
        );
        assert_eq!(
            expr(ValueType::String, FilterOperator::NotIn, vec!["A"], false),
            "P in ('A') eq false"
        );
    }

    #[test]
    fn test_value_guards() {
        assert_eq!(expr(ValueType::String, FilterOperator::Equals, FilterValue::Null, true), "");
        assert_eq!(expr(ValueType::String, FilterOperator::Equals, "", true), "");
        assert_eq!(
            expr(ValueType::String, FilterOperator::IsNull, FilterValue::Null, false),
            "P eq null"
        );
        assert_eq!(expr(ValueType::String, FilterOperator::IsNotEmpty, "", false), "P ne ''");

        let legacy = generator().with_config(GeneratorConfig {
            legacy_value_guards: true,
            ..GeneratorConfig::default()
        });
        let fragment = legacy
            .generate_expression(
                "P",
                FilterOperator::IsNull,
                &ValueType::String,
                &FilterValue::Null,
                false,
                DateDisplayMode::Raw,
            )
            .unwrap();
        assert_eq!(fragment, "");
    }

    #[test]
    fn test_enum_numeric_bool() {
        let color = ValueType::enumeration("Color");
        assert_eq!(expr(color.clone(), FilterOperator::Equals, FilterValue::enumeration("Red"), true), "P eq 'Red'");
        assert_eq!(
            expr(color, FilterOperator::NotIn, vec![FilterValue::enumeration("Red")], true),
            "P in ('Red') eq false"
        );
        assert_eq!(expr(ValueType::Integer, FilterOperator::GreaterThan, 5, false), "P gt 5");
        assert_eq!(expr(ValueType::Decimal, FilterOperator::LessThanOrEquals, 2.5, false), "P le 2.5");
        assert_eq!(expr(ValueType::Integer, FilterOperator::In, vec![1, 2], false), "P in (1,2)");
        assert_eq!(expr(ValueType::Bool, FilterOperator::Equals, true, false), "P eq true");
        assert_eq!(expr(ValueType::Bool, FilterOperator::Equals, "True", false), "P eq true");
        assert_eq!(expr(ValueType::Bool, FilterOperator::IsNotNull, true, false), "P ne null");
    }

    #[test]
    fn test_enumerable_lists() {
        let strings = ValueType::list_of(ValueType::String);
        let ab = vec!["a", "b"];
        assert_eq!(expr(strings.clone(), FilterOperator::Contains, ab.clone(), true), "P in ('a','b')");
        assert_eq!(expr(strings.clone(), FilterOperator::DoesNotContain, ab.clone(), true), "not(P in ('a','b'))");
        assert_eq!(expr(strings.clone(), FilterOperator::In, ab.clone(), true), "P/any(i:i eq 'a' or i eq 'b')");
        assert_eq!(expr(strings.clone(), FilterOperator::NotIn, ab.clone(), true), "not(P/any(i: i eq 'a' or i eq 'b'))");
        assert_eq!(
            expr(strings.clone(), FilterOperator::Equals, ab.clone(), true),
            "(P/any(i: i eq 'a') and P/any(i: i eq 'b'))"
        );
        assert_eq!(
            expr(strings.clone(), FilterOperator::NotEquals, ab, true),
            "not (P/any(i: i eq 'a') and P/any(i: i eq 'b'))"
        );
        assert_eq!(expr(strings, FilterOperator::Equals, Vec::<String>::new(), true), "");

        let numbers = ValueType::list_of(ValueType::Integer);
        assert_eq!(expr(numbers, FilterOperator::Equals, vec![1], false), "(P/any(i: i eq 1))");
    }

    #[test]
    fn test_scalar_against_list_property() {
        let strings = ValueType::list_of(ValueType::String);
        assert_eq!(
            expr(strings.clone(), FilterOperator::Contains, "Value", true),
            "P/any(i: contains(tolower(i), 'value'))"
        );
        assert_eq!(
            expr(strings, FilterOperator::IsNull, FilterValue::Null, true),
            "P/any(i: tolower(i) eq null)"
        );
        assert_eq!(
            expr(ValueType::list_of(ValueType::Integer), FilterOperator::GreaterThan, 3, false),
            "P/any(i: i gt 3)"
        );
    }

    #[test]
    fn test_guid() {
        let id = uuid::Uuid::nil();
        assert_eq!(expr(ValueType::Guid, FilterOperator::Equals, id, false), format!("P eq {}", id));
        assert_eq!(
            expr(ValueType::Guid, FilterOperator::In, vec![id], false),
            format!("P in ({})", id)
        );
        let err = generator()
            .generate_expression(
                "P",
                FilterOperator::Equals,
                &ValueType::Guid,
                &FilterValue::from(vec![id]),
                false,
                DateDisplayMode::Raw,
            )
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnsupportedOperator { operator: FilterOperator::Equals, .. }));
    }

    #[test]
    fn test_empty_guid_list_is_dropped() {
        for operator in [FilterOperator::In, FilterOperator::NotIn, FilterOperator::Equals] {
            assert_eq!(expr(ValueType::Guid, operator, Vec::<uuid::Uuid>::new(), false), "", "operator {}", operator);
        }
        assert_eq!(expr(ValueType::String, FilterOperator::In, Vec::<String>::new(), false), "");
        assert_eq!(expr(ValueType::Integer, FilterOperator::NotIn, Vec::<i64>::new(), false), "");
    }

    #[test]
    fn test_dates() {
        let instant = utc(2024, 1, 15, 13);
        assert_eq!(
            expr(ValueType::DateTime, FilterOperator::Equals, instant, false),
            "(P ge 2024-01-15T00:00:00.000000Z and P lt 2024-01-16T00:00:00.000000Z)"
        );
        assert_eq!(
            expr(ValueType::DateTime, FilterOperator::GreaterThan, instant, false),
            "P gt 2024-01-15T13:00:00.000000Z"
        );
        assert_eq!(expr(ValueType::DateTime, FilterOperator::IsNull, instant, false), "P eq null");
        assert_eq!(expr(ValueType::DateTime, FilterOperator::DoesNotContain, instant, false), "");

        let err = generator()
            .generate_expression(
                "P",
                FilterOperator::GreaterThan,
                &ValueType::DateTime,
                &FilterValue::from("yesterday"),
                false,
                DateDisplayMode::Raw,
            )
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnexpectedValueType { .. }));
    }

    #[test]
    fn test_date_range_in_user_zone() {
        let converter = OffsetDateTimeConverter::from_minutes(Some(-300), None).unwrap();
        let generator = ODataGenerator::new(converter);
        // 03:00 UTC is still the previous evening five hours west
        let fragment = generator
            .generate_expression(
                "P",
                FilterOperator::Equals,
                &ValueType::DateTime,
                &FilterValue::from(utc(2024, 1, 15, 3)),
                false,
                DateDisplayMode::UserLocal,
            )
            .unwrap();
        assert_eq!(
            fragment,
            "(P ge 2024-01-14T05:00:00.000000Z and P lt 2024-01-15T05:00:00.000000Z)"
        );
    }

    #[test]
    fn test_date_range_at_calendar_limits_is_dropped() {
        let converter = OffsetDateTimeConverter::from_minutes(Some(120), None).unwrap();
        let generator = ODataGenerator::new(converter);
        let generate = |instant: DateTime<Utc>, mode: DateDisplayMode| {
            generator
                .generate_expression("P", FilterOperator::Equals, &ValueType::DateTime, &instant.into(), false, mode)
                .unwrap()
        };
        assert_eq!(generate(DateTime::<Utc>::MIN_UTC, DateDisplayMode::UserLocal), "");
        assert_eq!(generate(DateTime::<Utc>::MAX_UTC, DateDisplayMode::UserLocal), "");
        assert_eq!(generate(DateTime::<Utc>::MAX_UTC, DateDisplayMode::Raw), "");
    }

    #[test]
    fn test_date_filters_use_clock() {
        let generator = generator().with_clock(FixedClock(utc(2024, 3, 10, 12)));
        let generate = |value: FilterValue| {
            generator
                .generate_expression("P", FilterOperator::LessThan, &ValueType::DateTime, &value, false, DateDisplayMode::Raw)
                .unwrap()
        };
        assert_eq!(
            generate(DateFilter::new(DateFilterOption::Yesterday).into()),
            "P lt 2024-03-09T12:00:00.000000Z"
        );
        assert_eq!(
            generate(DateFilter {
                option: DateFilterOption::Exact,
                days_to_add: 0,
                date: None
            }
            .into()),
            ""
        );
    }

    #[test]
    fn test_groups_drop_empty_fragments() {
        let name = FieldPath::simple("Name", ValueType::String);
        let group = FilterGroup::or([
            DataQueryFilter::new(name.clone(), FilterOperator::Equals, "a"),
            DataQueryFilter::unset(name.clone()),
            DataQueryFilter::new(name, FilterOperator::Equals, "b"),
        ]);
        assert_eq!(group.conjunction, Conjunction::Or);
        assert_eq!(
            generator().generate_group(&group).unwrap(),
            "tolower(Name) eq 'a' or tolower(Name) eq 'b'"
        );
        assert_eq!(generator().generate_group(&FilterGroup::default()).unwrap(), "");
    }

    #[test]
    fn test_filter_property_name_is_used() {
        let field = FieldPath::root(FieldDefinition::new("Name", ValueType::String).filter_property("NameSearch"));
        let query = DataQuery::new()
            .with_filter(DataQueryFilter::new(field.clone(), FilterOperator::Equals, "x").case_sensitive())
            .with_sort(SortSpec::ascending(field));
        assert_eq!(generator().generate_filter(&query).unwrap(), "NameSearch eq 'x'");
        assert_eq!(generator().generate_order_by(&query), "Name asc");
    }
}

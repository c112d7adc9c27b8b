//! Compiled-expression tests against the fixture view models.

use sieve_odata::{filterable_fields, supported_operators, ODataGenerator, ODataParams};
use sieve_test_utils::assertions::{assert_err, assert_ok, assert_unknown_field};
use sieve_test_utils::fixtures::{self, line_field, order_field, person_field, Person};
use sieve_test_utils::{
    Conjunction, DataQuery, DataQueryFilter, DateFilter, DateFilterOption, FieldPath, FilterGroup,
    FilterNode, FilterOperator, FilterValue, FixedClock, GeneratorConfig, SortSpec, ValueType,
    ViewModel,
};

/// Route generator logs to the test output; set `RUST_LOG=sieve_odata=trace` to see them.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn generator() -> ODataGenerator {
    init_tracing();
    ODataGenerator::new(fixtures::offset_converter()).with_clock(FixedClock::at(2024, 3, 10, 12))
}

fn compile(filter: DataQueryFilter) -> String {
    generator()
        .generate_filter(&DataQuery::new().with_filter(filter))
        .expect("compile filter")
}

fn string_list_field() -> FieldPath {
    FieldPath::simple("TestProperty", ValueType::list_of(ValueType::String))
}

// ============================================================================
// SCALAR FIELDS
// ============================================================================

#[test]
fn string_equals_ignores_case_by_default() {
    let field = FieldPath::simple("P", ValueType::String);
    assert_eq!(
        compile(DataQueryFilter::new(field.clone(), FilterOperator::Equals, "Value")),
        "tolower(P) eq 'value'"
    );
    assert_eq!(
        compile(DataQueryFilter::new(field, FilterOperator::Equals, "Value").case_sensitive()),
        "P eq 'Value'"
    );
}

#[test]
fn string_literals_escape_quotes() {
    let filter = DataQueryFilter::new(person_field("Name"), FilterOperator::StartsWith, "O'Brien");
    assert_eq!(compile(filter), "startswith(tolower(Name), 'o''brien')");
}

#[test]
fn enum_and_numeric_fields() {
    assert_eq!(
        compile(DataQueryFilter::new(
            person_field("Status"),
            FilterOperator::NotEquals,
            FilterValue::enumeration("Closed")
        )),
        "Status ne 'Closed'"
    );
    assert_eq!(
        compile(DataQueryFilter::new(person_field("Age"), FilterOperator::GreaterThanOrEquals, 21)),
        "Age ge 21"
    );
    assert_eq!(
        compile(DataQueryFilter::new(person_field("IsActive"), FilterOperator::Equals, false)),
        "IsActive eq false"
    );
}

#[test]
fn date_equals_spans_the_displayed_day() {
    // Birthday displays in the user's zone, five hours west of UTC
    let filter = DataQueryFilter::new(
        person_field("Birthday"),
        FilterOperator::Equals,
        fixtures::instant(2024, 6, 1, 2, 30),
    );
    assert_eq!(
        compile(filter),
        "(Birthday ge 2024-05-31T05:00:00.000000Z and Birthday lt 2024-06-01T05:00:00.000000Z)"
    );
}

#[test]
fn relative_dates_resolve_against_the_clock() {
    let filter = DataQueryFilter::new(
        person_field("Birthday"),
        FilterOperator::GreaterThan,
        DateFilter::new(DateFilterOption::SevenDaysAgo),
    );
    assert_eq!(compile(filter), "Birthday gt 2024-03-03T12:00:00.000000Z");
}

#[test]
fn date_field_rejects_text() {
    let query = DataQuery::new().with_filter(DataQueryFilter::new(
        person_field("Birthday"),
        FilterOperator::LessThan,
        "tomorrow",
    ));
    assert_err(&generator().generate_filter(&query));
}

// ============================================================================
// LIST FIELDS
// ============================================================================

#[test]
fn string_list_case_insensitive() {
    let cases = [
        (FilterOperator::Contains, "TestProperty/any(i: contains(tolower(i), 'value'))"),
        (FilterOperator::DoesNotContain, "TestProperty/any(i: indexof(tolower(i), 'value') eq -1)"),
        (FilterOperator::StartsWith, "TestProperty/any(i: startswith(tolower(i), 'value'))"),
        (FilterOperator::EndsWith, "TestProperty/any(i: endswith(tolower(i), 'value'))"),
        (FilterOperator::Equals, "TestProperty/any(i: tolower(i) eq 'value')"),
        (FilterOperator::IsNull, "TestProperty/any(i: tolower(i) eq null)"),
        (FilterOperator::IsEmpty, "TestProperty/any(i: tolower(i) eq '')"),
    ];
    for (operator, expected) in cases {
        let filter = DataQueryFilter::new(string_list_field(), operator, "Value");
        assert_eq!(compile(filter), expected, "operator {}", operator);
    }
}

#[test]
fn string_list_case_sensitive() {
    let cases = [
        (FilterOperator::Contains, "TestProperty/any(i: contains(i, 'Value'))"),
        (FilterOperator::DoesNotContain, "TestProperty/any(i: indexof(i, 'Value') eq -1)"),
        (FilterOperator::StartsWith, "TestProperty/any(i: startswith(i, 'Value'))"),
        (FilterOperator::EndsWith, "TestProperty/any(i: endswith(i, 'Value'))"),
        (FilterOperator::Equals, "TestProperty/any(i: i eq 'Value')"),
        (FilterOperator::IsNull, "TestProperty/any(i: i eq null)"),
        (FilterOperator::IsEmpty, "TestProperty/any(i: i eq '')"),
    ];
    for (operator, expected) in cases {
        let filter = DataQueryFilter::new(string_list_field(), operator, "Value").case_sensitive();
        assert_eq!(compile(filter), expected, "operator {}", operator);
    }
}

#[test]
fn list_values_against_list_field() {
    let tags = person_field("Tags");
    assert_eq!(
        compile(DataQueryFilter::new(tags.clone(), FilterOperator::In, vec!["vip", "new"])),
        "Tags/any(i:i eq 'vip' or i eq 'new')"
    );
    assert_eq!(
        compile(DataQueryFilter::new(tags, FilterOperator::NotEquals, vec!["vip"])),
        "not (Tags/any(i: i eq 'vip'))"
    );
}

// ============================================================================
// NESTED COLLECTIONS
// ============================================================================

#[test]
fn one_level_collection_uses_any() {
    let filter = DataQueryFilter::new(order_field("Number"), FilterOperator::Equals, "A-1").case_sensitive();
    assert_eq!(compile(filter), "Orders/any(x0: x0/OrderNumber eq 'A-1')");
}

#[test]
fn two_level_collection_numbers_lambdas_outwards() {
    let filter = DataQueryFilter::new(line_field("Sku"), FilterOperator::Equals, "v").case_sensitive();
    assert_eq!(
        compile(filter),
        "Orders/any(x1: x1/Lines/any(x0: x0/Sku eq 'v'))"
    );
}

#[test]
fn negated_membership_uses_all() {
    let not_equal = DataQueryFilter::new(line_field("Sku"), FilterOperator::NotEquals, "v").case_sensitive();
    assert_eq!(
        compile(not_equal),
        "Orders/all(x1: x1/Lines/all(x0: x0/Sku ne 'v'))"
    );

    let lacking = DataQueryFilter::new(line_field("Sku"), FilterOperator::DoesNotContain, "V");
    assert_eq!(
        compile(lacking),
        "Orders/all(x1: x1/Lines/all(x0: indexof(tolower(x0/Sku), 'v') eq -1))"
    );
}

#[test]
fn empty_collection_leaf_is_dropped() {
    let filter = DataQueryFilter::unset(line_field("Quantity"));
    assert_eq!(compile(filter), "");
}

// ============================================================================
// GROUPS AND ORDERING
// ============================================================================

#[test]
fn group_conjunctions() {
    let name = person_field("Name");
    let a = DataQueryFilter::new(name.clone(), FilterOperator::Equals, "a");
    let b = DataQueryFilter::new(name.clone(), FilterOperator::Equals, "b");

    let and = DataQuery::new().with_filter(a).with_filter(b);
    assert_eq!(
        generator().generate_filter(&and).unwrap(),
        "tolower(Name) eq 'a' and tolower(Name) eq 'b'"
    );

    let or = and.clone().with_conjunction(Conjunction::Or);
    assert_eq!(
        generator().generate_filter(&or).unwrap(),
        "tolower(Name) eq 'a' or tolower(Name) eq 'b'"
    );

    let empty_only = DataQuery::new()
        .with_filter(DataQueryFilter::unset(name.clone()))
        .with_filter(FilterGroup::or(Vec::<FilterNode>::new()));
    assert_eq!(generator().generate_filter(&empty_only).unwrap(), "");
    assert_eq!(generator().generate_filter(&DataQuery::new()).unwrap(), "");
}

#[test]
fn nested_groups_are_parenthesised() {
    let age = person_field("Age");
    let query = DataQuery::new()
        .with_filter(DataQueryFilter::new(person_field("IsActive"), FilterOperator::Equals, true))
        .with_filter(FilterGroup::or([
            DataQueryFilter::new(age.clone(), FilterOperator::LessThan, 18),
            DataQueryFilter::new(age, FilterOperator::GreaterThan, 65),
        ]));
    assert_eq!(
        generator().generate_filter(&query).unwrap(),
        "IsActive eq true and (Age lt 18 or Age gt 65)"
    );

    let single = DataQuery::new().with_filter(FilterGroup::or([DataQueryFilter::new(
        person_field("Age"),
        FilterOperator::LessThan,
        18,
    )]));
    assert_eq!(generator().generate_filter(&single).unwrap(), "Age lt 18");
}

#[test]
fn order_by_uses_odata_paths() {
    let query = DataQuery::new()
        .with_sort(SortSpec::ascending(person_field("Name")))
        .with_sort(SortSpec::descending(order_field("Number")));
    assert_eq!(generator().generate_order_by(&query), "Name asc, Orders/Number desc");
    assert_eq!(generator().generate_order_by(&DataQuery::new()), "");
}

// ============================================================================
// SEARCH FORM
// ============================================================================

#[test]
fn person_search_form() {
    let fields = generator().search_fields::<Person>();
    let paths: Vec<&str> = fields.iter().map(FieldPath::odata_path).collect();
    assert_eq!(
        paths,
        vec![
            "Id",
            "Name",
            "Age",
            "Balance",
            "IsActive",
            "Birthday",
            "Status",
            "Tags",
            "Orders/Number",
            "Orders/Placed",
            "Orders/Lines/Sku",
            "Orders/Lines/Quantity",
        ]
    );
    assert_eq!(
        filterable_fields(Person::search_fields(), GeneratorConfig::default().max_flatten_depth).len(),
        fields.len()
    );

    let name = fields.get("Name").unwrap();
    assert_eq!(supported_operators(name)[0], FilterOperator::Contains);
    assert_unknown_field(&fields.require("Notes"), "Notes");
}

#[test]
fn configured_depth_limits_search_form() {
    let shallow = generator().with_config(GeneratorConfig {
        max_flatten_depth: 2,
        ..GeneratorConfig::default()
    });
    let fields = shallow.search_fields::<Person>();
    let nested: Vec<&str> = fields
        .iter()
        .map(FieldPath::odata_path)
        .filter(|path| path.contains('/'))
        .collect();
    assert_eq!(nested, vec!["Orders/Number", "Orders/Placed"]);
    assert!(fields.get("Orders/Lines/Sku").is_none());
}

#[test]
fn request_url_for_nested_filter() {
    let query = DataQuery::new()
        .with_page(0, 50)
        .with_filter(DataQueryFilter::new(line_field("Quantity"), FilterOperator::GreaterThan, 2));
    let params = ODataParams::from_query(&generator(), &query);
    assert_ok(&params);
    let params = params.unwrap();
    assert_eq!(
        params.filter.as_deref(),
        Some("Orders/any(x1: x1/Lines/any(x0: x0/Quantity gt 2))")
    );
    assert_eq!(
        params.append_to("/odata/People"),
        "/odata/People?$filter=Orders%2Fany%28x1%3A%20x1%2FLines%2Fany%28x0%3A%20x0%2FQuantity%20gt%202%29%29&$top=50&$skip=0&$count=true"
    );
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sieve_odata::{encode_query, ODataGenerator};
use sieve_test_utils::fixtures::{self, line_field, order_field, person_field, Person};
use sieve_test_utils::{DataQuery, DataQueryFilter, FilterGroup, FilterOperator, SortSpec};

fn sample_query() -> DataQuery {
    let age = person_field("Age");
    DataQuery::new()
        .with_page(0, 50)
        .with_filter(DataQueryFilter::new(person_field("Name"), FilterOperator::Contains, "smith"))
        .with_filter(FilterGroup::or([
            DataQueryFilter::new(age.clone(), FilterOperator::LessThan, 18),
            DataQueryFilter::new(age, FilterOperator::GreaterThan, 65),
        ]))
        .with_filter(DataQueryFilter::new(
            person_field("Birthday"),
            FilterOperator::Equals,
            fixtures::instant(1990, 4, 2, 9, 0),
        ))
        .with_filter(DataQueryFilter::new(line_field("Sku"), FilterOperator::NotEquals, "X-1"))
        .with_sort(SortSpec::descending(order_field("Placed")))
}

fn bench_generate(c: &mut Criterion) {
    let generator = ODataGenerator::new(fixtures::offset_converter());
    let query = sample_query();

    c.bench_function("odata/generate_filter", |b| {
        b.iter(|| {
            let filter = generator.generate_filter(black_box(&query)).expect("generate filter");
            black_box(filter.len());
        });
    });

    c.bench_function("odata/generate_order_by", |b| {
        b.iter(|| black_box(generator.generate_order_by(black_box(&query))));
    });
}

fn bench_search_fields(c: &mut Criterion) {
    let generator = ODataGenerator::default();
    c.bench_function("flatten/person", |b| {
        b.iter(|| black_box(generator.search_fields::<Person>().len()));
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let query = sample_query();
    c.bench_function("snapshot/encode", |b| {
        b.iter(|| black_box(encode_query(black_box(&query)).expect("encode query")));
    });
}

criterion_group!(benches, bench_generate, bench_search_fields, bench_snapshot);
criterion_main!(benches);

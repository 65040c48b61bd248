use agpe_map::models::{CustomerRecordBuilder, Dataset, RawRecord};
use agpe_map::processors::{CoordinateValidator, MapViewBuilder, SearchFilter};
use agpe_map::readers::RawTable;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const MUNICIPALITIES: [&str; 5] = ["Duitama", "Tunja", "Sogamoso", "Paipa", "Chiquinquirá"];
const BRANDS: [&str; 3] = ["Elster", "Itron", "Landis+Gyr"];

// Create test data for benchmarking
fn create_test_dataset(count: usize) -> Dataset {
    let records = (0..count)
        .map(|i| {
            CustomerRecordBuilder::new()
                .name(format!("Cliente {}", i))
                .account(format!("{}", 100_000 + i))
                .municipality(MUNICIPALITIES[i % MUNICIPALITIES.len()])
                .meter(format!("M-{:06}", i), BRANDS[i % BRANDS.len()])
                .coordinates(5.0 + (i % 100) as f64 * 0.01, -73.5 + (i % 50) as f64 * 0.01)
                .build()
                .expect("benchmark records are in range")
        })
        .collect();
    Dataset::from_records(records).expect("benchmark records are in range")
}

fn create_raw_table(count: usize) -> RawTable {
    let records = (0..count)
        .map(|i| RawRecord {
            name: format!("Cliente {}", i),
            account: format!("{}", 100_000 + i),
            // Every tenth row carries an unusable coordinate
            lat: if i % 10 == 0 { "n/a".to_string() } else { format!("{}", 5.0 + (i % 100) as f64 * 0.01) },
            lon: format!("{}", -73.5 + (i % 50) as f64 * 0.01),
            ..Default::default()
        })
        .collect();
    RawTable {
        records,
        ..Default::default()
    }
}

fn benchmark_coordinate_validator(c: &mut Criterion) {
    let table = create_raw_table(10_000);

    c.bench_function("coordinate_validator_10k", |b| {
        b.iter(|| {
            let outcome = CoordinateValidator::new().validate(black_box(&table));
            black_box(outcome.dataset.len())
        })
    });
}

fn benchmark_search_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_filter");

    for size in [1_000, 10_000, 50_000].iter() {
        let dataset = create_test_dataset(*size);

        for query in ["", "duit", "M-0004", "zzz-nomatch-999"] {
            group.bench_with_input(
                BenchmarkId::new(format!("query_{:?}", query), size),
                &dataset,
                |b, dataset| {
                    let filter = SearchFilter::new(query);
                    b.iter(|| black_box(filter.apply(black_box(dataset)).len()))
                },
            );
        }
    }

    group.finish();
}

fn benchmark_view_builder(c: &mut Criterion) {
    let dataset = create_test_dataset(10_000);

    c.bench_function("map_view_builder_10k", |b| {
        b.iter(|| {
            let view = MapViewBuilder::new().build(black_box(&dataset));
            black_box(view.map(|v| v.markers.len()).unwrap_or_default())
        })
    });
}

criterion_group!(
    benches,
    benchmark_coordinate_validator,
    benchmark_search_filter,
    benchmark_view_builder
);
criterion_main!(benches);

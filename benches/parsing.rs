use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dex::{ParseOptions, Table};

fn character_document() -> String {
    "MAYU : vocaloid {\n\
     taglist { yandere, lolita, gothic, small }\n\
     gender   : female\n\
     age      : 15\n\
     company  : EXIT TUNES\n\
     language : Japanese\n\
     code     : QWCE-00264\n\
     }"
    .to_string()
}

fn wide_table(entries: usize) -> Table {
    let mut builder = Table::builder();
    for i in 0..entries {
        builder = builder.put(format!("key{i}"), i as f64 * 1.5);
    }
    builder.create()
}

fn benchmark_parse_document(c: &mut Criterion) {
    let doc = character_document();
    c.bench_function("parse_document", |b| {
        b.iter(|| dex::from_str(black_box(&doc)).unwrap())
    });
}

fn benchmark_parse_unchecked(c: &mut Criterion) {
    let doc = character_document();
    let options = ParseOptions::new().with_duplicate_check(false);
    c.bench_function("parse_document_unchecked", |b| {
        b.iter(|| dex::from_str_with_options(black_box(&doc), options.clone()).unwrap())
    });
}

fn benchmark_parse_wide(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_wide_table");
    for size in [10, 100, 1000].iter() {
        let printed = dex::to_string(&wide_table(*size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &printed, |b, printed| {
            b.iter(|| dex::from_str(black_box(printed)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_print(c: &mut Criterion) {
    let table = wide_table(100);
    c.bench_function("print_compact", |b| {
        b.iter(|| dex::to_string(black_box(&table)))
    });
    c.bench_function("print_pretty", |b| {
        b.iter(|| dex::to_string_pretty(black_box(&table)))
    });
}

fn benchmark_number_literals(c: &mut Criterion) {
    let tokens = ["12345.6789E-10", "0xABCDEF", "0b110110001110001", "not-a-number"];
    c.bench_function("parse_number", |b| {
        b.iter(|| {
            for token in &tokens {
                let _ = dex::parse_number(black_box(token));
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_parse_document,
    benchmark_parse_unchecked,
    benchmark_parse_wide,
    benchmark_print,
    benchmark_number_literals
);
criterion_main!(benches);

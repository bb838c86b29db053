//! Parameter conversion and conformance check benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nwrfc_types::{
    Direction, FieldDesc, FunctionDesc, ParameterDesc, RfcStructure, RfcType, RfcValue, TypeDesc,
};
use serde_json::json;

fn line_type() -> TypeDesc {
    TypeDesc::new("RFCSI")
        .with_field(FieldDesc::new("RFCHOST", RfcType::Char, 8))
        .with_field(FieldDesc::new("RFCDATE", RfcType::Date, 8))
        .with_field(FieldDesc::new("RFCCOUNT", RfcType::Int, 4))
        .with_field(FieldDesc::new("RFCAMOUNT", RfcType::Bcd, 8))
}

fn function_desc() -> FunctionDesc {
    FunctionDesc::new("Z_BENCH")
        .with_parameter(ParameterDesc::new("IV_TEXT", Direction::Import, RfcType::String, 0))
        .with_parameter(
            ParameterDesc::new("IT_LINES", Direction::Tables, RfcType::Table, 30)
                .with_type(line_type()),
        )
}

fn table_params(rows: usize) -> serde_json::Value {
    let lines: Vec<_> = (0..rows)
        .map(|i| {
            json!({
                "RFCHOST": format!("host{i}"),
                "RFCDATE": "20240101",
                "RFCCOUNT": i,
                "RFCAMOUNT": "12.50",
            })
        })
        .collect();
    json!({ "IV_TEXT": "bench", "IT_LINES": lines })
}

fn bench_from_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("from_json");

    for rows in [1, 100, 1000] {
        let value = table_params(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &value, |b, value| {
            b.iter(|| black_box(RfcValue::from(value.clone())));
        });
    }

    group.finish();
}

fn bench_check(c: &mut Criterion) {
    let desc = function_desc();
    let mut group = c.benchmark_group("check");

    for rows in [1, 100, 1000] {
        let params: RfcStructure = RfcValue::from(table_params(rows))
            .into_structure()
            .unwrap();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &params, |b, params| {
            b.iter(|| black_box(desc.check(params).is_ok()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_from_json, bench_check);

criterion_main!(benches);

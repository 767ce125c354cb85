// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_keystyle` compile, lookup and load.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_keystyle::{
    PropertySetBuilder, PropertySetSpecBuilder, RawStylesheet, Schema, SchemaBuilder, Selector,
    StyleQuery, StyleValue, Stylesheet, StylesheetBuilder, ValueEncoder, names,
};

fn schema() -> Schema {
    SchemaBuilder::new()
        .element(
            "key",
            PropertySetSpecBuilder::new()
                .property(
                    names::BACKGROUND,
                    [ValueEncoder::DefinedVar, ValueEncoder::SolidColor],
                )
                .property(names::FOREGROUND, [ValueEncoder::SolidColor])
                .property(names::BORDER_WIDTH, [ValueEncoder::DpSize])
                .property(names::FONT_SIZE, [ValueEncoder::SpSize])
                .property(
                    names::SHAPE,
                    [ValueEncoder::RectangleShape, ValueEncoder::RoundedCornerShape],
                )
                .build(),
        )
        .build()
}

/// A broad `key` rule plus one rule per key code, spread over a few groups
/// and modes, with every eighth rule pressed.
fn sheet(codes: i32) -> Stylesheet {
    let mut builder = StylesheetBuilder::new().rule(
        Selector::new("key"),
        PropertySetBuilder::new()
            .set(
                names::BACKGROUND,
                StyleValue::solid_color(0x21, 0x21, 0x21, 0xff),
            )
            .set(names::FONT_SIZE, StyleValue::SpSize(22.0))
            .build(),
    );
    for code in 0..codes {
        let selector = Selector::new("key")
            .with_codes([code])
            .with_groups([code % 4])
            .with_modes([code % 3])
            .with_pressed(code % 8 == 0);
        let shade = (code % 256) as u8;
        builder.insert(
            selector,
            PropertySetBuilder::new()
                .set(
                    names::FOREGROUND,
                    StyleValue::solid_color(shade, shade, shade, 0xff),
                )
                .build(),
        );
    }
    builder.build()
}

fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystyle/compile");
    let schema = schema();
    for codes in [16, 64, 256] {
        let sheet = sheet(codes);
        group.throughput(Throughput::Elements(sheet.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(codes), &sheet, |b, sheet| {
            b.iter(|| black_box(sheet.compile_to_fully_qualified(&schema)));
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystyle/resolve");
    let schema = schema();
    for codes in [16, 64, 256] {
        let compiled = sheet(codes).compile_to_fully_qualified(&schema);
        group.bench_with_input(
            BenchmarkId::new("hit", codes),
            &compiled,
            |b, compiled| {
                b.iter(|| {
                    let query = StyleQuery::new("key")
                        .with_code(black_box(codes / 2))
                        .with_pressed(true);
                    black_box(compiled.resolve(&query))
                });
            },
        );
        group.bench_with_input(
            BenchmarkId::new("fallback", codes),
            &compiled,
            |b, compiled| {
                b.iter(|| {
                    let query = StyleQuery::new("key").with_code(black_box(-1));
                    black_box(compiled.resolve(&query))
                });
            },
        );
    }
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystyle/load");
    let schema = schema();
    for codes in [64, 256] {
        let compiled = sheet(codes).compile_to_fully_qualified(&schema);
        let Ok(raw) = compiled.serialize(&schema) else {
            panic!("benchmark sheet must serialize");
        };
        let Ok(json) = serde_json::to_string(&raw) else {
            panic!("raw stylesheet must encode as JSON");
        };
        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(codes), &json, |b, json| {
            b.iter(|| {
                let raw: RawStylesheet = serde_json::from_str(json).unwrap_or_default();
                black_box(Stylesheet::deserialize(&raw, &schema))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_resolve, bench_load);
criterion_main!(benches);

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for variant table expansion and value conversion in
// the tonerwatch-core crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tonerwatch_core::conversion::{Conversion, percentage};
use tonerwatch_core::{FieldValue, fields_for, variant_names};

fn bench_fields_for(c: &mut Criterion) {
    c.bench_function("fields_for/xeroxvlc505s", |b| {
        b.iter(|| fields_for(black_box("XeroxVLC505S")))
    });

    c.bench_function("fields_for/all_variants", |b| {
        b.iter(|| {
            for name in variant_names() {
                black_box(fields_for(name).ok());
            }
        })
    });
}

fn bench_conversion(c: &mut Criterion) {
    let pct = Conversion::Percentage {
        capacity_oid: "1.3.6.1.2.1.43.11.1.1.8.1.1".into(),
    };
    let raw = FieldValue::Number(6250);
    let capacity = FieldValue::Number(25000);

    c.bench_function("conversion/percentage_apply", |b| {
        b.iter(|| pct.apply(black_box(&raw), Some(black_box(&capacity))))
    });

    c.bench_function("conversion/percentage_raw", |b| {
        b.iter(|| percentage(black_box(6250), black_box(25000)))
    });
}

criterion_group!(benches, bench_fields_for, bench_conversion);
criterion_main!(benches);

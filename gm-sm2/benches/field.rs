//! `FieldElement` and point benchmarks

use core::hint::black_box;
use criterion::{
    BenchmarkGroup, Criterion, criterion_group, criterion_main, measurement::Measurement,
};
use gm_sm2::{BigUint, Curve, FieldElement};
use hex_literal::hex;

const FE_A: [u8; 32] = hex!("32C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7");
const FE_B: [u8; 32] = hex!("BC3736A2F4F6779C59BDCEE36B692153D0A9877CC62A474002DF32E52139F0A0");

fn bench_field_ops<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, curve: &Curve) {
    let a = FieldElement::from_be_slice(&FE_A, curve.modulus()).unwrap();
    let b = FieldElement::from_be_slice(&FE_B, curve.modulus()).unwrap();

    group.bench_function("mul", |bench| bench.iter(|| black_box(&a) * black_box(&b)));
    group.bench_function("square", |bench| bench.iter(|| black_box(&a).square()));
    group.bench_function("invert", |bench| bench.iter(|| black_box(&a).invert()));
    group.bench_function("sqrt", |bench| bench.iter(|| black_box(&b).sqrt()));
}

fn bench_point_ops<M: Measurement>(group: &mut BenchmarkGroup<'_, M>, curve: &Curve) {
    let g = curve.generator();
    let k = BigUint::from_bytes_be(&FE_B) % curve.order();
    let p = g.mul(&k);

    group.bench_function("point add", |bench| bench.iter(|| black_box(&g) + black_box(&p)));
    group.bench_function("point double", |bench| bench.iter(|| black_box(&p).double()));
    group.bench_function("point mul", |bench| bench.iter(|| black_box(&g).mul(black_box(&k))));
}

fn bench_field(c: &mut Criterion) {
    let curve = Curve::sm2p256v1();
    let mut group = c.benchmark_group("FieldElement");
    bench_field_ops(&mut group, &curve);
    group.finish();

    let mut group = c.benchmark_group("AffinePoint");
    bench_point_ops(&mut group, &curve);
    group.finish();
}

criterion_group!(benches, bench_field);
criterion_main!(benches);

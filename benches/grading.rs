//! Criterion benches for the cipher and the membership test.

use criterion::{criterion_group, criterion_main, Criterion};
use opegrade_core::{Ope, RangeGrader, ValueRange};
use rand::rngs::OsRng;

fn bench_encrypt(c: &mut Criterion) {
    let ope = Ope::new(Ope::generate_key(&mut OsRng), ValueRange::full());
    c.bench_function("ope_encrypt", |b| {
        let mut m = 0u128;
        b.iter(|| {
            m = m.wrapping_add(0x9e37_79b9);
            ope.encrypt(m)
        });
    });
}

fn bench_grade(c: &mut Criterion) {
    let grader = RangeGrader::new(10.0, 20.0).unwrap();
    c.bench_function("range_grade", |b| b.iter(|| grader.grade(15.0).unwrap()));
}

criterion_group!(benches, bench_encrypt, bench_grade);
criterion_main!(benches);

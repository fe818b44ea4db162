// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for the FFT wrapper.

use std::f64::consts::PI;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use num_complex::Complex64;
use wavfilt_dsp_lib::fft::FftState;

/// Quadratic chirp used as a broadband test signal.
fn chirp(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / len as f64;
            (2.0 * PI * 1000.0 * t * t).sin()
        })
        .collect()
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft_forward");

    for &rank in &[8usize, 12, 16] {
        let mut state = FftState::new(rank);
        let input: Vec<Complex64> = chirp(state.len())
            .into_iter()
            .map(|x| Complex64::new(x, 0.0))
            .collect();
        let mut buf = input.clone();

        group.bench_with_input(BenchmarkId::from_parameter(state.len()), &rank, |b, _| {
            b.iter(|| {
                buf.copy_from_slice(&input);
                state.forward(black_box(&mut buf));
            });
        });
    }
    group.finish();
}

fn bench_real_magnitude(c: &mut Criterion) {
    let mut group = c.benchmark_group("fft_real_magnitude");

    for &rank in &[10usize, 14, 18] {
        let mut state = FftState::new(rank);
        let src = chirp(state.len() - state.len() / 4);
        let mut mag = vec![0.0; state.len() / 2 + 1];

        group.bench_with_input(BenchmarkId::from_parameter(state.len()), &rank, |b, _| {
            b.iter(|| state.real_magnitude(black_box(&mut mag), black_box(&src)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forward, bench_real_magnitude);
criterion_main!(benches);

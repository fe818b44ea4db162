// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for response analysis and spectrum computation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use wavfilt_dsp_units::analysis::spectrum::signal_spectrum;
use wavfilt_dsp_units::analysis::{ResponseAnalyzer, Spacing, run};
use wavfilt_dsp_units::filters::{FilterSpec, design};
use wavfilt_dsp_units::misc::windows::WindowType;
use wavfilt_dsp_units::plot::PlotBundle;
use wavfilt_dsp_units::signal::SignalBuffer;

const SR: u32 = 44100;

/// Generate a deterministic white noise buffer using a simple LCG.
fn white_noise(len: usize) -> Vec<f64> {
    let mut state: u64 = 0xDEAD_BEEF_CAFE_BABE;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as i32) as f64 / (i32::MAX as f64)
        })
        .collect()
}

fn bench_frequency_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("frequency_response");
    let filter = design(&FilterSpec::bandpass(300.0, 3000.0, 8), SR).unwrap();

    for &points in &[512usize, 4096] {
        let mut analyzer = ResponseAnalyzer::new();
        analyzer
            .set_freq_points(points)
            .set_spacing(Spacing::Logarithmic);
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, _| {
            b.iter(|| analyzer.frequency_response(black_box(&filter)));
        });
    }
    group.finish();
}

fn bench_impulse_response(c: &mut Criterion) {
    let filter = design(&FilterSpec::lowpass(500.0, 6), SR).unwrap();
    let analyzer = ResponseAnalyzer::new();
    c.bench_function("impulse_response_512", |b| {
        b.iter(|| analyzer.impulse_response(black_box(&filter)));
    });
}

fn bench_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_spectrum");
    for &secs in &[1usize, 10] {
        let signal = SignalBuffer::mono(SR, white_noise(secs * SR as usize)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(secs), &secs, |b, _| {
            b.iter(|| signal_spectrum(black_box(&signal), 0, WindowType::Hann));
        });
    }
    group.finish();
}

fn bench_full_request(c: &mut Criterion) {
    let signal = SignalBuffer::mono(SR, white_noise(5 * SR as usize)).unwrap();
    let spec = FilterSpec::lowpass(1000.0, 4);
    c.bench_function("run_and_plot_5s", |b| {
        b.iter(|| {
            let out = run(black_box(&spec), black_box(&signal)).unwrap();
            PlotBundle::decimated(&out.responses, 2000)
        });
    });
}

criterion_group!(
    benches,
    bench_frequency_response,
    bench_impulse_response,
    bench_spectrum,
    bench_full_request
);
criterion_main!(benches);

// SPDX-License-Identifier: LGPL-3.0-or-later
//
// Reference tests: compare the transposed direct form II cascade kernel
// against a plain direct form I difference equation, and the evaluated
// transfer function against the steady-state gain measured on a sine.

use std::f64::consts::PI;

use float_cmp::assert_approx_eq;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use wavfilt_dsp_lib::complex::cascade_response;
use wavfilt_dsp_lib::filters::cascade_process;
use wavfilt_dsp_lib::types::{Sos, SosState};

/// Generate a deterministic pseudo-random test signal in [-1, 1].
fn gen_test_signal(seed: u64, len: usize) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.random::<f64>() * 2.0 - 1.0).collect()
}

/// Generate a sine wave.
fn gen_sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (2.0 * PI * freq * i as f64 / sample_rate).sin())
        .collect()
}

/// Direct form I, one section at a time.
fn reference_df1(src: &[f64], sections: &[Sos]) -> Vec<f64> {
    let mut signal = src.to_vec();
    for c in sections {
        let (mut x1, mut x2, mut y1, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for s in signal.iter_mut() {
            let x = *s;
            let y = c.b0 * x + c.b1 * x1 + c.b2 * x2 - c.a1 * y1 - c.a2 * y2;
            x2 = x1;
            x1 = x;
            y2 = y1;
            y1 = y;
            *s = y;
        }
    }
    signal
}

/// Bilinear RBJ-style lowpass section, textbook sign convention.
fn lowpass(f0: f64, q: f64, fs: f64) -> Sos {
    let w0 = 2.0 * PI * f0 / fs;
    let alpha = w0.sin() / (2.0 * q);
    let cw = w0.cos();
    Sos::from_ba(
        [(1.0 - cw) / 2.0, 1.0 - cw, (1.0 - cw) / 2.0],
        [1.0 + alpha, -2.0 * cw, 1.0 - alpha],
    )
    .unwrap()
}

fn test_cascade() -> Vec<Sos> {
    vec![
        lowpass(1000.0, 0.541_196_1, 48000.0),
        lowpass(1000.0, 1.306_563, 48000.0),
        Sos {
            b0: 0.5,
            b1: 0.5,
            b2: 0.0,
            a1: -0.2,
            a2: 0.0,
        },
    ]
}

#[test]
fn cascade_matches_direct_form_one() {
    let sections = test_cascade();
    for seed in [1u64, 7, 42] {
        let src = gen_test_signal(seed, 4096);
        let expected = reference_df1(&src, &sections);
        let mut dst = vec![0.0; src.len()];
        let mut state = vec![SosState::default(); sections.len()];
        cascade_process(&mut dst, &src, &sections, &mut state);
        for (i, (&a, &b)) in dst.iter().zip(expected.iter()).enumerate() {
            assert!((a - b).abs() < 1e-12, "seed {seed} sample {i}: {a} vs {b}");
        }
    }
}

#[test]
fn evaluated_gain_matches_measured_sine_gain() {
    let fs = 48000.0;
    let sections = test_cascade();
    for freq in [100.0, 1000.0, 3000.0] {
        let len = 48000;
        let src = gen_sine(freq, fs, len);
        let mut dst = vec![0.0; len];
        let mut state = vec![SosState::default(); sections.len()];
        cascade_process(&mut dst, &src, &sections, &mut state);

        // Skip the transient; the tail holds a whole number of periods.
        let tail = &dst[len / 2..];
        let mean_sq = tail.iter().map(|x| x * x).sum::<f64>() / tail.len() as f64;
        let measured = (2.0 * mean_sq).sqrt();
        let expected = cascade_response(&sections, 2.0 * PI * freq / fs).norm();
        assert_approx_eq!(f64, measured, expected, epsilon = 1e-3);
    }
}

#[test]
fn zero_input_stays_zero() {
    let sections = test_cascade();
    let src = vec![0.0; 1024];
    let mut dst = vec![1.0; 1024];
    let mut state = vec![SosState::default(); sections.len()];
    cascade_process(&mut dst, &src, &sections, &mut state);
    assert!(dst.iter().all(|&x| x == 0.0));
}

// SPDX-License-Identifier: LGPL-3.0-or-later

//! Nth-order Butterworth design as a cascade of second-order sections.
//!
//! Butterworth filters are maximally flat in the passband. The design runs
//! entirely on zeros, poles and gain:
//!
//! 1. Analog prototype poles at `exp(j·π·(2k + N + 1) / (2N))`, unity gain.
//! 2. Each cutoff is pre-warped with `ω = 2·fs·tan(π·f/fs)` so the digital
//!    -3 dB points land exactly on the requested frequencies.
//! 3. Lowpass/highpass/bandpass/bandstop frequency transform of the
//!    prototype. Band transforms double the pole count.
//! 4. Bilinear mapping `z = (2fs + s) / (2fs - s)`. Zeros at infinity map
//!    to `z = -1`.
//! 5. Roots are grouped into sections: conjugate pairs and pairs of real
//!    roots form biquads, a leftover real root forms a first-order section.
//!    Sections run from the pole pair furthest from the unit circle to the
//!    closest, with the overall gain folded into the first one.
//!
//! Gains are carried as a complex logarithm until the sections are built.
//! A 48-root product of bilinear factors leaves the `f64` range well
//! before `MAX_ORDER`.
//!
//! Low/high pass designs of order N give `ceil(N/2)` sections; band designs
//! give `N` sections.

use std::f64::consts::PI;

use log::{debug, warn};
use num_complex::Complex64;
use wavfilt_dsp_lib::types::Sos;

use crate::consts::REAL_ROOT_EPSILON;
use crate::error::{FilterError, Result};
use crate::filters::designed::{DesignedFilter, FILTER_SECTIONS};
use crate::filters::spec::{Cutoff, FilterKind, FilterSpec};
use crate::units::prewarp;

/// Zeros, poles and gain of a transfer function. The gain is held as its
/// natural logarithm (log magnitude plus phase).
#[derive(Debug, Clone, PartialEq)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    ln_gain: Complex64,
}

impl Zpk {
    /// Real gain factor.
    fn gain(&self) -> f64 {
        self.ln_gain.exp().re
    }
}

/// `ln(x)` of a positive real as a complex log gain.
fn ln_real(x: f64) -> Complex64 {
    Complex64::new(x.ln(), 0.0)
}

/// `Σ ln(f(r))` over `roots`.
fn ln_product(roots: &[Complex64], f: impl Fn(Complex64) -> Complex64) -> Complex64 {
    roots.iter().map(|r| f(*r).ln()).sum()
}

/// Design a Butterworth filter for `spec` at `sample_rate`.
///
/// The spec is validated before any computation. A design whose poles do
/// not all lie strictly inside the unit circle, or whose coefficients are
/// not finite, is rejected with `InvalidSpecification { field: "order" }`.
///
/// # Examples
/// ```
/// use wavfilt_dsp_units::filters::{FilterSpec, design};
///
/// let filter = design(&FilterSpec::bandpass(300.0, 3000.0, 4), 44100).unwrap();
/// assert_eq!(filter.section_count(), 4);
/// assert!(filter.is_stable());
/// ```
pub fn design(spec: &FilterSpec, sample_rate: u32) -> Result<DesignedFilter> {
    spec.validate(sample_rate)?;

    let fs = f64::from(sample_rate);
    let analog = analog_zpk(spec, fs);
    let digital = bilinear(&analog, fs);

    let sections = zpk_to_sections(&digital).map_err(|index| {
        warn!(
            "butterworth: could not group roots for {} at {sample_rate} Hz (section {index})",
            spec.fingerprint()
        );
        FilterError::ResponseComputation {
            curve: FILTER_SECTIONS,
            index,
        }
    })?;

    let filter = DesignedFilter::from_sections(*spec, sample_rate, sections)?;
    debug!(
        "butterworth: {} at {sample_rate} Hz -> {} sections, max pole radius {:.9}",
        spec.fingerprint(),
        filter.section_count(),
        filter.max_pole_radius()
    );
    Ok(filter)
}

/// Analog Butterworth prototype poles (cutoff 1 rad/s).
///
/// The real pole of an odd order is exactly `-1`.
fn prototype_poles(order: usize) -> Vec<Complex64> {
    let n = order as f64;
    (0..order)
        .map(|k| {
            if 2 * k + 1 == order {
                return Complex64::new(-1.0, 0.0);
            }
            let theta = PI * (2.0 * k as f64 + n + 1.0) / (2.0 * n);
            Complex64::from_polar(1.0, theta)
        })
        .collect()
}

/// Log gain `ln(1 / Π(-p))` of an inverted prototype.
fn ln_inverted_gain(proto: &[Complex64]) -> Complex64 {
    -ln_product(proto, |p| -p)
}

/// Split each transformed prototype pole into the two roots of
/// `s² - 2qs + wo² = 0`, `q ± sqrt(q² - wo²)`.
///
/// The larger root is taken directly and the smaller one as `wo² / large`,
/// which avoids cancellation when `|q| >> wo`. Large roots come first.
fn band_split(scaled: &[Complex64], wo: f64) -> Vec<Complex64> {
    let wo2 = Complex64::new(wo * wo, 0.0);
    let (large, small): (Vec<Complex64>, Vec<Complex64>) = scaled
        .iter()
        .map(|&q| {
            let mut r = (q * q - wo2).sqrt();
            if (q.conj() * r).re < 0.0 {
                r = -r;
            }
            let big = q + r;
            (big, wo2 / big)
        })
        .unzip();
    large.into_iter().chain(small).collect()
}

/// Frequency-transformed analog zeros/poles/gain for the spec.
fn analog_zpk(spec: &FilterSpec, fs: f64) -> Zpk {
    let n = spec.order;
    let proto = prototype_poles(n);

    match (spec.kind, spec.cutoff) {
        (FilterKind::Lowpass, Cutoff::Single(f)) => {
            let wo = prewarp(fs, f);
            Zpk {
                zeros: Vec::new(),
                poles: proto.iter().map(|p| *p * wo).collect(),
                ln_gain: ln_real(wo) * n as f64,
            }
        }
        (FilterKind::Highpass, Cutoff::Single(f)) => {
            let wo = prewarp(fs, f);
            Zpk {
                zeros: vec![Complex64::new(0.0, 0.0); n],
                poles: proto.iter().map(|p| wo / *p).collect(),
                ln_gain: ln_inverted_gain(&proto),
            }
        }
        (FilterKind::Bandpass, Cutoff::Band { low, high }) => {
            let (w1, w2) = (prewarp(fs, low), prewarp(fs, high));
            let bw = w2 - w1;
            let wo = (w1 * w2).sqrt();
            let scaled: Vec<Complex64> = proto.iter().map(|p| *p * (bw * 0.5)).collect();
            Zpk {
                zeros: vec![Complex64::new(0.0, 0.0); n],
                poles: band_split(&scaled, wo),
                ln_gain: ln_real(bw) * n as f64,
            }
        }
        (FilterKind::Bandstop, Cutoff::Band { low, high }) => {
            let (w1, w2) = (prewarp(fs, low), prewarp(fs, high));
            let bw = w2 - w1;
            let wo = (w1 * w2).sqrt();
            let scaled: Vec<Complex64> = proto.iter().map(|p| (bw * 0.5) / *p).collect();
            let mut zeros = vec![Complex64::new(0.0, wo); n];
            zeros.extend(std::iter::repeat_n(Complex64::new(0.0, -wo), n));
            Zpk {
                zeros,
                poles: band_split(&scaled, wo),
                ln_gain: ln_inverted_gain(&proto),
            }
        }
        // Shape mismatches are rejected by validation.
        _ => Zpk {
            zeros: Vec::new(),
            poles: Vec::new(),
            ln_gain: Complex64::new(0.0, 0.0),
        },
    }
}

/// Bilinear transform of an analog zpk at sample rate `fs`.
fn bilinear(analog: &Zpk, fs: f64) -> Zpk {
    let fs2 = Complex64::new(2.0 * fs, 0.0);
    let map = |s: &Complex64| (fs2 + *s) / (fs2 - *s);

    // Gain correction Π(2fs - z) / Π(2fs - p), summed in the log domain.
    let ln_num = ln_product(&analog.zeros, |z| fs2 - z);
    let ln_den = ln_product(&analog.poles, |p| fs2 - p);

    let missing = analog.poles.len().saturating_sub(analog.zeros.len());
    let mut zeros: Vec<Complex64> = analog.zeros.iter().map(map).collect();
    zeros.extend(std::iter::repeat_n(Complex64::new(-1.0, 0.0), missing));

    Zpk {
        zeros,
        poles: analog.poles.iter().map(map).collect(),
        ln_gain: analog.ln_gain + ln_num - ln_den,
    }
}

/// One or two roots that end up in the same section polynomial.
#[derive(Debug, Clone, Copy)]
enum RootGroup {
    Single(f64),
    Pair(Complex64, Complex64),
}

impl RootGroup {
    fn len(&self) -> usize {
        match self {
            RootGroup::Single(_) => 1,
            RootGroup::Pair(..) => 2,
        }
    }

    fn roots(&self) -> Vec<Complex64> {
        match *self {
            RootGroup::Single(r) => vec![Complex64::new(r, 0.0)],
            RootGroup::Pair(a, b) => vec![a, b],
        }
    }

    fn max_radius(&self) -> f64 {
        self.roots().iter().map(|r| r.norm()).fold(0.0, f64::max)
    }

    /// Smallest distance between any root of `self` and any root of `other`.
    fn distance(&self, other: &RootGroup) -> f64 {
        let ours = self.roots();
        other
            .roots()
            .iter()
            .flat_map(|b| ours.iter().map(move |a| (*a - *b).norm()))
            .fold(f64::INFINITY, f64::min)
    }

    /// Monic polynomial `[1, c1, c2]` with these roots.
    fn poly(&self) -> [f64; 3] {
        match *self {
            RootGroup::Single(r) => [1.0, -r, 0.0],
            RootGroup::Pair(a, b) => [1.0, -(a + b).re, (a * b).re],
        }
    }
}

/// Group roots into conjugate pairs, real pairs and at most one single.
///
/// With `split_signs`, real roots of opposite sign pair with each other
/// first, keeping the numerator of band designs as `(z - 1)(z + 1)`.
fn group_roots(roots: &[Complex64], split_signs: bool) -> Vec<RootGroup> {
    let mut groups: Vec<RootGroup> = roots
        .iter()
        .filter(|r| r.im > REAL_ROOT_EPSILON)
        .map(|r| RootGroup::Pair(*r, r.conj()))
        .collect();

    let mut reals: Vec<f64> = roots
        .iter()
        .filter(|r| r.im.abs() <= REAL_ROOT_EPSILON)
        .map(|r| r.re)
        .collect();
    reals.sort_by(f64::total_cmp);

    let mut rest = if split_signs {
        let (mut neg, mut pos): (Vec<f64>, Vec<f64>) = reals.into_iter().partition(|&r| r < 0.0);
        while let (Some(&p), Some(&n)) = (pos.last(), neg.last()) {
            pos.pop();
            neg.pop();
            groups.push(RootGroup::Pair(Complex64::new(p, 0.0), Complex64::new(n, 0.0)));
        }
        pos.extend(neg);
        pos
    } else {
        reals
    };

    while rest.len() >= 2 {
        let (Some(a), Some(b)) = (rest.pop(), rest.pop()) else {
            break;
        };
        groups.push(RootGroup::Pair(Complex64::new(a, 0.0), Complex64::new(b, 0.0)));
    }
    if let Some(r) = rest.pop() {
        groups.push(RootGroup::Single(r));
    }
    groups
}

/// Convert digital zeros/poles/gain into a section cascade.
///
/// Fails with the index of the first section whose zeros cannot be matched
/// to its poles.
fn zpk_to_sections(zpk: &Zpk) -> std::result::Result<Vec<Sos>, usize> {
    let mut pole_groups = group_roots(&zpk.poles, false);
    let mut zero_groups = group_roots(&zpk.zeros, true);
    pole_groups.sort_by(|a, b| a.max_radius().total_cmp(&b.max_radius()));

    let mut sections = Vec::with_capacity(pole_groups.len());
    for (i, pg) in pole_groups.iter().enumerate() {
        let best = zero_groups
            .iter()
            .enumerate()
            .filter(|(_, zg)| zg.len() == pg.len())
            .min_by(|(_, a), (_, b)| a.distance(pg).total_cmp(&b.distance(pg)))
            .map(|(j, _)| j)
            .ok_or(i)?;
        let zg = zero_groups.remove(best);
        sections.push(Sos::from_ba(zg.poly(), pg.poly()).ok_or(i)?);
    }

    if !zero_groups.is_empty() {
        return Err(sections.len());
    }

    let gain = zpk.gain();
    let first = sections.first_mut().ok_or(0usize)?;
    first.b0 *= gain;
    first.b1 *= gain;
    first.b2 *= gain;
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_ORDER;
    use crate::units::gain_to_db;
    use float_cmp::assert_approx_eq;

    const FS: u32 = 44100;

    fn db_at(filter: &DesignedFilter, freq: f64) -> f64 {
        gain_to_db(filter.response_at(freq).norm())
    }

    #[test]
    fn test_prototype_poles_on_unit_circle_left_half() {
        for n in 1..=8 {
            for p in prototype_poles(n) {
                assert_approx_eq!(f64, p.norm(), 1.0, epsilon = 1e-12);
                assert!(p.re < 0.0, "order {n} pole {p} not in left half plane");
            }
        }
    }

    #[test]
    fn test_section_counts() {
        for order in 1..=8 {
            let lp = design(&FilterSpec::lowpass(1000.0, order), FS).unwrap();
            assert_eq!(lp.section_count(), order.div_ceil(2), "lowpass order {order}");
            let hp = design(&FilterSpec::highpass(1000.0, order), FS).unwrap();
            assert_eq!(hp.section_count(), order.div_ceil(2), "highpass order {order}");
            let bp = design(&FilterSpec::bandpass(300.0, 3000.0, order), FS).unwrap();
            assert_eq!(bp.section_count(), order, "bandpass order {order}");
            let bs = design(&FilterSpec::bandstop(300.0, 3000.0, order), FS).unwrap();
            assert_eq!(bs.section_count(), order, "bandstop order {order}");
        }
    }

    #[test]
    fn test_odd_order_has_one_first_order_section() {
        let f = design(&FilterSpec::lowpass(1000.0, 5), FS).unwrap();
        let first_order = f.sections().iter().filter(|s| s.is_first_order()).count();
        assert_eq!(first_order, 1);
    }

    #[test]
    fn test_lowpass_cutoff_is_minus_3db() {
        for order in [1, 2, 3, 4, 8] {
            let f = design(&FilterSpec::lowpass(1000.0, order), FS).unwrap();
            assert_approx_eq!(f64, db_at(&f, 1000.0), -3.0103, epsilon = 0.01);
            assert_approx_eq!(f64, db_at(&f, 0.0), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_highpass_cutoff_is_minus_3db() {
        for order in [1, 2, 5] {
            let f = design(&FilterSpec::highpass(500.0, order), FS).unwrap();
            assert_approx_eq!(f64, db_at(&f, 500.0), -3.0103, epsilon = 0.01);
            assert!(db_at(&f, 0.0) < -150.0);
            assert_approx_eq!(f64, db_at(&f, 20000.0), 0.0, epsilon = 0.01);
        }
    }

    #[test]
    fn test_band_edges_are_minus_3db() {
        for order in [1, 2, 4] {
            let bp = design(&FilterSpec::bandpass(300.0, 3000.0, order), FS).unwrap();
            assert_approx_eq!(f64, db_at(&bp, 300.0), -3.0103, epsilon = 0.01);
            assert_approx_eq!(f64, db_at(&bp, 3000.0), -3.0103, epsilon = 0.01);
            assert!(db_at(&bp, 0.0) < -150.0);

            let bs = design(&FilterSpec::bandstop(300.0, 3000.0, order), FS).unwrap();
            assert_approx_eq!(f64, db_at(&bs, 300.0), -3.0103, epsilon = 0.01);
            assert_approx_eq!(f64, db_at(&bs, 3000.0), -3.0103, epsilon = 0.01);
            assert_approx_eq!(f64, db_at(&bs, 0.0), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_bandpass_peak_at_center() {
        let bp = design(&FilterSpec::bandpass(300.0, 3000.0, 4), FS).unwrap();
        let center = (300.0f64 * 3000.0).sqrt();
        assert_approx_eq!(f64, db_at(&bp, center), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lowpass_rolloff_rate() {
        // N-th order rolls off ~6N dB/octave well above the cutoff.
        let f = design(&FilterSpec::lowpass(500.0, 4), FS).unwrap();
        let drop = db_at(&f, 2000.0) - db_at(&f, 4000.0);
        assert!(drop > 22.0 && drop < 26.0, "drop per octave {drop}");
    }

    #[test]
    fn test_all_designs_stable_across_range() {
        let cases = [
            FilterSpec::lowpass(20.0, MAX_ORDER),
            FilterSpec::lowpass(22000.0, 7),
            FilterSpec::highpass(20000.0, 12),
            FilterSpec::highpass(5.0, 3),
            FilterSpec::bandpass(20.0, 21000.0, 12),
            FilterSpec::bandpass(5.0, 10.0, 4),
            FilterSpec::bandstop(1000.0, 1100.0, 8),
            FilterSpec::bandstop(300.0, 3000.0, 12),
        ];
        for spec in cases {
            let f = design(&spec, FS).unwrap();
            assert!(f.is_stable(), "{} unstable", spec.fingerprint());
            assert!(f.sections().iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_every_kind_and_order_designs() {
        for order in 1..=MAX_ORDER {
            let specs = [
                FilterSpec::lowpass(1000.0, order),
                FilterSpec::highpass(1000.0, order),
                FilterSpec::bandpass(300.0, 3000.0, order),
                FilterSpec::bandstop(300.0, 3000.0, order),
            ];
            for spec in specs {
                let f = design(&spec, FS).unwrap_or_else(|e| panic!("{}: {e}", spec.fingerprint()));
                assert!(f.is_stable(), "{} unstable", spec.fingerprint());
                assert!(f.sections().iter().all(|s| s.is_finite()));
                for corner in spec.cutoff.frequencies() {
                    let db = db_at(&f, corner);
                    assert!(
                        (db + 3.0103).abs() < 0.05,
                        "{}: {db} dB at {corner} Hz",
                        spec.fingerprint()
                    );
                }
            }
        }
    }

    #[test]
    fn test_cutoff_next_to_nyquist_at_max_order() {
        for spec in [
            FilterSpec::highpass(22049.0, MAX_ORDER),
            FilterSpec::lowpass(22049.0, MAX_ORDER),
            FilterSpec::bandstop(10.0, 22049.0, MAX_ORDER),
        ] {
            let f = design(&spec, FS).unwrap_or_else(|e| panic!("{}: {e}", spec.fingerprint()));
            assert!(f.is_stable(), "{} unstable", spec.fingerprint());
            assert!(f.sections().iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_band_split_roots_solve_quadratic() {
        let wo: f64 = 50.0;
        let scaled = [Complex64::new(-1.0e6, 3.0e5), Complex64::new(-20.0, 0.0)];
        let roots = band_split(&scaled, wo);
        assert_eq!(roots.len(), 4);
        for (i, q) in scaled.iter().enumerate() {
            let (a, b) = (roots[i], roots[i + scaled.len()]);
            // s² - 2qs + wo²: sum 2q, product wo²
            assert!(((a + b) - *q * 2.0).norm() <= 1e-9 * q.norm());
            assert!(((a * b) - wo * wo).norm() <= 1e-9 * wo * wo);
        }
    }

    #[test]
    fn test_sections_ordered_by_pole_radius() {
        let f = design(&FilterSpec::lowpass(1000.0, 8), FS).unwrap();
        let radii: Vec<f64> = f.sections().iter().map(|s| s.max_pole_radius()).collect();
        for w in radii.windows(2) {
            assert!(w[0] <= w[1] + 1e-12, "radii not ascending: {radii:?}");
        }
    }

    #[test]
    fn test_second_order_lowpass_matches_closed_form() {
        // Bilinear 2nd-order Butterworth: K = tan(π fc / fs)
        let fc = 1000.0;
        let k = (PI * fc / f64::from(FS)).tan();
        let q = std::f64::consts::FRAC_1_SQRT_2;
        let norm = 1.0 / (1.0 + k / q + k * k);
        let b0 = k * k * norm;
        let a1 = 2.0 * (k * k - 1.0) * norm;
        let a2 = (1.0 - k / q + k * k) * norm;

        let f = design(&FilterSpec::lowpass(fc, 2), FS).unwrap();
        let s = f.sections()[0];
        assert_approx_eq!(f64, s.b0, b0, epsilon = 1e-12);
        assert_approx_eq!(f64, s.b1, 2.0 * b0, epsilon = 1e-12);
        assert_approx_eq!(f64, s.b2, b0, epsilon = 1e-12);
        assert_approx_eq!(f64, s.a1, a1, epsilon = 1e-12);
        assert_approx_eq!(f64, s.a2, a2, epsilon = 1e-12);
    }

    #[test]
    fn test_validation_happens_first() {
        let err = design(&FilterSpec::lowpass(30000.0, 2), FS).unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidSpecification { field: "cutoff", .. }
        ));
        let err = design(&FilterSpec::bandpass(3000.0, 300.0, 2), FS).unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidSpecification { field: "cutoff", .. }
        ));
    }

    #[test]
    fn test_group_roots_pairs_opposite_signs() {
        let roots = [
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(-1.0, 0.0),
            Complex64::new(-1.0, 0.0),
        ];
        let groups = group_roots(&roots, true);
        assert_eq!(groups.len(), 2);
        for g in groups {
            assert_eq!(g.poly(), [1.0, 0.0, -1.0]);
        }
    }

    #[test]
    fn test_group_roots_leftover_single() {
        let roots = [
            Complex64::new(0.5, 0.3),
            Complex64::new(0.5, -0.3),
            Complex64::new(0.2, 0.0),
        ];
        let groups = group_roots(&roots, false);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.iter().filter(|g| g.len() == 1).count(), 1);
    }
}

//! Interpolation helpers:
//! - lerp_f32 / hermite_segment (the only segment evaluator; curves and the
//!   compressor both go through it)
//! - estimate_tangents (central differences, flattened at extrema)
//! - quaternion hemisphere continuity
//! - rgb_to_hsv

use crate::curve::Keyframe;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Secant slope between two keys; zero for coincident times.
#[inline]
pub fn secant(k0: &Keyframe, k1: &Keyframe) -> f32 {
    let dt = k1.time - k0.time;
    if dt > 0.0 {
        (k1.value - k0.value) / dt
    } else {
        0.0
    }
}

/// Evaluate the segment `k0 -> k1` at absolute time `t`.
///
/// Uses `k0.out_tangent` and `k1.in_tangent`. When neither is set the segment is
/// a straight line; a single missing tangent is replaced by the secant slope.
/// `t` is clamped to the segment.
#[inline]
pub fn hermite_segment(k0: &Keyframe, k1: &Keyframe, t: f32) -> f32 {
    let dt = k1.time - k0.time;
    if dt <= 0.0 {
        return k0.value;
    }
    let s = ((t - k0.time) / dt).clamp(0.0, 1.0);
    match (k0.out_tangent, k1.in_tangent) {
        (None, None) => lerp_f32(k0.value, k1.value, s),
        (m0, m1) => {
            let chord = secant(k0, k1);
            let m0 = m0.unwrap_or(chord);
            let m1 = m1.unwrap_or(chord);
            let s2 = s * s;
            let s3 = s2 * s;
            let h10 = s3 - 2.0 * s2 + s;
            let h01 = -2.0 * s3 + 3.0 * s2;
            let h11 = s3 - s2;
            // h00 + h01 == 1; written relative to v0 so flat segments stay exact.
            k0.value + (k1.value - k0.value) * h01 + h10 * dt * m0 + h11 * dt * m1
        }
    }
}

/// Estimate one tangent per sample from its neighbours.
///
/// Interior samples use the central difference over `[i-1, i+1]`, endpoints the
/// one-sided slope. Local extrema get a flat tangent and magnitudes are limited
/// to three times the smaller adjacent slope, which keeps each native segment
/// monotone.
pub fn estimate_tangents(times: &[f32], values: &[f32]) -> Vec<f32> {
    let n = times.len().min(values.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let slope = |i: usize| {
        let dt = times[i + 1] - times[i];
        if dt > 0.0 {
            (values[i + 1] - values[i]) / dt
        } else {
            0.0
        }
    };

    let mut out = Vec::with_capacity(n);
    out.push(slope(0));
    for i in 1..n - 1 {
        let d0 = slope(i - 1);
        let d1 = slope(i);
        if d0 == 0.0 || d1 == 0.0 || d0.signum() != d1.signum() {
            out.push(0.0);
            continue;
        }
        let span = times[i + 1] - times[i - 1];
        let central = if span > 0.0 {
            (values[i + 1] - values[i - 1]) / span
        } else {
            0.0
        };
        let limit = 3.0 * d0.abs().min(d1.abs());
        out.push(central.signum() * central.abs().min(limit));
    }
    out.push(slope(n - 2));
    out
}

#[inline]
pub fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

#[inline]
pub fn negate4(q: [f32; 4]) -> [f32; 4] {
    [-q[0], -q[1], -q[2], -q[3]]
}

/// Flip samples so consecutive quaternions lie in the same hemisphere.
/// Returns the number of flipped samples.
pub fn make_sign_continuous(samples: &mut [[f32; 4]]) -> usize {
    let mut flips = 0;
    for i in 1..samples.len() {
        if dot4(samples[i - 1], samples[i]) < 0.0 {
            samples[i] = negate4(samples[i]);
            flips += 1;
        }
    }
    flips
}

/// RGB (0..1) to HSV (0..1). Greys report hue 0.
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };
    if delta <= 0.0 {
        return (0.0, s, v);
    }
    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let h = (sector / 6.0).rem_euclid(1.0);
    (h, s, v)
}

//! Keyframe reduction.
//!
//! Coupled channels (a position triple, a quaternion, an RGB colour) are reduced
//! together so every output channel shares the same key times. The reduction is
//! a span split in the Douglas-Peucker family:
//!
//! - first and last samples are always kept;
//! - for a span `[l, r]` every interior sample is compared against the Hermite
//!   segment built from `l` and `r` alone, using the group's [`ErrorMetric`];
//! - if the worst sample is within tolerance the span collapses, otherwise that
//!   sample is kept and both halves are processed.
//!
//! Keys carry explicit tangents. Tangents given on the input are kept, missing
//! ones are estimated from the native samples, so a span's shape depends only on
//! its two end keys. The segment checked during reduction is therefore exactly
//! the segment the output curve evaluates, and recompressing an output with the
//! same tolerance returns it unchanged.

use log::{debug, trace};

use crate::curve::{Keyframe, SampleCurve};
use crate::error::CurveError;
use crate::interp::functions::make_sign_continuous;
use crate::interp::{estimate_tangents, hermite_segment};
use crate::metric::{
    ColorHsvMetric, ErrorMetric, PositionMetric, RotationMetric, ScalarMetric, ScaleMetric,
};

/// Reduce a single scalar curve so that no native sample moves by more than
/// `max_error`.
pub fn compress(curve: &SampleCurve, max_error: f32) -> Result<SampleCurve, CurveError> {
    let metric = ScalarMetric::new(max_error)?;
    single(compress_channels(std::slice::from_ref(curve), &metric)?)
}

/// Reduce a single scale component; `min_ratio` is the largest acceptable
/// multiplicative error (e.g. 1.1 for 10%).
pub fn compress_scale(curve: &SampleCurve, min_ratio: f32) -> Result<SampleCurve, CurveError> {
    let metric = ScaleMetric::new(min_ratio, 1)?;
    single(compress_channels(std::slice::from_ref(curve), &metric)?)
}

/// Reduce a scale triple `[x, y, z]` with shared key times.
pub fn compress_scales(
    channels: &[SampleCurve],
    min_ratio: f32,
) -> Result<Vec<SampleCurve>, CurveError> {
    let metric = ScaleMetric::new(min_ratio, 3)?;
    compress_channels(channels, &metric)
}

/// Reduce a position triple `[x, y, z]` within a Euclidean distance.
pub fn compress_positions(
    channels: &[SampleCurve],
    max_distance: f32,
) -> Result<Vec<SampleCurve>, CurveError> {
    let metric = PositionMetric::new(max_distance)?;
    compress_channels(channels, &metric)
}

/// Reduce quaternion channels `[x, y, z, w]` within an angle in degrees.
///
/// Samples are made sign-continuous first (a sample whose dot product with its
/// predecessor is negative is negated), so output keys may hold `-q` where the
/// input held `q`; both encode the same rotation. This includes the endpoints:
/// the first and last keys keep their times and rotations, but the last key's
/// components are negated when the input path crossed hemispheres an odd
/// number of times.
pub fn compress_rotations(
    channels: &[SampleCurve],
    max_angle_degrees: f32,
) -> Result<Vec<SampleCurve>, CurveError> {
    let metric = RotationMetric::new(max_angle_degrees)?;
    let mut group = SampledGroup::sample(metric.name(), channels, metric.arity())?;
    group.make_quaternions_continuous();
    group.reduce(&metric)
}

/// Reduce an RGB triple `[r, g, b]` with independent HSV tolerances.
pub fn compress_colors_hsv(
    channels: &[SampleCurve],
    hue: f32,
    saturation: f32,
    value: f32,
) -> Result<Vec<SampleCurve>, CurveError> {
    let metric = ColorHsvMetric::new(hue, saturation, value)?;
    compress_channels(channels, &metric)
}

/// Reduce `channels` jointly under `metric`.
///
/// Channel order must match what the metric expects. Channels are sampled at
/// the union of their key times. A group whose samples collapse to a single time
/// is returned unchanged.
pub fn compress_channels<M: ErrorMetric + ?Sized>(
    channels: &[SampleCurve],
    metric: &M,
) -> Result<Vec<SampleCurve>, CurveError> {
    SampledGroup::sample(metric.name(), channels, metric.arity())?.reduce(metric)
}

fn single(mut out: Vec<SampleCurve>) -> Result<SampleCurve, CurveError> {
    match out.pop() {
        Some(curve) if out.is_empty() => Ok(curve),
        _ => Err(CurveError::ChannelCount {
            group: "scalar",
            expected: 1,
            actual: out.len() + 1,
        }),
    }
}

/// Channels resampled onto a common time base.
struct SampledGroup<'a> {
    name: &'static str,
    originals: &'a [SampleCurve],
    times: Vec<f32>,
    /// `values[channel][sample]`
    values: Vec<Vec<f32>>,
    in_tangents: Vec<Vec<Option<f32>>>,
    out_tangents: Vec<Vec<Option<f32>>>,
}

impl<'a> SampledGroup<'a> {
    fn sample(
        name: &'static str,
        channels: &'a [SampleCurve],
        arity: usize,
    ) -> Result<Self, CurveError> {
        if arity == 0 || channels.len() != arity {
            return Err(CurveError::ChannelCount {
                group: name,
                expected: arity.max(1),
                actual: channels.len(),
            });
        }
        if channels.iter().any(SampleCurve::is_empty) {
            return Err(CurveError::EmptyCurve);
        }

        let times = shared_times(channels);
        let mut values = Vec::with_capacity(arity);
        let mut in_tangents = Vec::with_capacity(arity);
        let mut out_tangents = Vec::with_capacity(arity);
        for curve in channels {
            let keys = curve.keys();
            let mut v = Vec::with_capacity(times.len());
            let mut tin = Vec::with_capacity(times.len());
            let mut tout = Vec::with_capacity(times.len());
            for &t in &times {
                match keys.binary_search_by(|k| k.time.total_cmp(&t)) {
                    Ok(i) => {
                        v.push(keys[i].value);
                        tin.push(keys[i].in_tangent);
                        tout.push(keys[i].out_tangent);
                    }
                    Err(_) => {
                        v.push(curve.evaluate(t));
                        tin.push(None);
                        tout.push(None);
                    }
                }
            }
            values.push(v);
            in_tangents.push(tin);
            out_tangents.push(tout);
        }

        Ok(Self {
            name,
            originals: channels,
            times,
            values,
            in_tangents,
            out_tangents,
        })
    }

    /// Negate whole samples (values and explicit tangents) so consecutive
    /// quaternions share a hemisphere. Expects four channels.
    fn make_quaternions_continuous(&mut self) {
        if self.values.len() != 4 {
            return;
        }
        let mut quats: Vec<[f32; 4]> = (0..self.times.len())
            .map(|i| {
                [
                    self.values[0][i],
                    self.values[1][i],
                    self.values[2][i],
                    self.values[3][i],
                ]
            })
            .collect();
        let before = quats.clone();
        if make_sign_continuous(&mut quats) == 0 {
            return;
        }
        for (i, (q, orig)) in quats.iter().zip(&before).enumerate() {
            if q == orig {
                continue;
            }
            for c in 0..4 {
                self.values[c][i] = q[c];
                self.in_tangents[c][i] = self.in_tangents[c][i].map(|m| -m);
                self.out_tangents[c][i] = self.out_tangents[c][i].map(|m| -m);
            }
        }
    }

    /// Final per-sample keys with every tangent resolved.
    fn keys(&self) -> Vec<Vec<Keyframe>> {
        (0..self.values.len())
            .map(|c| {
                let estimated = estimate_tangents(&self.times, &self.values[c]);
                self.times
                    .iter()
                    .enumerate()
                    .map(|(i, &time)| Keyframe {
                        time,
                        value: self.values[c][i],
                        in_tangent: Some(self.in_tangents[c][i].unwrap_or(estimated[i])),
                        out_tangent: Some(self.out_tangents[c][i].unwrap_or(estimated[i])),
                    })
                    .collect()
            })
            .collect()
    }

    fn reduce<M: ErrorMetric + ?Sized>(self, metric: &M) -> Result<Vec<SampleCurve>, CurveError> {
        let n = self.times.len();
        if n == 1 {
            return Ok(self.originals.to_vec());
        }

        let keys = self.keys();
        let retained = retain_keys(&self.times, &self.values, &keys, metric);
        let kept = retained.iter().filter(|k| **k).count();
        debug!(
            "compress {}: {} channel(s), {} samples -> {} keys",
            self.name,
            keys.len(),
            n,
            kept
        );

        keys.into_iter()
            .map(|channel| {
                let reduced = channel
                    .into_iter()
                    .zip(&retained)
                    .filter_map(|(k, &keep)| keep.then_some(k))
                    .collect();
                SampleCurve::from_keys(reduced)
            })
            .collect()
    }
}

/// Sorted union of the channels' key times. Identical time bases (the usual
/// recorded case) are reused without merging.
fn shared_times(channels: &[SampleCurve]) -> Vec<f32> {
    let first: Vec<f32> = channels[0].times().collect();
    if channels[1..].iter().all(|c| c.times().eq(first.iter().copied())) {
        return first;
    }
    let mut times: Vec<f32> = channels.iter().flat_map(|c| c.times()).collect();
    times.sort_by(f32::total_cmp);
    times.dedup();
    times
}

/// Mark the samples to keep. Spans are processed from an explicit stack.
fn retain_keys<M: ErrorMetric + ?Sized>(
    times: &[f32],
    values: &[Vec<f32>],
    keys: &[Vec<Keyframe>],
    metric: &M,
) -> Vec<bool> {
    let n = times.len();
    let arity = values.len();
    let mut retained = vec![false; n];
    retained[0] = true;
    retained[n - 1] = true;

    let mut original = vec![0.0f32; arity];
    let mut candidate = vec![0.0f32; arity];
    let mut spans = vec![(0usize, n - 1)];
    while let Some((l, r)) = spans.pop() {
        if r - l < 2 {
            continue;
        }
        let mut worst = f32::NEG_INFINITY;
        let mut worst_idx = l + 1;
        for i in (l + 1)..r {
            for c in 0..arity {
                original[c] = values[c][i];
                candidate[c] = hermite_segment(&keys[c][l], &keys[c][r], times[i]);
            }
            let d = metric.deviation(&original, &candidate);
            let d = if d.is_nan() { f32::INFINITY } else { d };
            if d > worst {
                worst = d;
                worst_idx = i;
            }
        }
        if metric.within(worst) {
            continue;
        }
        trace!(
            "{}: split [{}, {}] at {} (deviation {})",
            metric.name(),
            times[l],
            times[r],
            times[worst_idx],
            worst
        );
        retained[worst_idx] = true;
        spans.push((l, worst_idx));
        spans.push((worst_idx, r));
    }
    retained
}

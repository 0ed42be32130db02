//! Error metrics used to decide whether a reduced curve still tracks the
//! recorded one.
//!
//! Every metric compares one original sample (one value per channel) against
//! the candidate reconstruction at the same time and reports a deviation in its
//! own unit. A sample is acceptable when `within(deviation)` holds.

use crate::curve::SampleCurve;
use crate::error::CurveError;
use crate::interp::functions::rgb_to_hsv;

/// Per-domain deviation between an original sample and a reconstruction.
pub trait ErrorMetric {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Number of coupled channels the metric consumes; at least 1.
    fn arity(&self) -> usize;

    /// Deviation of `candidate` from `original`.
    ///
    /// Callers pass slices of exactly `arity()` values; implementations may
    /// index them directly and panic on shorter input.
    fn deviation(&self, original: &[f32], candidate: &[f32]) -> f32;

    /// Largest acceptable deviation.
    fn tolerance(&self) -> f32;

    #[inline]
    fn within(&self, deviation: f32) -> bool {
        deviation <= self.tolerance()
    }
}

/// `|a - b|` on a single channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarMetric {
    pub max_error: f32,
}

impl ScalarMetric {
    pub fn new(max_error: f32) -> Result<Self, CurveError> {
        Ok(Self {
            max_error: non_negative("generic", max_error)?,
        })
    }
}

impl ErrorMetric for ScalarMetric {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn arity(&self) -> usize {
        1
    }

    fn deviation(&self, original: &[f32], candidate: &[f32]) -> f32 {
        (original[0] - candidate[0]).abs()
    }

    fn tolerance(&self) -> f32 {
        self.max_error
    }
}

/// Euclidean distance between two 3-vectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionMetric {
    pub max_distance: f32,
}

impl PositionMetric {
    pub fn new(max_distance: f32) -> Result<Self, CurveError> {
        Ok(Self {
            max_distance: non_negative("position", max_distance)?,
        })
    }
}

impl ErrorMetric for PositionMetric {
    fn name(&self) -> &'static str {
        "position"
    }

    fn arity(&self) -> usize {
        3
    }

    fn deviation(&self, original: &[f32], candidate: &[f32]) -> f32 {
        let dx = original[0] - candidate[0];
        let dy = original[1] - candidate[1];
        let dz = original[2] - candidate[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    fn tolerance(&self) -> f32 {
        self.max_distance
    }
}

/// Angle in degrees between two quaternions (x, y, z, w).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotationMetric {
    pub max_angle_degrees: f32,
}

impl RotationMetric {
    pub fn new(max_angle_degrees: f32) -> Result<Self, CurveError> {
        Ok(Self {
            max_angle_degrees: non_negative("rotation", max_angle_degrees)?,
        })
    }
}

impl ErrorMetric for RotationMetric {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn arity(&self) -> usize {
        4
    }

    fn deviation(&self, original: &[f32], candidate: &[f32]) -> f32 {
        quat_angle_degrees(
            [original[0], original[1], original[2], original[3]],
            [candidate[0], candidate[1], candidate[2], candidate[3]],
        )
    }

    fn tolerance(&self) -> f32 {
        self.max_angle_degrees
    }
}

/// `2 * acos(|dot(q1, q2)|)` in degrees, after normalizing both inputs.
///
/// Sign-insensitive (q and -q are the same rotation). A zero-length quaternion
/// on either side reports zero error. Computed in f64 because `acos` near 1 is
/// too coarse in single precision for sub-degree tolerances.
pub fn quat_angle_degrees(a: [f32; 4], b: [f32; 4]) -> f32 {
    let a = a.map(f64::from);
    let b = b.map(f64::from);
    let la = (a[0] * a[0] + a[1] * a[1] + a[2] * a[2] + a[3] * a[3]).sqrt();
    let lb = (b[0] * b[0] + b[1] * b[1] + b[2] * b[2] + b[3] * b[3]).sqrt();
    if !(la > 0.0 && lb > 0.0) || !la.is_finite() || !lb.is_finite() {
        return 0.0;
    }
    let dot = (a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]) / (la * lb);
    let dot = dot.abs().min(1.0);
    (2.0 * dot.acos()).to_degrees() as f32
}

/// Multiplicative error on scale channels. The tolerance is the largest
/// acceptable `max(a, b) / min(a, b)` ratio, so it must be at least 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleMetric {
    pub min_ratio: f32,
    channels: usize,
}

impl ScaleMetric {
    /// Metric over `channels` independent scale components (1 or 3).
    pub fn new(min_ratio: f32, channels: usize) -> Result<Self, CurveError> {
        if !min_ratio.is_finite() || min_ratio < 1.0 {
            return Err(CurveError::InvalidThreshold {
                name: "scale",
                value: min_ratio,
            });
        }
        Ok(Self {
            min_ratio,
            channels: channels.max(1),
        })
    }
}

impl ErrorMetric for ScaleMetric {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn arity(&self) -> usize {
        self.channels
    }

    fn deviation(&self, original: &[f32], candidate: &[f32]) -> f32 {
        original
            .iter()
            .zip(candidate)
            .take(self.channels)
            .map(|(&a, &b)| scale_ratio(a, b))
            .fold(1.0, f32::max)
    }

    fn tolerance(&self) -> f32 {
        self.min_ratio
    }
}

/// `max(|a|, |b|) / min(|a|, |b|)`. Equal values (including both zero) give 1;
/// a sign flip or a one-sided zero gives infinity.
pub fn scale_ratio(a: f32, b: f32) -> f32 {
    if a == b {
        return 1.0;
    }
    if a == 0.0 || b == 0.0 || a.signum() != b.signum() {
        return f32::INFINITY;
    }
    let (a, b) = (a.abs(), b.abs());
    a.max(b) / a.min(b)
}

/// HSV distance on RGB triples with separate hue, saturation and value
/// tolerances.
///
/// The deviation is normalized: the largest of `dh / hue`, `ds / saturation`
/// and `dv / value`, so the tolerance is always 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorHsvMetric {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl ColorHsvMetric {
    pub fn new(hue: f32, saturation: f32, value: f32) -> Result<Self, CurveError> {
        Ok(Self {
            hue: non_negative("hue", hue)?,
            saturation: non_negative("saturation", saturation)?,
            value: non_negative("value", value)?,
        })
    }
}

impl ErrorMetric for ColorHsvMetric {
    fn name(&self) -> &'static str {
        "color"
    }

    fn arity(&self) -> usize {
        3
    }

    fn deviation(&self, original: &[f32], candidate: &[f32]) -> f32 {
        let (h0, s0, v0) = rgb_to_hsv(original[0], original[1], original[2]);
        let (h1, s1, v1) = rgb_to_hsv(candidate[0], candidate[1], candidate[2]);
        relative(hue_distance(h0, h1), self.hue)
            .max(relative((s0 - s1).abs(), self.saturation))
            .max(relative((v0 - v1).abs(), self.value))
    }

    fn tolerance(&self) -> f32 {
        1.0
    }
}

/// Circular distance between two hues in `[0, 1)`.
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs().rem_euclid(1.0);
    d.min(1.0 - d)
}

fn relative(distance: f32, tolerance: f32) -> f32 {
    if tolerance > 0.0 {
        distance / tolerance
    } else if distance > 0.0 {
        f32::INFINITY
    } else {
        0.0
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<f32, CurveError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CurveError::InvalidThreshold { name, value })
    }
}

/// Largest deviation between `originals` and `reduced` over `[start, end]`,
/// sampled at the originals' native key times.
///
/// Both slices hold one curve per metric channel. Times where no original has
/// a key are not inspected.
pub fn max_deviation<M: ErrorMetric + ?Sized>(
    metric: &M,
    originals: &[SampleCurve],
    reduced: &[SampleCurve],
    range: (f32, f32),
) -> Result<f32, CurveError> {
    let arity = metric.arity();
    for set in [originals, reduced] {
        if set.len() != arity {
            return Err(CurveError::ChannelCount {
                group: metric.name(),
                expected: arity,
                actual: set.len(),
            });
        }
    }

    let (start, end) = range;
    let mut times: Vec<f32> = originals
        .iter()
        .flat_map(|c| c.times())
        .filter(|t| *t >= start && *t <= end)
        .collect();
    times.sort_by(f32::total_cmp);
    times.dedup();

    let mut original = vec![0.0; arity];
    let mut candidate = vec![0.0; arity];
    let mut worst = 0.0f32;
    for t in times {
        for c in 0..arity {
            original[c] = originals[c].evaluate(t);
            candidate[c] = reduced[c].evaluate(t);
        }
        worst = worst.max(metric.deviation(&original, &candidate));
    }
    Ok(worst)
}

//! Scalar animation curve model.
//!
//! A [`SampleCurve`] is one animated float channel: keyframes ordered by strictly
//! increasing time. Recording appends keys through [`SampleCurve::add_key`]; the
//! compressor rebuilds curves with explicit tangents.

use serde::{Deserialize, Serialize};

use crate::error::CurveError;
use crate::interp::hermite_segment;

/// A single key. Tangents are slopes in value units per second; `None` means
/// "unspecified" and the adjacent segment falls back to its secant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    #[serde(default, rename = "inTangent", skip_serializing_if = "Option::is_none")]
    pub in_tangent: Option<f32>,
    #[serde(default, rename = "outTangent", skip_serializing_if = "Option::is_none")]
    pub out_tangent: Option<f32>,
}

impl Keyframe {
    /// Key without tangents (linear on both sides).
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: None,
            out_tangent: None,
        }
    }

    pub fn with_tangents(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: Some(in_tangent),
            out_tangent: Some(out_tangent),
        }
    }
}

/// Ordered keyframes for one channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct SampleCurve {
    keys: Vec<Keyframe>,
}

impl SampleCurve {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from keys, validating finite values and strictly increasing times.
    pub fn from_keys(keys: Vec<Keyframe>) -> Result<Self, CurveError> {
        let mut last: Option<f32> = None;
        for k in &keys {
            check_finite(k.time, k.value)?;
            if let Some(prev) = last {
                if k.time <= prev {
                    return Err(CurveError::NonMonotonicKey {
                        time: k.time,
                        last: prev,
                    });
                }
            }
            last = Some(k.time);
        }
        Ok(Self { keys })
    }

    /// Build a tangent-less curve from `(time, value)` samples.
    pub fn from_samples(samples: &[(f32, f32)]) -> Result<Self, CurveError> {
        let mut curve = Self {
            keys: Vec::with_capacity(samples.len()),
        };
        for &(t, v) in samples {
            curve.add_key(t, v)?;
        }
        Ok(curve)
    }

    /// Append a key. `t` must be strictly greater than the last key time.
    pub fn add_key(&mut self, t: f32, value: f32) -> Result<(), CurveError> {
        check_finite(t, value)?;
        if let Some(last) = self.keys.last() {
            if t <= last.time {
                return Err(CurveError::NonMonotonicKey {
                    time: t,
                    last: last.time,
                });
            }
        }
        self.keys.push(Keyframe::new(t, value));
        Ok(())
    }

    #[inline]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn into_keys(self) -> Vec<Keyframe> {
        self.keys
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn first(&self) -> Option<&Keyframe> {
        self.keys.first()
    }

    pub fn last(&self) -> Option<&Keyframe> {
        self.keys.last()
    }

    pub fn start_time(&self) -> Option<f32> {
        self.first().map(|k| k.time)
    }

    pub fn end_time(&self) -> Option<f32> {
        self.last().map(|k| k.time)
    }

    pub fn times(&self) -> impl Iterator<Item = f32> + '_ {
        self.keys.iter().map(|k| k.time)
    }

    /// Evaluate at absolute time `t`, holding the end values outside the key
    /// range. Exact at key times. An empty curve evaluates to 0.0.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (i0, i1) = find_segment(&self.keys, t);
        match self.keys.get(i0) {
            None => 0.0,
            Some(k0) if i0 == i1 => k0.value,
            Some(k0) => hermite_segment(k0, &self.keys[i1], t),
        }
    }

    /// True when every key holds the same value (within `f32::EPSILON`) and no
    /// explicit tangent bends the curve away from it.
    ///
    /// Stricter than comparing values alone: equal values with a non-zero
    /// explicit tangent still overshoot between keys, so such a curve is not
    /// constant.
    pub fn is_constant(&self) -> bool {
        let Some(first) = self.keys.first() else {
            return true;
        };
        self.keys.iter().all(|k| {
            (k.value - first.value).abs() <= f32::EPSILON
                && k.in_tangent.map_or(true, |m| m == 0.0)
                && k.out_tangent.map_or(true, |m| m == 0.0)
        })
    }
}

impl TryFrom<Vec<Keyframe>> for SampleCurve {
    type Error = CurveError;

    fn try_from(keys: Vec<Keyframe>) -> Result<Self, Self::Error> {
        Self::from_keys(keys)
    }
}

impl From<SampleCurve> for Vec<Keyframe> {
    fn from(curve: SampleCurve) -> Self {
        curve.keys
    }
}

fn check_finite(time: f32, value: f32) -> Result<(), CurveError> {
    if time.is_finite() && value.is_finite() {
        Ok(())
    } else {
        Err(CurveError::NonFinite { time, value })
    }
}

/// Find the segment `[i, i+1]` containing `t`.
/// Edge cases:
/// - `t` at or before the first key returns `(0, 0)`.
/// - `t` at or after the last key returns `(last, last)`.
/// - `t` exactly on an interior key returns `(i, i)`.
fn find_segment(keys: &[Keyframe], t: f32) -> (usize, usize) {
    let n = keys.len();
    if n <= 1 || t <= keys[0].time {
        return (0, 0);
    }
    if t >= keys[n - 1].time {
        return (n - 1, n - 1);
    }
    // First key strictly after t; t > keys[0].time guarantees idx >= 1.
    let idx = keys.partition_point(|k| k.time <= t);
    if keys[idx - 1].time == t {
        (idx - 1, idx - 1)
    } else {
        (idx - 1, idx)
    }
}
